use serde::{Deserialize, Serialize};

use crate::agent::{AgentResult, QueryResult};

/// Body of `POST /query`
#[derive(Debug, Default, Deserialize)]
pub struct QueryRequest {
    /// Missing or null is treated as empty text
    #[serde(default)]
    pub query: Option<String>,
}

impl QueryRequest {
    /// Parse a request body; a JSON `null` body is an empty request
    pub fn from_body(body: &[u8]) -> serde_json::Result<Self> {
        let request: Option<Self> = serde_json::from_slice(body)?;
        Ok(request.unwrap_or_default())
    }

    pub fn query_text(&self) -> &str {
        self.query.as_deref().unwrap_or_default()
    }
}

/// Reply to `POST /query`
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct QueryResponse {
    pub answer: String,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl QueryResponse {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            answer: String::new(),
            status: "error".to_string(),
            error: Some(message.into()),
        }
    }
}

impl From<AgentResult<QueryResult>> for QueryResponse {
    /// Failed queries and rejected input both surface as `status: "error"`
    fn from(outcome: AgentResult<QueryResult>) -> Self {
        match outcome {
            Ok(result) if result.is_completed() => Self {
                answer: result.answer,
                status: result.status.as_str().to_string(),
                error: None,
            },
            Ok(result) => match result.error {
                Some(error) => Self::error(error.to_string()),
                None => Self::error(result.answer),
            },
            Err(e) => Self::error(e.to_string()),
        }
    }
}
