mod conversation;
pub mod prompts;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::inference::InferenceError;

pub use conversation::ConversationAgent;
pub use prompts::build_prompt;

/// Lifecycle of a single query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryStatus {
    Started,
    Completed,
    Failed,
}

impl QueryStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Started => "started",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

/// One query/answer attempt, as recorded in the agent history
#[derive(Debug, Clone)]
pub struct QueryResult {
    pub query: String,
    pub answer: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub status: QueryStatus,
    /// Underlying failure when `status` is `Failed`
    pub error: Option<Arc<InferenceError>>,
}

impl QueryResult {
    /// Fresh result for `query`, not yet answered
    pub fn started(query: &str) -> Self {
        Self {
            query: query.to_string(),
            answer: String::new(),
            timestamp: chrono::Utc::now(),
            status: QueryStatus::Started,
            error: None,
        }
    }

    pub(crate) fn complete(&mut self, answer: String) {
        self.status = QueryStatus::Completed;
        self.answer = answer;
    }

    pub(crate) fn fail(&mut self, error: InferenceError) {
        self.status = QueryStatus::Failed;
        self.answer = format!("Error: {error}");
        self.error = Some(Arc::new(error));
    }

    pub fn is_completed(&self) -> bool {
        self.status == QueryStatus::Completed
    }
}

/// Error type for agent operations
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("{0}")]
    Validation(String),
}

/// Result type for agent operations
pub type AgentResult<T> = Result<T, AgentError>;
