use parking_lot::Mutex;
use tracing::{Instrument, Span, debug, error, info};

use crate::agent::{AgentError, AgentResult, QueryResult, build_prompt};
use crate::inference::InferenceClient;

/// Conversational agent with an append-only query history
///
/// Safe to share behind an `Arc`: the history lock is held only while the
/// prompt is assembled and while the finished result is appended, never
/// across the inference round trip. Concurrent queries each see the history
/// as it stood when they started and are appended in completion order.
pub struct ConversationAgent<C: InferenceClient> {
    client: C,
    history: Mutex<Vec<QueryResult>>,
    span: Span,
}

impl<C: InferenceClient> ConversationAgent<C> {
    pub fn new(client: C) -> Self {
        info!(model = client.model_name(), "Creating new agent");
        Self {
            client,
            history: Mutex::new(Vec::new()),
            span: tracing::info_span!("agent"),
        }
    }

    /// Replace the span this agent logs under
    #[must_use]
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn model_name(&self) -> &str {
        self.client.model_name()
    }

    /// Answer `query` using prior completed exchanges as context
    ///
    /// An inference failure is not an `Err`: the returned result has status
    /// `Failed`, carries the error, and is recorded in history like any other
    /// attempt. Only empty input is rejected, and it leaves history untouched.
    pub async fn submit_query(&self, query: &str) -> AgentResult<QueryResult> {
        if query.is_empty() {
            return Err(AgentError::Validation("query cannot be empty".to_string()));
        }

        async {
            info!(query, "Processing query");
            let mut result = QueryResult::started(query);
            let prompt = self.build_prompt(query);
            debug!(chars = prompt.len(), "Assembled prompt");

            match self.client.generate(&prompt).await {
                Ok(answer) => {
                    result.complete(answer);
                    info!("Query processed successfully");
                }
                Err(e) => {
                    error!("Error getting response: {}", e);
                    result.fail(e);
                }
            }

            self.history.lock().push(result.clone());
            Ok(result)
        }
        .instrument(self.span.clone())
        .await
    }

    /// Prompt that would be sent for `query` against the current history
    pub fn build_prompt(&self, query: &str) -> String {
        let history = self.history.lock();
        build_prompt(&history, query)
    }

    /// Snapshot of the history, oldest first
    pub fn history(&self) -> Vec<QueryResult> {
        self.history.lock().clone()
    }

    pub fn clear_history(&self) {
        self.history.lock().clear();
        debug!(parent: &self.span, "History cleared");
    }

    /// Release agent state; safe to call repeatedly
    pub fn close(&self) -> AgentResult<()> {
        self.clear_history();
        Ok(())
    }
}
