//! Task decomposition
//!
//! Asks the inference service to split free text into `{task, description}`
//! pairs. Model output is not guaranteed to be valid JSON, so the reply is
//! cleaned up before parsing: code fences are stripped, the outermost
//! `[`...`]` region is sliced out and raw control characters are flattened
//! to spaces.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{Instrument, Span, debug, error, info};

use crate::inference::{InferenceClient, InferenceError};

/// One unit of work extracted from user input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub task: String,
    pub description: String,
}

#[derive(Error, Debug)]
pub enum DecomposeError {
    #[error("error getting response from inference service: {0}")]
    Inference(#[from] InferenceError),

    #[error("{0}")]
    Parse(String),
}

pub type DecomposeResult<T> = Result<T, DecomposeError>;

/// Prompt asking for a JSON array of tasks describing `input`
pub fn decomposition_prompt(input: &str) -> String {
    format!(
        r#"Given the following user input, break it down into a list of specific tasks or instructions.
Format each task with a 'task' field and a 'description' field.
Return the response as a valid JSON array.

User Input: {input}

Example format:
[
    {{"task": "Task 1", "description": "Description of task 1"}},
    {{"task": "Task 2", "description": "Description of task 2"}}
]"#
    )
}

/// Slice the task array out of raw model output and parse it
///
/// Fails when no `[`...`]` region exists or when the cleaned slice is not an
/// array of objects with string `task` and `description` fields.
pub fn extract_task_array(raw: &str) -> DecomposeResult<Vec<Task>> {
    let trimmed = raw.trim();
    let trimmed = trimmed.strip_prefix("```json").unwrap_or(trimmed);
    let trimmed = trimmed.strip_suffix("```").unwrap_or(trimmed);
    let trimmed = trimmed.trim();

    let (Some(start), Some(end)) = (trimmed.find('['), trimmed.rfind(']')) else {
        return Err(DecomposeError::Parse(
            "could not find JSON array in response".to_string(),
        ));
    };
    if end < start {
        return Err(DecomposeError::Parse(
            "could not find JSON array in response".to_string(),
        ));
    }

    let cleaned: String = trimmed[start..=end]
        .chars()
        .map(|c| if matches!(c, '\n' | '\r' | '\t') { ' ' } else { c })
        .collect();

    serde_json::from_str(&cleaned)
        .map_err(|e| DecomposeError::Parse(format!("error parsing tasks: {e}")))
}

/// Turns free text into an ordered task list via the inference service
pub struct TaskDecomposer<C: InferenceClient> {
    client: C,
    span: Span,
}

impl<C: InferenceClient> TaskDecomposer<C> {
    pub fn new(client: C) -> Self {
        info!(model = client.model_name(), "Creating new task decomposer");
        Self {
            client,
            span: tracing::info_span!("decomposer"),
        }
    }

    /// Replace the span this decomposer logs under
    #[must_use]
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn model_name(&self) -> &str {
        self.client.model_name()
    }

    pub async fn decompose(&self, input: &str) -> DecomposeResult<Vec<Task>> {
        async {
            info!(input, "Parsing input");

            let response = self
                .client
                .generate(&decomposition_prompt(input))
                .await
                .inspect_err(|e| error!("Error getting response: {}", e))?;
            debug!(chars = response.len(), "Received decomposition response");

            let tasks = extract_task_array(&response)?;
            info!("Parsed input into {} tasks", tasks.len());
            Ok(tasks)
        }
        .instrument(self.span.clone())
        .await
    }
}
