//! Inference service client
//!
//! Both the conversational agent and the task decomposer talk to the same
//! local generation endpoint: `POST http://<host>:<port>/api/generate` with
//! `{model, prompt, stream: false}`, answered by `{response}`.

mod ollama;

pub use ollama::OllamaClient;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default port the local inference service listens on
pub const DEFAULT_INFERENCE_PORT: u16 = 11434;

/// Model used when none (or an empty name) is configured
pub const DEFAULT_MODEL: &str = "mistral";

/// Endpoint resolution and transport settings for the inference service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InferenceConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Upper bound for a single generate round trip
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    DEFAULT_INFERENCE_PORT
}

fn default_request_timeout_secs() -> u64 {
    300
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl InferenceConfig {
    /// Full URL of the generate endpoint
    #[must_use]
    pub fn generate_url(&self) -> String {
        format!("http://{}:{}/api/generate", self.host, self.port)
    }
}

/// Resolve the model name, falling back to [`DEFAULT_MODEL`] when empty
#[must_use]
pub fn resolve_model_name(model: &str) -> String {
    let trimmed = model.trim();
    if trimmed.is_empty() {
        DEFAULT_MODEL.to_string()
    } else {
        trimmed.to_string()
    }
}

#[derive(Error, Debug)]
pub enum InferenceError {
    /// Network or HTTP failure reaching the service
    #[error("error sending request to inference service: {0}")]
    Transport(String),

    /// Service answered, but not with the expected shape
    #[error("unexpected inference response: {0}")]
    Protocol(String),
}

pub type InferenceResult<T> = Result<T, InferenceError>;

/// Turns a prompt into generated text
#[async_trait]
pub trait InferenceClient: Send + Sync {
    /// Model name sent with every request
    fn model_name(&self) -> &str;

    /// Send one non-streaming generate request and return the `response` text
    async fn generate(&self, prompt: &str) -> InferenceResult<String>;
}
