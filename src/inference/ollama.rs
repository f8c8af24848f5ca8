//! reqwest-backed client for the local generate endpoint

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use tracing::{Instrument, Span, debug};

use super::{InferenceClient, InferenceConfig, InferenceError, InferenceResult, resolve_model_name};

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

/// Non-streaming client for `/api/generate`
#[derive(Clone)]
pub struct OllamaClient {
    client: Client,
    endpoint: String,
    model_name: String,
    span: Span,
}

impl OllamaClient {
    /// Build a client for `model` against the configured endpoint
    ///
    /// An empty model name resolves to the default model.
    pub fn new(config: &InferenceConfig, model: &str) -> InferenceResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| InferenceError::Transport(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: config.generate_url(),
            model_name: resolve_model_name(model),
            span: tracing::info_span!("inference"),
        })
    }

    /// Replace the span this client logs under
    #[must_use]
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn send(&self, prompt: &str) -> InferenceResult<String> {
        debug!(endpoint = %self.endpoint, model = %self.model_name, "Sending generate request");

        let request = GenerateRequest {
            model: &self.model_name,
            prompt,
            stream: false,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| InferenceError::Transport(e.to_string()))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(InferenceError::Protocol(format!(
                "unexpected status code: {}",
                status.as_u16()
            )));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| InferenceError::Transport(format!("error reading response body: {e}")))?;

        let parsed: serde_json::Value = serde_json::from_slice(&body)
            .map_err(|e| InferenceError::Protocol(format!("error parsing response: {e}")))?;

        match parsed.get("response") {
            Some(serde_json::Value::String(text)) => {
                debug!(chars = text.len(), "Received generate response");
                Ok(text.clone())
            }
            _ => Err(InferenceError::Protocol(
                "response does not contain 'response' field".to_string(),
            )),
        }
    }
}

#[async_trait]
impl InferenceClient for OllamaClient {
    fn model_name(&self) -> &str {
        &self.model_name
    }

    async fn generate(&self, prompt: &str) -> InferenceResult<String> {
        self.send(prompt).instrument(self.span.clone()).await
    }
}
