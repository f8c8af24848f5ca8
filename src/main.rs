// HTTP server for the local conversational assistant
//
// Serves POST /query on the configured bind address (0.0.0.0:8080 by default)
// and forwards queries to the local inference service.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use kodegen_tools_assistant::{ConversationAgent, OllamaClient, load_yaml_config, server};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Overrides `inference.host` from the config file
const INFERENCE_HOST_ENV: &str = "OLLAMA_HOST";

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut config = load_yaml_config().context("Failed to load config.yaml")?;
    config.apply_inference_host(std::env::var(INFERENCE_HOST_ENV).ok());

    let addr: SocketAddr = config
        .server
        .bind_addr
        .parse()
        .with_context(|| format!("Invalid bind address: {}", config.server.bind_addr))?;

    let client = OllamaClient::new(&config.inference, &config.model)
        .context("Failed to create inference client")?;
    info!(endpoint = client.endpoint(), model = %config.model, "Using inference service");

    let agent = Arc::new(ConversationAgent::new(client));

    info!("Server starting on http://{}", addr);
    let served = server::serve(Arc::clone(&agent), addr, shutdown_signal()).await;

    if let Err(e) = agent.close() {
        warn!("Failed to close agent: {}", e);
    }
    served.context("HTTP server failed")
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
