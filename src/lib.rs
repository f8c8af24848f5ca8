//! Local conversational assistant
//!
//! A context-aware agent and a task decomposer on top of a local inference
//! service, plus a browser-driven web search and page scraper.

pub mod agent;
mod browser;
pub mod browser_setup;
pub mod decomposer;
pub mod inference;
pub mod retry;
pub mod server;
pub mod web_search;

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::inference::InferenceConfig;
use crate::web_search::SearchConfig;

const CONFIG_FILE_NAME: &str = "config.yaml";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Model name sent with every generate request
    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default)]
    pub inference: InferenceConfig,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub browser: BrowserConfig,

    #[serde(default)]
    pub search: SearchConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
}

/// Browser security and launch configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    /// Run browser in headless mode
    #[serde(default = "default_headless")]
    pub headless: bool,

    /// Disable web security features (Same-Origin Policy, etc.)
    /// WARNING: Only enable for trusted content
    #[serde(default = "default_disable_security")]
    pub disable_security: bool,

    /// Window dimensions
    #[serde(default)]
    pub window: WindowConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowConfig {
    #[serde(default = "default_window_width")]
    pub width: u32,

    #[serde(default = "default_window_height")]
    pub height: u32,
}

fn default_model() -> String {
    inference::DEFAULT_MODEL.to_string()
}

fn default_bind_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_headless() -> bool {
    false
}

fn default_disable_security() -> bool {
    false
}

fn default_window_width() -> u32 {
    1280
}

fn default_window_height() -> u32 {
    800
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model: default_model(),
            inference: InferenceConfig::default(),
            server: ServerConfig::default(),
            browser: BrowserConfig::default(),
            search: SearchConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
        }
    }
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: default_headless(),
            disable_security: default_disable_security(),
            window: WindowConfig::default(),
        }
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: default_window_width(),
            height: default_window_height(),
        }
    }
}

impl Config {
    /// Point the inference client at `host`; blank or absent leaves the config as is
    pub fn apply_inference_host(&mut self, host: Option<String>) {
        if let Some(host) = host
            && !host.trim().is_empty()
        {
            self.inference.host = host.trim().to_string();
        }
    }
}

/// Load config.yaml from the working directory, then the package root
///
/// Falls back to defaults when neither exists.
pub fn load_yaml_config() -> anyhow::Result<Config> {
    let candidates = [
        PathBuf::from(CONFIG_FILE_NAME),
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join(CONFIG_FILE_NAME),
    ];

    match candidates.iter().find(|path| path.exists()) {
        Some(path) => load_yaml_config_from(path),
        None => Ok(Config::default()),
    }
}

/// Load config from an explicit YAML file
pub fn load_yaml_config_from(path: &Path) -> anyhow::Result<Config> {
    let contents = fs::read_to_string(path)?;
    let config: Config = serde_yaml::from_str(&contents)?;
    Ok(config)
}

pub use agent::{AgentError, AgentResult, ConversationAgent, QueryResult, QueryStatus};
pub use browser::{
    BrowserError, BrowserHandle, BrowserResult, BrowserWrapper, ChromePage, PageHandle,
    download_managed_browser, find_browser_executable, launch_browser,
};
pub use decomposer::{DecomposeError, Task, TaskDecomposer};
pub use inference::{InferenceClient, InferenceError, OllamaClient};
pub use server::ServerError;
pub use web_search::{SearchDriver, SearchOutcome, SearchResult, SearchStage};
