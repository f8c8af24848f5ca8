//! Browser infrastructure for launching Chrome and driving a single page
//!
//! The search driver talks to the browser only through [`PageHandle`] and
//! [`BrowserHandle`]; [`ChromePage`] and [`BrowserWrapper`] are the
//! chromiumoxide-backed implementations.

mod page;
mod wait_for_element;
mod wrapper;

pub use crate::browser_setup::{download_managed_browser, find_browser_executable};
pub use page::ChromePage;
pub use wait_for_element::wait_for_element;
pub use wrapper::{BrowserWrapper, create_blank_page, launch_browser};

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BrowserError {
    #[error("Failed to launch browser: {0}")]
    LaunchFailed(String),

    #[error("Failed to create page: {0}")]
    PageCreationFailed(String),

    #[error("Navigation failed: {0}")]
    Navigation(String),

    #[error("Page interaction failed: {0}")]
    Interaction(String),

    #[error("Extraction failed: {0}")]
    Extraction(String),

    #[error("Failed to close browser resources: {0}")]
    Close(String),
}

pub type BrowserResult<T> = Result<T, BrowserError>;

/// Primitives the driver needs from one browser tab
#[async_trait]
pub trait PageHandle: Send + Sync {
    async fn navigate(&self, url: &str) -> BrowserResult<()>;

    async fn wait_for_load(&self) -> BrowserResult<()>;

    /// Resolve once `selector` matches an element, or fail after `timeout`
    async fn wait_for_selector(&self, selector: &str, timeout: Duration) -> BrowserResult<()>;

    async fn focus(&self, selector: &str) -> BrowserResult<()>;

    async fn is_visible(&self, selector: &str) -> BrowserResult<bool>;

    async fn type_text(&self, selector: &str, text: &str) -> BrowserResult<()>;

    async fn press_key(&self, selector: &str, key: &str) -> BrowserResult<()>;

    /// Evaluate a JavaScript expression and return its JSON value
    async fn evaluate(&self, script: &str) -> BrowserResult<serde_json::Value>;

    /// Rendered HTML of the current document
    async fn content(&self) -> BrowserResult<String>;

    async fn close(&self) -> BrowserResult<()>;
}

/// The browser process behind a page
#[async_trait]
pub trait BrowserHandle: Send {
    async fn close(&mut self) -> BrowserResult<()>;
}
