//! Browser lifecycle management
//!
//! Owns the chromiumoxide browser, its CDP event handler task and the
//! throwaway profile directory.

use std::path::PathBuf;

use anyhow::Context;
use async_trait::async_trait;
use chromiumoxide::browser::Browser;
use chromiumoxide::page::Page;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use super::{BrowserError, BrowserHandle, BrowserResult};
use crate::BrowserConfig;

/// Wrapper for Browser and its event handler task
///
/// The handler MUST be aborted once the browser is gone, otherwise it keeps
/// polling a dead websocket. `Drop` takes care of that.
pub struct BrowserWrapper {
    browser: Browser,
    handler: JoinHandle<()>,
    user_data_dir: Option<PathBuf>,
}

impl BrowserWrapper {
    pub(crate) fn new(browser: Browser, handler: JoinHandle<()>, user_data_dir: PathBuf) -> Self {
        Self {
            browser,
            handler,
            user_data_dir: Some(user_data_dir),
        }
    }

    pub(crate) fn browser(&self) -> &Browser {
        &self.browser
    }

    /// Remove the profile directory
    ///
    /// Only call after `browser.wait()` returned; Chrome holds file locks
    /// until the process exits.
    pub fn cleanup_temp_dir(&mut self) {
        if let Some(path) = self.user_data_dir.take() {
            info!("Cleaning up temp directory: {}", path.display());
            if let Err(e) = std::fs::remove_dir_all(&path) {
                warn!(
                    "Failed to clean up temp directory {}: {}. Manual cleanup may be required.",
                    path.display(),
                    e
                );
            }
        }
    }
}

#[async_trait]
impl BrowserHandle for BrowserWrapper {
    /// Close Chrome, wait for the process to exit, then drop the profile
    ///
    /// The wait and the cleanup run even when the close command fails.
    async fn close(&mut self) -> BrowserResult<()> {
        let closed = self.browser.close().await;
        if let Err(e) = self.browser.wait().await {
            warn!("Failed to wait for browser exit: {}", e);
        }
        self.cleanup_temp_dir();
        self.handler.abort();

        closed
            .map(|_| ())
            .map_err(|e| BrowserError::Close(format!("failed to close browser: {e}")))
    }
}

impl Drop for BrowserWrapper {
    fn drop(&mut self) {
        self.handler.abort();

        if let Some(path) = &self.user_data_dir {
            warn!(
                "BrowserWrapper dropped without close(). Temp directory will be orphaned: {}",
                path.display()
            );
        }
    }
}

/// Launch a browser with the configured window, headless and security settings
///
/// Each launch gets its own profile directory so concurrent instances never
/// contend for Chrome's profile lock.
pub async fn launch_browser(config: &BrowserConfig) -> anyhow::Result<BrowserWrapper> {
    info!("Launching browser instance");

    let user_data_dir = std::env::temp_dir().join(format!(
        "kodegen_assistant_{}_{}",
        std::process::id(),
        chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default()
    ));

    let (browser, handler) =
        crate::browser_setup::launch_browser(config, Some(user_data_dir.clone())).await?;

    Ok(BrowserWrapper::new(browser, handler, user_data_dir))
}

/// Create a blank tab to drive
pub async fn create_blank_page(wrapper: &BrowserWrapper) -> anyhow::Result<Page> {
    let page = wrapper
        .browser()
        .new_page("about:blank")
        .await
        .context("Failed to create blank page")?;

    info!("Created blank page");
    Ok(page)
}
