//! Web search and page scraping through a single browser tab
//!
//! A search walks one page through a fixed sequence of stages:
//!
//! `Idle → Navigating → SearchBoxReady → Typing → Submitted → ResultsReady → Extracted`
//!
//! Navigation and typing are retried within their stage; any other failure
//! moves the driver to `Failed` and aborts the call. There is no resume
//! across stages.
//!
//! # Usage
//! ```no_run
//! use kodegen_tools_assistant::{BrowserConfig, web_search::{SearchConfig, SearchDriver}};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut driver = SearchDriver::launch(&BrowserConfig::default(), SearchConfig::default()).await?;
//!     let outcome = driver.search("rust programming").await?;
//!     println!("{}", outcome.summary);
//!     driver.close().await?;
//!     Ok(())
//! }
//! ```

mod scripts;
mod types;

pub use types::{
    MAIN_CONTENT_SELECTORS, NO_RESULTS_MESSAGE, RESULTS_CONTAINER_SELECTOR, SEARCH_BOX_SELECTOR,
    SearchConfig, SearchOutcome, SearchResult, SearchStage,
};

use std::time::Duration;

use tracing::{Instrument, Span, debug, error, info, warn};

use crate::BrowserConfig;
use crate::browser::{
    BrowserError, BrowserHandle, BrowserResult, BrowserWrapper, ChromePage, PageHandle,
    create_blank_page, launch_browser,
};
use crate::retry::RetryPolicy;
use types::RawEntry;

/// Drives one page through searches and page visits
///
/// The driver exclusively owns its page and the browser behind it.
pub struct SearchDriver<P: PageHandle, B: BrowserHandle> {
    page: Option<P>,
    browser: Option<B>,
    config: SearchConfig,
    stage: SearchStage,
    span: Span,
}

impl SearchDriver<ChromePage, BrowserWrapper> {
    /// Launch Chrome and open a blank tab to drive
    pub async fn launch(browser_config: &BrowserConfig, config: SearchConfig) -> BrowserResult<Self> {
        info!("Creating new browser instance");
        let mut wrapper = launch_browser(browser_config)
            .await
            .map_err(|e| BrowserError::LaunchFailed(format!("{e:#}")))?;
        let opened = create_blank_page(&wrapper).await;
        let page = page_or_close(opened, &mut wrapper).await?;

        info!("Browser instance created successfully");
        Ok(Self::new(ChromePage::new(page), wrapper, config))
    }
}

impl<P: PageHandle, B: BrowserHandle> SearchDriver<P, B> {
    pub fn new(page: P, browser: B, config: SearchConfig) -> Self {
        Self {
            page: Some(page),
            browser: Some(browser),
            config,
            stage: SearchStage::Idle,
            span: tracing::info_span!("browser"),
        }
    }

    /// Replace the span this driver logs under
    #[must_use]
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn stage(&self) -> SearchStage {
        self.stage
    }

    /// Search the configured engine for `query` and extract the top results
    ///
    /// An empty result page is not an error: the outcome carries
    /// [`NO_RESULTS_MESSAGE`] and no links.
    pub async fn search(&mut self, query: &str) -> BrowserResult<SearchOutcome> {
        let span = self.span.clone();
        let outcome = self.run_search(query).instrument(span).await;
        if outcome.is_err() {
            self.stage = SearchStage::Failed;
        }
        outcome
    }

    async fn run_search(&mut self, query: &str) -> BrowserResult<SearchOutcome> {
        info!(query, "Starting web search");
        let page = self
            .page
            .as_ref()
            .ok_or_else(|| BrowserError::Navigation("browser session is closed".to_string()))?;
        let config = &self.config;
        let element_timeout = Duration::from_secs(config.element_timeout_secs);

        self.stage = SearchStage::Navigating;
        let navigation_timeout = Duration::from_secs(config.search_timeout_secs);
        let engine_url = config.engine_url.as_str();
        RetryPolicy::navigation(config.navigation_attempts)
            .run(
                "navigation",
                |attempt| {
                    info!(
                        "Navigation attempt {}/{} to {}",
                        attempt + 1,
                        config.navigation_attempts,
                        engine_url
                    );
                    navigate_and_load(page, engine_url, navigation_timeout)
                },
                |_| true,
            )
            .await
            .map_err(|e| {
                BrowserError::Navigation(format!(
                    "failed to navigate to search engine after {} attempts: {}",
                    e.attempts, e.last_error
                ))
            })?;

        page.wait_for_selector(SEARCH_BOX_SELECTOR, element_timeout)
            .await
            .map_err(|e| BrowserError::Extraction(format!("failed to find search box: {e}")))?;
        self.stage = SearchStage::SearchBoxReady;

        page.focus(SEARCH_BOX_SELECTOR)
            .await
            .map_err(|e| BrowserError::Interaction(format!("failed to focus search box: {e}")))?;
        let visible = page.is_visible(SEARCH_BOX_SELECTOR).await.map_err(|e| {
            BrowserError::Interaction(format!("failed to check search box visibility: {e}"))
        })?;
        if !visible {
            error!("Search box is not visible");
            return Err(BrowserError::Interaction("search box is not visible".to_string()));
        }

        self.stage = SearchStage::Typing;
        RetryPolicy::input(config.input_attempts)
            .run(
                "input",
                |_| page.type_text(SEARCH_BOX_SELECTOR, query),
                |_| true,
            )
            .await
            .map_err(|e| {
                BrowserError::Interaction(format!(
                    "failed to type search query after {} attempts: {}",
                    e.attempts, e.last_error
                ))
            })?;

        tokio::time::sleep(Duration::from_millis(config.settle_delay_ms)).await;
        page.press_key(SEARCH_BOX_SELECTOR, "Enter")
            .await
            .map_err(|e| BrowserError::Interaction(format!("failed to submit search: {e}")))?;
        self.stage = SearchStage::Submitted;

        page.wait_for_selector(RESULTS_CONTAINER_SELECTOR, element_timeout)
            .await
            .map_err(|e| BrowserError::Extraction(format!("failed to load search results: {e}")))?;
        self.stage = SearchStage::ResultsReady;

        let raw = page
            .evaluate(&scripts::search_results_script(config.max_results))
            .await
            .map_err(|e| BrowserError::Extraction(format!("failed to extract search results: {e}")))?;
        let mut entries: Vec<RawEntry> = serde_json::from_value(raw)
            .map_err(|e| BrowserError::Extraction(format!("failed to parse search results: {e}")))?;
        entries.truncate(config.max_results);

        let total = entries.len();
        let results: Vec<SearchResult> = entries
            .into_iter()
            .filter_map(RawEntry::into_result)
            .collect();
        if results.len() < total {
            debug!("Skipped {} entries missing a title or link", total - results.len());
        }

        self.stage = SearchStage::Extracted;
        if results.is_empty() {
            warn!("No search results found");
        } else {
            info!("Search completed successfully with {} results", results.len());
        }
        Ok(SearchOutcome::new(query.to_string(), results))
    }

    /// Navigate to `url` and extract its visible text
    ///
    /// Falls back to converting the rendered HTML when the page exposes no
    /// `innerText` (typical for client-rendered apps).
    pub async fn visit_page(&mut self, url: &str) -> BrowserResult<String> {
        let span = self.span.clone();
        self.run_visit(url).instrument(span).await
    }

    async fn run_visit(&self, url: &str) -> BrowserResult<String> {
        info!(url, "Visiting page");
        let page = self
            .page
            .as_ref()
            .ok_or_else(|| BrowserError::Navigation("browser session is closed".to_string()))?;

        url::Url::parse(url)
            .map_err(|e| BrowserError::Navigation(format!("invalid URL '{url}': {e}")))?;

        navigate_and_load(page, url, Duration::from_secs(self.config.page_timeout_secs))
            .await
            .inspect_err(|e| error!("Failed to load page: {}", e))?;

        let text = match page.evaluate(&scripts::visible_text_script()).await.map_err(|e| {
            BrowserError::Extraction(format!("failed to extract page content: {e}"))
        })? {
            serde_json::Value::String(text) => text,
            _ => String::new(),
        };

        let text = if text.trim().is_empty() {
            debug!("Page has no innerText, converting rendered HTML");
            html2md::parse_html(&page.content().await?)
        } else {
            text
        };

        info!("Successfully extracted {} characters from page", text.len());
        Ok(text)
    }

    /// Release the page, then the browser
    ///
    /// Both releases are attempted even if the first fails; failures are
    /// reported together. Calling again after a close is a no-op.
    pub async fn close(&mut self) -> BrowserResult<()> {
        let mut failures = Vec::new();

        if let Some(page) = self.page.take()
            && let Err(e) = page.close().await
        {
            error!("Failed to close page: {}", e);
            failures.push(close_failure(e));
        }

        if let Some(mut browser) = self.browser.take()
            && let Err(e) = browser.close().await
        {
            error!("Failed to close browser: {}", e);
            failures.push(close_failure(e));
        }

        self.stage = SearchStage::Idle;
        if failures.is_empty() {
            info!(parent: &self.span, "Browser closed successfully");
            Ok(())
        } else {
            Err(BrowserError::Close(failures.join("; ")))
        }
    }
}

/// Pass through an opened page, or close `browser` and report the failure
async fn page_or_close<T, B: BrowserHandle>(
    opened: anyhow::Result<T>,
    browser: &mut B,
) -> BrowserResult<T> {
    match opened {
        Ok(page) => Ok(page),
        Err(e) => {
            if let Err(close_err) = browser.close().await {
                warn!("Failed to close browser after page creation failure: {}", close_err);
            }
            Err(BrowserError::PageCreationFailed(format!("{e:#}")))
        }
    }
}

fn close_failure(error: BrowserError) -> String {
    match error {
        BrowserError::Close(message) => message,
        other => other.to_string(),
    }
}

/// Navigate and wait for load, bounded by `timeout`
async fn navigate_and_load<P: PageHandle>(page: &P, url: &str, timeout: Duration) -> BrowserResult<()> {
    let load = async {
        page.navigate(url).await?;
        page.wait_for_load().await
    };

    match tokio::time::timeout(timeout, load).await {
        Ok(result) => result,
        Err(_) => Err(BrowserError::Navigation(format!(
            "timed out after {}s loading {}",
            timeout.as_secs(),
            url
        ))),
    }
}

#[cfg(test)]
mod tests;
