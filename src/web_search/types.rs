//! Data structures and constants for web search

use serde::{Deserialize, Serialize};

/// Search box on the engine landing page
pub const SEARCH_BOX_SELECTOR: &str = r#"input[name="q"]"#;

/// Container that appears once results are rendered
pub const RESULTS_CONTAINER_SELECTOR: &str = "#search";

/// Main content regions, in priority order, used by page extraction
pub const MAIN_CONTENT_SELECTORS: [&str; 6] =
    ["main", "article", ".content", "#content", ".main", "#main"];

/// Summary returned when a search yields no usable entries
pub const NO_RESULTS_MESSAGE: &str = "No search results found. The search engine may have changed its structure or blocked automated access.";

/// Tunables for the search driver
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_engine_url")]
    pub engine_url: String,

    #[serde(default = "default_attempts")]
    pub navigation_attempts: u32,

    #[serde(default = "default_attempts")]
    pub input_attempts: u32,

    /// Per-attempt bound on navigating to the search engine
    #[serde(default = "default_search_timeout_secs")]
    pub search_timeout_secs: u64,

    /// Bound on navigating to an arbitrary page
    #[serde(default = "default_page_timeout_secs")]
    pub page_timeout_secs: u64,

    /// Bound on waiting for the search box and the results container
    #[serde(default = "default_element_timeout_secs")]
    pub element_timeout_secs: u64,

    /// Pause between typing the query and submitting it
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,

    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

fn default_engine_url() -> String {
    "https://www.google.com".to_string()
}
fn default_attempts() -> u32 {
    5
}
fn default_search_timeout_secs() -> u64 {
    180
}
fn default_page_timeout_secs() -> u64 {
    120
}
fn default_element_timeout_secs() -> u64 {
    30
}
fn default_settle_delay_ms() -> u64 {
    2000
}
fn default_max_results() -> usize {
    5
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            engine_url: default_engine_url(),
            navigation_attempts: default_attempts(),
            input_attempts: default_attempts(),
            search_timeout_secs: default_search_timeout_secs(),
            page_timeout_secs: default_page_timeout_secs(),
            element_timeout_secs: default_element_timeout_secs(),
            settle_delay_ms: default_settle_delay_ms(),
            max_results: default_max_results(),
        }
    }
}

/// Where a search call currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStage {
    Idle,
    Navigating,
    SearchBoxReady,
    Typing,
    Submitted,
    ResultsReady,
    Extracted,
    Failed,
}

/// One organic result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub link: String,
    pub snippet: String,
}

/// Entry as returned by the page script; any field may be missing
#[derive(Debug, Default, Deserialize)]
pub(super) struct RawEntry {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub snippet: Option<String>,
}

impl RawEntry {
    /// Keep entries that have both a title and a link
    pub(super) fn into_result(self) -> Option<SearchResult> {
        Some(SearchResult {
            title: self.title?,
            link: self.link?,
            snippet: self.snippet.unwrap_or_default(),
        })
    }
}

/// Result of one search call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchOutcome {
    pub query: String,
    /// Human-readable listing, or [`NO_RESULTS_MESSAGE`]
    pub summary: String,
    pub links: Vec<String>,
    pub results: Vec<SearchResult>,
}

impl SearchOutcome {
    pub(super) fn new(query: String, results: Vec<SearchResult>) -> Self {
        if results.is_empty() {
            return Self {
                query,
                summary: NO_RESULTS_MESSAGE.to_string(),
                links: Vec::new(),
                results,
            };
        }

        let mut summary = String::from("Search Results:\n\n");
        for (i, result) in results.iter().enumerate() {
            summary.push_str(&format!(
                "{}. {}\n   {}\n   Source: {}\n\n",
                i + 1,
                result.title,
                result.snippet,
                result.link
            ));
        }

        Self {
            query,
            summary,
            links: results.iter().map(|r| r.link.clone()).collect(),
            results,
        }
    }

    /// True when no entry qualified
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}
