//! Element polling utility
//!
//! Results containers and search boxes are often rendered by JavaScript after
//! the load event fires, so lookups poll instead of failing on first miss.

use std::time::Duration;

use chromiumoxide::Page;
use chromiumoxide::element::Element;
use tokio::time::Instant;

use super::{BrowserError, BrowserResult};

const INITIAL_INTERVAL: Duration = Duration::from_millis(100);
const MAX_INTERVAL: Duration = Duration::from_secs(1);

/// Poll for `selector` until it matches or `timeout` elapses
///
/// The interval starts at 100ms and doubles up to 1s. On timeout the error
/// carries the last lookup failure.
pub async fn wait_for_element(
    page: &Page,
    selector: &str,
    timeout: Duration,
) -> BrowserResult<Element> {
    let deadline = Instant::now() + timeout;
    let mut interval = INITIAL_INTERVAL;

    loop {
        let miss = match page.find_element(selector).await {
            Ok(element) => return Ok(element),
            Err(e) => e,
        };

        let now = Instant::now();
        if now >= deadline {
            return Err(BrowserError::Extraction(format!(
                "element '{selector}' not found within {}ms: {miss}",
                timeout.as_millis()
            )));
        }

        tokio::time::sleep(interval.min(deadline - now)).await;
        interval = (interval * 2).min(MAX_INTERVAL);
    }
}
