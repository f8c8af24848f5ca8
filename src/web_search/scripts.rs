//! In-page JavaScript used for extraction

use super::types::{MAIN_CONTENT_SELECTORS, RESULTS_CONTAINER_SELECTOR};

/// Collect title/link/snippet for the first `max_results` result blocks
///
/// Missing elements come back as `null`; filtering happens on the Rust side.
pub(super) fn search_results_script(max_results: usize) -> String {
    format!(
        r#"(() => {{
    const results = [];
    document.querySelectorAll('{RESULTS_CONTAINER_SELECTOR} .g').forEach((result, index) => {{
        if (index >= {max_results}) return;
        const titleElement = result.querySelector('h3');
        const linkElement = result.querySelector('a');
        const snippetElement = result.querySelector('.VwiC3b');
        results.push({{
            title: titleElement ? titleElement.textContent.trim() : null,
            link: linkElement ? linkElement.href : null,
            snippet: snippetElement ? snippetElement.textContent.trim() : null,
        }});
    }});
    return results;
}})()"#
    )
}

/// Strip scripts and styles, then return the text of the first main content
/// region found, falling back to the whole body
pub(super) fn visible_text_script() -> String {
    let selectors = MAIN_CONTENT_SELECTORS
        .iter()
        .map(|s| format!("'{s}'"))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        r#"(() => {{
    document.querySelectorAll('script, style').forEach(e => e.remove());
    for (const selector of [{selectors}]) {{
        const region = document.querySelector(selector);
        if (region) return region.innerText;
    }}
    return document.body ? document.body.innerText : '';
}})()"#
    )
}
