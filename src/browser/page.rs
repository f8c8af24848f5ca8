//! chromiumoxide implementation of [`PageHandle`]

use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::element::Element;
use chromiumoxide::page::Page;
use tracing::trace;

use super::{BrowserError, BrowserResult, PageHandle, wait_for_element};

/// One Chrome tab
#[derive(Clone)]
pub struct ChromePage {
    page: Page,
}

impl ChromePage {
    pub fn new(page: Page) -> Self {
        Self { page }
    }

    async fn element(&self, selector: &str) -> BrowserResult<Element> {
        self.page.find_element(selector).await.map_err(|e| {
            BrowserError::Extraction(format!("element not found for selector '{selector}': {e}"))
        })
    }
}

#[async_trait]
impl PageHandle for ChromePage {
    async fn navigate(&self, url: &str) -> BrowserResult<()> {
        trace!(url, "Navigating");
        self.page
            .goto(url)
            .await
            .map_err(|e| BrowserError::Navigation(format!("failed to navigate to {url}: {e}")))?;
        Ok(())
    }

    async fn wait_for_load(&self) -> BrowserResult<()> {
        self.page
            .wait_for_navigation()
            .await
            .map_err(|e| BrowserError::Navigation(format!("failed to load page: {e}")))?;
        Ok(())
    }

    async fn wait_for_selector(&self, selector: &str, timeout: Duration) -> BrowserResult<()> {
        wait_for_element(&self.page, selector, timeout).await?;
        Ok(())
    }

    async fn focus(&self, selector: &str) -> BrowserResult<()> {
        self.element(selector)
            .await?
            .focus()
            .await
            .map_err(|e| BrowserError::Interaction(format!("failed to focus '{selector}': {e}")))?;
        Ok(())
    }

    async fn is_visible(&self, selector: &str) -> BrowserResult<bool> {
        let quoted = serde_json::to_string(selector)
            .map_err(|e| BrowserError::Interaction(format!("invalid selector '{selector}': {e}")))?;
        let script = format!(
            "(() => {{
                const el = document.querySelector({quoted});
                if (!el) return false;
                const rect = el.getBoundingClientRect();
                const style = window.getComputedStyle(el);
                return rect.width > 0 && rect.height > 0
                    && style.visibility !== 'hidden' && style.display !== 'none';
            }})()"
        );
        Ok(matches!(self.evaluate(&script).await?, serde_json::Value::Bool(true)))
    }

    async fn type_text(&self, selector: &str, text: &str) -> BrowserResult<()> {
        self.element(selector)
            .await?
            .type_str(text)
            .await
            .map_err(|e| BrowserError::Interaction(format!("failed to type into '{selector}': {e}")))?;
        Ok(())
    }

    async fn press_key(&self, selector: &str, key: &str) -> BrowserResult<()> {
        self.element(selector)
            .await?
            .press_key(key)
            .await
            .map_err(|e| BrowserError::Interaction(format!("failed to press {key}: {e}")))?;
        Ok(())
    }

    async fn evaluate(&self, script: &str) -> BrowserResult<serde_json::Value> {
        let result = self
            .page
            .evaluate(script)
            .await
            .map_err(|e| BrowserError::Extraction(format!("script evaluation failed: {e}")))?;

        result
            .into_value::<serde_json::Value>()
            .map_err(|e| BrowserError::Extraction(format!("failed to read script result: {e}")))
    }

    async fn content(&self) -> BrowserResult<String> {
        self.page
            .content()
            .await
            .map_err(|e| BrowserError::Extraction(format!("failed to get HTML content: {e}")))
    }

    async fn close(&self) -> BrowserResult<()> {
        self.page
            .clone()
            .close()
            .await
            .map_err(|e| BrowserError::Close(format!("failed to close page: {e}")))
    }
}
