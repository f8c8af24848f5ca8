use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::json;

use super::*;

type CallLog = Arc<Mutex<Vec<String>>>;

/// Scripted behaviour for the fake tab
#[derive(Default)]
struct PageScript {
    navigation_failures: u32,
    hang_navigation: bool,
    missing_search_box: bool,
    hidden_search_box: bool,
    typing_failures: u32,
    results: serde_json::Value,
    page_text: serde_json::Value,
    html: String,
    close_fails: bool,
}

struct FakePage {
    script: Mutex<PageScript>,
    calls: CallLog,
}

#[async_trait]
impl PageHandle for FakePage {
    async fn navigate(&self, url: &str) -> BrowserResult<()> {
        self.calls.lock().push(format!("navigate {url}"));
        let hang = {
            let mut script = self.script.lock();
            if script.navigation_failures > 0 {
                script.navigation_failures -= 1;
                return Err(BrowserError::Navigation("net::ERR_CONNECTION_RESET".to_string()));
            }
            script.hang_navigation
        };
        if hang {
            std::future::pending::<()>().await;
        }
        Ok(())
    }

    async fn wait_for_load(&self) -> BrowserResult<()> {
        Ok(())
    }

    async fn wait_for_selector(&self, selector: &str, _timeout: Duration) -> BrowserResult<()> {
        self.calls.lock().push(format!("wait {selector}"));
        if selector == SEARCH_BOX_SELECTOR && self.script.lock().missing_search_box {
            return Err(BrowserError::Extraction(format!("element not found: '{selector}'")));
        }
        Ok(())
    }

    async fn focus(&self, selector: &str) -> BrowserResult<()> {
        self.calls.lock().push(format!("focus {selector}"));
        Ok(())
    }

    async fn is_visible(&self, _selector: &str) -> BrowserResult<bool> {
        Ok(!self.script.lock().hidden_search_box)
    }

    async fn type_text(&self, _selector: &str, text: &str) -> BrowserResult<()> {
        self.calls.lock().push(format!("type {text}"));
        let mut script = self.script.lock();
        if script.typing_failures > 0 {
            script.typing_failures -= 1;
            return Err(BrowserError::Interaction("element detached".to_string()));
        }
        Ok(())
    }

    async fn press_key(&self, _selector: &str, key: &str) -> BrowserResult<()> {
        self.calls.lock().push(format!("press {key}"));
        Ok(())
    }

    async fn evaluate(&self, script: &str) -> BrowserResult<serde_json::Value> {
        let page = self.script.lock();
        if script.contains(".VwiC3b") {
            Ok(page.results.clone())
        } else {
            Ok(page.page_text.clone())
        }
    }

    async fn content(&self) -> BrowserResult<String> {
        Ok(self.script.lock().html.clone())
    }

    async fn close(&self) -> BrowserResult<()> {
        self.calls.lock().push("close page".to_string());
        if self.script.lock().close_fails {
            return Err(BrowserError::Close("failed to close page: target gone".to_string()));
        }
        Ok(())
    }
}

struct FakeBrowser {
    close_fails: bool,
    calls: CallLog,
}

#[async_trait]
impl BrowserHandle for FakeBrowser {
    async fn close(&mut self) -> BrowserResult<()> {
        self.calls.lock().push("close browser".to_string());
        if self.close_fails {
            return Err(BrowserError::Close("failed to close browser: process exited".to_string()));
        }
        Ok(())
    }
}

fn driver_with(script: PageScript) -> (SearchDriver<FakePage, FakeBrowser>, CallLog) {
    driver_with_browser(script, false)
}

fn driver_with_browser(
    script: PageScript,
    browser_close_fails: bool,
) -> (SearchDriver<FakePage, FakeBrowser>, CallLog) {
    let calls = CallLog::default();
    let page = FakePage {
        script: Mutex::new(script),
        calls: Arc::clone(&calls),
    };
    let browser = FakeBrowser {
        close_fails: browser_close_fails,
        calls: Arc::clone(&calls),
    };
    (SearchDriver::new(page, browser, SearchConfig::default()), calls)
}

#[tokio::test(start_paused = true)]
async fn search_extracts_qualifying_results_in_order() {
    let (mut driver, calls) = driver_with(PageScript {
        results: json!([
            {"title": "Rust", "link": "https://www.rust-lang.org/", "snippet": "A language empowering everyone"},
            {"title": "No link here", "link": null, "snippet": "dropped"},
            {"title": "The Book", "link": "https://doc.rust-lang.org/book/", "snippet": null},
        ]),
        ..PageScript::default()
    });

    let outcome = driver.search("rust programming").await.unwrap();

    assert_eq!(driver.stage(), SearchStage::Extracted);
    assert_eq!(
        outcome.links,
        vec!["https://www.rust-lang.org/", "https://doc.rust-lang.org/book/"]
    );
    assert_eq!(outcome.results[1].snippet, "");
    assert_eq!(
        outcome.summary,
        "Search Results:\n\n\
         1. Rust\n   A language empowering everyone\n   Source: https://www.rust-lang.org/\n\n\
         2. The Book\n   \n   Source: https://doc.rust-lang.org/book/\n\n"
    );

    let calls = calls.lock();
    assert_eq!(calls[0], "navigate https://www.google.com");
    assert!(calls.contains(&"type rust programming".to_string()));
    assert!(calls.contains(&"press Enter".to_string()));
    assert!(calls.contains(&format!("wait {RESULTS_CONTAINER_SELECTOR}")));
}

#[tokio::test(start_paused = true)]
async fn search_keeps_at_most_max_results_candidates() {
    let entries: Vec<serde_json::Value> = (1..=8)
        .map(|i| json!({"title": format!("t{i}"), "link": format!("https://e.com/{i}"), "snippet": ""}))
        .collect();
    let (mut driver, _) = driver_with(PageScript {
        results: serde_json::Value::Array(entries),
        ..PageScript::default()
    });

    let outcome = driver.search("many").await.unwrap();
    assert_eq!(outcome.results.len(), 5);
    assert_eq!(outcome.links.last().map(String::as_str), Some("https://e.com/5"));
}

#[tokio::test(start_paused = true)]
async fn search_without_qualifying_entries_is_empty_not_error() {
    let (mut driver, _) = driver_with(PageScript {
        results: json!([
            {"title": null, "link": "https://a.example", "snippet": "x"},
            {"title": "orphan title", "link": null, "snippet": null},
        ]),
        ..PageScript::default()
    });

    let outcome = driver.search("obscure").await.unwrap();
    assert!(outcome.is_empty());
    assert!(outcome.links.is_empty());
    assert_eq!(outcome.summary, NO_RESULTS_MESSAGE);
    assert_eq!(driver.stage(), SearchStage::Extracted);
}

#[tokio::test(start_paused = true)]
async fn navigation_exhaustion_names_attempt_count() {
    let (mut driver, calls) = driver_with(PageScript {
        navigation_failures: 5,
        ..PageScript::default()
    });
    let started = tokio::time::Instant::now();

    let err = driver.search("anything").await.unwrap_err();

    assert!(matches!(err, BrowserError::Navigation(_)));
    assert!(err.to_string().contains("after 5 attempts"));
    assert_eq!(driver.stage(), SearchStage::Failed);
    assert_eq!(calls.lock().iter().filter(|c| c.starts_with("navigate")).count(), 5);
    // 1 + 4 + 7 + 10 + 13 seconds of backoff
    assert_eq!(started.elapsed(), Duration::from_secs(35));
}

#[tokio::test(start_paused = true)]
async fn navigation_recovers_within_budget() {
    let (mut driver, calls) = driver_with(PageScript {
        navigation_failures: 2,
        results: json!([]),
        ..PageScript::default()
    });

    let outcome = driver.search("retry me").await.unwrap();
    assert!(outcome.is_empty());
    assert_eq!(calls.lock().iter().filter(|c| c.starts_with("navigate")).count(), 3);
}

#[tokio::test(start_paused = true)]
async fn typing_is_retried() {
    let (mut driver, calls) = driver_with(PageScript {
        typing_failures: 2,
        results: json!([]),
        ..PageScript::default()
    });

    driver.search("stubborn").await.unwrap();
    assert_eq!(calls.lock().iter().filter(|c| c.starts_with("type")).count(), 3);
}

#[tokio::test(start_paused = true)]
async fn typing_exhaustion_fails_the_call() {
    let (mut driver, _) = driver_with(PageScript {
        typing_failures: 10,
        ..PageScript::default()
    });

    let err = driver.search("never typed").await.unwrap_err();
    assert!(matches!(err, BrowserError::Interaction(_)));
    assert!(err.to_string().contains("after 5 attempts"));
    assert_eq!(driver.stage(), SearchStage::Failed);
}

#[tokio::test(start_paused = true)]
async fn hidden_search_box_aborts_before_typing() {
    let (mut driver, calls) = driver_with(PageScript {
        hidden_search_box: true,
        ..PageScript::default()
    });

    let err = driver.search("invisible").await.unwrap_err();
    assert!(err.to_string().contains("not visible"));
    assert!(!calls.lock().iter().any(|c| c.starts_with("type")));
}

#[tokio::test(start_paused = true)]
async fn missing_search_box_is_extraction_error() {
    let (mut driver, _) = driver_with(PageScript {
        missing_search_box: true,
        ..PageScript::default()
    });

    let err = driver.search("nowhere").await.unwrap_err();
    assert!(matches!(err, BrowserError::Extraction(_)));
    assert!(err.to_string().contains("search box"));
}

#[tokio::test(start_paused = true)]
async fn malformed_results_payload_is_extraction_error() {
    let (mut driver, _) = driver_with(PageScript {
        results: json!({"unexpected": true}),
        ..PageScript::default()
    });

    let err = driver.search("odd").await.unwrap_err();
    assert!(matches!(err, BrowserError::Extraction(_)));
}

#[tokio::test]
async fn visit_page_returns_main_text() {
    let (mut driver, calls) = driver_with(PageScript {
        page_text: json!("Article body"),
        ..PageScript::default()
    });

    let text = driver.visit_page("https://example.com/post").await.unwrap();
    assert_eq!(text, "Article body");
    assert_eq!(calls.lock()[0], "navigate https://example.com/post");
}

#[tokio::test]
async fn visit_page_falls_back_to_rendered_html() {
    let (mut driver, _) = driver_with(PageScript {
        page_text: json!("   "),
        html: "<html><body><p>Rendered by script</p></body></html>".to_string(),
        ..PageScript::default()
    });

    let text = driver.visit_page("https://spa.example").await.unwrap();
    assert!(text.contains("Rendered by script"));
}

#[tokio::test]
async fn visit_page_rejects_invalid_url() {
    let (mut driver, calls) = driver_with(PageScript::default());

    let err = driver.visit_page("not a url").await.unwrap_err();
    assert!(matches!(err, BrowserError::Navigation(_)));
    assert!(calls.lock().is_empty());
}

#[tokio::test(start_paused = true)]
async fn visit_page_times_out() {
    let (mut driver, _) = driver_with(PageScript {
        hang_navigation: true,
        ..PageScript::default()
    });

    let err = driver.visit_page("https://slow.example").await.unwrap_err();
    assert!(matches!(err, BrowserError::Navigation(_)));
    assert!(err.to_string().contains("timed out after 120s"));
}

#[tokio::test]
async fn close_releases_page_then_browser() {
    let (mut driver, calls) = driver_with(PageScript::default());

    driver.close().await.unwrap();
    assert_eq!(*calls.lock(), vec!["close page", "close browser"]);

    // Second close has nothing left to release
    driver.close().await.unwrap();
    assert_eq!(calls.lock().len(), 2);

    let err = driver.search("after close").await.unwrap_err();
    assert!(err.to_string().contains("closed"));
}

#[tokio::test]
async fn close_attempts_browser_even_when_page_fails() {
    let (mut driver, calls) = driver_with_browser(
        PageScript {
            close_fails: true,
            ..PageScript::default()
        },
        true,
    );

    let err = driver.close().await.unwrap_err();
    assert_eq!(*calls.lock(), vec!["close page", "close browser"]);

    let message = err.to_string();
    assert!(message.contains("failed to close page: target gone"));
    assert!(message.contains("failed to close browser: process exited"));
}

#[tokio::test]
async fn failed_page_creation_closes_the_browser() {
    let calls = CallLog::default();
    let mut browser = FakeBrowser {
        close_fails: false,
        calls: Arc::clone(&calls),
    };

    let err = page_or_close::<(), _>(Err(anyhow::anyhow!("target crashed")), &mut browser)
        .await
        .unwrap_err();

    assert!(matches!(err, BrowserError::PageCreationFailed(_)));
    assert!(err.to_string().contains("target crashed"));
    assert_eq!(*calls.lock(), vec!["close browser"]);
}

#[tokio::test]
async fn opened_page_leaves_the_browser_running() {
    let calls = CallLog::default();
    let mut browser = FakeBrowser {
        close_fails: false,
        calls: Arc::clone(&calls),
    };

    let page = page_or_close(Ok("tab"), &mut browser).await.unwrap();
    assert_eq!(page, "tab");
    assert!(calls.lock().is_empty());
}
