//! Locating, downloading and launching Chrome/Chromium

use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use anyhow::{Context, Result};
use chromiumoxide::browser::{Browser, BrowserConfigBuilder, HeadlessMode};
use chromiumoxide::fetcher::{BrowserFetcher, BrowserFetcherOptions};
use futures::StreamExt;
use tokio::task::{self, JoinHandle};
use tracing::{error, info, trace, warn};

use crate::BrowserConfig;

/// Desktop Chrome user agent sent instead of the HeadlessChrome default
pub const CHROME_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/132.0.6834.160 Safari/537.36";

/// Environment variable that pins the browser executable
pub const BROWSER_PATH_ENV: &str = "CHROMIUM_PATH";

/// Removes the profile directory unless launch succeeds
struct ProfileDirGuard {
    path: PathBuf,
    keep: bool,
}

impl ProfileDirGuard {
    fn create(path: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&path).context("Failed to create user data directory")?;
        Ok(Self { path, keep: false })
    }

    fn keep(mut self) {
        self.keep = true;
    }
}

impl Drop for ProfileDirGuard {
    fn drop(&mut self) {
        if !self.keep && std::fs::remove_dir_all(&self.path).is_ok() {
            info!("Removed profile dir after launch failure: {}", self.path.display());
        }
    }
}

fn candidate_paths() -> Vec<PathBuf> {
    let fixed: &[&str] = if cfg!(target_os = "windows") {
        &[
            r"C:\Program Files\Google\Chrome\Application\chrome.exe",
            r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe",
            r"C:\Program Files\Chromium\Application\chrome.exe",
        ]
    } else if cfg!(target_os = "macos") {
        &[
            "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
            "/Applications/Chromium.app/Contents/MacOS/Chromium",
            "/opt/homebrew/bin/chromium",
        ]
    } else {
        &[
            "/usr/bin/google-chrome",
            "/usr/bin/google-chrome-stable",
            "/usr/bin/chromium",
            "/usr/bin/chromium-browser",
            "/snap/bin/chromium",
            "/usr/local/bin/chromium",
            "/opt/google/chrome/chrome",
        ]
    };

    let mut paths: Vec<PathBuf> = fixed.iter().map(PathBuf::from).collect();
    if cfg!(target_os = "macos")
        && let Some(home) = dirs::home_dir()
    {
        paths.push(home.join("Applications/Google Chrome.app/Contents/MacOS/Google Chrome"));
    }
    paths
}

/// Find a Chrome/Chromium executable: env override, well-known paths, then `which`
pub async fn find_browser_executable() -> Result<PathBuf> {
    if let Ok(path) = std::env::var(BROWSER_PATH_ENV) {
        let path = PathBuf::from(path);
        if path.exists() {
            info!("Using browser from {}: {}", BROWSER_PATH_ENV, path.display());
            return Ok(path);
        }
        warn!("{} points to missing file: {}", BROWSER_PATH_ENV, path.display());
    }

    if let Some(path) = candidate_paths().into_iter().find(|p| p.exists()) {
        info!("Found browser at: {}", path.display());
        return Ok(path);
    }

    if !cfg!(target_os = "windows") {
        for cmd in ["chromium", "chromium-browser", "google-chrome", "chrome"] {
            if let Ok(output) = Command::new("which").arg(cmd).output()
                && output.status.success()
            {
                let found = String::from_utf8_lossy(&output.stdout).trim().to_string();
                if !found.is_empty() {
                    info!("Found browser using 'which': {}", found);
                    return Ok(PathBuf::from(found));
                }
            }
        }
    }

    Err(anyhow::anyhow!("Chrome/Chromium executable not found"))
}

/// Download a managed Chromium into the user cache directory
pub async fn download_managed_browser() -> Result<PathBuf> {
    info!("Downloading managed Chromium browser...");

    let cache_dir = dirs::cache_dir()
        .unwrap_or_else(|| std::env::temp_dir().join(".cache"))
        .join("kodegen/chromium");
    std::fs::create_dir_all(&cache_dir).context("Failed to create cache directory")?;

    let fetcher = BrowserFetcher::new(
        BrowserFetcherOptions::builder()
            .with_path(&cache_dir)
            .build()
            .context("Failed to build fetcher options")?,
    );
    let revision = fetcher.fetch().await.context("Failed to fetch browser")?;

    info!("Downloaded Chromium to: {}", revision.folder_path.display());
    Ok(revision.executable_path)
}

/// Find or download Chrome/Chromium and launch it with `config`
///
/// When `chrome_data_dir` is None the profile lives in a per-process temp
/// directory. The returned handler task drives the CDP connection and must
/// be aborted once the browser is closed.
pub async fn launch_browser(
    config: &BrowserConfig,
    chrome_data_dir: Option<PathBuf>,
) -> Result<(Browser, JoinHandle<()>)> {
    let chrome_path = match find_browser_executable().await {
        Ok(path) => path,
        Err(e) => {
            warn!("{}. Falling back to managed download.", e);
            download_managed_browser().await?
        }
    };

    let profile = ProfileDirGuard::create(chrome_data_dir.unwrap_or_else(|| {
        std::env::temp_dir().join(format!("kodegen_assistant_chrome_{}", std::process::id()))
    }))?;

    let mut builder = BrowserConfigBuilder::default()
        .request_timeout(Duration::from_secs(30))
        .window_size(config.window.width, config.window.height)
        .user_data_dir(profile.path.clone())
        .chrome_executable(chrome_path)
        .arg(format!("--user-agent={CHROME_USER_AGENT}"))
        // Hides navigator.webdriver and the automation infobar
        .arg("--disable-blink-features=AutomationControlled")
        .arg("--disable-infobars")
        .arg("--disable-notifications")
        .arg("--no-first-run")
        .arg("--no-default-browser-check")
        .arg("--disable-extensions")
        .arg("--disable-background-networking")
        .arg("--disable-breakpad")
        .arg("--disable-features=TranslateUI")
        .arg("--password-store=basic")
        .arg("--use-mock-keychain")
        .arg("--mute-audio");

    builder = if config.headless {
        builder.headless_mode(HeadlessMode::default())
    } else {
        builder.with_head()
    };

    if config.disable_security {
        warn!("Disabling browser security features (disable_security=true)");
        builder = builder
            .arg("--disable-web-security")
            .arg("--disable-features=IsolateOrigins,site-per-process")
            .arg("--ignore-certificate-errors");
    }

    if config.disable_security || should_disable_sandbox() {
        builder = builder.arg("--no-sandbox").arg("--disable-setuid-sandbox");
    }

    let browser_config = builder
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build browser config: {e}"))?;

    info!(headless = config.headless, "Launching browser");
    let (browser, mut handler) = Browser::launch(browser_config)
        .await
        .context("Failed to launch browser")?;

    let handler_task = task::spawn(async move {
        while let Some(event) = handler.next().await {
            if let Err(e) = event {
                let message = e.to_string();
                // chromiumoxide cannot decode every CDP event Chrome emits
                // (mattsse/chromiumoxide#167, #229); those are noise
                if message.contains("data did not match any variant of untagged enum Message")
                    || message.contains("Failed to deserialize WS response")
                {
                    trace!("Suppressed CDP decode error: {}", message);
                } else {
                    error!("Browser handler error: {:?}", e);
                }
            }
        }
        info!("Browser handler task completed");
    });

    profile.keep();
    Ok((browser, handler_task))
}

/// Sandboxing needs setuid, which containers do not grant
fn should_disable_sandbox() -> bool {
    Path::new("/.dockerenv").exists()
        || std::env::var("container").is_ok()
        || std::env::var("KUBERNETES_SERVICE_HOST").is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn candidate_paths_cover_current_platform() {
        let paths = candidate_paths();
        assert!(!paths.is_empty());
        assert!(paths.iter().all(|p| p.is_absolute()));
    }

    #[test]
    fn profile_dir_is_removed_unless_kept() {
        let root = tempfile::tempdir().unwrap();

        let dropped = root.path().join("dropped");
        drop(ProfileDirGuard::create(dropped.clone()).unwrap());
        assert!(!dropped.exists());

        let kept = root.path().join("kept");
        ProfileDirGuard::create(kept.clone()).unwrap().keep();
        assert!(kept.exists());
    }
}
