use crate::error::ExtractError;
use crate::utils::sanitize_filename;
use fantoccini::{Client, ClientBuilder, Locator};
use std::future::Future;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

/// The headless rendering service.
pub trait Renderer: Send + Sync {
    /// Loads `url`, runs its scripts and returns the materialized HTML
    fn render(&self, url: &str) -> impl Future<Output = Result<String, ExtractError>> + Send;

    /// Captures `url` as a PNG and returns where it was written
    fn screenshot(&self, url: &str) -> impl Future<Output = Result<PathBuf, ExtractError>> + Send;
}

/// Renderer for runs that never render; every call fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoRenderer;

impl Renderer for NoRenderer {
    async fn render(&self, url: &str) -> Result<String, ExtractError> {
        Err(ExtractError::render(url, "no rendering service configured"))
    }

    async fn screenshot(&self, url: &str) -> Result<PathBuf, ExtractError> {
        Err(ExtractError::render(url, "no rendering service configured"))
    }
}

/// [`Renderer`] driving a browser over WebDriver.
///
/// The session is opened on first use and shared; a page holds it from
/// navigation until its source or screenshot has been read.
pub struct WebDriverRenderer {
    webdriver_url: String,
    screenshot_dir: PathBuf,
    client: Mutex<Option<Client>>,
}

impl WebDriverRenderer {
    pub fn new(webdriver_url: &str, screenshot_dir: impl AsRef<Path>) -> Self {
        Self {
            webdriver_url: webdriver_url.to_string(),
            screenshot_dir: screenshot_dir.as_ref().to_path_buf(),
            client: Mutex::new(None),
        }
    }

    /// Ends the WebDriver session, if one was opened
    pub async fn close(&self) {
        if let Some(client) = self.client.lock().await.take() {
            if let Err(e) = client.close().await {
                ::log::warn!("Failed to close WebDriver session: {}", e);
            }
        }
    }

    /// Navigates the shared session to `url` and waits for the body.
    ///
    /// Returns the session with its lock still held.
    async fn load(&self, url: &str) -> Result<tokio::sync::MutexGuard<'_, Option<Client>>, ExtractError> {
        let mut guard = self.client.lock().await;
        if guard.is_none() {
            *guard = Some(connect_to_webdriver(&self.webdriver_url).await?);
        }
        let client = guard
            .as_ref()
            .ok_or_else(|| ExtractError::render(url, "WebDriver session unavailable"))?;

        client
            .goto(url)
            .await
            .map_err(|e| ExtractError::render(url, e))?;
        client
            .wait()
            .for_element(Locator::Css("body"))
            .await
            .map_err(|e| ExtractError::render(url, e))?;
        Ok(guard)
    }
}

impl Renderer for WebDriverRenderer {
    async fn render(&self, url: &str) -> Result<String, ExtractError> {
        let session = self.load(url).await?;
        let client = session
            .as_ref()
            .ok_or_else(|| ExtractError::render(url, "WebDriver session unavailable"))?;
        let html = client
            .source()
            .await
            .map_err(|e| ExtractError::render(url, e))?;
        ::log::debug!("Rendered {} ({} bytes)", url, html.len());
        Ok(html)
    }

    async fn screenshot(&self, url: &str) -> Result<PathBuf, ExtractError> {
        let png = {
            let session = self.load(url).await?;
            let client = session
                .as_ref()
                .ok_or_else(|| ExtractError::render(url, "WebDriver session unavailable"))?;
            client
                .screenshot()
                .await
                .map_err(|e| ExtractError::render(url, e))?
        };

        tokio::fs::create_dir_all(&self.screenshot_dir).await?;
        let path = self
            .screenshot_dir
            .join(format!("{}.png", sanitize_filename(url)));
        tokio::fs::write(&path, png).await?;
        Ok(path)
    }
}

/// Connects to the WebDriver instance, trying common local ports after `webdriver_url`
async fn connect_to_webdriver(webdriver_url: &str) -> Result<Client, ExtractError> {
    let fallback_urls = [
        "http://localhost:9515", // ChromeDriver default
        "http://127.0.0.1:4444",
    ];

    let mut last_error = String::new();
    for url in std::iter::once(webdriver_url).chain(
        fallback_urls
            .iter()
            .copied()
            .filter(|url| *url != webdriver_url),
    ) {
        match ClientBuilder::native().connect(url).await {
            Ok(client) => {
                ::log::debug!("Connected to WebDriver at {}", url);
                return Ok(client);
            }
            Err(e) => {
                ::log::debug!("Failed to connect to WebDriver at {}: {}", url, e);
                last_error = e.to_string();
            }
        }
    }

    ::log::error!(
        "Make sure a WebDriver server is running or set the WEBDRIVER_URL environment variable"
    );
    Err(ExtractError::render(webdriver_url, last_error))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_no_renderer_always_fails() {
        let renderer = NoRenderer;
        assert!(matches!(
            renderer.render("https://e.test").await,
            Err(ExtractError::Render { .. })
        ));
        assert!(matches!(
            renderer.screenshot("https://e.test").await,
            Err(ExtractError::Render { .. })
        ));
    }
}
