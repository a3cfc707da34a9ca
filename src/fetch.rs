use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::Page;
use futures::StreamExt;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::error::ScrapeError;

/// Capability to turn a URL into fully rendered page markup.
///
/// The driver only depends on this trait, so tests can swap the real
/// browser for an in-memory map of canned pages.
#[async_trait]
pub trait PageFetcher {
    async fn fetch(&self, url: &str) -> Result<String, ScrapeError>;
}

/// One long-lived headless Chrome session, reused for every product page.
///
/// Product data on these pages is injected client-side, so a plain HTTP GET
/// returns a shell document; the markup has to come from a real rendering
/// engine. The session is opened once at pipeline start and must be released
/// with [`BrowserFetcher::close`] on every exit path.
pub struct BrowserFetcher {
    browser: Browser,
    handler_task: JoinHandle<()>,
}

impl BrowserFetcher {
    /// Launch headless Chrome and start draining its CDP event stream.
    pub async fn launch() -> Result<Self, ScrapeError> {
        let config = BrowserConfig::builder()
            .arg("--disable-dev-shm-usage")
            .build()
            .map_err(ScrapeError::BrowserLaunch)?;

        let (browser, mut handler) = Browser::launch(config).await?;

        // The handler stream must be polled for the browser to make
        // progress; it ends when the browser connection closes.
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        Ok(Self {
            browser,
            handler_task,
        })
    }

    /// Shut the browser down and reap the child process.
    ///
    /// Consumes the fetcher: after this the session is gone and the driver
    /// cannot accidentally render through a dead browser.
    pub async fn close(mut self) -> Result<(), ScrapeError> {
        let closed = self.browser.close().await;
        let _ = self.browser.wait().await;
        self.handler_task.abort();
        closed?;
        Ok(())
    }

    async fn render(&self, page: &Page, url: &str) -> Result<String, ScrapeError> {
        page.wait_for_navigation()
            .await
            .map_err(|e| ScrapeError::Render {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        page.content().await.map_err(|e| ScrapeError::Render {
            url: url.to_string(),
            reason: e.to_string(),
        })
    }
}

#[async_trait]
impl PageFetcher for BrowserFetcher {
    async fn fetch(&self, url: &str) -> Result<String, ScrapeError> {
        debug!("Rendering {}", url);
        let page = self
            .browser
            .new_page(url)
            .await
            .map_err(|e| ScrapeError::Render {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        let markup = self.render(&page, url).await;

        // One tab per URL; close it before the next page regardless of how
        // the render went. A failed close is not worth failing the URL over.
        if let Err(e) = page.close().await {
            warn!("Failed to close tab for {}: {}", url, e);
        }

        markup
    }
}
