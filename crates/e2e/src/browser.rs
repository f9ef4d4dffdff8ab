//! Chromium session over the Chrome DevTools Protocol

use chromiumoxide::handler::viewport::Viewport;
use chromiumoxide::{Browser, BrowserConfig};
use futures::StreamExt;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::{BrowserSettings, SuiteConfig};
use crate::error::{E2eError, E2eResult};
use crate::page::AppPage;

/// A launched browser plus the task pumping its CDP connection
pub struct BrowserSession {
    browser: Browser,
    handler: JoinHandle<()>,
}

impl BrowserSession {
    pub async fn launch(settings: &BrowserSettings) -> E2eResult<Self> {
        let config = Self::browser_config(settings)?;

        info!(
            "Launching Chromium ({}, {}x{})",
            if settings.headless { "headless" } else { "headed" },
            settings.viewport_width,
            settings.viewport_height
        );

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| E2eError::BrowserLaunch(e.to_string()))?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("Browser handler stopped: {}", e);
                    break;
                }
            }
        });

        Ok(Self { browser, handler })
    }

    fn browser_config(settings: &BrowserSettings) -> E2eResult<BrowserConfig> {
        let mut builder = BrowserConfig::builder()
            .window_size(settings.viewport_width, settings.viewport_height)
            .viewport(Viewport {
                width: settings.viewport_width,
                height: settings.viewport_height,
                ..Viewport::default()
            })
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage");

        if !settings.headless {
            builder = builder.with_head();
        }
        if settings.no_sandbox {
            builder = builder.no_sandbox();
        }
        if let Some(path) = &settings.chrome_executable {
            builder = builder.chrome_executable(path);
        }

        builder.build().map_err(E2eError::BrowserLaunch)
    }

    /// Open a blank tab bound to the suite's base URL and timeouts
    pub async fn new_page(&self, config: &SuiteConfig) -> E2eResult<AppPage> {
        let page = self.browser.new_page("about:blank").await?;
        Ok(AppPage::new(page, config))
    }

    /// Close the browser and wait for the process to exit
    pub async fn close(mut self) -> E2eResult<()> {
        info!("Closing browser");
        if let Err(e) = self.browser.close().await {
            warn!("Browser close failed: {}", e);
        }
        if let Err(e) = self.browser.wait().await {
            warn!("Waiting for browser exit failed: {}", e);
        }
        self.handler.abort();
        Ok(())
    }
}
