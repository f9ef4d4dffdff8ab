//! Browser tab bound to the console under test

use chromiumoxide::page::ScreenshotParams;
use chromiumoxide::Page;
use std::path::Path;
use tracing::{debug, info};

use crate::config::{join_url, SuiteConfig, TimeoutSettings};
use crate::error::{E2eError, E2eResult};
use crate::expect::PageAssertions;
use crate::locator::{Locator, Role, Selector};
use crate::network::{ResponseMatcher, ResponseWaiter};

#[derive(Clone)]
pub struct AppPage {
    page: Page,
    base_url: String,
    timeouts: TimeoutSettings,
}

impl AppPage {
    pub fn new(page: Page, config: &SuiteConfig) -> Self {
        Self {
            page,
            base_url: config.base_url.clone(),
            timeouts: config.timeouts.clone(),
        }
    }

    pub fn inner(&self) -> &Page {
        &self.page
    }

    pub fn timeouts(&self) -> &TimeoutSettings {
        &self.timeouts
    }

    /// Navigate to a route relative to the console base URL and wait for load
    pub async fn goto(&self, route: &str) -> E2eResult<()> {
        let url = join_url(&self.base_url, route);
        info!("Navigating to {}", url);

        let timeout = self.timeouts.navigation();
        match tokio::time::timeout(timeout, self.page.goto(url.as_str())).await {
            Ok(result) => {
                result?;
                Ok(())
            }
            Err(_) => Err(E2eError::Timeout {
                what: format!("navigation to {}", url),
                expected: "load event".to_string(),
                last_observed: "page still loading".to_string(),
                timeout_ms: timeout.as_millis() as u64,
            }),
        }
    }

    /// Current location, including the hash route
    pub async fn url(&self) -> E2eResult<String> {
        let href: String = self
            .page
            .evaluate("window.location.href")
            .await?
            .into_value()?;
        Ok(href)
    }

    pub async fn title(&self) -> E2eResult<String> {
        Ok(self.page.get_title().await?.unwrap_or_default())
    }

    /// Elements matching a CSS selector
    pub fn locator(&self, css: &str) -> Locator {
        Locator::new(
            self.page.clone(),
            Selector::Css {
                selector: css.to_string(),
            },
            self.timeouts.clone(),
        )
    }

    /// Elements with an ARIA role whose accessible name contains `name`
    pub fn get_by_role(&self, role: Role, name: &str) -> Locator {
        Locator::new(
            self.page.clone(),
            Selector::Role {
                role,
                name: Some(name.to_string()),
            },
            self.timeouts.clone(),
        )
    }

    pub fn expect(&self) -> PageAssertions<'_> {
        PageAssertions::new(self)
    }

    /// Start listening for a response before triggering the request
    pub async fn wait_for_response(&self, matcher: ResponseMatcher) -> E2eResult<ResponseWaiter> {
        ResponseWaiter::register(&self.page, matcher, self.timeouts.response()).await
    }

    /// Save a full-page PNG screenshot
    pub async fn screenshot(&self, path: &Path) -> E2eResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let params = ScreenshotParams::builder().full_page(true).build();
        self.page.save_screenshot(params, path).await?;
        debug!("Screenshot saved to {}", path.display());
        Ok(())
    }
}
