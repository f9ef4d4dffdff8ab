//! Web-first assertions
//!
//! Each assertion re-probes the page until it holds or its timeout elapses.

use regex::Regex;
use std::time::Duration;

use crate::error::E2eResult;
use crate::locator::{ElementState, Locator};
use crate::page::AppPage;
use crate::wait::{poll_until, Probe, WaitConfig};

/// Collapse runs of whitespace and trim, as text assertions compare it
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn observed(state: &ElementState) -> String {
    match state {
        ElementState { count: 0, .. } => "no element".to_string(),
        ElementState { visible: false, .. } => "hidden element".to_string(),
        _ => "visible element".to_string(),
    }
}

/// Assertions on a locator
pub struct LocatorAssertions {
    locator: Locator,
    wait: WaitConfig,
}

impl LocatorAssertions {
    pub(crate) fn new(locator: Locator) -> Self {
        let wait = WaitConfig::new(
            locator.timeouts().expect(),
            locator.timeouts().poll_interval(),
        );
        Self { locator, wait }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.wait = self.wait.with_timeout(timeout);
        self
    }

    pub async fn to_be_visible(&self) -> E2eResult<()> {
        let locator = &self.locator;
        poll_until(&locator.describe(), "visible", self.wait, move || async move {
            let state = locator.strict_state().await?;
            Ok(if state.count == 1 && state.visible {
                Probe::Ready(())
            } else {
                Probe::Pending(observed(&state))
            })
        })
        .await
    }

    /// Passes when nothing matches or the match is not visible
    pub async fn to_be_hidden(&self) -> E2eResult<()> {
        let locator = &self.locator;
        poll_until(&locator.describe(), "hidden", self.wait, move || async move {
            let state = locator.strict_state().await?;
            Ok(if state.count == 0 || !state.visible {
                Probe::Ready(())
            } else {
                Probe::Pending(observed(&state))
            })
        })
        .await
    }

    pub async fn to_have_count(&self, expected: usize) -> E2eResult<()> {
        let locator = &self.locator;
        let what = format!("count of {}", locator.describe());
        poll_until(&what, &expected.to_string(), self.wait, move || async move {
            let count = locator.count().await?;
            Ok(if count == expected {
                Probe::Ready(())
            } else {
                Probe::Pending(count.to_string())
            })
        })
        .await
    }

    /// Whole text content equals `expected` after whitespace normalisation
    pub async fn to_have_text(&self, expected: &str) -> E2eResult<()> {
        let locator = &self.locator;
        let expected = normalize_whitespace(expected);
        let what = format!("text of {}", locator.describe());
        let wanted = expected.as_str();
        poll_until(&what, &format!("{:?}", wanted), self.wait, move || async move {
            let state = locator.strict_state().await?;
            Ok(match state.text {
                Some(text) if text == wanted => Probe::Ready(()),
                Some(text) => Probe::Pending(format!("{:?}", text)),
                None => Probe::Pending("no element".to_string()),
            })
        })
        .await
    }

    /// The `class` attribute matches `pattern`
    pub async fn to_have_class(&self, pattern: &Regex) -> E2eResult<()> {
        let locator = &self.locator;
        let what = format!("class of {}", locator.describe());
        poll_until(&what, &format!("/{}/", pattern), self.wait, move || async move {
            let state = locator.strict_state().await?;
            Ok(match state.class_name {
                Some(class) if pattern.is_match(&class) => Probe::Ready(()),
                Some(class) => Probe::Pending(format!("{:?}", class)),
                None => Probe::Pending("no element".to_string()),
            })
        })
        .await
    }
}

/// Assertions on the page itself
pub struct PageAssertions<'a> {
    page: &'a AppPage,
    wait: WaitConfig,
}

impl<'a> PageAssertions<'a> {
    pub(crate) fn new(page: &'a AppPage) -> Self {
        let timeouts = page.timeouts();
        Self {
            page,
            wait: WaitConfig::new(timeouts.expect(), timeouts.poll_interval()),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.wait = self.wait.with_timeout(timeout);
        self
    }

    pub async fn to_have_url(&self, pattern: &Regex) -> E2eResult<()> {
        let page = self.page;
        poll_until("page url", &format!("/{}/", pattern), self.wait, move || async move {
            let url = page.url().await?;
            Ok(if pattern.is_match(&url) {
                Probe::Ready(())
            } else {
                Probe::Pending(url)
            })
        })
        .await
    }

    pub async fn to_have_title(&self, expected: &str) -> E2eResult<()> {
        let page = self.page;
        let expected = normalize_whitespace(expected);
        let wanted = expected.as_str();
        poll_until("page title", &format!("{:?}", wanted), self.wait, move || async move {
            let title = normalize_whitespace(&page.title().await?);
            Ok(if title == wanted {
                Probe::Ready(())
            } else {
                Probe::Pending(format!("{:?}", title))
            })
        })
        .await
    }
}
