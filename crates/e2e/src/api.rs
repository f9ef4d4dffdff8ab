//! Isolated API request context for suite setup
//!
//! Each suite gets its own `reqwest` client with a private cookie jar, so
//! sessions created during setup never leak into the browser or other suites.

use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::config::{join_url, SuiteConfig};
use crate::error::{E2eError, E2eResult};
use crate::model::RegisterUser;

pub const REGISTER_PATH: &str = "/api/auth/register";

/// Handle to the suite's request context
pub struct ApiContext {
    client: reqwest::Client,
    api_base_url: String,
}

impl ApiContext {
    pub fn new(config: &SuiteConfig) -> E2eResult<Self> {
        let client = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(config.timeouts.request())
            .build()?;

        Ok(Self {
            client,
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Register a user account; any non-2xx status is an error
    pub async fn register_user(&self, user: &RegisterUser) -> E2eResult<reqwest::StatusCode> {
        let url = join_url(&self.api_base_url, REGISTER_PATH);
        info!("Registering {} via {}", user.email, url);

        let response = self.client.post(&url).json(user).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(E2eError::UnexpectedStatus {
                url,
                status: status.as_u16(),
                body,
            });
        }

        debug!("Registration returned {}", status);
        Ok(status)
    }

    /// Poll `url` until it answers with anything but a server error
    pub async fn wait_until_reachable(&self, url: &str, deadline: Duration) -> E2eResult<()> {
        let start = Instant::now();
        let mut attempts = 0;

        while start.elapsed() < deadline {
            attempts += 1;

            match self.client.get(url).send().await {
                Ok(resp) if !resp.status().is_server_error() => {
                    debug!("{} reachable after {} attempt(s)", url, attempts);
                    return Ok(());
                }
                Ok(resp) => {
                    warn!("Preflight {} returned {}", url, resp.status());
                }
                Err(e) => {
                    if attempts == 1 {
                        info!("Waiting for {} to become reachable...", url);
                    }
                    if !e.is_connect() {
                        warn!("Preflight error: {}", e);
                    }
                }
            }

            sleep(Duration::from_millis(250)).await;
        }

        Err(E2eError::Unreachable(url.to_string(), attempts))
    }

    /// Release connections and cookies held by this context
    pub fn dispose(self) {
        debug!("Disposing API context for {}", self.api_base_url);
        drop(self.client);
    }
}
