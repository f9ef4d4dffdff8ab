//! Polling primitive behind actions and assertions

use std::future::Future;
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::debug;

use crate::error::{E2eError, E2eResult};

/// Outcome of one probe
#[derive(Debug, Clone, PartialEq)]
pub enum Probe<T> {
    /// Condition met; polling stops with this value
    Ready(T),
    /// Condition not met yet; the string describes what was observed
    Pending(String),
}

/// Timeout and poll cadence for a single wait
#[derive(Debug, Clone, Copy)]
pub struct WaitConfig {
    pub timeout: Duration,
    pub interval: Duration,
}

impl WaitConfig {
    pub fn new(timeout: Duration, interval: Duration) -> Self {
        Self { timeout, interval }
    }

    pub fn with_timeout(self, timeout: Duration) -> Self {
        Self { timeout, ..self }
    }
}

/// Probe until ready, a non-transient error, or the timeout.
///
/// The probe always runs at least once, so a zero timeout still checks the
/// current state.
pub async fn poll_until<T, F, Fut>(
    what: &str,
    expected: &str,
    wait: WaitConfig,
    mut probe: F,
) -> E2eResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = E2eResult<Probe<T>>>,
{
    let start = Instant::now();
    let mut last_observed: String;

    loop {
        match probe().await {
            Ok(Probe::Ready(value)) => return Ok(value),
            Ok(Probe::Pending(observed)) => last_observed = observed,
            Err(e) if e.is_transient() => {
                debug!("Transient error while waiting for {}: {}", what, e);
                last_observed = e.to_string();
            }
            Err(e) => return Err(e),
        }

        let elapsed = start.elapsed();
        if elapsed >= wait.timeout {
            return Err(E2eError::Timeout {
                what: what.to_string(),
                expected: expected.to_string(),
                last_observed,
                timeout_ms: wait.timeout.as_millis() as u64,
            });
        }

        sleep(wait.interval.min(wait.timeout - elapsed)).await;
    }
}
