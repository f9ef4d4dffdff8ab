//! Error types for E2E testing

use chromiumoxide::error::CdpError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum E2eError {
    #[error("Browser failed to launch: {0}")]
    BrowserLaunch(String),

    #[error("Browser error: {0}")]
    Browser(#[from] CdpError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Step failed: {step} - {reason}")]
    StepFailed { step: String, reason: String },

    #[error("Assertion failed: {0}")]
    AssertionFailed(String),

    #[error("Strict mode violation: {locator} resolved to {count} elements")]
    StrictModeViolation { locator: String, count: usize },

    #[error("Timeout after {timeout_ms} ms waiting for {what}: expected {expected}, last observed {last_observed}")]
    Timeout {
        what: String,
        expected: String,
        last_observed: String,
        timeout_ms: u64,
    },

    #[error("Unexpected status {status} from {url}: {body}")]
    UnexpectedStatus {
        url: String,
        status: u16,
        body: String,
    },

    #[error("Unsupported key: {0}")]
    UnsupportedKey(String),

    #[error("Server at {0} did not become reachable after {1} attempts")]
    Unreachable(String, usize),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    #[error("Base64 error: {0}")]
    Base64(#[from] base64::DecodeError),
}

impl E2eError {
    /// Whether a probe hitting this error should be retried by a polling assertion.
    ///
    /// CDP calls fail while a navigation tears down the execution context; the
    /// next probe usually succeeds against the new document.
    /// Browser errors that a later probe may not hit again, such as a
    /// navigation destroying the execution context. Script exceptions are
    /// bugs in the probe itself and are never retried.
    pub fn is_transient(&self) -> bool {
        matches!(self, E2eError::Browser(e) if !matches!(e, CdpError::JavascriptException(_)))
    }
}

pub type E2eResult<T> = Result<T, E2eError>;

#[cfg(test)]
mod tests {
    use super::*;
    use chromiumoxide::cdp::js_protocol::runtime::ExceptionDetails;

    #[test]
    fn test_timeout_message_carries_last_observation() {
        let err = E2eError::Timeout {
            what: "page url".to_string(),
            expected: "matching /dashboard".to_string(),
            last_observed: "https://app/#/auth/login".to_string(),
            timeout_ms: 5000,
        };
        let msg = err.to_string();
        assert!(msg.contains("5000 ms"));
        assert!(msg.contains("/#/auth/login"));
    }

    #[test]
    fn test_strict_mode_is_not_transient() {
        let err = E2eError::StrictModeViolation {
            locator: "tbody tr".to_string(),
            count: 3,
        };
        assert!(!err.is_transient());
        assert!(!E2eError::AssertionFailed("x".into()).is_transient());
    }

    #[test]
    fn test_script_exceptions_are_not_transient() {
        let details = ExceptionDetails::builder()
            .exception_id(1)
            .text("Uncaught Error: unknown selector step: bogus")
            .line_number(0)
            .column_number(0)
            .build()
            .unwrap();
        let err = E2eError::from(CdpError::JavascriptException(Box::new(details)));
        assert!(!err.is_transient());

        assert!(E2eError::from(CdpError::Timeout).is_transient());
    }
}
