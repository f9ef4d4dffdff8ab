//! Suite configuration
//!
//! Values come from built-in defaults, then an optional TOML file, then
//! `CLUBADMIN_E2E_*` environment variables. The harness applies CLI flags last.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{E2eError, E2eResult};

pub const ENV_BASE_URL: &str = "CLUBADMIN_E2E_BASE_URL";
pub const ENV_API_BASE_URL: &str = "CLUBADMIN_E2E_API_BASE_URL";
pub const ENV_HEADLESS: &str = "CLUBADMIN_E2E_HEADLESS";
pub const ENV_CHROME: &str = "CLUBADMIN_E2E_CHROME";

/// Top-level suite configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SuiteConfig {
    /// Base URL of the web console (routes are hash routes appended to it)
    pub base_url: String,

    /// Base URL of the backend API
    pub api_base_url: String,

    /// Pre-existing root category used as the sub-category parent
    pub existing_root_category: String,

    /// Roles granted to the registered user
    pub user_roles: Vec<String>,

    /// Domain for generated fixture emails
    pub email_domain: String,

    /// Browser configuration
    pub browser: BrowserSettings,

    /// Wait windows
    pub timeouts: TimeoutSettings,
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            base_url: "https://club-administration.qa.qubika.com".to_string(),
            api_base_url: "https://api.club-administration.qa.qubika.com".to_string(),
            existing_root_category: "TestCategoryRoot".to_string(),
            user_roles: vec!["ROLE_ADMIN".to_string()],
            email_domain: "playwrite.com".to_string(),
            browser: BrowserSettings::default(),
            timeouts: TimeoutSettings::default(),
        }
    }
}

/// Chromium launch configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserSettings {
    pub headless: bool,

    /// Explicit Chrome/Chromium binary (None = auto-detect)
    pub chrome_executable: Option<PathBuf>,

    pub viewport_width: u32,
    pub viewport_height: u32,

    /// Pass `--no-sandbox` (needed in most containers)
    pub no_sandbox: bool,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            headless: true,
            chrome_executable: None,
            viewport_width: 1280,
            viewport_height: 720,
            no_sandbox: true,
        }
    }
}

/// Timeouts in milliseconds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutSettings {
    pub expect_ms: u64,
    pub action_ms: u64,
    pub navigation_ms: u64,
    pub response_ms: u64,
    pub toast_dismiss_ms: u64,
    pub request_ms: u64,
    pub poll_interval_ms: u64,
}

impl Default for TimeoutSettings {
    fn default() -> Self {
        Self {
            expect_ms: 5_000,
            action_ms: 10_000,
            navigation_ms: 30_000,
            response_ms: 30_000,
            toast_dismiss_ms: 10_000,
            request_ms: 30_000,
            poll_interval_ms: 100,
        }
    }
}

impl TimeoutSettings {
    pub fn expect(&self) -> Duration {
        Duration::from_millis(self.expect_ms)
    }

    pub fn action(&self) -> Duration {
        Duration::from_millis(self.action_ms)
    }

    pub fn navigation(&self) -> Duration {
        Duration::from_millis(self.navigation_ms)
    }

    pub fn response(&self) -> Duration {
        Duration::from_millis(self.response_ms)
    }

    pub fn toast_dismiss(&self) -> Duration {
        Duration::from_millis(self.toast_dismiss_ms)
    }

    pub fn request(&self) -> Duration {
        Duration::from_millis(self.request_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl SuiteConfig {
    /// Load configuration from file, falling back to defaults when it does not exist
    pub fn load(path: &Path) -> E2eResult<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Self = toml::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Apply `CLUBADMIN_E2E_*` overrides from the process environment
    pub fn apply_env(&mut self) -> E2eResult<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from any key lookup (the environment in production)
    pub fn apply_overrides<F>(&mut self, lookup: F) -> E2eResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_BASE_URL) {
            self.base_url = url;
        }
        if let Some(url) = lookup(ENV_API_BASE_URL) {
            self.api_base_url = url;
        }
        if let Some(value) = lookup(ENV_HEADLESS) {
            self.browser.headless = parse_bool(ENV_HEADLESS, &value)?;
        }
        if let Some(path) = lookup(ENV_CHROME) {
            self.browser.chrome_executable = Some(PathBuf::from(path));
        }
        Ok(())
    }

    /// Reject configurations the suite cannot run with
    pub fn validate(&self) -> E2eResult<()> {
        for (name, url) in [("base_url", &self.base_url), ("api_base_url", &self.api_base_url)] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(E2eError::InvalidConfig(format!(
                    "{} must be an http(s) URL, got '{}'",
                    name, url
                )));
            }
        }
        if self.existing_root_category.trim().is_empty() {
            return Err(E2eError::InvalidConfig(
                "existing_root_category must not be empty".to_string(),
            ));
        }
        if self.timeouts.poll_interval_ms == 0 {
            return Err(E2eError::InvalidConfig(
                "timeouts.poll_interval_ms must be positive".to_string(),
            ));
        }
        Ok(())
    }

}

/// Join a route or path onto a base URL with exactly one slash between them
pub(crate) fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}

fn parse_bool(key: &str, value: &str) -> E2eResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(E2eError::InvalidConfig(format!(
            "{} expects a boolean, got '{}'",
            key, other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_example_file_matches_defaults() {
        let config: SuiteConfig = toml::from_str(include_str!("../e2e.example.toml")).unwrap();
        let defaults = SuiteConfig::default();
        assert_eq!(config.base_url, defaults.base_url);
        assert_eq!(config.api_base_url, defaults.api_base_url);
        assert_eq!(config.user_roles, defaults.user_roles);
        assert_eq!(config.browser.no_sandbox, defaults.browser.no_sandbox);
        assert_eq!(config.timeouts.toast_dismiss_ms, 10_000);
        config.validate().unwrap();
    }

    #[test]
    fn test_defaults_target_qa_environment() {
        let config = SuiteConfig::default();
        assert_eq!(config.existing_root_category, "TestCategoryRoot");
        assert_eq!(config.user_roles, vec!["ROLE_ADMIN".to_string()]);
        assert_eq!(config.timeouts.toast_dismiss(), Duration::from_secs(10));
        assert!(config.browser.headless);
        config.validate().unwrap();
    }

    #[test]
    fn test_join_url_handles_hash_routes_and_slashes() {
        assert_eq!(
            join_url("http://localhost:4200/", "/#/auth/login"),
            "http://localhost:4200/#/auth/login"
        );
        assert_eq!(
            join_url("https://api.example", "api/auth/register"),
            "https://api.example/api/auth/register"
        );
        assert_eq!(join_url("https://api.example//", "//x"), "https://api.example/x");
    }

    #[test]
    fn test_load_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("suite.toml");
        std::fs::write(
            &path,
            r#"
base_url = "http://127.0.0.1:8080"

[timeouts]
expect_ms = 2000
"#,
        )
        .unwrap();

        let config = SuiteConfig::load(&path).unwrap();
        assert_eq!(config.base_url, "http://127.0.0.1:8080");
        assert_eq!(config.timeouts.expect_ms, 2000);
        assert_eq!(config.timeouts.toast_dismiss_ms, 10_000);
        assert_eq!(config.browser.viewport_width, 1280);
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = SuiteConfig::load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.email_domain, "playwrite.com");
    }

    #[test]
    fn test_overrides_win_over_file_values() {
        let env: HashMap<&str, &str> = [
            (ENV_BASE_URL, "http://ui.local"),
            (ENV_API_BASE_URL, "http://api.local"),
            (ENV_HEADLESS, "false"),
            (ENV_CHROME, "/usr/bin/chromium"),
        ]
        .into_iter()
        .collect();

        let mut config = SuiteConfig::default();
        config
            .apply_overrides(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.base_url, "http://ui.local");
        assert_eq!(config.api_base_url, "http://api.local");
        assert!(!config.browser.headless);
        assert_eq!(
            config.browser.chrome_executable,
            Some(PathBuf::from("/usr/bin/chromium"))
        );
    }

    #[test]
    fn test_bad_boolean_override_is_rejected() {
        let mut config = SuiteConfig::default();
        let err = config
            .apply_overrides(|key| (key == ENV_HEADLESS).then(|| "maybe".to_string()))
            .unwrap_err();
        assert!(matches!(err, E2eError::InvalidConfig(_)));
    }

    #[test]
    fn test_validate_rejects_non_http_urls() {
        let mut config = SuiteConfig::default();
        config.api_base_url = "ftp://example.com".to_string();
        assert!(config.validate().is_err());
    }
}
