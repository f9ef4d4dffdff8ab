//! Test runner: suite lifecycle, step recording and result reporting

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{error, info, warn};

use crate::browser::BrowserSession;
use crate::config::SuiteConfig;
use crate::error::{E2eError, E2eResult};
use crate::page::AppPage;
use crate::suite::{CategoryTypesSuite, SUITE_NAME, TEST_NAME};

/// Result of a single named step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepResult {
    pub step_name: String,
    pub success: bool,
    pub duration_ms: u64,
    pub error: Option<String>,
}

/// Result of running a single test
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestResult {
    pub name: String,
    pub success: bool,
    pub duration_ms: u64,
    pub steps: Vec<StepResult>,
    pub error: Option<String>,
    pub screenshot_path: Option<String>,
}

impl TestResult {
    fn not_run(name: &str, error: &E2eError) -> Self {
        Self {
            name: name.to_string(),
            success: false,
            duration_ms: 0,
            steps: vec![],
            error: Some(error.to_string()),
            screenshot_path: None,
        }
    }
}

/// Result of running the suite
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestSuiteResult {
    pub suite: String,
    pub started_at: DateTime<Utc>,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub duration_ms: u64,
    pub results: Vec<TestResult>,
}

impl TestSuiteResult {
    pub fn from_results(suite: &str, started_at: DateTime<Utc>, duration_ms: u64, results: Vec<TestResult>) -> Self {
        let passed = results.iter().filter(|r| r.success).count();
        Self {
            suite: suite.to_string(),
            started_at,
            total: results.len(),
            passed,
            failed: results.len() - passed,
            skipped: 0,
            duration_ms,
            results,
        }
    }

    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }
}

/// Records each helper call of a test as a named step
#[derive(Debug, Default)]
pub struct StepLog {
    steps: Vec<StepResult>,
}

impl StepLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Await `step`, recording its name, duration and outcome
    pub async fn run<T, Fut>(&mut self, name: &str, step: Fut) -> E2eResult<T>
    where
        Fut: Future<Output = E2eResult<T>>,
    {
        let start = Instant::now();
        info!("→ {}", name);

        let result = step.await;
        let duration_ms = start.elapsed().as_millis() as u64;

        self.steps.push(StepResult {
            step_name: name.to_string(),
            success: result.is_ok(),
            duration_ms,
            error: result.as_ref().err().map(ToString::to_string),
        });

        result.map_err(|e| E2eError::StepFailed {
            step: name.to_string(),
            reason: match e {
                E2eError::StepFailed { step, reason } => format!("{}: {}", step, reason),
                other => other.to_string(),
            },
        })
    }

    pub fn steps(&self) -> &[StepResult] {
        &self.steps
    }

    pub fn into_steps(self) -> Vec<StepResult> {
        self.steps
    }
}

/// Configuration for the test runner
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    pub suite: SuiteConfig,
    pub output_dir: PathBuf,
    /// Check the API answers before registering the user
    pub preflight: bool,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            suite: SuiteConfig::default(),
            output_dir: PathBuf::from("test-results"),
            preflight: true,
        }
    }
}

/// Main E2E test runner
pub struct TestRunner {
    config: RunnerConfig,
}

impl TestRunner {
    pub fn new() -> Self {
        Self::with_config(RunnerConfig::default())
    }

    pub fn with_config(config: RunnerConfig) -> Self {
        Self { config }
    }

    /// Run `before_all`, the test, then `after_all`
    pub async fn run(&self) -> E2eResult<TestSuiteResult> {
        self.config.suite.validate()?;

        let started_at = Utc::now();
        let start = Instant::now();
        info!("Running suite: {}", SUITE_NAME);

        let results = match CategoryTypesSuite::before_all(&self.config.suite, self.config.preflight).await {
            Ok(suite) => {
                let result = self.run_test(&suite).await;
                suite.after_all();
                vec![result]
            }
            Err(e) => {
                error!("before_all failed: {}", e);
                vec![TestResult::not_run(TEST_NAME, &e)]
            }
        };

        let duration_ms = start.elapsed().as_millis() as u64;
        let suite_result = TestSuiteResult::from_results(SUITE_NAME, started_at, duration_ms, results);

        for result in &suite_result.results {
            if result.success {
                info!("✓ {} ({} ms)", result.name, result.duration_ms);
            } else {
                error!("✗ {} - {}", result.name, result.error.as_deref().unwrap_or("unknown error"));
            }
        }
        info!(
            "Test Results: {} passed, {} failed, {} skipped ({} ms)",
            suite_result.passed, suite_result.failed, suite_result.skipped, suite_result.duration_ms
        );

        Ok(suite_result)
    }

    async fn run_test(&self, suite: &CategoryTypesSuite) -> TestResult {
        let start = Instant::now();

        let session = match BrowserSession::launch(&self.config.suite.browser).await {
            Ok(session) => session,
            Err(e) => return TestResult::not_run(TEST_NAME, &e),
        };

        let mut steps = StepLog::new();
        let mut screenshot_path = None;

        let outcome = match session.new_page(&self.config.suite).await {
            Ok(page) => {
                let outcome = suite.creates_root_and_sub_category(&page, &mut steps).await;
                if outcome.is_err() {
                    screenshot_path = self.capture_failure(&page).await;
                }
                outcome
            }
            Err(e) => Err(e),
        };

        if let Err(e) = session.close().await {
            warn!("Browser teardown failed: {}", e);
        }

        TestResult {
            name: TEST_NAME.to_string(),
            success: outcome.is_ok(),
            duration_ms: start.elapsed().as_millis() as u64,
            steps: steps.into_steps(),
            error: outcome.err().map(|e| e.to_string()),
            screenshot_path,
        }
    }

    /// Best-effort full-page screenshot of a failed test
    async fn capture_failure(&self, page: &AppPage) -> Option<String> {
        let path = self
            .config
            .output_dir
            .join("screenshots")
            .join(format!("{}.png", slug(TEST_NAME)));

        match page.screenshot(&path).await {
            Ok(()) => Some(path.to_string_lossy().to_string()),
            Err(e) => {
                warn!("Could not capture failure screenshot: {}", e);
                None
            }
        }
    }

    /// Write test results to JSON file
    pub fn write_results(&self, results: &TestSuiteResult) -> E2eResult<PathBuf> {
        std::fs::create_dir_all(&self.config.output_dir)?;

        let path = self.config.output_dir.join("test-results.json");
        let json = serde_json::to_string_pretty(results)?;
        std::fs::write(&path, json)?;

        info!("Results written to: {}", path.display());
        Ok(path)
    }
}

impl Default for TestRunner {
    fn default() -> Self {
        Self::new()
    }
}

/// File-name-safe form of a test name
pub fn slug(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if !out.ends_with('-') {
            out.push('-');
        }
    }
    out.trim_matches('-').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_step_log_records_success_and_failure() {
        let mut log = StepLog::new();

        let value = log.run("first", async { Ok(7) }).await.unwrap();
        assert_eq!(value, 7);

        let err = log
            .run("second", async {
                Err::<(), _>(E2eError::AssertionFailed("row missing".to_string()))
            })
            .await
            .unwrap_err();

        match err {
            E2eError::StepFailed { step, reason } => {
                assert_eq!(step, "second");
                assert!(reason.contains("row missing"));
            }
            other => panic!("expected step failure, got {other}"),
        }

        let steps = log.steps();
        assert_eq!(steps.len(), 2);
        assert!(steps[0].success);
        assert!(!steps[1].success);
        assert!(steps[1].error.as_deref().unwrap().contains("row missing"));
    }

    #[tokio::test]
    async fn test_nested_step_failure_reports_outer_step() {
        let mut log = StepLog::new();

        let err = log
            .run("create root category", async {
                Err::<(), _>(E2eError::StepFailed {
                    step: "response to POST */category-type/create*".to_string(),
                    reason: "request failed: net::ERR_FAILED".to_string(),
                })
            })
            .await
            .unwrap_err();

        match err {
            E2eError::StepFailed { step, reason } => {
                assert_eq!(step, "create root category");
                assert!(reason.starts_with("response to POST */category-type/create*"));
                assert!(reason.contains("net::ERR_FAILED"));
            }
            other => panic!("expected step failure, got {other}"),
        }
    }

    #[test]
    fn test_suite_result_tallies() {
        let ok = TestResult {
            name: "a".to_string(),
            success: true,
            duration_ms: 10,
            steps: vec![],
            error: None,
            screenshot_path: None,
        };
        let failed = TestResult::not_run("b", &E2eError::AssertionFailed("x".to_string()));

        let result = TestSuiteResult::from_results(SUITE_NAME, Utc::now(), 25, vec![ok, failed]);
        assert_eq!(result.total, 2);
        assert_eq!(result.passed, 1);
        assert_eq!(result.failed, 1);
        assert!(!result.all_passed());
    }

    #[test]
    fn test_write_results_creates_json_report() {
        let dir = tempfile::tempdir().unwrap();
        let runner = TestRunner::with_config(RunnerConfig {
            output_dir: dir.path().join("out"),
            ..RunnerConfig::default()
        });

        let result = TestSuiteResult::from_results(SUITE_NAME, Utc::now(), 0, vec![]);
        let path = runner.write_results(&result).unwrap();

        let written: TestSuiteResult =
            serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(written.suite, SUITE_NAME);
        assert!(written.all_passed());
    }

    #[test]
    fn test_slug() {
        assert_eq!(
            slug(TEST_NAME),
            "creates-a-root-category-and-a-sub-category-then-validates-them-in-the-list"
        );
        assert_eq!(slug("  Hello, World!  "), "hello-world");
    }
}
