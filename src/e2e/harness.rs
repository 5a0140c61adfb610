//! Scenario orchestrator.

use std::path::Path;
use std::time::{Duration, Instant};

use serde_json::Value;

use crate::config::Validate;
use crate::error::Result;
use crate::filter::DataFilter;

use super::fixture::Fixture;
use super::validator::{ValidationReport, Validator};

/// Configuration for the scenario harness.
#[derive(Debug, Clone, Default)]
pub struct HarnessConfig {
    /// Stop a directory run at the first failing fixture.
    pub fail_fast: bool,
}

impl HarnessConfig {
    /// Sets whether to stop at the first failure.
    pub fn with_fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }
}

/// Result of one fixture run.
#[derive(Debug)]
pub struct ScenarioResult {
    /// The fixture that was run.
    pub fixture_name: String,
    /// Identifier for correlating log lines of this run.
    pub run_id: String,
    /// Filter output, if the pass succeeded.
    pub output: Option<Vec<Value>>,
    /// Validation report.
    pub validation: Option<ValidationReport>,
    /// Overall pass/fail.
    pub passed: bool,
    /// Error message if the fixture could not be run.
    pub error: Option<String>,
    /// Wall-clock time of the run.
    pub duration: Duration,
}

impl ScenarioResult {
    fn aborted(fixture_name: String, run_id: String, error: String, started: Instant) -> Self {
        Self {
            fixture_name,
            run_id,
            output: None,
            validation: None,
            passed: false,
            error: Some(error),
            duration: started.elapsed(),
        }
    }
}

/// Runs filter fixtures and validates their output.
#[derive(Debug, Default)]
pub struct ScenarioHarness {
    config: HarnessConfig,
}

impl ScenarioHarness {
    /// Creates a harness with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a harness with the given configuration.
    pub fn with_config(config: HarnessConfig) -> Self {
        Self { config }
    }

    /// Runs a fixture and returns the result.
    pub async fn run_fixture(&self, fixture: &Fixture) -> ScenarioResult {
        let started = Instant::now();
        let run_id = uuid::Uuid::new_v4().to_string();
        let fixture_name = fixture.name.clone();

        tracing::info!(fixture = %fixture.name, run_id = %run_id, "running scenario fixture");

        for warning in fixture.filter.validate().warnings {
            tracing::warn!(fixture = %fixture.name, warning = %warning, "filter configuration");
        }

        let records = match fixture.input_records() {
            Ok(records) => records,
            Err(e) => {
                return ScenarioResult::aborted(
                    fixture_name,
                    run_id,
                    format!("Failed to load records: {}", e),
                    started,
                )
            }
        };

        let filter = DataFilter::from_config(fixture.filter.clone());
        let outcome = filter.filter(&records).await;
        let validation = Validator::validate(&outcome, &fixture.expect);

        tracing::info!(
            fixture = %fixture.name,
            run_id = %run_id,
            input = records.len(),
            passed = validation.passed,
            "scenario finished"
        );

        ScenarioResult {
            fixture_name,
            run_id,
            output: outcome.ok(),
            passed: validation.passed,
            validation: Some(validation),
            error: None,
            duration: started.elapsed(),
        }
    }

    /// Runs every `*.yaml`/`*.yml` fixture in `dir`, in file name order.
    pub async fn run_dir(&self, dir: impl AsRef<Path>) -> Result<Vec<ScenarioResult>> {
        let mut paths: Vec<_> = std::fs::read_dir(dir.as_ref())?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| {
                p.is_file()
                    && p.extension()
                        .and_then(|ext| ext.to_str())
                        .is_some_and(|ext| ext == "yaml" || ext == "yml")
            })
            .collect();
        paths.sort();

        let mut results = Vec::with_capacity(paths.len());
        for path in paths {
            let result = match Fixture::load(&path) {
                Ok(fixture) => self.run_fixture(&fixture).await,
                Err(e) => ScenarioResult::aborted(
                    path.display().to_string(),
                    uuid::Uuid::new_v4().to_string(),
                    e.to_string(),
                    Instant::now(),
                ),
            };

            let stop = self.config.fail_fast && !result.passed;
            results.push(result);
            if stop {
                tracing::warn!(path = %path.display(), "stopping after first failure");
                break;
            }
        }

        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const PASSING: &str = r#"
name: adults
records:
  - { user: { name: Ann, age: 17 } }
  - { user: { name: Ben, age: 40 } }
filter:
  keys_to_return: [user.name]
  criteria:
    - { condition: greater_than, key: user.age, value: 17 }
expect:
  records:
    - { user: { user: { name: Ben } } }
"#;

    const FAILING: &str = r#"
name: wrong-count
records:
  - { user: { name: Ann } }
filter:
  keys_to_return: [user.name]
expect:
  count: 2
"#;

    #[tokio::test]
    async fn run_fixture_passes() {
        let fixture = Fixture::from_yaml_str(PASSING).unwrap();
        let result = ScenarioHarness::new().run_fixture(&fixture).await;

        assert!(result.passed, "{:?}", result.validation);
        assert_eq!(result.output.unwrap().len(), 1);
        assert!(!result.run_id.is_empty());
    }

    #[tokio::test]
    async fn run_fixture_reports_missing_records_file() {
        let mut fixture = Fixture::from_yaml_str(PASSING).unwrap();
        fixture.records_file = Some("/definitely/not/here.json".into());

        let result = ScenarioHarness::new().run_fixture(&fixture).await;
        assert!(!result.passed);
        assert!(result.error.unwrap().starts_with("Failed to load records"));
    }

    #[tokio::test]
    async fn run_dir_orders_and_skips_non_yaml() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("b_failing.yaml"), FAILING).unwrap();
        std::fs::write(temp.path().join("a_passing.yml"), PASSING).unwrap();
        std::fs::write(temp.path().join("notes.txt"), "ignore me").unwrap();

        let results = ScenarioHarness::new().run_dir(temp.path()).await.unwrap();
        let names: Vec<&str> = results.iter().map(|r| r.fixture_name.as_str()).collect();
        assert_eq!(names, vec!["adults", "wrong-count"]);
        assert!(results[0].passed);
        assert!(!results[1].passed);
    }

    #[tokio::test]
    async fn fail_fast_stops_early() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("a_failing.yaml"), FAILING).unwrap();
        std::fs::write(temp.path().join("b_passing.yaml"), PASSING).unwrap();

        let harness = ScenarioHarness::with_config(HarnessConfig::default().with_fail_fast(true));
        let results = harness.run_dir(temp.path()).await.unwrap();
        assert_eq!(results.len(), 1);
    }

    #[tokio::test]
    async fn unparsable_fixture_is_reported_not_fatal() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("bad.yaml"), "name: [").unwrap();

        let results = ScenarioHarness::new().run_dir(temp.path()).await.unwrap();
        assert_eq!(results.len(), 1);
        assert!(results[0].error.as_ref().unwrap().contains("failed to parse fixture"));
    }
}
