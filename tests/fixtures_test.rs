//! Scenario fixture integration tests.
//!
//! Each YAML file under `tests/fixtures/` describes input records, a filter
//! configuration and the expected output.
//!
//! Run with: `cargo test --test fixtures_test`

use std::path::PathBuf;

use harness_kit::e2e::{Fixture, HarnessConfig, ScenarioHarness, ScenarioResult};

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

fn print_result(result: &ScenarioResult) {
    println!("\n=== Scenario Result ===");
    println!("Fixture: {}", result.fixture_name);
    println!("Run: {}", result.run_id);
    println!("Passed: {}", result.passed);

    if let Some(validation) = &result.validation {
        println!("Validation:");
        for msg in &validation.messages {
            println!("  - {}", msg);
        }
    }

    if let Some(error) = &result.error {
        println!("Error: {}", error);
    }
}

async fn run(name: &str) -> ScenarioResult {
    let fixture = Fixture::load(fixtures_dir().join(name)).expect("failed to load fixture");
    let result = ScenarioHarness::new().run_fixture(&fixture).await;
    print_result(&result);
    result
}

#[tokio::test]
async fn new_york() {
    let result = run("new-york.yaml").await;
    assert!(result.passed, "scenario failed: {:?}", result.validation);
}

#[tokio::test]
async fn age_range() {
    let result = run("age-range.yaml").await;
    assert!(result.passed, "scenario failed: {:?}", result.validation);
}

#[tokio::test]
async fn combined_criteria() {
    let result = run("combined-criteria.yaml").await;
    assert!(result.passed, "scenario failed: {:?}", result.validation);
}

#[tokio::test]
async fn missing_path() {
    let result = run("missing-path.yaml").await;
    assert!(result.passed, "scenario failed: {:?}", result.validation);
}

#[tokio::test]
async fn malformed_range_fails_as_expected() {
    let result = run("malformed-range.yaml").await;
    assert!(result.passed, "scenario failed: {:?}", result.validation);
    assert!(result.output.is_none());
}

#[tokio::test]
async fn table_records() {
    let result = run("table-records.yaml").await;
    assert!(result.passed, "scenario failed: {:?}", result.validation);
}

#[tokio::test]
async fn whole_directory_passes() {
    let harness = ScenarioHarness::with_config(HarnessConfig::default().with_fail_fast(true));
    let results = harness
        .run_dir(fixtures_dir())
        .await
        .expect("failed to read fixtures dir");

    for result in &results {
        print_result(result);
    }

    assert_eq!(results.len(), 6);
    assert!(results.iter().all(|r| r.passed));
    assert_eq!(results[0].fixture_name, "age-range");
}
