//! Fixture-driven scenario testing.
//!
//! A fixture is a YAML file with input records, a filter configuration and
//! the expected output. The harness runs the filter and validates the result.

pub mod fixture;
pub mod harness;
pub mod validator;

pub use fixture::{Expectation, Fixture};
pub use harness::{HarnessConfig, ScenarioHarness, ScenarioResult};
pub use validator::{ValidationReport, Validator};
