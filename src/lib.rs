//! E2E Harness Kit - data plumbing for end-to-end test harnesses
//!
//! This library provides declarative filtering of JSON record sets, request
//! clients over a pluggable transport, environment configuration, and
//! fixture-driven scenario runs for browser and API test suites.

pub mod backoff;
pub mod config;
pub mod e2e;
pub mod error;
pub mod filter;
pub mod format;
pub mod request;
pub mod table;
pub mod text;

pub use error::{Error, Result};

pub use config::{EnvConfig, Environment, ResolvedEnv, Validate, ValidationResult};
pub use e2e::{Expectation, Fixture, HarnessConfig, ScenarioHarness, ScenarioResult};
pub use filter::{Condition, DataFilter, FilterConfig, FilterError, Predicate};
pub use request::{
    ApiClient, GraphqlClient, Headers, HttpMethod, HttpRequest, HttpResponse, RequestSettings,
    SettingsOverride, Transport,
};
pub use table::DataTable;
pub use text::{collect_leaf_text, verify_assertive_text, PageProbe};
