//! Environment configuration and validation.
//!
//! Environments are described in a TOML file:
//!
//! ```toml
//! verbose = false
//!
//! [environments.int]
//! frontend.url = "https://automationexercise.com"
//! backend.api.url = "https://reqres.in/api"
//! backend.gql.url = "https://graphqlzero.almansi.me/api"
//! backend.api.headers = { x-api-key = "reqres-free-v1" }
//! ```
//!
//! Environment variables:
//! - `E2E` - name of the active environment (default: `int`)
//! - `HARNESS_VERBOSE=1` - log request and response detail

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::filter::{Condition, FilterConfig};
use crate::request::{Headers, RequestSettings};

/// Variable selecting the active environment.
pub const ENV_VAR: &str = "E2E";

/// Variable enabling verbose request logging.
pub const VERBOSE_VAR: &str = "HARNESS_VERBOSE";

/// Environment used when `E2E` is unset.
pub const DEFAULT_ENV: &str = "int";

/// A URL plus headers specific to it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub headers: Headers,
}

/// Frontend settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frontend {
    #[serde(default)]
    pub url: String,
}

/// Backend endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Backend {
    #[serde(default)]
    pub api: Endpoint,
    #[serde(default)]
    pub gql: Endpoint,
}

/// One named environment (int, staging, production, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Environment {
    #[serde(default)]
    pub frontend: Frontend,
    #[serde(default)]
    pub backend: Backend,
}

/// All configured environments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvConfig {
    /// Enable request/response debug logging.
    #[serde(default)]
    pub verbose: bool,

    /// Environments by name.
    #[serde(default)]
    pub environments: BTreeMap<String, Environment>,
}

impl Default for EnvConfig {
    fn default() -> Self {
        let int = Environment {
            frontend: Frontend {
                url: "https://automationexercise.com".to_string(),
            },
            backend: Backend {
                api: Endpoint {
                    url: "https://reqres.in/api".to_string(),
                    headers: Headers::new(),
                },
                gql: Endpoint {
                    url: "https://graphqlzero.almansi.me/api".to_string(),
                    headers: Headers::new(),
                },
            },
        };
        Self {
            verbose: false,
            environments: [(DEFAULT_ENV.to_string(), int)].into(),
        }
    }
}

/// Settings for one environment, with default headers merged in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedEnv {
    pub name: String,
    pub frontend_url: String,
    pub api_url: String,
    pub gql_url: String,
    pub api_headers: Headers,
    pub gql_headers: Headers,
    pub verbose: bool,
}

/// Headers every JSON request carries unless overridden.
pub fn default_json_headers() -> Headers {
    [
        ("Content-Type".to_string(), "application/json".to_string()),
        ("Accept".to_string(), "application/json".to_string()),
    ]
    .into()
}

fn env_flag(name: &str) -> bool {
    std::env::var(name)
        .map(|v| v == "1" || v.to_lowercase() == "true")
        .unwrap_or(false)
}

impl EnvConfig {
    /// Loads a configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Parses a configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| Error::Config(format!("failed to parse environment config: {}", e)))
    }

    /// Name of the environment selected by `E2E`, or `int`.
    pub fn active_name() -> String {
        std::env::var(ENV_VAR)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_ENV.to_string())
    }

    /// Resolves a named environment.
    pub fn resolve(&self, name: &str) -> Result<ResolvedEnv> {
        let env = self.environments.get(name).ok_or_else(|| {
            let known: Vec<&str> = self.environments.keys().map(String::as_str).collect();
            Error::Config(format!(
                "unknown environment '{}' (configured: {})",
                name,
                known.join(", ")
            ))
        })?;

        let defaults = default_json_headers();
        Ok(ResolvedEnv {
            name: name.to_string(),
            frontend_url: env.frontend.url.clone(),
            api_url: env.backend.api.url.clone(),
            gql_url: env.backend.gql.url.clone(),
            api_headers: crate::request::merge_headers(&defaults, &env.backend.api.headers),
            gql_headers: crate::request::merge_headers(&defaults, &env.backend.gql.headers),
            verbose: self.verbose || env_flag(VERBOSE_VAR),
        })
    }

    /// Resolves the environment selected by `E2E`.
    pub fn resolve_active(&self) -> Result<ResolvedEnv> {
        let name = Self::active_name();
        tracing::info!(env = %name, "resolving active environment");
        self.resolve(&name)
    }
}

/// Validation result containing all found issues.
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    /// List of validation errors (fatal).
    pub errors: Vec<String>,
    /// List of validation warnings (non-fatal).
    pub warnings: Vec<String>,
}

impl ValidationResult {
    /// Returns true if validation passed (no errors).
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Adds an error to the result.
    pub fn add_error(&mut self, msg: impl Into<String>) {
        self.errors.push(msg.into());
    }

    /// Adds a warning to the result.
    pub fn add_warning(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }

    /// Merges another validation result into this one.
    pub fn merge(&mut self, other: ValidationResult) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }

    /// Converts to a Result, failing if there are errors.
    pub fn into_result(self) -> Result<Vec<String>> {
        if self.is_valid() {
            Ok(self.warnings)
        } else {
            Err(Error::Config(self.errors.join("; ")))
        }
    }
}

/// Trait for validatable configuration types.
pub trait Validate {
    /// Validates the configuration and returns any issues found.
    fn validate(&self) -> ValidationResult;
}

fn check_url(result: &mut ValidationResult, what: &str, url: &str) {
    if url.trim().is_empty() {
        result.add_error(format!("{} URL is not defined", what));
    } else if !(url.starts_with("http://") || url.starts_with("https://")) {
        result.add_error(format!("{} URL '{}' must start with http:// or https://", what, url));
    }
}

impl Validate for Environment {
    fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        check_url(&mut result, "API", &self.backend.api.url);
        check_url(&mut result, "GraphQL", &self.backend.gql.url);

        if self.frontend.url.trim().is_empty() {
            result.add_warning("frontend URL is not defined; UI scenarios cannot navigate");
        }

        result
    }
}

impl Validate for EnvConfig {
    fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        if self.environments.is_empty() {
            result.add_error("no environments configured");
        }

        for (name, env) in &self.environments {
            let mut env_result = env.validate();
            env_result.errors.iter_mut().for_each(|e| *e = format!("[{}] {}", name, e));
            env_result.warnings.iter_mut().for_each(|w| *w = format!("[{}] {}", name, w));
            result.merge(env_result);
        }

        result
    }
}

impl Validate for RequestSettings {
    fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        if self.timeout.is_zero() {
            result.add_error("timeout must be greater than zero");
        }

        if self.max_retries > 10 {
            result.add_warning("max_retries > 10 may hide a failing endpoint");
        }

        if self.timeout > Duration::from_secs(300) {
            result.add_warning("timeout over 5 minutes may indicate a misconfiguration");
        }

        result
    }
}

impl Validate for FilterConfig {
    fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        if self.keys_to_return.is_empty() {
            result.add_warning("keys_to_return is empty; filtered records will carry no fields");
        }

        for key in &self.keys_to_return {
            if key.is_empty() || key.split('.').any(str::is_empty) {
                result.add_warning(format!("key '{}' can never resolve", key));
            }
        }

        for predicate in &self.criteria {
            if let Err(e) = predicate.check() {
                result.add_error(e.to_string());
            }
            if predicate.condition == Condition::Include && !predicate.value.is_null() {
                result.add_warning(format!(
                    "include criterion on '{}' ignores its value",
                    predicate.path
                ));
            }
        }

        if matches!(self.wrapper.as_deref(), Some("")) {
            result.add_error("wrapper must not be empty");
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const SAMPLE: &str = r#"
verbose = true

[environments.int]
frontend.url = "https://automationexercise.com"
backend.api.url = "https://reqres.in/api"
backend.gql.url = "https://graphqlzero.almansi.me/api"
backend.api.headers = { x-api-key = "reqres-free-v1", Accept = "application/vnd.api+json" }

[environments.staging]
backend.api.url = "reqres.in/api"
"#;

    // ========================================
    // Loading and resolution
    // ========================================

    #[test]
    fn parses_environments_from_toml() {
        let config = EnvConfig::from_toml_str(SAMPLE).unwrap();
        assert!(config.verbose);
        assert_eq!(config.environments.len(), 2);
        assert_eq!(config.environments["int"].backend.gql.url, "https://graphqlzero.almansi.me/api");
    }

    #[test]
    fn resolve_merges_default_headers() {
        let config = EnvConfig::from_toml_str(SAMPLE).unwrap();
        let env = config.resolve("int").unwrap();

        assert_eq!(env.api_headers["Content-Type"], "application/json");
        assert_eq!(env.api_headers["Accept"], "application/vnd.api+json");
        assert_eq!(env.api_headers["x-api-key"], "reqres-free-v1");
        assert_eq!(env.gql_headers, default_json_headers());
        assert!(env.verbose);
    }

    #[test]
    fn resolve_unknown_env_lists_known() {
        let config = EnvConfig::from_toml_str(SAMPLE).unwrap();
        let err = config.resolve("prod").unwrap_err();
        assert!(err.to_string().contains("int, staging"));
    }

    #[test]
    fn load_reads_file() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("env.toml");
        std::fs::write(&path, SAMPLE).unwrap();

        let config = EnvConfig::load(&path).unwrap();
        assert_eq!(config.resolve("int").unwrap().api_url, "https://reqres.in/api");
    }

    #[test]
    fn invalid_toml_is_config_error() {
        assert!(matches!(
            EnvConfig::from_toml_str("environments = 3"),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn default_config_has_int() {
        let config = EnvConfig::default();
        assert!(config.validate().is_valid());
        assert_eq!(config.resolve(DEFAULT_ENV).unwrap().frontend_url, "https://automationexercise.com");
    }

    // ========================================
    // Validation
    // ========================================

    #[test]
    fn staging_without_scheme_fails() {
        let config = EnvConfig::from_toml_str(SAMPLE).unwrap();
        let result = config.validate();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.starts_with("[staging] API URL")));
        assert!(result.errors.iter().any(|e| e.contains("GraphQL URL is not defined")));
        assert!(result.warnings.iter().any(|w| w.contains("frontend")));
    }

    #[test]
    fn empty_config_fails() {
        let config = EnvConfig::from_toml_str("").unwrap();
        assert!(config.validate().into_result().is_err());
    }

    #[test]
    fn request_settings_validation() {
        assert!(RequestSettings::default().validate().is_valid());

        let zero = RequestSettings {
            timeout: Duration::ZERO,
            max_retries: 20,
            ..Default::default()
        };
        let result = zero.validate();
        assert!(!result.is_valid());
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn filter_config_validation() {
        let config = FilterConfig::new(["user.name", "user..age"])
            .with_criterion(Condition::Range, "user.age", json!([1]))
            .with_criterion(Condition::Include, "user.name", "x");
        let result = config.validate();

        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].contains("range"));
        assert_eq!(result.warnings.len(), 2);
    }

    #[test]
    fn empty_projection_warns() {
        let result = FilterConfig::default().validate();
        assert!(result.is_valid());
        assert_eq!(result.warnings.len(), 1);
    }
}
