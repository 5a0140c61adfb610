//! Declarative filtering of JSON record sets.
//!
//! A [`DataFilter`] holds a projection (the dotted paths to keep) and a list of
//! predicates combined with AND. Filtering keeps the records that satisfy every
//! predicate, in input order, and reshapes each one to contain only the
//! projected fields nested under a wrapper key.
//!
//! ```
//! use harness_kit::filter::{Condition, DataFilter, FilterConfig};
//! use serde_json::json;
//!
//! # tokio_test::block_on(async {
//! let records = vec![
//!     json!({"user": {"name": "Alice", "details": {"city": "New York"}}}),
//!     json!({"user": {"name": "Bob", "details": {"city": "LA"}}}),
//! ];
//!
//! let mut filter = DataFilter::new();
//! filter.configure(
//!     FilterConfig::new(["user.name"])
//!         .with_criterion(Condition::Contains, "user.details.city", "New York"),
//! );
//!
//! let out = filter.filter(&records).await.unwrap();
//! assert_eq!(out, vec![json!({"user": {"user": {"name": "Alice"}}})]);
//! # });
//! ```

mod condition;
pub mod path;

pub use condition::{strict_eq, Condition, Numeric, Predicate, Scalar};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Wrapper key used when none is configured.
pub const DEFAULT_WRAPPER: &str = "user";

/// Errors that abort a whole filter pass.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FilterError {
    /// A `range` predicate whose operand is not a `[min, max]` pair of numbers.
    #[error("filtering error: range criterion on '{path}' needs a [min, max] pair of numbers, got {value}")]
    MalformedRange { path: String, value: Value },

    /// A condition name outside the supported set.
    #[error("filtering error: unknown condition '{0}'")]
    UnknownCondition(String),

    /// The wrapper key for projected records is empty.
    #[error("filtering error: wrapper key must not be empty")]
    EmptyWrapper,
}

/// Projection and criteria for a filter pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Dotted paths to retain in every output record.
    #[serde(default)]
    pub keys_to_return: Vec<String>,

    /// Predicates a record must all satisfy.
    #[serde(default)]
    pub criteria: Vec<Predicate>,

    /// Top-level key that projected fields are nested under.
    #[serde(default)]
    pub wrapper: Option<String>,

    /// Emit projected fields at the top level, without any wrapper key.
    #[serde(default)]
    pub unwrapped: bool,
}

impl FilterConfig {
    /// Creates a config projecting the given paths with no criteria.
    pub fn new<I, S>(keys_to_return: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keys_to_return: keys_to_return.into_iter().map(Into::into).collect(),
            criteria: Vec::new(),
            wrapper: None,
            unwrapped: false,
        }
    }

    /// Returns a copy with one more criterion appended.
    pub fn with_criterion(
        mut self,
        condition: Condition,
        path: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        self.criteria.push(Predicate::new(condition, path, value));
        self
    }

    /// Returns a copy using the given wrapper key.
    pub fn with_wrapper(mut self, wrapper: impl Into<String>) -> Self {
        self.wrapper = Some(wrapper.into());
        self.unwrapped = false;
        self
    }

    /// Returns a copy that projects fields without a wrapper key.
    pub fn unwrapped(mut self) -> Self {
        self.wrapper = None;
        self.unwrapped = true;
        self
    }
}

/// Filters record sets against a mutable configuration.
///
/// The configuration is owned by the filter and changed through `&mut self`,
/// so a filter shared between tasks can only be read. Records are borrowed
/// and never modified.
#[derive(Debug, Clone)]
pub struct DataFilter {
    keys_to_return: Vec<String>,
    criteria: Vec<Predicate>,
    wrapper: Option<String>,
}

impl Default for DataFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl DataFilter {
    /// Creates a filter with no projection, no criteria and the default wrapper.
    pub fn new() -> Self {
        Self {
            keys_to_return: Vec::new(),
            criteria: Vec::new(),
            wrapper: Some(DEFAULT_WRAPPER.to_string()),
        }
    }

    /// Creates a filter from a complete configuration.
    pub fn from_config(config: FilterConfig) -> Self {
        let mut filter = Self::new();
        filter.configure(config);
        filter
    }

    /// Replaces the projection and criteria.
    ///
    /// The wrapper is replaced only when the config names one or asks for
    /// unwrapped output.
    pub fn configure(&mut self, config: FilterConfig) -> &mut Self {
        self.keys_to_return = config.keys_to_return;
        self.criteria = config.criteria;
        if config.unwrapped {
            self.wrapper = None;
        } else if let Some(wrapper) = config.wrapper {
            self.wrapper = Some(wrapper);
        }
        self
    }

    /// Appends one predicate to the current criteria.
    pub fn add_predicate(
        &mut self,
        condition: Condition,
        path: impl Into<String>,
        value: impl Into<Value>,
    ) -> &mut Self {
        self.criteria.push(Predicate::new(condition, path, value));
        self
    }

    /// Sets the top-level key projected fields are nested under.
    pub fn set_wrapper(&mut self, wrapper: impl Into<String>) -> &mut Self {
        self.wrapper = Some(wrapper.into());
        self
    }

    /// Projects fields at the top level of each output record.
    pub fn clear_wrapper(&mut self) -> &mut Self {
        self.wrapper = None;
        self
    }

    /// Returns the configured projection.
    pub fn keys_to_return(&self) -> &[String] {
        &self.keys_to_return
    }

    /// Returns the configured criteria.
    pub fn criteria(&self) -> &[Predicate] {
        &self.criteria
    }

    /// Returns the wrapper key, if output records are wrapped.
    pub fn wrapper(&self) -> Option<&str> {
        self.wrapper.as_deref()
    }

    /// Returns true if the record satisfies every criterion.
    pub fn matches(&self, record: &Value) -> Result<bool, FilterError> {
        for predicate in &self.criteria {
            if !predicate.evaluate(record)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Keeps the matching records, in order, reduced to the projected fields.
    ///
    /// Fails as a whole if the configuration is malformed; no partial result
    /// is ever returned.
    pub async fn filter(&self, records: &[Value]) -> Result<Vec<Value>, FilterError> {
        self.filter_sync(records)
    }

    /// Synchronous body of [`DataFilter::filter`].
    pub fn filter_sync(&self, records: &[Value]) -> Result<Vec<Value>, FilterError> {
        self.check()?;

        let mut filtered = Vec::new();
        for record in records {
            if self.matches(record)? {
                filtered.push(self.project(record));
            }
        }

        tracing::debug!(
            input = records.len(),
            kept = filtered.len(),
            criteria = self.criteria.len(),
            keys = self.keys_to_return.len(),
            "filtered records"
        );

        Ok(filtered)
    }

    fn check(&self) -> Result<(), FilterError> {
        if self.wrapper.as_deref() == Some("") {
            return Err(FilterError::EmptyWrapper);
        }
        self.criteria.iter().try_for_each(Predicate::check)
    }

    fn project(&self, record: &Value) -> Value {
        let mut inner = Map::new();
        for key in &self.keys_to_return {
            let Some(value) = path::resolve(record, key) else {
                continue;
            };
            if !path::insert_at(&mut inner, key, value.clone()) {
                tracing::debug!(key = %key, "projected path blocked by an earlier value");
            }
        }

        let Some(wrapper) = &self.wrapper else {
            return Value::Object(inner);
        };
        let mut outer = Map::new();
        outer.insert(wrapper.clone(), Value::Object(inner));
        Value::Object(outer)
    }
}
