//! Filter conditions and single-field predicates.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{path, FilterError};

/// The fixed set of conditions a predicate can test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    /// Field is a string containing the value as a substring.
    Contains,
    /// Field equals the value.
    Exactly,
    /// Field does not equal the value (absent fields count as not equal).
    Exclude,
    /// Field is present. The value is ignored.
    Include,
    /// Field is greater than the value.
    GreaterThan,
    /// Field is less than the value.
    LessThan,
    /// Field lies within an inclusive `[min, max]` pair.
    Range,
}

impl Condition {
    /// All conditions, in declaration order.
    pub const ALL: [Condition; 7] = [
        Condition::Contains,
        Condition::Exactly,
        Condition::Exclude,
        Condition::Include,
        Condition::GreaterThan,
        Condition::LessThan,
        Condition::Range,
    ];

    /// Returns the wire name of the condition.
    pub fn as_str(&self) -> &'static str {
        match self {
            Condition::Contains => "contains",
            Condition::Exactly => "exactly",
            Condition::Exclude => "exclude",
            Condition::Include => "include",
            Condition::GreaterThan => "greater_than",
            Condition::LessThan => "less_than",
            Condition::Range => "range",
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Condition {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace([' ', '-'], "_");
        Condition::ALL
            .into_iter()
            .find(|c| c.as_str() == wanted)
            .ok_or_else(|| FilterError::UnknownCondition(s.to_string()))
    }
}

/// A JSON number that keeps integers exact.
///
/// Integers compare exactly against integers; any pairing with a float falls
/// back to `f64`.
#[derive(Debug, Clone, Copy)]
pub enum Numeric {
    Int(i128),
    Float(f64),
}

impl Numeric {
    /// Returns the numeric view of a value, or `None` for non-numbers.
    pub fn of(value: &Value) -> Option<Self> {
        let Value::Number(n) = value else {
            return None;
        };
        if let Some(i) = n.as_i64() {
            Some(Numeric::Int(i.into()))
        } else if let Some(u) = n.as_u64() {
            Some(Numeric::Int(u.into()))
        } else {
            n.as_f64().map(Numeric::Float)
        }
    }

    fn as_f64(self) -> f64 {
        match self {
            Numeric::Int(i) => i as f64,
            Numeric::Float(f) => f,
        }
    }

    /// Orders two numbers. `None` only when a NaN is involved.
    pub fn compare(&self, other: &Numeric) -> Option<Ordering> {
        match (self, other) {
            (Numeric::Int(a), Numeric::Int(b)) => Some(a.cmp(b)),
            _ => self.as_f64().partial_cmp(&other.as_f64()),
        }
    }
}

impl PartialEq for Numeric {
    fn eq(&self, other: &Self) -> bool {
        self.compare(other) == Some(Ordering::Equal)
    }
}

/// Typed view over a JSON leaf so comparisons are only defined within a type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scalar<'a> {
    Null,
    Bool(bool),
    Number(Numeric),
    Str(&'a str),
}

impl<'a> Scalar<'a> {
    /// Returns the scalar view of a value, or `None` for arrays and objects.
    pub fn of(value: &'a Value) -> Option<Self> {
        match value {
            Value::Null => Some(Scalar::Null),
            Value::Bool(b) => Some(Scalar::Bool(*b)),
            Value::Number(_) => Numeric::of(value).map(Scalar::Number),
            Value::String(s) => Some(Scalar::Str(s)),
            Value::Array(_) | Value::Object(_) => None,
        }
    }

    /// Orders two scalars of the same kind. Mixed kinds are unordered.
    pub fn compare(&self, other: &Scalar<'_>) -> Option<Ordering> {
        match (self, other) {
            (Scalar::Number(a), Scalar::Number(b)) => a.compare(b),
            (Scalar::Str(a), Scalar::Str(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

/// Strict equality: same JSON kind and value, numbers compared numerically.
pub fn strict_eq(left: &Value, right: &Value) -> bool {
    match (Scalar::of(left), Scalar::of(right)) {
        (Some(a), Some(b)) => a == b,
        _ => left == right,
    }
}

fn ordering_of(field: Option<&Value>, value: &Value) -> Option<Ordering> {
    let field = Scalar::of(field?)?;
    let value = Scalar::of(value)?;
    field.compare(&value)
}

/// A single `(condition, path, value)` test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Predicate {
    /// Condition to apply.
    pub condition: Condition,
    /// Dotted path of the field under test.
    #[serde(alias = "key")]
    pub path: String,
    /// Operand. Ignored by `include`; a `[min, max]` pair for `range`.
    #[serde(default)]
    pub value: Value,
}

impl Predicate {
    /// Creates a predicate.
    pub fn new(condition: Condition, path: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            condition,
            path: path.into(),
            value: value.into(),
        }
    }

    /// Checks that the operand has the shape the condition needs.
    ///
    /// Only `range` has a structural requirement; every other operand is
    /// accepted and simply fails to match when the types disagree.
    pub fn check(&self) -> Result<(), FilterError> {
        if self.condition == Condition::Range {
            self.range_bounds()?;
        }
        Ok(())
    }

    fn range_bounds(&self) -> Result<(Numeric, Numeric), FilterError> {
        let malformed = || FilterError::MalformedRange {
            path: self.path.clone(),
            value: self.value.clone(),
        };
        match self.value.as_array().map(Vec::as_slice) {
            Some([min, max]) => match (Numeric::of(min), Numeric::of(max)) {
                (Some(min), Some(max)) => Ok((min, max)),
                _ => Err(malformed()),
            },
            _ => Err(malformed()),
        }
    }

    /// Evaluates the predicate against a record.
    ///
    /// Unresolved paths and type mismatches evaluate to `false`.
    pub fn evaluate(&self, record: &Value) -> Result<bool, FilterError> {
        let field = path::resolve(record, &self.path);

        let matched = match self.condition {
            Condition::Contains => match (field, &self.value) {
                (Some(Value::String(haystack)), Value::String(needle)) => {
                    haystack.contains(needle.as_str())
                }
                _ => false,
            },
            Condition::Exactly => field.is_some_and(|f| strict_eq(f, &self.value)),
            Condition::Exclude => !field.is_some_and(|f| strict_eq(f, &self.value)),
            Condition::Include => field.is_some(),
            Condition::GreaterThan => ordering_of(field, &self.value) == Some(Ordering::Greater),
            Condition::LessThan => ordering_of(field, &self.value) == Some(Ordering::Less),
            Condition::Range => {
                let (min, max) = self.range_bounds()?;
                match field.and_then(Numeric::of) {
                    Some(n) => {
                        min.compare(&n).is_some_and(Ordering::is_le)
                            && n.compare(&max).is_some_and(Ordering::is_le)
                    }
                    None => false,
                }
            }
        };

        Ok(matched)
    }
}
