//! Result validation engine.

use serde_json::Value;

use crate::filter::FilterError;
use crate::text::collect_leaf_text;

use super::fixture::Expectation;

/// Result of validation.
#[derive(Debug, Clone)]
pub struct ValidationReport {
    /// Whether validation passed.
    pub passed: bool,
    /// Validation messages.
    pub messages: Vec<String>,
}

/// Validates filter output against fixture expectations.
pub struct Validator;

impl Validator {
    /// Checks a filter outcome against the expectation.
    pub fn validate(
        outcome: &std::result::Result<Vec<Value>, FilterError>,
        expect: &Expectation,
    ) -> ValidationReport {
        let mut messages = Vec::new();

        let output = match (outcome, &expect.error) {
            (Err(e), Some(wanted)) => {
                let actual = e.to_string();
                let passed = actual.contains(wanted.as_str());
                messages.push(if passed {
                    format!("Failed as expected: {}", actual)
                } else {
                    format!("Wrong error: expected '{}', got '{}'", wanted, actual)
                });
                return ValidationReport { passed, messages };
            }
            (Err(e), None) => {
                messages.push(format!("Filter failed: {}", e));
                return ValidationReport {
                    passed: false,
                    messages,
                };
            }
            (Ok(output), Some(wanted)) => {
                messages.push(format!(
                    "Expected failure containing '{}', but {} records were returned",
                    wanted,
                    output.len()
                ));
                return ValidationReport {
                    passed: false,
                    messages,
                };
            }
            (Ok(output), None) => output,
        };

        let mut passed = true;

        if let Some(count) = expect.count {
            if output.len() == count {
                messages.push(format!("Record count matched: {}", count));
            } else {
                messages.push(format!(
                    "Record count mismatch: expected {}, got {}",
                    count,
                    output.len()
                ));
                passed = false;
            }
        }

        if let Some(records) = &expect.records {
            if records == output {
                messages.push(format!("Records matched ({} records)", records.len()));
            } else {
                messages.push(format!(
                    "Records mismatch: expected {}, got {}",
                    Value::Array(records.clone()),
                    Value::Array(output.clone())
                ));
                passed = false;
            }
        }

        if !expect.contains_texts.is_empty() {
            let leaves: Vec<String> = output
                .iter()
                .flat_map(collect_leaf_text)
                .map(|(_, text)| text)
                .collect();
            for text in &expect.contains_texts {
                if leaves.iter().any(|leaf| leaf.contains(text.as_str())) {
                    messages.push(format!("Found text: {}", text));
                } else {
                    messages.push(format!("Missing text: {}", text));
                    passed = false;
                }
            }
        }

        ValidationReport { passed, messages }
    }
}
