//! Test fixture loading and parsing.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::filter::FilterConfig;
use crate::table::DataTable;

/// What a fixture expects from its filter pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Expectation {
    /// Exact output records, in order.
    #[serde(default)]
    pub records: Option<Vec<Value>>,

    /// Number of output records.
    #[serde(default)]
    pub count: Option<usize>,

    /// Texts that must appear among the output's leaf values.
    #[serde(default)]
    pub contains_texts: Vec<String>,

    /// Substring of the error the pass is expected to fail with.
    #[serde(default)]
    pub error: Option<String>,
}

/// A filter scenario: input records, a filter configuration, and expectations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fixture {
    /// Fixture name.
    pub name: String,

    /// Description of what this fixture tests.
    #[serde(default)]
    pub description: String,

    /// Inline input records.
    #[serde(default)]
    pub records: Vec<Value>,

    /// JSON file holding an array of records, relative to the fixture file.
    #[serde(default)]
    pub records_file: Option<PathBuf>,

    /// Records given as a data table (first row is the header).
    #[serde(default)]
    pub table: Option<DataTable>,

    /// Filter to apply.
    #[serde(default)]
    pub filter: FilterConfig,

    /// Expected outcome.
    #[serde(default)]
    pub expect: Expectation,

    /// Directory of the fixture file, for resolving `records_file`.
    #[serde(skip)]
    pub base_dir: Option<PathBuf>,
}

impl Fixture {
    /// Loads a fixture from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;

        let mut fixture: Self = serde_yaml::from_str(&content).map_err(|e| {
            Error::Config(format!("failed to parse fixture {}: {}", path.display(), e))
        })?;
        fixture.base_dir = path.parent().map(Path::to_path_buf);
        Ok(fixture)
    }

    /// Parses a fixture from YAML text.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        serde_yaml::from_str(content)
            .map_err(|e| Error::Config(format!("failed to parse fixture: {}", e)))
    }

    /// Gathers input records: inline first, then the records file, then the table.
    pub fn input_records(&self) -> Result<Vec<Value>> {
        let mut records = self.records.clone();

        if let Some(file) = &self.records_file {
            let path = match &self.base_dir {
                Some(dir) if file.is_relative() => dir.join(file),
                _ => file.clone(),
            };
            let content = std::fs::read_to_string(&path)?;
            match serde_json::from_str::<Value>(&content)? {
                Value::Array(items) => records.extend(items),
                _ => {
                    return Err(Error::Config(format!(
                        "{} must hold a JSON array of records",
                        path.display()
                    )))
                }
            }
        }

        if let Some(table) = &self.table {
            records.extend(table.to_records()?);
        }

        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::Condition;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn fixture_parses_minimal_yaml() {
        let yaml = r#"
name: minimal
"#;
        let fixture = Fixture::from_yaml_str(yaml).unwrap();
        assert_eq!(fixture.name, "minimal");
        assert!(fixture.records.is_empty());
        assert_eq!(fixture.filter, FilterConfig::default());
        assert_eq!(fixture.expect, Expectation::default());
    }

    #[test]
    fn fixture_parses_full_yaml() {
        let yaml = r#"
name: new-york
description: "Only New York residents"
records:
  - user: { name: Alice, details: { city: New York } }
  - user: { name: Bob, details: { city: LA } }
table:
  - [name, city]
  - [Dora, New York]
filter:
  keys_to_return: [user.name]
  criteria:
    - { condition: contains, key: user.details.city, value: New York }
expect:
  count: 1
  contains_texts: [Alice]
"#;
        let fixture = Fixture::from_yaml_str(yaml).unwrap();
        assert_eq!(fixture.filter.criteria[0].condition, Condition::Contains);
        assert_eq!(fixture.expect.count, Some(1));

        let records = fixture.input_records().unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[2], json!({"name": "Dora", "city": "New York"}));
    }

    #[test]
    fn records_file_resolves_relative_to_fixture() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("people.json"), r#"[{"user": {"name": "Eve"}}]"#).unwrap();
        std::fs::write(
            temp.path().join("eve.yaml"),
            "name: eve\nrecords_file: people.json\n",
        )
        .unwrap();

        let fixture = Fixture::load(temp.path().join("eve.yaml")).unwrap();
        let records = fixture.input_records().unwrap();
        assert_eq!(records, vec![json!({"user": {"name": "Eve"}})]);
    }

    #[test]
    fn records_file_must_be_array() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("one.json"), r#"{"user": {}}"#).unwrap();

        let mut fixture = Fixture::from_yaml_str("name: one\nrecords_file: one.json").unwrap();
        fixture.base_dir = Some(temp.path().to_path_buf());
        assert!(matches!(fixture.input_records(), Err(Error::Config(_))));
    }

    #[test]
    fn load_reports_path_on_bad_yaml() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("broken.yaml");
        std::fs::write(&path, "name: [unclosed").unwrap();

        let err = Fixture::load(&path).unwrap_err();
        assert!(err.to_string().contains("broken.yaml"));
    }
}
