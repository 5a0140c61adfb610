//! Data tables handed over by scenario steps.
//!
//! A table is a header row followed by data rows. Converted records are
//! plain JSON objects keyed by header, ready for a [`crate::filter::DataFilter`].

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// Rows of string cells; the first row holds the headers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DataTable {
    rows: Vec<Vec<String>>,
}

impl DataTable {
    /// Creates a table from rows of cells.
    pub fn new<R, C, S>(rows: R) -> Self
    where
        R: IntoIterator<Item = C>,
        C: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            rows: rows
                .into_iter()
                .map(|row| row.into_iter().map(Into::into).collect())
                .collect(),
        }
    }

    /// Parses a Gherkin pipe table.
    ///
    /// ```text
    /// | name  | city     |
    /// | Alice | New York |
    /// ```
    ///
    /// Blank lines and `#` comments are skipped; `\|` escapes a pipe.
    pub fn parse(text: &str) -> Result<Self> {
        let mut rows = Vec::new();
        for (number, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let inner = line
                .strip_prefix('|')
                .and_then(|l| l.strip_suffix('|'))
                .ok_or_else(|| {
                    Error::Table(format!("line {} is not a |-delimited row", number + 1))
                })?;
            rows.push(split_cells(inner));
        }
        Ok(Self { rows })
    }

    /// Returns the header row.
    pub fn headers(&self) -> Option<&[String]> {
        self.rows.first().map(Vec::as_slice)
    }

    /// Returns all rows, headers included.
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Keeps rows `first_row..=last_row` (1-based); the first kept row becomes the header.
    pub fn slice(&self, first_row: usize, last_row: Option<usize>) -> Result<Self> {
        if first_row == 0 {
            return Err(Error::Table("rows are numbered from 1".into()));
        }
        let end = last_row.unwrap_or(self.rows.len()).min(self.rows.len());
        if first_row > end {
            return Ok(Self::default());
        }
        Ok(Self {
            rows: self.rows[first_row - 1..end].to_vec(),
        })
    }

    /// Converts data rows into JSON objects keyed by header.
    ///
    /// Missing cells become empty strings; cells beyond the header are dropped.
    pub fn to_records(&self) -> Result<Vec<Value>> {
        let (headers, data) = self
            .rows
            .split_first()
            .ok_or_else(|| Error::Table("table has no header row".into()))?;

        Ok(data
            .iter()
            .map(|row| {
                let mut record = Map::new();
                for (i, header) in headers.iter().enumerate() {
                    let cell = row.get(i).cloned().unwrap_or_default();
                    record.insert(header.clone(), Value::String(cell));
                }
                Value::Object(record)
            })
            .collect())
    }
}

fn split_cells(inner: &str) -> Vec<String> {
    let mut cells = Vec::new();
    let mut current = String::new();
    let mut chars = inner.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '\\' if chars.peek() == Some(&'|') => {
                current.push('|');
                chars.next();
            }
            '|' => cells.push(std::mem::take(&mut current).trim().to_string()),
            _ => current.push(ch),
        }
    }
    cells.push(current.trim().to_string());
    cells
}
