//! Error types for the harness kit.

use thiserror::Error;

use crate::filter::FilterError;

/// Top-level error type for harness operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Filtering a record set failed.
    #[error(transparent)]
    Filter(#[from] FilterError),

    /// IO error while reading fixtures, configs or records.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A JSON document could not be parsed or serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Environment or fixture configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// An API or GraphQL request failed.
    #[error("request failed: {0}")]
    Request(String),

    /// A data table could not be converted into records.
    #[error("invalid data table: {0}")]
    Table(String),

    /// A helper received input it cannot work with.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Expected text never became visible on the page.
    #[error("text \"{text}\" not found within {timeout_secs} seconds")]
    TextNotFound { text: String, timeout_secs: u64 },

    /// A value fell outside its expected bounds.
    #[error("value ({value}) is not between {min} and {max}")]
    OutOfRange { value: f64, min: f64, max: f64 },
}

/// Result type alias for harness operations.
pub type Result<T> = std::result::Result<T, Error>;
