//! Error types for the credit_recon library.
//!
//! Only failures the caller must act on surface here. Row-level problems
//! (bad amounts, bad dates, count shortfalls) are absorbed by the
//! normalizer and reconciler and never become an `Error`.

use std::io;
use thiserror::Error;

/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while loading inputs or writing the report.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error occurred during read or write operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Error reading or writing CSV.
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    /// Error writing the XML workbook.
    #[error("XML error: {0}")]
    XmlError(String),

    /// A required column is absent from an input table.
    #[error("Missing required column '{column}' in {table} input")]
    MissingColumn { table: &'static str, column: String },

    /// The file-reference pattern does not compile.
    #[error("Invalid file-reference pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    /// Configuration file could not be parsed.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid output format specified.
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::XmlError(err.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}
