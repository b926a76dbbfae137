//! Reconciliation settings.
//!
//! Defaults reproduce the behaviour expected by the bookkeeping workflow;
//! a TOML file and command-line flags may override individual values.

use crate::error::Result;
use regex::Regex;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Default shape of a file reference in the ledger `Split` column (`2024-17`).
pub const DEFAULT_FILE_REFERENCE_PATTERN: &str = r"^\d{4}-\d+$";

/// Default width cap for the `Split` and `Description` report columns.
pub const DEFAULT_MAX_TEXT_WIDTH: usize = 60;

/// Settings as written in a configuration file. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OptionsFile {
    pub file_reference_pattern: Option<String>,
    pub max_text_width: Option<usize>,
}

impl OptionsFile {
    /// Read a TOML configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

/// Resolved reconciliation settings.
#[derive(Debug, Clone)]
pub struct ReconcileOptions {
    /// Matches `Split` values that look like a file reference. Rows that do not
    /// match are removed first when the ledger has too many entries at an amount.
    pub file_reference: Regex,

    /// Width cap for free-text report columns.
    pub max_text_width: usize,
}

impl ReconcileOptions {
    /// Settings with the default file-reference pattern and width cap.
    pub fn new() -> Result<Self> {
        Ok(Self {
            file_reference: Regex::new(DEFAULT_FILE_REFERENCE_PATTERN)?,
            max_text_width: DEFAULT_MAX_TEXT_WIDTH,
        })
    }

    /// Replace the file-reference pattern.
    pub fn with_file_reference_pattern(mut self, pattern: &str) -> Result<Self> {
        self.file_reference = Regex::new(pattern)?;
        Ok(self)
    }

    pub fn with_max_text_width(mut self, width: usize) -> Self {
        self.max_text_width = width;
        self
    }

    /// Apply the values present in a configuration file.
    pub fn merge(self, file: &OptionsFile) -> Result<Self> {
        let mut options = match file.file_reference_pattern {
            Some(ref pattern) => self.with_file_reference_pattern(pattern)?,
            None => self,
        };
        if let Some(width) = file.max_text_width {
            options.max_text_width = width;
        }
        Ok(options)
    }

    /// Whether a `Split` value looks like a file reference.
    pub fn is_file_reference(&self, split: Option<&str>) -> bool {
        split.is_some_and(|s| self.file_reference.is_match(s))
    }
}
