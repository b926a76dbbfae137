//! Credit Reconciliation Library
//!
//! Reconciles a bank credit feed against an accounting ledger export. Entries
//! are matched on their amount rounded to cents: surplus ledger entries are
//! set aside as extras, bank credits missing from the ledger are added as
//! `Bank-Add` rows, and the result is laid out side by side for review.
//!
//! # Pipeline
//!
//! - [`normalize`]: raw rows to typed, filtered, sorted entries
//! - [`bucket`]: counts per rounded amount
//! - [`reconcile`]: extras selection and synthesis of missing entries
//! - [`report`]: ordering, totals and review highlights
//! - [`sheet`]: grid layout for the writers in [`csv_format`] and [`spreadsheet_xml`]
//!
//! # Examples
//!
//! ```no_run
//! use std::fs::File;
//! use credit_recon::csv_format::{BankTable, CsvReport, LedgerTable};
//! use credit_recon::{reconcile_records, ReconcileOptions, Sheet};
//!
//! let bank = BankTable::from_read(&mut File::open("bank.csv")?)?;
//! let ledger = LedgerTable::from_read(&mut File::open("ledger.csv")?)?;
//!
//! let options = ReconcileOptions::new()?;
//! let report = reconcile_records(&bank.records, &ledger.records, &options);
//! println!("{} extras, {} added", report.extras.len(), report.added_count());
//!
//! let sheet = Sheet::layout(&report, options.max_text_width);
//! CsvReport { sheet: &sheet }.write_to(&mut File::create("reconciliation.csv")?)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod bucket;
pub mod csv_format;
pub mod error;
pub mod normalize;
pub mod options;
pub mod reconcile;
pub mod report;
pub mod sheet;
pub mod spreadsheet_xml;
pub mod types;

use std::path::Path;
use std::str::FromStr;
use tracing::info;

// Re-export commonly used types
pub use error::{Error, Result};
pub use options::ReconcileOptions;
pub use reconcile::{BucketOutcome, Reconciler};
pub use report::{Highlight, Report};
pub use sheet::Sheet;
pub use types::{Amount, BankEntry, BankRecord, EntryOrigin, LedgerEntry, LedgerRecord, ReconciledEntry};

/// Reconcile raw bank and ledger rows and assemble the review report.
///
/// Never fails: unusable cells and count shortfalls are absorbed and show up
/// in the report as unparseable amounts, excluded rows or highlights.
pub fn reconcile_records(bank: &[BankRecord], ledger: &[LedgerRecord], options: &ReconcileOptions) -> Report {
    let bank = normalize::normalize_bank(bank);
    let ledger = normalize::normalize_ledger(ledger);

    let reconciliation = Reconciler::new(options).reconcile(&bank, &ledger);
    let report = Report::assemble(reconciliation);

    info!(
        bank_rows = report.bank.len(),
        ledger_rows = report.ledger.len(),
        extras = report.extras.len(),
        added = report.added_count(),
        padded = report.padded_count(),
        "reconciliation complete"
    );
    report
}

/// Supported report formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Plain CSV grid, no highlights
    Csv,
    /// XML Spreadsheet 2003 workbook with highlights
    Xml,
}

impl FromStr for Format {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(Format::Csv),
            "xml" | "spreadsheetml" | "excel" => Ok(Format::Xml),
            _ => Err(Error::InvalidFormat(s.to_string())),
        }
    }
}

impl Format {
    /// Guess the format from an output path; anything but `.xml` is CSV.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("xml") => Format::Xml,
            _ => Format::Csv,
        }
    }

    /// Get file extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            Format::Csv => "csv",
            Format::Xml => "xml",
        }
    }
}
