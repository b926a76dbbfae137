//! Common types shared by the normalizer, reconciler and report.

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;

/// `Type` value given to ledger rows synthesized from bank transactions.
pub const BANK_ADD_TYPE: &str = "Bank-Add";

/// Memo of a synthetic row when it is the only one added at its amount.
pub const MEMO_ADDED: &str = "Added to match bank";

/// Memo of synthetic rows when several were added at the same amount.
pub const MEMO_DUPLICATE: &str = "Duplicate, investigate added date";

/// Column names of the bank credit feed, in report order.
pub const BANK_COLUMNS: [&str; 5] = ["Post Date", "Check", "Description", "Debit", "Credit"];

/// Column names of the accounting ledger, in report order.
pub const LEDGER_COLUMNS: [&str; 8] = ["Type", "Date", "Num", "Name", "Memo", "Clr", "Split", "Amount"];

/// A monetary amount rounded to cents, or the marker for a cell that held no number.
///
/// `Unparseable` orders after every value, so sorted ledgers keep such rows at the end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Amount {
    /// Parsed amount, rounded half-to-even to 2 decimal places.
    Value(Decimal),
    /// Blank or non-numeric cell. Never matched.
    Unparseable,
}

impl Amount {
    /// Round `value` to cents and wrap it.
    pub fn new(value: Decimal) -> Self {
        Amount::Value(value.round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven))
    }

    /// The rounded value, if any.
    pub fn value(&self) -> Option<Decimal> {
        match self {
            Amount::Value(v) => Some(*v),
            Amount::Unparseable => None,
        }
    }
}

impl From<Decimal> for Amount {
    fn from(value: Decimal) -> Self {
        Amount::new(value)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Amount::Value(v) => write!(f, "{:.2}", v),
            Amount::Unparseable => Ok(()),
        }
    }
}

/// Raw bank feed row as read from CSV. Every cell is kept as text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BankRecord {
    #[serde(rename = "Post Date", default)]
    pub post_date: String,
    #[serde(rename = "Check", default)]
    pub check: String,
    #[serde(rename = "Description", default)]
    pub description: String,
    #[serde(rename = "Debit", default)]
    pub debit: String,
    #[serde(rename = "Credit", default)]
    pub credit: String,
}

/// Raw accounting ledger row as read from CSV.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LedgerRecord {
    #[serde(rename = "Type", default)]
    pub entry_type: String,
    #[serde(rename = "Date", default)]
    pub date: String,
    #[serde(rename = "Num", default)]
    pub num: String,
    #[serde(rename = "Name", default)]
    pub name: String,
    #[serde(rename = "Memo", default)]
    pub memo: String,
    #[serde(rename = "Clr", default)]
    pub cleared: String,
    #[serde(rename = "Split", default)]
    pub split: String,
    #[serde(rename = "Amount", default)]
    pub amount: String,
}

/// A normalized bank credit feed row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BankEntry {
    /// Posting date. `None` if the cell did not hold a date.
    pub post_date: Option<NaiveDate>,

    /// Check number.
    pub check: Option<String>,

    /// Transaction description.
    pub description: String,

    /// Debit amount.
    pub debit: Amount,

    /// Credit amount. This is the matching field.
    pub credit: Amount,
}

/// A normalized accounting ledger row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Transaction type (`Deposit`, `Payment`, `Bank-Add`, ...).
    pub entry_type: String,

    /// Transaction date. Always present on rows read from the ledger; a
    /// synthetic row copies the bank post date, which may be missing.
    pub date: Option<NaiveDate>,

    /// Document number.
    pub num: Option<String>,

    /// Payee or customer name.
    pub name: Option<String>,

    /// Memo text.
    pub memo: Option<String>,

    /// Cleared flag. Blank means not yet reconciled.
    pub cleared: String,

    /// Split account or reference.
    pub split: Option<String>,

    /// Amount. This is the matching field.
    pub amount: Amount,
}

/// Where a row of the reconciled ledger came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryOrigin {
    /// Carried over from the accounting ledger.
    Ledger,
    /// Synthesized from a bank transaction missing from the ledger.
    BankAdd {
        /// Produced by reusing a bank row because too few were unmatched.
        padded: bool,
    },
}

/// A row of the reconciled ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciledEntry {
    pub entry: LedgerEntry,
    pub origin: EntryOrigin,
}

impl ReconciledEntry {
    pub fn is_synthetic(&self) -> bool {
        matches!(self.origin, EntryOrigin::BankAdd { .. })
    }

    pub fn is_padded(&self) -> bool {
        matches!(self.origin, EntryOrigin::BankAdd { padded: true })
    }
}
