//! Ledger normalizer.
//!
//! Turns raw text records into typed entries. Amounts are rounded to cents,
//! the accounting ledger is filtered down to unreconciled candidates, and both
//! sequences come back sorted by their matching amount. Sorting is stable, so
//! rows with equal amounts keep their input order. Inputs are never modified.

use crate::types::{Amount, BankEntry, BankRecord, LedgerEntry, LedgerRecord};
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use std::str::FromStr;
use tracing::debug;

const DATE_FORMATS: [&str; 4] = [
    "%Y-%m-%d", // 2024-01-05
    "%m/%d/%y", // 01/05/24, must precede %m/%d/%Y
    "%m/%d/%Y", // 01/05/2024
    "%d.%m.%Y", // 05.01.2024
];

const DATE_TIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Normalize the bank feed. Every row is kept; rows without a usable credit
/// carry `Amount::Unparseable` and sort last.
pub fn normalize_bank(records: &[BankRecord]) -> Vec<BankEntry> {
    let mut entries: Vec<BankEntry> = records
        .iter()
        .map(|record| BankEntry {
            post_date: parse_date(&record.post_date),
            check: non_blank(&record.check),
            description: record.description.trim().to_string(),
            debit: parse_amount(&record.debit),
            credit: parse_amount(&record.credit),
        })
        .collect();

    // Vec::sort_by_key is stable.
    entries.sort_by_key(|entry| entry.credit);
    entries
}

/// Normalize the accounting ledger, keeping only rows eligible for reconciliation.
pub fn normalize_ledger(records: &[LedgerRecord]) -> Vec<LedgerEntry> {
    let mut entries: Vec<LedgerEntry> = records.iter().filter_map(eligible_entry).collect();

    let skipped = records.len() - entries.len();
    if skipped > 0 {
        debug!(skipped, "ledger rows not eligible for reconciliation");
    }

    entries.sort_by_key(|entry| entry.amount);
    entries
}

/// A ledger row takes part only if it is uncleared, typed and dated.
fn eligible_entry(record: &LedgerRecord) -> Option<LedgerEntry> {
    if !record.cleared.trim().is_empty() || record.entry_type.trim().is_empty() {
        return None;
    }
    let date = parse_date(&record.date)?;

    Some(LedgerEntry {
        entry_type: record.entry_type.trim().to_string(),
        date: Some(date),
        num: non_blank(&record.num),
        name: non_blank(&record.name),
        memo: non_blank(&record.memo),
        cleared: String::new(),
        split: present(&record.split),
        amount: parse_amount(&record.amount),
    })
}

/// Parse a monetary cell.
///
/// Accepts a leading `$`, `,` thousands separators and `(12.50)` negatives.
/// Anything else, including a blank cell, is `Amount::Unparseable`.
pub fn parse_amount(raw: &str) -> Amount {
    let cleaned: String = raw.trim().chars().filter(|c| !matches!(c, ',' | '$')).collect();
    let cleaned = cleaned.trim();
    // Decimal::from_str skips underscores.
    if cleaned.is_empty() || cleaned.contains('_') {
        return Amount::Unparseable;
    }

    let parsed = match cleaned.strip_prefix('(').and_then(|s| s.strip_suffix(')')) {
        Some(inner) => Decimal::from_str(inner.trim()).map(|v| -v),
        None => Decimal::from_str(cleaned).or_else(|_| Decimal::from_scientific(cleaned)),
    };

    match parsed {
        Ok(value) => Amount::new(value),
        Err(_) => Amount::Unparseable,
    }
}

/// Parse a date cell. Malformed or blank cells give `None`.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(raw, format).ok())
        .or_else(|| {
            DATE_TIME_FORMATS
                .iter()
                .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
                .map(|dt| dt.date())
        })
}

/// The cell as written, unless it is blank.
fn present(raw: &str) -> Option<String> {
    if raw.trim().is_empty() {
        None
    } else {
        Some(raw.to_string())
    }
}

fn non_blank(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
