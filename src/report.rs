//! Report assembler.
//!
//! Orders the reconciled ledger, totals each side and decides which rows a
//! reviewer should look at. Classification is a pure function of the
//! reconciliation; turning a [`Highlight`] into a colour is up to the writer.

use crate::reconcile::{BucketOutcome, Reconciliation};
use crate::types::{BankEntry, EntryOrigin, LedgerEntry, ReconciledEntry};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;
use tracing::warn;

/// Review class attached to a report row or cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Highlight {
    /// A single, unambiguous entry was added to match the bank.
    CleanAdded,
    /// An added entry that needs a closer look: several were added at the same
    /// amount, several bank transactions were folded into it, or it was padded.
    Ambiguous,
    /// Removed from the ledger as an extra.
    Removed,
    /// Separator column.
    Spacer,
}

/// A report row with its review class.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Classified<T> {
    pub entry: T,
    pub highlight: Option<Highlight>,
}

/// Column totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Totals {
    /// Sum of bank credits.
    pub bank_credit: Decimal,
    /// Sum of the reconciled ledger.
    pub ledger_amount: Decimal,
    /// Sum of the removed extras.
    pub extras_amount: Decimal,
}

/// Everything the presentation layer needs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub bank: Vec<Classified<BankEntry>>,
    pub ledger: Vec<Classified<ReconciledEntry>>,
    pub extras: Vec<Classified<LedgerEntry>>,
    pub totals: Totals,
    pub outcomes: Vec<BucketOutcome>,
}

impl Report {
    /// Assemble the report for a finished reconciliation.
    pub fn assemble(reconciliation: Reconciliation) -> Self {
        let Reconciliation {
            bank,
            kept,
            synthetic,
            mut extras,
            outcomes,
        } = reconciliation;

        let mut ledger: Vec<ReconciledEntry> = kept
            .into_iter()
            .map(|entry| ReconciledEntry {
                entry,
                origin: EntryOrigin::Ledger,
            })
            .chain(synthetic)
            .collect();
        ledger.sort_by_key(|row| row.entry.amount);
        extras.sort_by_key(|entry| entry.amount);

        let totals = Totals {
            bank_credit: checked_total("bank credit", bank.iter().filter_map(|e| e.credit.value())),
            ledger_amount: checked_total("ledger amount", ledger.iter().filter_map(|r| r.entry.amount.value())),
            extras_amount: checked_total("extras amount", extras.iter().filter_map(|e| e.amount.value())),
        };

        let ledger_highlights = classify_synthetic(&ledger);

        let mut bank_highlights = vec![None; bank.len()];
        for (row, highlight) in ledger.iter().zip(&ledger_highlights) {
            let Some(highlight) = *highlight else { continue };
            for (entry, slot) in bank.iter().zip(bank_highlights.iter_mut()) {
                if entry.credit == row.entry.amount
                    && entry.post_date.is_some()
                    && entry.post_date == row.entry.date
                {
                    *slot = Some(highlight);
                }
            }
        }

        Report {
            bank: bank
                .into_iter()
                .zip(bank_highlights)
                .map(|(entry, highlight)| Classified { entry, highlight })
                .collect(),
            ledger: ledger
                .into_iter()
                .zip(ledger_highlights)
                .map(|(entry, highlight)| Classified { entry, highlight })
                .collect(),
            extras: extras
                .into_iter()
                .map(|entry| Classified {
                    entry,
                    highlight: Some(Highlight::Removed),
                })
                .collect(),
            totals,
            outcomes,
        }
    }

    pub fn added_count(&self) -> usize {
        self.ledger.iter().filter(|row| row.entry.is_synthetic()).count()
    }

    pub fn padded_count(&self) -> usize {
        self.ledger.iter().filter(|row| row.entry.is_padded()).count()
    }

    /// Number of ledger rows at each amount, for balance checks.
    pub fn ledger_count(&self, amount: Decimal) -> usize {
        self.ledger
            .iter()
            .filter(|row| row.entry.entry.amount.value() == Some(amount))
            .count()
    }

    pub fn bank_count(&self, amount: Decimal) -> usize {
        self.bank
            .iter()
            .filter(|row| row.entry.credit.value() == Some(amount))
            .count()
    }
}

/// Sum `values`, leaving out any value that would overflow the running total.
fn checked_total(column: &'static str, values: impl Iterator<Item = Decimal>) -> Decimal {
    values.fold(Decimal::ZERO, |total, value| match total.checked_add(value) {
        Some(sum) => sum,
        None => {
            warn!(column, %value, "total overflows, value left out");
            total
        }
    })
}

/// Classify each row of the ordered ledger. Only synthetic rows get a class.
fn classify_synthetic(ledger: &[ReconciledEntry]) -> Vec<Option<Highlight>> {
    let mut added_per_amount = HashMap::new();
    for row in ledger.iter().filter(|row| row.is_synthetic()) {
        *added_per_amount.entry(row.entry.amount).or_insert(0usize) += 1;
    }

    ledger
        .iter()
        .map(|row| {
            if !row.is_synthetic() {
                return None;
            }
            let several_added = added_per_amount.get(&row.entry.amount).copied().unwrap_or(0) > 1;
            let folded = row.entry.split.as_deref().is_some_and(|s| s.contains(';'));
            if several_added || folded || row.is_padded() {
                Some(Highlight::Ambiguous)
            } else {
                Some(Highlight::CleanAdded)
            }
        })
        .collect()
}
