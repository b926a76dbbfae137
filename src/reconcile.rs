//! Reconciler: the matching engine.
//!
//! Works one amount bucket at a time. When the ledger holds more entries at an
//! amount than the bank feed, the surplus is removed as extras. When the bank
//! feed holds more, the missing entries are synthesized as `Bank-Add` rows.
//! After every bucket is processed both sides hold the same number of entries
//! at every amount.
//!
//! Nothing here fails. Shortfalls are resolved by the fallback rules and
//! surfaced through [`BucketOutcome`] and the entry origin.

use crate::bucket::{union_amounts, AmountBuckets};
use crate::options::ReconcileOptions;
use crate::types::{
    Amount, BankEntry, EntryOrigin, LedgerEntry, ReconciledEntry, BANK_ADD_TYPE, MEMO_ADDED,
    MEMO_DUPLICATE,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, warn};

/// What happened to one amount bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BucketOutcome {
    pub amount: Decimal,
    pub bank_count: usize,
    pub ledger_count: usize,
    /// Ledger entries removed as extras.
    pub removed: usize,
    /// Synthetic entries added.
    pub added: usize,
    /// Synthetic entries built by reusing bank rows already accounted for.
    pub padded: usize,
}

impl BucketOutcome {
    pub fn is_balanced_on_input(&self) -> bool {
        self.bank_count == self.ledger_count
    }
}

/// Result of reconciling two normalized ledgers.
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciliation {
    /// Bank feed, in normalized order.
    pub bank: Vec<BankEntry>,
    /// Ledger entries that survived extras removal, in normalized order.
    pub kept: Vec<LedgerEntry>,
    /// Synthesized entries, amount ascending, in creation order.
    pub synthetic: Vec<ReconciledEntry>,
    /// Removed ledger entries, amount ascending; within an amount in removal order.
    pub extras: Vec<LedgerEntry>,
    /// One outcome per distinct amount on either side, ascending.
    pub outcomes: Vec<BucketOutcome>,
}

/// Matches a normalized bank feed against a normalized ledger.
#[derive(Debug, Clone)]
pub struct Reconciler<'a> {
    options: &'a ReconcileOptions,
}

impl<'a> Reconciler<'a> {
    pub fn new(options: &'a ReconcileOptions) -> Self {
        Self { options }
    }

    /// Reconcile `bank` against `ledger`.
    ///
    /// Both slices are expected in normalized order (see [`crate::normalize`]);
    /// the relative order of rows at one amount decides tie-breaks.
    pub fn reconcile(&self, bank: &[BankEntry], ledger: &[LedgerEntry]) -> Reconciliation {
        let bank_buckets = AmountBuckets::from_amounts(bank.iter().map(|e| e.credit));
        let ledger_buckets = AmountBuckets::from_amounts(ledger.iter().map(|e| e.amount));

        let mut removed = vec![false; ledger.len()];
        let mut extras = Vec::new();
        let mut synthetic = Vec::new();
        let mut outcomes = Vec::new();

        for amount in union_amounts(&bank_buckets, &ledger_buckets) {
            let bank_count = bank_buckets.count(amount);
            let ledger_count = ledger_buckets.count(amount);
            let mut outcome = BucketOutcome {
                amount,
                bank_count,
                ledger_count,
                removed: 0,
                added: 0,
                padded: 0,
            };

            if ledger_count > bank_count {
                let diff = ledger_count - bank_count;
                for index in self.select_extras(ledger, amount, diff) {
                    removed[index] = true;
                    extras.push(ledger[index].clone());
                }
                outcome.removed = diff;
                debug!(%amount, bank_count, ledger_count, removed = diff, "removed extras");
            } else if bank_count > ledger_count {
                let diff = bank_count - ledger_count;
                let added = synthesize(bank, ledger, &removed, amount, diff);
                outcome.added = added.len();
                outcome.padded = added.iter().filter(|e| e.is_padded()).count();
                if outcome.padded > 0 {
                    warn!(
                        %amount,
                        padded = outcome.padded,
                        "too few unmatched bank rows; reused bank rows to fill missing entries"
                    );
                }
                debug!(%amount, bank_count, ledger_count, added = diff, "synthesized missing entries");
                synthetic.extend(added);
            }

            outcomes.push(outcome);
        }

        let kept = ledger
            .iter()
            .zip(&removed)
            .filter(|(_, removed)| !**removed)
            .map(|(entry, _)| entry.clone())
            .collect();

        Reconciliation {
            bank: bank.to_vec(),
            kept,
            synthetic,
            extras,
            outcomes,
        }
    }

    /// Pick `diff` ledger rows at `amount` to remove.
    ///
    /// Rows whose split is not a file reference go first, in ledger order;
    /// file-reference rows fill whatever is left, also in ledger order.
    fn select_extras(&self, ledger: &[LedgerEntry], amount: Decimal, diff: usize) -> Vec<usize> {
        let (plain, referenced): (Vec<usize>, Vec<usize>) = ledger
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.amount == Amount::Value(amount))
            .map(|(index, _)| index)
            .partition(|&index| !self.options.is_file_reference(ledger[index].split.as_deref()));

        plain.into_iter().chain(referenced).take(diff).collect()
    }
}

/// Build `diff` synthetic entries for the bank rows at `amount` that have no
/// ledger counterpart.
fn synthesize(
    bank: &[BankEntry],
    ledger: &[LedgerEntry],
    removed: &[bool],
    amount: Decimal,
    diff: usize,
) -> Vec<ReconciledEntry> {
    let group: Vec<&BankEntry> = bank
        .iter()
        .filter(|entry| entry.credit == Amount::Value(amount))
        .collect();

    // Ledger entries still available at this amount, per date.
    let mut budget: HashMap<NaiveDate, usize> = HashMap::new();
    for (entry, _) in ledger
        .iter()
        .zip(removed)
        .filter(|(entry, removed)| !**removed && entry.amount == Amount::Value(amount))
    {
        if let Some(date) = entry.date {
            *budget.entry(date).or_insert(0) += 1;
        }
    }

    // Order matters: earlier bank rows claim a same-date ledger entry first.
    let mut unmatched = Vec::new();
    for &entry in &group {
        match entry.post_date.and_then(|date| budget.get_mut(&date)) {
            Some(remaining) if *remaining > 0 => *remaining -= 1,
            _ => unmatched.push(entry),
        }
    }

    let mut selected: Vec<(&BankEntry, bool)> =
        unmatched.into_iter().take(diff).map(|entry| (entry, false)).collect();
    if selected.len() < diff {
        let need = diff - selected.len();
        selected.extend(group.iter().take(need).map(|&entry| (entry, true)));
    }

    let memo = if diff > 1 { MEMO_DUPLICATE } else { MEMO_ADDED };
    selected
        .into_iter()
        .map(|(source, padded)| ReconciledEntry {
            entry: LedgerEntry {
                entry_type: BANK_ADD_TYPE.to_string(),
                date: source.post_date,
                num: None,
                name: None,
                memo: Some(memo.to_string()),
                cleared: String::new(),
                split: joined_descriptions(&group, source.post_date),
                amount: source.credit,
            },
            origin: EntryOrigin::BankAdd { padded },
        })
        .collect()
}

/// Distinct non-blank descriptions of the bank rows posted on `date`, in
/// first-seen order, joined with `"; "`.
fn joined_descriptions(group: &[&BankEntry], date: Option<NaiveDate>) -> Option<String> {
    let mut descriptions: Vec<&str> = Vec::new();
    for entry in group.iter().filter(|entry| entry.post_date == date) {
        let description = entry.description.as_str();
        if !description.is_empty() && !descriptions.contains(&description) {
            descriptions.push(description);
        }
    }

    if descriptions.is_empty() {
        None
    } else {
        Some(descriptions.join("; "))
    }
}
