//! Amount bucketer: counts entries per rounded amount.

use crate::types::Amount;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// Multiset of rounded amounts. Unparseable amounts are not counted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AmountBuckets {
    counts: BTreeMap<Decimal, usize>,
}

impl AmountBuckets {
    pub fn from_amounts<I>(amounts: I) -> Self
    where
        I: IntoIterator<Item = Amount>,
    {
        let mut counts = BTreeMap::new();
        for value in amounts.into_iter().filter_map(|a| a.value()) {
            *counts.entry(value).or_insert(0) += 1;
        }
        Self { counts }
    }

    /// Number of entries at `amount`, 0 if none.
    pub fn count(&self, amount: Decimal) -> usize {
        self.counts.get(&amount).copied().unwrap_or(0)
    }

    /// Distinct amounts, ascending.
    pub fn amounts(&self) -> impl Iterator<Item = Decimal> + '_ {
        self.counts.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Decimal, usize)> + '_ {
        self.counts.iter().map(|(amount, count)| (*amount, *count))
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

/// Distinct amounts present in either multiset, ascending.
pub fn union_amounts(a: &AmountBuckets, b: &AmountBuckets) -> Vec<Decimal> {
    let mut amounts: Vec<Decimal> = a.amounts().chain(b.amounts()).collect();
    amounts.sort();
    amounts.dedup();
    amounts
}
