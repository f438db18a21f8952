//! Debt Simplification
//!
//! Reduces a zero-sum net-balance vector to a small set of suggested
//! payments that would square the whole group ("minimum cash flow").
//!
//! The matching is greedy: repeatedly pair the largest creditor with the
//! largest debtor and settle the smaller of the two amounts. That is
//! O(n log n) and near-optimal, but not guaranteed minimal in payment
//! count; the true minimum is NP-hard, and this tradeoff is accepted.
//!
//! # Critical Invariants
//!
//! 1. Input balances must sum to exactly 0 (asserted)
//! 2. Applying the suggested payments as settlements and re-aggregating
//!    yields all-zero balances
//! 3. Output is deterministic: equal amounts are ordered by user id

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use serde::{Deserialize, Serialize};

use crate::balance::NetBalances;

/// One payment in the suggested settling plan (debtor → creditor)
///
/// Same shape as a pairwise debt, but explicitly part of a near-minimal
/// plan rather than an itemized per-history view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestedPayment {
    /// User who should pay
    pub from: String,

    /// User who should be paid
    pub to: String,

    /// Payment amount in minor units (positive)
    pub amount: i64,

    /// ISO currency code
    pub currency: String,
}

/// Heap key for the open creditor/debtor pools
///
/// Larger outstanding amount first; equal amounts fall back to ascending
/// user id. The source history never pins this order down, so it is fixed
/// here to keep output reproducible.
#[derive(Debug, Clone, PartialEq, Eq)]
struct OpenPosition {
    amount: i64,
    user_id: String,
}

impl Ord for OpenPosition {
    fn cmp(&self, other: &Self) -> Ordering {
        self.amount
            .cmp(&other.amount)
            .then_with(|| other.user_id.cmp(&self.user_id))
    }
}

impl PartialOrd for OpenPosition {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Reduce net balances to a near-minimal set of settling payments
///
/// # Panics
///
/// Panics if the balances do not sum to zero. Simplification is only
/// meaningful over the output of balance aggregation, which guarantees
/// the zero-sum invariant.
///
/// # Example
///
/// ```
/// use tally_core_rs::balance::NetBalances;
/// use tally_core_rs::simplify::simplify;
///
/// let balances: NetBalances = [
///     ("alice".to_string(), 2_000),
///     ("bob".to_string(), -2_000),
/// ]
/// .into_iter()
/// .collect();
///
/// let payments = simplify(&balances, "USD");
/// assert_eq!(payments.len(), 1);
/// assert_eq!(payments[0].from, "bob");
/// assert_eq!(payments[0].to, "alice");
/// assert_eq!(payments[0].amount, 2_000);
/// ```
pub fn simplify(balances: &NetBalances, currency: &str) -> Vec<SuggestedPayment> {
    let residue: i64 = balances.iter().map(|(_, amount)| amount).sum();
    assert_eq!(
        residue, 0,
        "cannot simplify balances summing to {residue}; expected 0"
    );

    let mut creditors: BinaryHeap<OpenPosition> = BinaryHeap::new();
    let mut debtors: BinaryHeap<OpenPosition> = BinaryHeap::new();

    // Balances are integers, so "nonzero" needs no epsilon
    for (user_id, amount) in balances.iter() {
        match amount.cmp(&0) {
            Ordering::Greater => creditors.push(OpenPosition {
                amount,
                user_id: user_id.to_string(),
            }),
            Ordering::Less => debtors.push(OpenPosition {
                amount: -amount,
                user_id: user_id.to_string(),
            }),
            Ordering::Equal => {}
        }
    }

    let mut payments = Vec::new();

    loop {
        let (mut creditor, mut debtor) = match (creditors.pop(), debtors.pop()) {
            (Some(creditor), Some(debtor)) => (creditor, debtor),
            (None, None) => break,
            // Zero-sum input drains both pools together
            (creditor, debtor) => panic!(
                "simplification left unmatched positions ({:?}, {:?}); balances were not zero-sum",
                creditor, debtor
            ),
        };

        let settled = creditor.amount.min(debtor.amount);

        payments.push(SuggestedPayment {
            from: debtor.user_id.clone(),
            to: creditor.user_id.clone(),
            amount: settled,
            currency: currency.to_string(),
        });

        creditor.amount -= settled;
        debtor.amount -= settled;

        if creditor.amount > 0 {
            creditors.push(creditor);
        }
        if debtor.amount > 0 {
            debtors.push(debtor);
        }
    }

    tracing::debug!(
        users = balances.len(),
        payments = payments.len(),
        "simplified group debts"
    );

    payments
}
