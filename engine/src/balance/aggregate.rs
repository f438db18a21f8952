//! Balance aggregation
//!
//! Folds a group's full expense/settlement history into one signed net
//! balance per user. This is the single source of truth for "who owes or
//! is owed how much"; the pairwise and simplified views are projections
//! of the same history, never competing computations.
//!
//! The fold is order-independent: every record contributes a fixed set of
//! per-user adjustments, and only their sum matters. No cross-user
//! matching happens here.
//!
//! # Critical Invariants
//!
//! 1. **Zero-sum**: balances always sum to exactly 0. Violation is a
//!    panic, not an error: records validate their own internal
//!    invariants at construction, so a nonzero sum means corrupted
//!    upstream data or a bug in this fold.
//! 2. Amounts stay in i64 minor units end to end; the contract's
//!    "round to the minor unit" step is the identity here.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::expense::ExpenseRecord;
use crate::models::settlement::SettlementRecord;

/// Signed net balance per user: positive = is owed money, negative =
/// owes money. Iterates in user-id order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetBalances(BTreeMap<String, i64>);

impl NetBalances {
    /// Balance for one user; users absent from the history are at 0
    pub fn get(&self, user_id: &str) -> i64 {
        self.0.get(user_id).copied().unwrap_or(0)
    }

    /// Iterate balances in user-id order
    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> + '_ {
        self.0.iter().map(|(user, amount)| (user.as_str(), *amount))
    }

    /// Number of users that appear in the history
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when no user appears in the history
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True when every balance is zero (the group is square)
    pub fn is_settled(&self) -> bool {
        self.0.values().all(|amount| *amount == 0)
    }

    /// Borrow the underlying map
    pub fn as_map(&self) -> &BTreeMap<String, i64> {
        &self.0
    }

    /// Consume into the underlying map
    pub fn into_inner(self) -> BTreeMap<String, i64> {
        self.0
    }
}

impl FromIterator<(String, i64)> for NetBalances {
    fn from_iter<T: IntoIterator<Item = (String, i64)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Fold a group history into per-user net balances
///
/// Each expense credits its payer by the full total and debits every
/// split participant by their share; a payer who is also a participant
/// nets the two naturally. Each settlement credits the payer (their debt
/// shrinks) and debits the receiver.
///
/// # Panics
///
/// Panics if the resulting balances do not sum to zero. That postcondition
/// holds for any history built from validated records; a violation means
/// the input was corrupted upstream.
///
/// # Example
///
/// ```
/// use tally_core_rs::balance::aggregate;
/// use tally_core_rs::models::ExpenseRecord;
/// use tally_core_rs::split::SplitPolicy;
///
/// let expense = ExpenseRecord::new(
///     "trip".to_string(),
///     "alice".to_string(),
///     10_000,
///     "USD".to_string(),
///     SplitPolicy::Equal {
///         participants: vec!["alice".to_string(), "bob".to_string()],
///     },
/// )
/// .unwrap();
///
/// let balances = aggregate(&[expense], &[]);
/// assert_eq!(balances.get("alice"), 5_000);
/// assert_eq!(balances.get("bob"), -5_000);
/// ```
pub fn aggregate(expenses: &[ExpenseRecord], settlements: &[SettlementRecord]) -> NetBalances {
    let mut totals: BTreeMap<String, i64> = BTreeMap::new();

    for expense in expenses {
        *totals.entry(expense.payer_id().to_string()).or_insert(0) += expense.total_amount();
        for share in expense.splits() {
            *totals.entry(share.user_id.clone()).or_insert(0) -= share.amount;
        }
    }

    for settlement in settlements {
        *totals
            .entry(settlement.from_user_id().to_string())
            .or_insert(0) += settlement.amount();
        *totals
            .entry(settlement.to_user_id().to_string())
            .or_insert(0) -= settlement.amount();
    }

    let residue: i64 = totals.values().sum();
    assert_eq!(
        residue, 0,
        "net balances sum to {residue}, expected 0; group history is corrupt"
    );

    tracing::debug!(
        expenses = expenses.len(),
        settlements = settlements.len(),
        users = totals.len(),
        "aggregated net balances"
    );

    NetBalances(totals)
}
