//! Expense record
//!
//! One shared expense: who paid, how much, and how the total is divided
//! among the participants. The record is immutable once created; an edit
//! in the product is a replace, not a mutation.
//!
//! CRITICAL: All money values are i64 (minor units), and the stored
//! splits always sum exactly to the total.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::EngineLimits;
use crate::split::{self, SplitError, SplitPolicy, SplitShare};

/// Errors that can occur when building an expense record
#[derive(Debug, Error, PartialEq)]
pub enum ExpenseError {
    #[error("split allocation failed: {0}")]
    Split(#[from] SplitError),

    #[error("stored splits sum to {computed}, expected total {expected}")]
    SplitSumMismatch { computed: i64, expected: i64 },

    #[error("negative stored split amount {amount} for participant {user_id}")]
    NegativeSplitAmount { user_id: String, amount: i64 },
}

/// A shared expense with its per-participant splits
///
/// The payer may or may not appear among the split participants; when
/// they do, their own share simply nets against the amount they fronted
/// during balance aggregation.
///
/// # Example
///
/// ```
/// use tally_core_rs::models::ExpenseRecord;
/// use tally_core_rs::split::SplitPolicy;
///
/// let expense = ExpenseRecord::new(
///     "trip".to_string(),
///     "alice".to_string(),
///     10_000, // $100.00 in cents
///     "USD".to_string(),
///     SplitPolicy::Equal {
///         participants: vec!["alice".to_string(), "bob".to_string()],
///     },
/// )
/// .unwrap();
///
/// assert_eq!(expense.total_amount(), 10_000);
/// assert_eq!(expense.splits().len(), 2);
/// assert_eq!(expense.splits()[0].amount, 5_000);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpenseRecord {
    /// Unique expense identifier (UUID)
    id: String,

    /// Group this expense belongs to
    group_id: String,

    /// Expense total in minor units (positive)
    total_amount: i64,

    /// ISO currency code (e.g., "USD")
    currency: String,

    /// User who fronted the money
    payer_id: String,

    /// Policy the splits were produced from (kept for edit/audit flows)
    policy: SplitPolicy,

    /// Per-participant shares, in participant order; sums to `total_amount`
    splits: Vec<SplitShare>,
}

impl ExpenseRecord {
    /// Create a new expense, allocating its splits from the policy
    ///
    /// Runs the split allocator, so a freshly created record always
    /// satisfies the splits-sum invariant.
    ///
    /// # Errors
    ///
    /// Any [`SplitError`] from allocation (bad totals, mismatched exact
    /// amounts, out-of-tolerance percentages, ...).
    pub fn new(
        group_id: String,
        payer_id: String,
        total_amount: i64,
        currency: String,
        policy: SplitPolicy,
    ) -> Result<Self, ExpenseError> {
        Self::with_limits(
            group_id,
            payer_id,
            total_amount,
            currency,
            policy,
            &EngineLimits::default(),
        )
    }

    /// Create a new expense under explicit input limits
    pub fn with_limits(
        group_id: String,
        payer_id: String,
        total_amount: i64,
        currency: String,
        policy: SplitPolicy,
        limits: &EngineLimits,
    ) -> Result<Self, ExpenseError> {
        let splits = split::allocate_with_limits(total_amount, &policy, limits)?;

        Ok(Self {
            id: uuid::Uuid::new_v4().to_string(),
            group_id,
            total_amount,
            currency,
            payer_id,
            policy,
            splits,
        })
    }

    /// Restore an expense from stored parts
    ///
    /// Storage is not trusted: the splits-sum invariant and share signs
    /// are re-validated instead of assumed.
    ///
    /// # Errors
    ///
    /// - [`ExpenseError::SplitSumMismatch`] if the stored splits do not
    ///   sum to the stored total
    /// - [`ExpenseError::NegativeSplitAmount`] for any negative share
    #[allow(clippy::too_many_arguments)]
    pub fn from_parts(
        id: String,
        group_id: String,
        payer_id: String,
        total_amount: i64,
        currency: String,
        policy: SplitPolicy,
        splits: Vec<SplitShare>,
    ) -> Result<Self, ExpenseError> {
        for share in &splits {
            if share.amount < 0 {
                return Err(ExpenseError::NegativeSplitAmount {
                    user_id: share.user_id.clone(),
                    amount: share.amount,
                });
            }
        }

        let computed: i64 = splits.iter().map(|s| s.amount).sum();
        if computed != total_amount {
            return Err(ExpenseError::SplitSumMismatch {
                computed,
                expected: total_amount,
            });
        }

        Ok(Self {
            id,
            group_id,
            total_amount,
            currency,
            payer_id,
            policy,
            splits,
        })
    }

    /// Get expense ID
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Get group ID
    pub fn group_id(&self) -> &str {
        &self.group_id
    }

    /// Get expense total in minor units
    pub fn total_amount(&self) -> i64 {
        self.total_amount
    }

    /// Get currency code
    pub fn currency(&self) -> &str {
        &self.currency
    }

    /// Get payer user ID
    pub fn payer_id(&self) -> &str {
        &self.payer_id
    }

    /// Get the policy the splits were produced from
    pub fn policy(&self) -> &SplitPolicy {
        &self.policy
    }

    /// Get per-participant shares in participant order
    pub fn splits(&self) -> &[SplitShare] {
        &self.splits
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn equal_policy(participants: &[&str]) -> SplitPolicy {
        SplitPolicy::Equal {
            participants: participants.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_new_expense_allocates_splits() {
        let expense = ExpenseRecord::new(
            "g1".to_string(),
            "alice".to_string(),
            1_000,
            "USD".to_string(),
            equal_policy(&["alice", "bob", "carol"]),
        )
        .unwrap();

        let amounts: Vec<i64> = expense.splits().iter().map(|s| s.amount).collect();
        assert_eq!(amounts, vec![334, 333, 333]);
        assert_eq!(expense.payer_id(), "alice");
        assert!(!expense.id().is_empty());
    }

    #[test]
    fn test_new_expense_propagates_split_errors() {
        let result = ExpenseRecord::new(
            "g1".to_string(),
            "alice".to_string(),
            1_000,
            "USD".to_string(),
            equal_policy(&[]),
        );
        assert_eq!(
            result.unwrap_err(),
            ExpenseError::Split(SplitError::NoParticipants)
        );
    }

    #[test]
    fn test_from_parts_validates_sum() {
        let splits = vec![
            SplitShare {
                user_id: "alice".to_string(),
                amount: 400,
            },
            SplitShare {
                user_id: "bob".to_string(),
                amount: 500,
            },
        ];
        let result = ExpenseRecord::from_parts(
            "e1".to_string(),
            "g1".to_string(),
            "alice".to_string(),
            1_000,
            "USD".to_string(),
            equal_policy(&["alice", "bob"]),
            splits,
        );
        assert_eq!(
            result.unwrap_err(),
            ExpenseError::SplitSumMismatch {
                computed: 900,
                expected: 1_000
            }
        );
    }

    #[test]
    fn test_from_parts_rejects_negative_share() {
        let splits = vec![
            SplitShare {
                user_id: "alice".to_string(),
                amount: 1_100,
            },
            SplitShare {
                user_id: "bob".to_string(),
                amount: -100,
            },
        ];
        let result = ExpenseRecord::from_parts(
            "e1".to_string(),
            "g1".to_string(),
            "alice".to_string(),
            1_000,
            "USD".to_string(),
            equal_policy(&["alice", "bob"]),
            splits,
        );
        assert_eq!(
            result.unwrap_err(),
            ExpenseError::NegativeSplitAmount {
                user_id: "bob".to_string(),
                amount: -100
            }
        );
    }

    #[test]
    fn test_from_parts_preserves_id() {
        let splits = vec![SplitShare {
            user_id: "bob".to_string(),
            amount: 1_000,
        }];
        let expense = ExpenseRecord::from_parts(
            "expense-42".to_string(),
            "g1".to_string(),
            "alice".to_string(),
            1_000,
            "USD".to_string(),
            equal_policy(&["bob"]),
            splits,
        )
        .unwrap();
        assert_eq!(expense.id(), "expense-42");
    }
}
