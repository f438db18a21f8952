//! Group history snapshot
//!
//! The internally consistent expense/settlement history for one group, as
//! handed over by storage (e.g., assembled inside one read transaction).
//! This is the input surface of the balance pipeline: every view is
//! recomputed from the full snapshot on each call, and the engine caches
//! nothing between calls. A caller that caches derived views must
//! invalidate them on every write to the group's history, since the fold is
//! order-independent but not incrementally updatable without re-deriving
//! the zero-sum invariant.
//!
//! All records in a snapshot share one group and one currency; conversion
//! into a group's reporting currency happens upstream.

use thiserror::Error;

use crate::balance::{self, NetBalances, PairwiseDebt};
use crate::config::EngineLimits;
use crate::models::expense::ExpenseRecord;
use crate::models::settlement::SettlementRecord;
use crate::simplify::{self, SuggestedPayment};

/// Errors that can occur when assembling a snapshot
#[derive(Debug, Error, PartialEq)]
pub enum SnapshotError {
    #[error("record currency {found} does not match snapshot currency {expected}")]
    CurrencyMismatch { expected: String, found: String },

    #[error("record group {found} does not match snapshot group {expected}")]
    GroupMismatch { expected: String, found: String },

    #[error("snapshot has {count} expenses, limit is {limit}")]
    TooManyExpenses { count: usize, limit: usize },

    #[error("snapshot has {count} settlements, limit is {limit}")]
    TooManySettlements { count: usize, limit: usize },
}

/// One group's full history plus the derived-view entry points
///
/// # Example
///
/// ```
/// use tally_core_rs::models::{ExpenseRecord, GroupSnapshot, SettlementRecord};
/// use tally_core_rs::split::SplitPolicy;
///
/// let mut snapshot = GroupSnapshot::new("trip".to_string(), "USD".to_string());
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
/// snapshot.push_expense(expense).unwrap();
///
/// let balances = snapshot.net_balances();
/// assert_eq!(balances.get("alice"), 5_000);
/// assert_eq!(balances.get("bob"), -5_000);
/// ```
#[derive(Debug, Clone)]
pub struct GroupSnapshot {
    /// Group all records must belong to
    group_id: String,

    /// Currency all records must be expressed in
    currency: String,

    /// Expense history
    expenses: Vec<ExpenseRecord>,

    /// Settlement history
    settlements: Vec<SettlementRecord>,

    /// Defensive input bounds
    limits: EngineLimits,
}

impl GroupSnapshot {
    /// Create an empty snapshot with default limits
    pub fn new(group_id: String, currency: String) -> Self {
        Self::with_limits(group_id, currency, EngineLimits::default())
    }

    /// Create an empty snapshot with explicit limits
    pub fn with_limits(group_id: String, currency: String, limits: EngineLimits) -> Self {
        Self {
            group_id,
            currency,
            expenses: Vec::new(),
            settlements: Vec::new(),
            limits,
        }
    }

    /// Assemble a snapshot from full stored history
    ///
    /// Validates group, currency, and size limits for every record.
    pub fn from_history(
        group_id: String,
        currency: String,
        expenses: Vec<ExpenseRecord>,
        settlements: Vec<SettlementRecord>,
    ) -> Result<Self, SnapshotError> {
        let mut snapshot = Self::new(group_id, currency);
        for expense in expenses {
            snapshot.push_expense(expense)?;
        }
        for settlement in settlements {
            snapshot.push_settlement(settlement)?;
        }
        Ok(snapshot)
    }

    /// Add an expense, validating it belongs in this snapshot
    pub fn push_expense(&mut self, expense: ExpenseRecord) -> Result<(), SnapshotError> {
        if expense.group_id() != self.group_id {
            return Err(SnapshotError::GroupMismatch {
                expected: self.group_id.clone(),
                found: expense.group_id().to_string(),
            });
        }
        if expense.currency() != self.currency {
            return Err(SnapshotError::CurrencyMismatch {
                expected: self.currency.clone(),
                found: expense.currency().to_string(),
            });
        }
        if self.expenses.len() >= self.limits.max_expenses_per_snapshot {
            return Err(SnapshotError::TooManyExpenses {
                count: self.expenses.len() + 1,
                limit: self.limits.max_expenses_per_snapshot,
            });
        }

        self.expenses.push(expense);
        Ok(())
    }

    /// Add a settlement, validating it belongs in this snapshot
    pub fn push_settlement(&mut self, settlement: SettlementRecord) -> Result<(), SnapshotError> {
        if settlement.group_id() != self.group_id {
            return Err(SnapshotError::GroupMismatch {
                expected: self.group_id.clone(),
                found: settlement.group_id().to_string(),
            });
        }
        if settlement.currency() != self.currency {
            return Err(SnapshotError::CurrencyMismatch {
                expected: self.currency.clone(),
                found: settlement.currency().to_string(),
            });
        }
        if self.settlements.len() >= self.limits.max_settlements_per_snapshot {
            return Err(SnapshotError::TooManySettlements {
                count: self.settlements.len() + 1,
                limit: self.limits.max_settlements_per_snapshot,
            });
        }

        self.settlements.push(settlement);
        Ok(())
    }

    /// Get group ID
    pub fn group_id(&self) -> &str {
        &self.group_id
    }

    /// Get snapshot currency
    pub fn currency(&self) -> &str {
        &self.currency
    }

    /// Get expense history
    pub fn expenses(&self) -> &[ExpenseRecord] {
        &self.expenses
    }

    /// Get settlement history
    pub fn settlements(&self) -> &[SettlementRecord] {
        &self.settlements
    }

    /// One signed net balance per user; the authoritative "who owes how
    /// much" view. Balances sum to zero.
    pub fn net_balances(&self) -> NetBalances {
        balance::aggregate(&self.expenses, &self.settlements)
    }

    /// Itemized directed debts per user pair, for detail views. A
    /// projection of the same history, not a second source of truth.
    pub fn pairwise_debts(&self) -> Vec<PairwiseDebt> {
        balance::resolve(&self.expenses, &self.settlements)
    }

    /// Near-minimal set of payments that would settle the whole group
    pub fn suggested_payments(&self) -> Vec<SuggestedPayment> {
        simplify::simplify(&self.net_balances(), &self.currency)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::split::SplitPolicy;

    fn expense(group: &str, currency: &str, payer: &str, total: i64) -> ExpenseRecord {
        ExpenseRecord::new(
            group.to_string(),
            payer.to_string(),
            total,
            currency.to_string(),
            SplitPolicy::Equal {
                participants: vec!["alice".to_string(), "bob".to_string()],
            },
        )
        .unwrap()
    }

    #[test]
    fn test_push_rejects_wrong_group() {
        let mut snapshot = GroupSnapshot::new("trip".to_string(), "USD".to_string());
        let result = snapshot.push_expense(expense("other", "USD", "alice", 1_000));
        assert_eq!(
            result.unwrap_err(),
            SnapshotError::GroupMismatch {
                expected: "trip".to_string(),
                found: "other".to_string()
            }
        );
    }

    #[test]
    fn test_push_rejects_wrong_currency() {
        let mut snapshot = GroupSnapshot::new("trip".to_string(), "USD".to_string());
        let result = snapshot.push_expense(expense("trip", "EUR", "alice", 1_000));
        assert_eq!(
            result.unwrap_err(),
            SnapshotError::CurrencyMismatch {
                expected: "USD".to_string(),
                found: "EUR".to_string()
            }
        );
    }

    #[test]
    fn test_push_enforces_expense_limit() {
        let limits = EngineLimits {
            max_expenses_per_snapshot: 1,
            ..EngineLimits::default()
        };
        let mut snapshot =
            GroupSnapshot::with_limits("trip".to_string(), "USD".to_string(), limits);

        snapshot
            .push_expense(expense("trip", "USD", "alice", 1_000))
            .unwrap();
        let result = snapshot.push_expense(expense("trip", "USD", "bob", 2_000));
        assert_eq!(
            result.unwrap_err(),
            SnapshotError::TooManyExpenses { count: 2, limit: 1 }
        );
    }

    #[test]
    fn test_settlement_limit_and_mismatch() {
        let limits = EngineLimits {
            max_settlements_per_snapshot: 1,
            ..EngineLimits::default()
        };
        let mut snapshot =
            GroupSnapshot::with_limits("trip".to_string(), "USD".to_string(), limits);

        let pay = |amount: i64| {
            SettlementRecord::new(
                "trip".to_string(),
                "bob".to_string(),
                "alice".to_string(),
                amount,
                "USD".to_string(),
            )
            .unwrap()
        };

        snapshot.push_settlement(pay(500)).unwrap();
        assert_eq!(
            snapshot.push_settlement(pay(700)).unwrap_err(),
            SnapshotError::TooManySettlements { count: 2, limit: 1 }
        );
    }

    #[test]
    fn test_from_history_round_trip() {
        let expenses = vec![expense("trip", "USD", "alice", 1_000)];
        let snapshot =
            GroupSnapshot::from_history("trip".to_string(), "USD".to_string(), expenses, vec![])
                .unwrap();
        assert_eq!(snapshot.expenses().len(), 1);
        assert_eq!(snapshot.settlements().len(), 0);
    }
}
