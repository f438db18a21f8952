//! Engine input limits
//!
//! The engine recomputes every view from the full group history, so a
//! pathologically large input (millions of expenses, thousands of
//! participants on one bill) costs the caller a full pass every time.
//! These limits bound a single call; exceeding one is a recoverable
//! validation error, not a panic.

use serde::{Deserialize, Serialize};

/// Defensive bounds on engine inputs
///
/// All limits are per-call: the engine holds no state between calls, so
/// there is nothing cumulative to bound.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineLimits {
    /// Maximum participants on a single expense split
    pub max_participants_per_expense: usize,

    /// Maximum expenses in one group snapshot
    pub max_expenses_per_snapshot: usize,

    /// Maximum settlements in one group snapshot
    pub max_settlements_per_snapshot: usize,
}

impl Default for EngineLimits {
    fn default() -> Self {
        Self {
            max_participants_per_expense: 100,
            max_expenses_per_snapshot: 10_000,
            max_settlements_per_snapshot: 10_000,
        }
    }
}
