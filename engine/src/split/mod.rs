//! Split Allocation
//!
//! Turns an expense total plus a split policy into exact per-participant
//! shares. This is the only place share amounts are ever computed; stored
//! expense splits always come out of [`allocate`].
//!
//! # Critical Invariants
//!
//! 1. Shares sum to the expense total **exactly**, in minor units
//! 2. Allocation is deterministic: participant order is caller order
//! 3. Proportion math may pass through f64, money never does
//!
//! # Remainder rules
//!
//! The four policies do not share one remainder rule, and that is a
//! deliberate product decision rather than an accident:
//!
//! - **Equal** spreads the remainder one minor unit at a time across the
//!   *first* `remainder` participants, so no share is ever more than one
//!   minor unit away from the mean.
//! - **Percentage** and **Shares** give all rounding residue to the *last*
//!   participant, whose requested proportion is already inexact once the
//!   others are rounded.
//!
//! # Example
//!
//! ```
//! use tally_core_rs::split::{allocate, SplitPolicy};
//!
//! let policy = SplitPolicy::Equal {
//!     participants: vec!["alice".to_string(), "bob".to_string(), "carol".to_string()],
//! };
//!
//! // $10.00 among three people: 334 + 333 + 333, never 999 or 1001
//! let shares = allocate(1000, &policy).unwrap();
//! let amounts: Vec<i64> = shares.iter().map(|s| s.amount).collect();
//! assert_eq!(amounts, vec![334, 333, 333]);
//! ```

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::EngineLimits;

/// Accepted drift when validating that percentages sum to 100
pub const PERCENT_SUM_TOLERANCE: f64 = 0.01;

/// Errors that can occur during split allocation
#[derive(Debug, Error, PartialEq)]
pub enum SplitError {
    #[error("expense total must be positive, got {total}")]
    NonPositiveTotal { total: i64 },

    #[error("split has no participants")]
    NoParticipants,

    #[error("participant {user_id} appears more than once in split")]
    DuplicateParticipant { user_id: String },

    #[error("split has {count} participants, limit is {limit}")]
    TooManyParticipants { count: usize, limit: usize },

    #[error("negative amount {amount} for participant {user_id}")]
    NegativeAmount { user_id: String, amount: i64 },

    #[error("exact split amounts sum to {computed}, expected total {expected}")]
    SumMismatch { computed: i64, expected: i64 },

    #[error("percentages sum to {computed}, expected 100")]
    PercentSumMismatch { computed: f64 },

    #[error("percentage {percent} for participant {user_id} must be finite and non-negative")]
    InvalidPercentage { user_id: String, percent: f64 },

    #[error("weight {weight} for participant {user_id} must be finite and positive")]
    InvalidWeight { user_id: String, weight: f64 },
}

/// One participant's share of an expense
///
/// Ordered lists of these are stored on the expense record; their amounts
/// sum exactly to the expense total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitShare {
    /// Participant user ID
    pub user_id: String,

    /// Share amount in minor units (never negative)
    pub amount: i64,
}

/// How an expense total is divided among participants
///
/// Participants are always processed in the order the caller supplies
/// them; every remainder rule below refers to that order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SplitPolicy {
    /// Even split; the first `total % n` participants get one extra minor unit
    Equal { participants: Vec<String> },

    /// Caller supplies every amount directly; must sum to the total exactly.
    /// Rounding is the caller's problem; there is no tolerance here.
    Exact { amounts: Vec<(String, i64)> },

    /// Proportional by percentage; must sum to 100 within
    /// [`PERCENT_SUM_TOLERANCE`]. The last participant absorbs all
    /// rounding residue.
    Percentage { portions: Vec<(String, f64)> },

    /// Proportional by arbitrary positive weights. The last participant
    /// absorbs all rounding residue.
    Shares { weights: Vec<(String, f64)> },
}

impl SplitPolicy {
    /// Participant IDs in caller order
    pub fn participants(&self) -> Vec<&str> {
        match self {
            SplitPolicy::Equal { participants } => {
                participants.iter().map(String::as_str).collect()
            }
            SplitPolicy::Exact { amounts } => amounts.iter().map(|(u, _)| u.as_str()).collect(),
            SplitPolicy::Percentage { portions } => {
                portions.iter().map(|(u, _)| u.as_str()).collect()
            }
            SplitPolicy::Shares { weights } => weights.iter().map(|(u, _)| u.as_str()).collect(),
        }
    }

    /// Number of participants
    pub fn participant_count(&self) -> usize {
        match self {
            SplitPolicy::Equal { participants } => participants.len(),
            SplitPolicy::Exact { amounts } => amounts.len(),
            SplitPolicy::Percentage { portions } => portions.len(),
            SplitPolicy::Shares { weights } => weights.len(),
        }
    }

    /// Policy name for diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            SplitPolicy::Equal { .. } => "equal",
            SplitPolicy::Exact { .. } => "exact",
            SplitPolicy::Percentage { .. } => "percentage",
            SplitPolicy::Shares { .. } => "shares",
        }
    }
}

/// Allocate an expense total into per-participant shares
///
/// Uses [`EngineLimits::default`] for the participant bound; see
/// [`allocate_with_limits`].
///
/// # Arguments
///
/// * `total` - Expense total in minor units (must be positive)
/// * `policy` - Split policy carrying the participants
///
/// # Returns
///
/// Shares in participant order, summing exactly to `total`.
///
/// # Example
///
/// ```
/// use tally_core_rs::split::{allocate, SplitPolicy};
///
/// let policy = SplitPolicy::Exact {
///     amounts: vec![("alice".to_string(), 3000), ("bob".to_string(), 2000)],
/// };
/// let shares = allocate(5000, &policy).unwrap();
/// assert_eq!(shares.len(), 2);
/// assert_eq!(shares[0].amount + shares[1].amount, 5000);
/// ```
pub fn allocate(total: i64, policy: &SplitPolicy) -> Result<Vec<SplitShare>, SplitError> {
    allocate_with_limits(total, policy, &EngineLimits::default())
}

/// Allocate an expense total under explicit input limits
///
/// # Errors
///
/// - [`SplitError::NonPositiveTotal`] if `total <= 0`
/// - [`SplitError::NoParticipants`] / [`SplitError::DuplicateParticipant`] /
///   [`SplitError::TooManyParticipants`] for malformed participant lists
/// - Per-policy validation errors carrying the computed vs expected values
pub fn allocate_with_limits(
    total: i64,
    policy: &SplitPolicy,
    limits: &EngineLimits,
) -> Result<Vec<SplitShare>, SplitError> {
    if total <= 0 {
        return Err(SplitError::NonPositiveTotal { total });
    }
    validate_participants(policy, limits)?;

    let shares = match policy {
        SplitPolicy::Equal { participants } => allocate_equal(total, participants),
        SplitPolicy::Exact { amounts } => allocate_exact(total, amounts)?,
        SplitPolicy::Percentage { portions } => allocate_percentage(total, portions)?,
        SplitPolicy::Shares { weights } => allocate_weighted(total, weights)?,
    };

    // Exactness postcondition holds for every policy, by construction
    debug_assert_eq!(
        shares.iter().map(|s| s.amount).sum::<i64>(),
        total,
        "allocated shares must sum to the expense total"
    );

    tracing::debug!(
        policy = policy.kind(),
        total,
        participants = shares.len(),
        "allocated expense split"
    );

    Ok(shares)
}

fn validate_participants(policy: &SplitPolicy, limits: &EngineLimits) -> Result<(), SplitError> {
    let participants = policy.participants();

    if participants.is_empty() {
        return Err(SplitError::NoParticipants);
    }
    if participants.len() > limits.max_participants_per_expense {
        return Err(SplitError::TooManyParticipants {
            count: participants.len(),
            limit: limits.max_participants_per_expense,
        });
    }

    let mut seen = BTreeSet::new();
    for user_id in participants {
        if !seen.insert(user_id) {
            return Err(SplitError::DuplicateParticipant {
                user_id: user_id.to_string(),
            });
        }
    }

    Ok(())
}

/// Equal split: base share for everyone, remainder spread across the
/// first `total % n` participants one minor unit at a time
fn allocate_equal(total: i64, participants: &[String]) -> Vec<SplitShare> {
    let n = participants.len() as i64;
    let base = total / n;
    let remainder = (total % n) as usize;

    participants
        .iter()
        .enumerate()
        .map(|(i, user_id)| SplitShare {
            user_id: user_id.clone(),
            amount: if i < remainder { base + 1 } else { base },
        })
        .collect()
}

/// Exact split: amounts are taken verbatim after validation
fn allocate_exact(total: i64, amounts: &[(String, i64)]) -> Result<Vec<SplitShare>, SplitError> {
    for (user_id, amount) in amounts {
        if *amount < 0 {
            return Err(SplitError::NegativeAmount {
                user_id: user_id.clone(),
                amount: *amount,
            });
        }
    }

    let computed: i64 = amounts.iter().map(|(_, a)| a).sum();
    if computed != total {
        return Err(SplitError::SumMismatch {
            computed,
            expected: total,
        });
    }

    Ok(amounts
        .iter()
        .map(|(user_id, amount)| SplitShare {
            user_id: user_id.clone(),
            amount: *amount,
        })
        .collect())
}

/// Percentage split: rounded per-participant shares, last absorbs residue
fn allocate_percentage(
    total: i64,
    portions: &[(String, f64)],
) -> Result<Vec<SplitShare>, SplitError> {
    for (user_id, percent) in portions {
        if !percent.is_finite() || *percent < 0.0 {
            return Err(SplitError::InvalidPercentage {
                user_id: user_id.clone(),
                percent: *percent,
            });
        }
    }

    let computed: f64 = portions.iter().map(|(_, p)| p).sum();
    if (computed - 100.0).abs() > PERCENT_SUM_TOLERANCE {
        return Err(SplitError::PercentSumMismatch { computed });
    }

    allocate_proportional(total, portions, |percent| percent / 100.0)
}

/// Weighted split: same residue rule as percentage, arbitrary weights
fn allocate_weighted(total: i64, weights: &[(String, f64)]) -> Result<Vec<SplitShare>, SplitError> {
    for (user_id, weight) in weights {
        if !weight.is_finite() || *weight <= 0.0 {
            return Err(SplitError::InvalidWeight {
                user_id: user_id.clone(),
                weight: *weight,
            });
        }
    }

    let total_weight: f64 = weights.iter().map(|(_, w)| w).sum();
    allocate_proportional(total, weights, |weight| weight / total_weight)
}

/// Shared proportional allocation: every participant but the last gets
/// `round(total * fraction)`; the last gets whatever is left so the sum
/// is exact. A residue that would leave the last participant negative is
/// rejected rather than stored.
fn allocate_proportional(
    total: i64,
    portions: &[(String, f64)],
    fraction_of: impl Fn(f64) -> f64,
) -> Result<Vec<SplitShare>, SplitError> {
    let mut shares = Vec::with_capacity(portions.len());
    let mut allocated: i64 = 0;

    for (i, (user_id, portion)) in portions.iter().enumerate() {
        let amount = if i + 1 == portions.len() {
            total - allocated
        } else {
            (total as f64 * fraction_of(*portion)).round() as i64
        };

        if amount < 0 {
            return Err(SplitError::NegativeAmount {
                user_id: user_id.clone(),
                amount,
            });
        }

        allocated += amount;
        shares.push(SplitShare {
            user_id: user_id.clone(),
            amount,
        });
    }

    Ok(shares)
}
