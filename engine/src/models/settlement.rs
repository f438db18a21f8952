//! Settlement record
//!
//! A cash payment from one group member to another, recorded to pay down
//! debt outside of any expense. Immutable once created.
//!
//! CRITICAL: All money values are i64 (minor units)

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when building a settlement record
#[derive(Debug, Error, PartialEq)]
pub enum SettlementRecordError {
    #[error("user {user_id} cannot settle with themselves")]
    SelfSettlement { user_id: String },

    #[error("settlement amount must be positive, got {amount}")]
    NonPositiveAmount { amount: i64 },
}

/// A cash settlement between two group members
///
/// # Example
///
/// ```
/// use tally_core_rs::models::SettlementRecord;
///
/// let settlement = SettlementRecord::new(
///     "trip".to_string(),
///     "bob".to_string(),
///     "alice".to_string(),
///     2_000, // $20.00 in cents
///     "USD".to_string(),
/// )
/// .unwrap();
///
/// assert_eq!(settlement.from_user_id(), "bob");
/// assert_eq!(settlement.to_user_id(), "alice");
/// assert_eq!(settlement.amount(), 2_000);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettlementRecord {
    /// Unique settlement identifier (UUID)
    id: String,

    /// Group this settlement belongs to
    group_id: String,

    /// User who paid
    from_user_id: String,

    /// User who received the money
    to_user_id: String,

    /// Amount paid in minor units (positive)
    amount: i64,

    /// ISO currency code
    currency: String,
}

impl SettlementRecord {
    /// Record a new settlement
    ///
    /// # Errors
    ///
    /// - [`SettlementRecordError::SelfSettlement`] if payer and receiver
    ///   are the same user
    /// - [`SettlementRecordError::NonPositiveAmount`] if `amount <= 0`
    pub fn new(
        group_id: String,
        from_user_id: String,
        to_user_id: String,
        amount: i64,
        currency: String,
    ) -> Result<Self, SettlementRecordError> {
        Self::from_parts(
            uuid::Uuid::new_v4().to_string(),
            group_id,
            from_user_id,
            to_user_id,
            amount,
            currency,
        )
    }

    /// Restore a settlement from stored parts, re-validating invariants
    pub fn from_parts(
        id: String,
        group_id: String,
        from_user_id: String,
        to_user_id: String,
        amount: i64,
        currency: String,
    ) -> Result<Self, SettlementRecordError> {
        if from_user_id == to_user_id {
            return Err(SettlementRecordError::SelfSettlement {
                user_id: from_user_id,
            });
        }
        if amount <= 0 {
            return Err(SettlementRecordError::NonPositiveAmount { amount });
        }

        Ok(Self {
            id,
            group_id,
            from_user_id,
            to_user_id,
            amount,
            currency,
        })
    }

    /// Get settlement ID
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Get group ID
    pub fn group_id(&self) -> &str {
        &self.group_id
    }

    /// Get paying user ID
    pub fn from_user_id(&self) -> &str {
        &self.from_user_id
    }

    /// Get receiving user ID
    pub fn to_user_id(&self) -> &str {
        &self.to_user_id
    }

    /// Get amount in minor units
    pub fn amount(&self) -> i64 {
        self.amount
    }

    /// Get currency code
    pub fn currency(&self) -> &str {
        &self.currency
    }
}
