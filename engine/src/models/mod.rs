//! Domain models for the balance engine

pub mod expense;
pub mod settlement;
pub mod snapshot;

// Re-exports
pub use expense::{ExpenseError, ExpenseRecord};
pub use settlement::{SettlementRecord, SettlementRecordError};
pub use snapshot::{GroupSnapshot, SnapshotError};
