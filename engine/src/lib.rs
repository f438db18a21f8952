//! Tally Core - Balance & Debt-Simplification Engine
//!
//! The numeric core of a shared-expense application: exact split
//! allocation, net-balance aggregation, pairwise debt resolution, and
//! greedy debt simplification.
//!
//! # Architecture
//!
//! - **models**: Domain records (ExpenseRecord, SettlementRecord) and the
//!   GroupSnapshot handed over by storage
//! - **split**: Split allocation (equal / exact / percentage / shares)
//! - **balance**: Net-balance aggregation and pairwise debt resolution
//! - **simplify**: Greedy minimum-cash-flow payment suggestions
//! - **config**: Defensive input limits
//!
//! Data flows one way: expense creation runs the split allocator and
//! stores exact shares; any balance query folds the full history into net
//! balances; the pairwise and simplified views are projections of the
//! same history.
//!
//! # Critical Invariants
//!
//! 1. All money values are i64 (minor units); shares always sum exactly
//!    to their expense total
//! 2. Net balances of any well-formed history sum to exactly 0
//! 3. Everything is a pure, synchronous fold over an immutable snapshot:
//!    no internal state, no caching, deterministic output order
//!
//! Transport, persistence, authentication, and currency conversion are
//! the embedding application's concern; amounts arrive here already
//! converted to one currency per computation.

// Module declarations
pub mod balance;
pub mod config;
pub mod models;
pub mod simplify;
pub mod split;

// Re-exports for convenience
pub use balance::{aggregate, resolve, NetBalances, PairwiseDebt};
pub use config::EngineLimits;
pub use models::{
    expense::{ExpenseError, ExpenseRecord},
    settlement::{SettlementRecord, SettlementRecordError},
    snapshot::{GroupSnapshot, SnapshotError},
};
pub use simplify::{simplify, SuggestedPayment};
pub use split::{allocate, SplitError, SplitPolicy, SplitShare};
