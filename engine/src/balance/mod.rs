//! Balance Computation
//!
//! Two read-side views over the same group history:
//!
//! - [`aggregate`]: one signed net balance per user, the authoritative
//!   "who owes how much" answer (zero-sum by construction)
//! - [`resolve`]: itemized directed debts per user pair, for detail UIs
//!
//! Both are pure folds over an immutable snapshot; neither keeps state
//! between calls. The pairwise view is a projection of the history, not a
//! second balance computation: the per-user sums of its edges always
//! agree with [`aggregate`].

pub mod aggregate;
pub mod pairwise;

// Re-export public API
pub use aggregate::{aggregate, NetBalances};
pub use pairwise::{resolve, PairwiseDebt};
