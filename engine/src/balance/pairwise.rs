//! Pairwise debt resolution
//!
//! Projects the group history onto directed per-pair debts for itemized
//! "alice owes bob" detail views. Two passes:
//!
//! 1. **Accumulate**: signed amounts are gathered on the unordered user
//!    pair over the *whole* history before any edge is emitted; netting
//!    incrementally, expense by expense, would make the result depend on
//!    processing order.
//! 2. **Cancel cycles**: directed debt cycles (a owes b owes c owes a)
//!    are reduced by their bottleneck amount until none remain. A cycle
//!    moves no net money, so cancelling it changes nobody's balance; what
//!    is left is the projection of the net-balance view onto user pairs.
//!
//! # Critical Invariants
//!
//! 1. At most one directed edge per user pair, whatever the number of
//!    records that touched the pair
//! 2. Per-user edge sums always agree with balance aggregation
//! 3. Emitted amounts are always positive; a pair that nets to zero is
//!    omitted, and a history whose debts form only cycles emits nothing
//! 4. Output order is deterministic (canonical pair key order)

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::models::expense::ExpenseRecord;
use crate::models::settlement::SettlementRecord;

/// A directed debt between two specific users (debtor → creditor)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairwiseDebt {
    /// User who owes
    pub from: String,

    /// User who is owed
    pub to: String,

    /// Amount owed in minor units (positive)
    pub amount: i64,

    /// ISO currency code
    pub currency: String,
}

/// Canonical unordered pair key: smaller id first
///
/// Positive accumulated net means `lo` owes `hi`.
fn pair_key(a: &str, b: &str) -> (String, String) {
    if a < b {
        (a.to_string(), b.to_string())
    } else {
        (b.to_string(), a.to_string())
    }
}

/// Accumulate "debtor owes creditor `amount`" onto the canonical key
fn accumulate(
    nets: &mut BTreeMap<(String, String), i64>,
    debtor: &str,
    creditor: &str,
    amount: i64,
) {
    let signed = if debtor < creditor { amount } else { -amount };
    *nets.entry(pair_key(debtor, creditor)).or_insert(0) += signed;
}

/// Resolve a group history into itemized pairwise debts
///
/// For every expense, each split participant other than the payer owes
/// the payer their share. Each settlement pays debt down in the opposite
/// direction. Pairs that net to zero produce no edge, and debt cycles
/// cancel completely.
///
/// # Example
///
/// ```
/// use tally_core_rs::balance::resolve;
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
/// let debts = resolve(&[expense], &[]);
/// assert_eq!(debts.len(), 1);
/// assert_eq!(debts[0].from, "bob");
/// assert_eq!(debts[0].to, "alice");
/// assert_eq!(debts[0].amount, 5_000);
/// ```
pub fn resolve(expenses: &[ExpenseRecord], settlements: &[SettlementRecord]) -> Vec<PairwiseDebt> {
    // Snapshot validation guarantees a single currency; standalone callers
    // get the currency of the records they pass in.
    let currency = expenses
        .first()
        .map(ExpenseRecord::currency)
        .or_else(|| settlements.first().map(SettlementRecord::currency))
        .unwrap_or_default()
        .to_string();

    let mut nets: BTreeMap<(String, String), i64> = BTreeMap::new();

    for expense in expenses {
        for share in expense.splits() {
            if share.user_id != expense.payer_id() && share.amount != 0 {
                accumulate(&mut nets, &share.user_id, expense.payer_id(), share.amount);
            }
        }
    }

    for settlement in settlements {
        // A payment reduces what the payer owes the receiver
        accumulate(
            &mut nets,
            settlement.to_user_id(),
            settlement.from_user_id(),
            settlement.amount(),
        );
    }

    // Normalize into a directed debtor → creditor adjacency
    let mut graph = DebtGraph::default();
    for ((lo, hi), net) in nets {
        match net.cmp(&0) {
            std::cmp::Ordering::Greater => graph.insert(lo, hi, net),
            std::cmp::Ordering::Less => graph.insert(hi, lo, -net),
            std::cmp::Ordering::Equal => {}
        }
    }

    graph.cancel_cycles();

    let debts: Vec<PairwiseDebt> = graph
        .into_edges()
        .map(|(from, to, amount)| PairwiseDebt {
            from,
            to,
            amount,
            currency: currency.clone(),
        })
        .collect();

    debug_assert!(
        {
            let mut pairs: Vec<(String, String)> =
                debts.iter().map(|d| pair_key(&d.from, &d.to)).collect();
            pairs.sort();
            pairs.windows(2).all(|w| w[0] != w[1])
        },
        "pairwise resolution emitted two edges for one user pair"
    );

    tracing::debug!(
        expenses = expenses.len(),
        settlements = settlements.len(),
        edges = debts.len(),
        "resolved pairwise debts"
    );

    debts
}

/// Directed debt graph with deterministic iteration
///
/// Adjacency is debtor → creditor → amount; all maps are BTreeMaps so
/// cycle search visits vertices and neighbors in id order, which pins
/// down which cycle cancels first when several overlap.
#[derive(Debug, Default)]
struct DebtGraph {
    adj: BTreeMap<String, BTreeMap<String, i64>>,
}

impl DebtGraph {
    fn insert(&mut self, from: String, to: String, amount: i64) {
        self.adj.entry(from).or_default().insert(to, amount);
    }

    /// Cancel directed cycles until the graph is acyclic
    ///
    /// Every round finds the first cycle in id order and subtracts its
    /// bottleneck amount from each edge on it; the bottleneck edge drops
    /// out, so this terminates after at most one round per edge. Each
    /// vertex on a cycle pays and receives the same amount, so per-user
    /// nets are untouched.
    fn cancel_cycles(&mut self) {
        while let Some(cycle) = self.find_cycle() {
            let bottleneck = cycle
                .windows(2)
                .map(|w| self.adj[&w[0]][&w[1]])
                .min()
                .unwrap_or(0);

            for w in cycle.windows(2) {
                let remaining = {
                    let amount = self
                        .adj
                        .get_mut(&w[0])
                        .and_then(|out| out.get_mut(&w[1]))
                        .unwrap();
                    *amount -= bottleneck;
                    *amount
                };
                if remaining == 0 {
                    self.remove_edge(&w[0], &w[1]);
                }
            }
        }
    }

    fn remove_edge(&mut self, from: &str, to: &str) {
        if let Some(out) = self.adj.get_mut(from) {
            out.remove(to);
            if out.is_empty() {
                self.adj.remove(from);
            }
        }
    }

    /// First directed cycle in vertex-id order, as [v0, ..., vk, v0]
    ///
    /// Vertices fully explored without closing a cycle are never visited
    /// again, keeping one search pass linear in the graph size.
    fn find_cycle(&self) -> Option<Vec<String>> {
        let mut finished: BTreeSet<String> = BTreeSet::new();
        for start in self.adj.keys() {
            if finished.contains(start) {
                continue;
            }
            let mut path = vec![start.clone()];
            if let Some(cycle) = self.dfs_cycle(&mut path, &mut finished) {
                return Some(cycle);
            }
        }
        None
    }

    fn dfs_cycle(
        &self,
        path: &mut Vec<String>,
        finished: &mut BTreeSet<String>,
    ) -> Option<Vec<String>> {
        let current = path.last().cloned()?;

        if let Some(neighbors) = self.adj.get(&current) {
            for next in neighbors.keys() {
                if finished.contains(next) {
                    continue;
                }
                if let Some(pos) = path.iter().position(|v| v == next) {
                    let mut cycle = path[pos..].to_vec();
                    cycle.push(next.clone());
                    return Some(cycle);
                }
                path.push(next.clone());
                if let Some(cycle) = self.dfs_cycle(path, finished) {
                    return Some(cycle);
                }
                path.pop();
            }
        }

        finished.insert(current);
        None
    }

    /// Remaining edges ordered by canonical pair key
    fn into_edges(self) -> impl Iterator<Item = (String, String, i64)> {
        let mut edges: Vec<(String, String, i64)> = self
            .adj
            .into_iter()
            .flat_map(|(from, out)| {
                out.into_iter()
                    .map(move |(to, amount)| (from.clone(), to, amount))
            })
            .collect();
        edges.sort_by(|a, b| pair_key(&a.0, &a.1).cmp(&pair_key(&b.0, &b.1)));
        edges.into_iter()
    }
}
