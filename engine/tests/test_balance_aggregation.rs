//! Balance Aggregation Tests
//!
//! Folds expense/settlement histories into per-user net balances and
//! checks the zero-sum postcondition plus the concrete group scenarios
//! the product cares about.

use tally_core_rs::balance::aggregate;
use tally_core_rs::models::{ExpenseRecord, SettlementRecord};
use tally_core_rs::split::SplitPolicy;

// ============================================================================
// Test Helpers
// ============================================================================

fn equal_expense(payer: &str, total: i64, participants: &[&str]) -> ExpenseRecord {
    ExpenseRecord::new(
        "trip".to_string(),
        payer.to_string(),
        total,
        "USD".to_string(),
        SplitPolicy::Equal {
            participants: participants.iter().map(|s| s.to_string()).collect(),
        },
    )
    .unwrap()
}

fn exact_expense(payer: &str, total: i64, amounts: &[(&str, i64)]) -> ExpenseRecord {
    ExpenseRecord::new(
        "trip".to_string(),
        payer.to_string(),
        total,
        "USD".to_string(),
        SplitPolicy::Exact {
            amounts: amounts
                .iter()
                .map(|(u, a)| (u.to_string(), *a))
                .collect(),
        },
    )
    .unwrap()
}

fn settlement(from: &str, to: &str, amount: i64) -> SettlementRecord {
    SettlementRecord::new(
        "trip".to_string(),
        from.to_string(),
        to.to_string(),
        amount,
        "USD".to_string(),
    )
    .unwrap()
}

fn assert_zero_sum(balances: &tally_core_rs::NetBalances) {
    let total: i64 = balances.iter().map(|(_, v)| v).sum();
    assert_eq!(total, 0, "net balances must sum to zero");
}

// ============================================================================
// Concrete Scenarios
// ============================================================================

#[test]
fn test_hundred_dollars_split_two_ways() {
    // Alice pays $100 split equally between alice and bob
    let balances = aggregate(&[equal_expense("alice", 10_000, &["alice", "bob"])], &[]);

    assert_eq!(balances.get("alice"), 5_000);
    assert_eq!(balances.get("bob"), -5_000);
    assert_zero_sum(&balances);
}

#[test]
fn test_two_expenses_net_against_each_other() {
    // Alice pays $100 equal {alice, bob}; bob pays $60 equal {alice, bob}
    let expenses = [
        equal_expense("alice", 10_000, &["alice", "bob"]),
        equal_expense("bob", 6_000, &["alice", "bob"]),
    ];
    let balances = aggregate(&expenses, &[]);

    assert_eq!(balances.get("alice"), 2_000);
    assert_eq!(balances.get("bob"), -2_000);
    assert_zero_sum(&balances);
}

#[test]
fn test_exact_split_where_payer_covers_nothing() {
    // Alice fronts $50 but the whole cost is bob's and carol's
    let expense = exact_expense("alice", 5_000, &[("bob", 3_000), ("carol", 2_000)]);
    let balances = aggregate(&[expense], &[]);

    assert_eq!(balances.get("alice"), 5_000);
    assert_eq!(balances.get("bob"), -3_000);
    assert_eq!(balances.get("carol"), -2_000);
    assert_zero_sum(&balances);
}

#[test]
fn test_settlement_pays_debt_down() {
    let expenses = [equal_expense("alice", 10_000, &["alice", "bob"])];
    let settlements = [settlement("bob", "alice", 3_000)];
    let balances = aggregate(&expenses, &settlements);

    assert_eq!(balances.get("alice"), 2_000);
    assert_eq!(balances.get("bob"), -2_000);
}

#[test]
fn test_full_settlement_squares_the_group() {
    let expenses = [equal_expense("alice", 10_000, &["alice", "bob"])];
    let settlements = [settlement("bob", "alice", 5_000)];
    let balances = aggregate(&expenses, &settlements);

    assert!(balances.is_settled());
}

#[test]
fn test_settlement_only_history() {
    // A settlement with no expense history still moves balances
    let balances = aggregate(&[], &[settlement("bob", "alice", 1_500)]);

    assert_eq!(balances.get("bob"), 1_500);
    assert_eq!(balances.get("alice"), -1_500);
    assert_zero_sum(&balances);
}

// ============================================================================
// Structural Properties
// ============================================================================

#[test]
fn test_order_independence_across_record_kinds() {
    let e1 = equal_expense("alice", 9_999, &["alice", "bob", "carol"]);
    let e2 = exact_expense("bob", 4_000, &[("alice", 2_500), ("carol", 1_500)]);
    let s1 = settlement("carol", "alice", 1_200);
    let s2 = settlement("bob", "carol", 800);

    let forward = aggregate(&[e1.clone(), e2.clone()], &[s1.clone(), s2.clone()]);
    let reversed = aggregate(&[e2, e1], &[s2, s1]);

    assert_eq!(forward, reversed);
}

#[test]
fn test_uneven_remainder_still_sums_to_zero() {
    // $10.00 across three participants leaves a one-cent remainder
    let balances = aggregate(
        &[equal_expense("alice", 1_000, &["alice", "bob", "carol"])],
        &[],
    );

    assert_eq!(balances.get("alice"), 1_000 - 334);
    assert_eq!(balances.get("bob"), -333);
    assert_eq!(balances.get("carol"), -333);
    assert_zero_sum(&balances);
}

#[test]
fn test_many_expenses_accumulate_per_user() {
    let expenses: Vec<ExpenseRecord> = (0..10)
        .map(|_| equal_expense("alice", 1_000, &["alice", "bob"]))
        .collect();
    let balances = aggregate(&expenses, &[]);

    assert_eq!(balances.get("alice"), 5_000);
    assert_eq!(balances.get("bob"), -5_000);
}
