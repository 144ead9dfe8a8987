//! Property-based tests for settlement invariants
//!
//! These tests use proptest to verify critical invariants:
//! - Money conservation: applying the plan zeroes every balance
//! - Sign respect: debtors only pay, creditors only receive
//! - No self payment
//! - Minimality: plan size matches an exhaustive reference for ≤6 players
//! - Unbalanced input is always rejected

use proptest::prelude::*;
use settlement::{
    solve, verify::residual_balances, Balance, Error, ParticipantId, SettlementSolver,
};
use std::collections::HashMap;

/// Strategy for generating zero-sum balances (2..=max_players entries)
fn balanced_strategy(max_players: usize) -> impl Strategy<Value = Vec<Balance>> {
    prop::collection::vec(-500i64..=500, 1..max_players).prop_map(|mut amounts| {
        let total: i64 = amounts.iter().sum();
        amounts.push(-total);
        amounts
            .into_iter()
            .enumerate()
            .map(|(i, net)| Balance::new(format!("P{}", i), net))
            .collect()
    })
}

/// Strategy for balances drawn from a few magnitudes, which produces many
/// exactly-cancelling subsets
fn chip_strategy(max_players: usize) -> impl Strategy<Value = Vec<Balance>> {
    prop::collection::vec(-4i64..=4, 1..max_players).prop_map(|mut steps| {
        let total: i64 = steps.iter().sum();
        steps.push(-total);
        steps
            .into_iter()
            .enumerate()
            .map(|(i, step)| Balance::new(format!("P{}", i), step * 50))
            .collect()
    })
}

/// Largest number of zero-sum groups the nonzero amounts can be split into,
/// by enumerating every set partition
fn max_zero_sum_groups(amounts: &[i64]) -> usize {
    fn assign(amounts: &[i64], idx: usize, groups: &mut Vec<i64>, best: &mut usize) {
        if idx == amounts.len() {
            if groups.iter().all(|&sum| sum == 0) {
                *best = (*best).max(groups.len());
            }
            return;
        }

        for g in 0..groups.len() {
            groups[g] += amounts[idx];
            assign(amounts, idx + 1, groups, best);
            groups[g] -= amounts[idx];
        }

        groups.push(amounts[idx]);
        assign(amounts, idx + 1, groups, best);
        groups.pop();
    }

    let mut best = 0;
    assign(amounts, 0, &mut Vec::new(), &mut best);
    best
}

fn reference_minimum(balances: &[Balance]) -> usize {
    let amounts: Vec<i64> = balances.iter().map(|b| b.net).filter(|&n| n != 0).collect();
    if amounts.is_empty() {
        return 0;
    }
    amounts.len() - max_zero_sum_groups(&amounts)
}

fn nonzero_count(balances: &[Balance]) -> usize {
    balances.iter().filter(|b| b.net != 0).count()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Property: applying the plan drives every balance to zero
    #[test]
    fn prop_conservation(balances in balanced_strategy(9)) {
        let transactions = solve(&balances).unwrap();
        let residual = residual_balances(&balances, &transactions).unwrap();
        prop_assert!(residual.values().all(|&net| net == 0));
    }

    /// Property: debtors only pay, creditors only receive, nobody pays themselves
    #[test]
    fn prop_sign_respect(balances in chip_strategy(9)) {
        let original: HashMap<ParticipantId, i64> =
            balances.iter().map(|b| (b.id.clone(), b.net)).collect();

        for tx in solve(&balances).unwrap() {
            prop_assert_ne!(&tx.debtor, &tx.creditor);
            prop_assert!(tx.amount > 0);
            prop_assert!(original[&tx.debtor] < 0);
            prop_assert!(original[&tx.creditor] > 0);
        }
    }

    /// Property: plan size equals the exhaustive minimum
    #[test]
    fn prop_minimality(balances in balanced_strategy(6)) {
        let transactions = solve(&balances).unwrap();
        prop_assert_eq!(transactions.len(), reference_minimum(&balances));
    }

    /// Property: minimality also holds when many subsets cancel exactly
    #[test]
    fn prop_minimality_with_cancelling_subsets(balances in chip_strategy(6)) {
        let transactions = solve(&balances).unwrap();
        prop_assert_eq!(transactions.len(), reference_minimum(&balances));
    }

    /// Property: the plan never needs more than (nonzero - 1) payments
    #[test]
    fn prop_upper_bound(balances in balanced_strategy(9)) {
        let active = nonzero_count(&balances);

        let transactions = solve(&balances).unwrap();
        prop_assert!(transactions.len() <= active.saturating_sub(1));
    }

    /// Property: input that does not sum to zero is always rejected
    #[test]
    fn prop_unbalanced_rejected(
        balances in balanced_strategy(9),
        offset in prop_oneof![-1000i64..=-1, 1i64..=1000],
    ) {
        let mut skewed = balances;
        skewed[0].net += offset;

        let err = solve(&skewed).unwrap_err();
        prop_assert!(err.is_input_error());
        prop_assert!(matches!(
            err,
            Error::UnbalancedInput { .. } | Error::SingleLeftover { .. }
        ), "unexpected error variant: {:?}", err);
    }

    /// Property: identical input yields identical output
    #[test]
    fn prop_deterministic(balances in chip_strategy(9)) {
        let solver = SettlementSolver::default();
        prop_assert_eq!(solver.solve(&balances).unwrap(), solver.solve(&balances).unwrap());
    }
}
