//! Property-based tests for tally-core.
//!
//! These tests verify invariants of balances and the account arena hold
//! for arbitrary inputs using proptest.

use proptest::prelude::*;
use rust_decimal::Decimal;
use tally_core::{AccountTree, Amount, Balance};

// ============================================================================
// Arbitrary generators
// ============================================================================

fn arb_decimal() -> impl Strategy<Value = Decimal> {
    (-1_000_000i64..1_000_000i64).prop_map(|n| Decimal::new(n, 2))
}

fn arb_commodity() -> impl Strategy<Value = &'static str> {
    prop_oneof![Just("USD"), Just("EUR"), Just("AAPL")]
}

fn arb_amount() -> impl Strategy<Value = Amount> {
    (arb_decimal(), arb_commodity()).prop_map(|(n, c)| Amount::new(n, c))
}

fn arb_path() -> impl Strategy<Value = String> {
    prop::collection::vec("[A-Z][a-z]{1,6}", 1..4).prop_map(|segs| segs.join(":"))
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    /// Adding amounts in any order yields the same balance.
    #[test]
    fn prop_balance_addition_commutes(mut amounts in prop::collection::vec(arb_amount(), 0..12)) {
        let mut forward = Balance::new();
        for a in &amounts {
            forward.add_amount(a);
        }
        amounts.reverse();
        let mut backward = Balance::new();
        for a in &amounts {
            backward.add_amount(a);
        }
        prop_assert_eq!(forward, backward);
    }

    /// A balance plus its negation is zero, and zero slots never linger.
    #[test]
    fn prop_balance_cancels(amounts in prop::collection::vec(arb_amount(), 0..12)) {
        let mut balance = Balance::new();
        for a in &amounts {
            balance.add_amount(a);
        }
        let mut cancelled = balance.clone();
        cancelled.add_balance(&-balance);
        prop_assert!(cancelled.is_zero());
        prop_assert_eq!(cancelled.len(), 0);
    }

    /// `find_or_create` is idempotent and creates every ancestor.
    #[test]
    fn prop_find_or_create_idempotent(paths in prop::collection::vec(arb_path(), 1..10)) {
        let mut tree = AccountTree::new();
        for path in &paths {
            let first = tree.find_or_create(path);
            let second = tree.find_or_create(path);
            prop_assert_eq!(first, second);
            prop_assert_eq!(tree.find(path), Some(first));

            // Every prefix of the path exists too.
            let mut prefix = String::new();
            for seg in path.split(':') {
                if !prefix.is_empty() {
                    prefix.push(':');
                }
                prefix.push_str(seg);
                prop_assert!(tree.find(&prefix).is_some(), "missing {prefix}");
            }
        }
    }

    /// Parents always precede children in the arena, so a single reverse
    /// sweep can roll totals up.
    #[test]
    fn prop_parent_index_below_child(paths in prop::collection::vec(arb_path(), 1..10)) {
        let mut tree = AccountTree::new();
        for path in &paths {
            tree.find_or_create(path);
        }
        for id in tree.ids() {
            if let Some(parent) = tree.get(id).parent {
                prop_assert!(parent.0 < id.0);
            }
        }
    }
}
