//! Property-based tests for lotbasis-core.
//!
//! These tests verify inventory and averaging invariants hold for arbitrary
//! lot queues using proptest.
//!
//! Run with: cargo test -p lotbasis-core --test `property_tests`

use chrono::NaiveDate;
use lotbasis_core::{
    array_price_dates, average_cost, total_quantity, total_unit_basis, CostLot, Inventory, Sku,
};
use proptest::prelude::*;
use rust_decimal::Decimal;

// ============================================================================
// Arbitrary generators
// ============================================================================

fn arb_cost() -> impl Strategy<Value = Decimal> {
    (-100_000i64..100_000i64).prop_map(|n| Decimal::new(n, 2))
}

fn arb_date() -> impl Strategy<Value = NaiveDate> {
    (2018i32..2024i32, 1u32..13u32, 1u32..29u32)
        .prop_map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).unwrap())
}

fn arb_lot() -> impl Strategy<Value = CostLot> {
    (
        1u64..50u64,
        prop::collection::vec((arb_date(), arb_cost()), 1..4),
    )
        .prop_map(|(quantity, components)| {
            components
                .into_iter()
                .fold(CostLot::new(quantity), |lot, (date, cost)| {
                    lot.with_component(date, cost)
                })
        })
}

fn arb_sku() -> impl Strategy<Value = Sku> {
    (1u64..4u64).prop_map(Sku)
}

fn arb_inventory() -> impl Strategy<Value = Inventory> {
    prop::collection::vec((arb_sku(), arb_lot()), 0..12).prop_map(|lots| {
        let mut inv = Inventory::new();
        for (sku, lot) in lots {
            inv.add(sku, lot);
        }
        inv
    })
}

// ============================================================================
// Aggregation Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Collapsing the date map gives the summed lot basis
    #[test]
    fn prop_array_price_dates_matches_product_basis(lots in prop::collection::vec(arb_lot(), 0..8)) {
        let expected: Decimal = lots.iter().map(CostLot::product_basis).sum();
        prop_assert_eq!(total_unit_basis(&array_price_dates(&lots)), expected);
    }

    /// Average cost times quantity recovers total basis
    #[test]
    fn prop_average_cost_recovers_total(lots in prop::collection::vec(arb_lot(), 1..8)) {
        let quantity = total_quantity(&lots);
        let average = average_cost(&lots).unwrap();
        let expected: Decimal = lots.iter().map(CostLot::product_basis).sum();
        let diff = (average * Decimal::from(quantity) - expected).abs();
        prop_assert!(diff < Decimal::new(1, 6), "diff {}", diff);
    }
}

// ============================================================================
// Depletion Properties
// ============================================================================

proptest! {
    /// Depletion conserves units and basis
    #[test]
    fn prop_deplete_conserves_units(inv in arb_inventory(), sku in arb_sku(), take in 0u64..200u64) {
        let mut after = inv.clone();
        let held = inv.units(sku);

        match after.deplete(sku, take) {
            Ok(consumed) => {
                prop_assert!(take <= held);
                prop_assert_eq!(total_quantity(&consumed), take);
                prop_assert_eq!(after.units(sku) + take, held);

                let before_basis = total_unit_basis(&inv.book_value(sku));
                let after_basis = total_unit_basis(&after.book_value(sku))
                    + total_unit_basis(&array_price_dates(&consumed));
                prop_assert_eq!(before_basis, after_basis);
            }
            Err(_) => {
                prop_assert!(take > held);
                prop_assert_eq!(&after, &inv);
            }
        }
    }

    /// No SKU is ever left with an empty queue
    #[test]
    fn prop_no_empty_queues(inv in arb_inventory(), sku in arb_sku(), take in 0u64..200u64) {
        let mut inv = inv;
        let _ = inv.deplete(sku, take);
        for (_, queue) in inv.iter() {
            prop_assert!(!queue.is_empty());
            prop_assert!(queue.iter().all(|lot| lot.quantity > 0));
        }
    }

    /// Other SKUs are untouched by depletion
    #[test]
    fn prop_deplete_isolated_to_sku(inv in arb_inventory(), sku in arb_sku(), take in 0u64..200u64) {
        let mut after = inv.clone();
        let _ = after.deplete(sku, take);
        for other in inv.skus().filter(|s| *s != sku) {
            prop_assert_eq!(inv.lots(other), after.lots(other));
        }
    }
}
