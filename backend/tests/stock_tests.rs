//! Stock consumption checker property-based and unit tests
//!
//! Covers the case-insensitive (name, unit) matching rule, shortfall
//! reporting, and the consumption proposal including negative balances and
//! unmatched consumables.

use chrono::Utc;
use proptest::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use shared::models::{CommodityType, Consumable, Stock};
use shared::stock_check::{
    calculate_stock_consumption, check_consumables_in_stock, get_missing_consumables,
};

/// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn consumable(name: &str, unit: &str, quantity: Decimal) -> Consumable {
    Consumable {
        id: Uuid::new_v4(),
        action_id: Uuid::new_v4(),
        name: name.to_string(),
        unit: unit.to_string(),
        quantity,
        original_quantity: None,
        commodity: CommodityType::Additive,
    }
}

fn stock(name: &str, unit: &str, quantity: Decimal) -> Stock {
    Stock {
        id: Uuid::new_v4(),
        owner_id: Uuid::new_v4(),
        name: name.to_string(),
        unit: unit.to_string(),
        quantity,
        minimum_qty: Decimal::ZERO,
        is_out_of_stock: false,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

mod matching {
    use super::*;

    #[test]
    fn name_and_unit_match_is_case_insensitive() {
        let consumables = vec![consumable("SO2", "g", dec("50"))];
        let stocks = vec![stock("so2", "G", dec("30"))];

        assert!(!check_consumables_in_stock(&consumables, &stocks));

        let missing = get_missing_consumables(&consumables, &stocks);
        assert_eq!(missing.len(), 1);
        assert_eq!(missing[0].available_quantity, dec("30"));
        assert_eq!(missing[0].missing_quantity, dec("20"));
    }

    #[test]
    fn unit_mismatch_means_no_match() {
        let consumables = vec![consumable("SO2", "g", dec("10"))];
        let stocks = vec![stock("SO2", "kg", dec("10"))];

        assert!(!check_consumables_in_stock(&consumables, &stocks));
    }

    #[test]
    fn empty_requirement_list_is_in_stock() {
        assert!(check_consumables_in_stock(&[], &[]));
    }

    #[test]
    fn sufficient_stock_reports_nothing_missing() {
        let consumables = vec![
            consumable("SO2", "g", dec("50")),
            consumable("Bentonite", "kg", dec("2")),
        ];
        let stocks = vec![
            stock("so2", "g", dec("100")),
            stock("bentonite", "kg", dec("2")),
        ];

        assert!(check_consumables_in_stock(&consumables, &stocks));
        assert!(get_missing_consumables(&consumables, &stocks).is_empty());
    }
}

mod consumption {
    use super::*;

    #[test]
    fn consumption_may_leave_a_negative_balance() {
        let consumables = vec![consumable("SO2", "g", dec("50"))];
        let stocks = vec![stock("SO2", "g", dec("30"))];

        let proposal = calculate_stock_consumption(&consumables, &stocks);

        assert_eq!(proposal.updates.len(), 1);
        assert_eq!(proposal.updates[0].new_quantity, dec("-20"));
        assert_eq!(proposal.out_of_stock[0].missing_quantity, dec("20"));
        assert!(proposal.unmatched.is_empty());
    }

    #[test]
    fn unmatched_consumable_reports_full_requirement() {
        let consumables = vec![consumable("Levures", "g", dec("500"))];

        let proposal = calculate_stock_consumption(&consumables, &[]);

        assert!(proposal.updates.is_empty());
        assert_eq!(proposal.unmatched.len(), 1);
        assert_eq!(proposal.unmatched[0].required_quantity, dec("500"));
        assert_eq!(proposal.out_of_stock[0].available_quantity, Decimal::ZERO);
        assert_eq!(proposal.out_of_stock[0].missing_quantity, dec("500"));
    }

    #[test]
    fn exact_consumption_is_not_a_shortfall() {
        let consumables = vec![consumable("SO2", "g", dec("30"))];
        let stocks = vec![stock("SO2", "g", dec("30"))];

        let proposal = calculate_stock_consumption(&consumables, &stocks);

        assert_eq!(proposal.updates[0].new_quantity, Decimal::ZERO);
        assert!(proposal.out_of_stock.is_empty());
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

/// Quantities with two decimal places
fn quantity_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..=1_000_000).prop_map(|cents| Decimal::new(cents, 2))
}

proptest! {
    /// Matched consumption is exact arithmetic: new quantity is stock minus
    /// requirement, and a shortfall entry appears iff it goes negative
    #[test]
    fn test_consumption_arithmetic(
        required in quantity_strategy(),
        available in quantity_strategy(),
    ) {
        let consumables = vec![consumable("SO2", "g", required)];
        let stocks = vec![stock("so2", "G", available)];

        let proposal = calculate_stock_consumption(&consumables, &stocks);

        prop_assert_eq!(proposal.updates.len(), 1);
        prop_assert_eq!(proposal.updates[0].new_quantity, available - required);

        if required > available {
            prop_assert_eq!(proposal.out_of_stock.len(), 1);
            prop_assert_eq!(
                proposal.out_of_stock[0].missing_quantity,
                required - available
            );
        } else {
            prop_assert!(proposal.out_of_stock.is_empty());
        }
    }

    /// The boolean check agrees with the shortfall report
    #[test]
    fn test_check_agrees_with_missing_report(
        required in quantity_strategy(),
        available in quantity_strategy(),
    ) {
        let consumables = vec![consumable("Bentonite", "kg", required)];
        let stocks = vec![stock("Bentonite", "kg", available)];

        let in_stock = check_consumables_in_stock(&consumables, &stocks);
        let missing = get_missing_consumables(&consumables, &stocks);

        prop_assert_eq!(in_stock, missing.is_empty());
    }

    /// Every consumable lands in exactly one of updates or unmatched
    #[test]
    fn test_every_requirement_is_accounted_for(
        quantities in prop::collection::vec(quantity_strategy(), 1..6),
        stocked in prop::collection::vec(any::<bool>(), 1..6),
    ) {
        let consumables: Vec<Consumable> = quantities
            .iter()
            .enumerate()
            .map(|(i, q)| consumable(&format!("item-{}", i), "g", *q))
            .collect();
        let stocks: Vec<Stock> = consumables
            .iter()
            .zip(stocked.iter().cycle())
            .filter(|(_, &has_stock)| has_stock)
            .map(|(c, _)| stock(&c.name, &c.unit, dec("10")))
            .collect();

        let proposal = calculate_stock_consumption(&consumables, &stocks);

        prop_assert_eq!(
            proposal.updates.len() + proposal.unmatched.len(),
            consumables.len()
        );
    }
}
