//! Batch allocation property-based and unit tests
//!
//! Covers volume conservation across tank allocations, progress reporting
//! on degenerate inputs, the best-fit/worst-fit sort asymmetry of the
//! availability search, and the greedy placement heuristic.

use chrono::Utc;
use proptest::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use shared::allocation::{
    calculate_allocation, find_available_tanks, suggest_optimal_allocation, CandidateTank,
    TankAllocation, TankFillPolicy,
};
use shared::models::Batch;

/// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn batch(quantity_hl: Decimal) -> Batch {
    Batch {
        id: Uuid::new_v4(),
        owner_id: Uuid::new_v4(),
        name: "Cuvée Tradition".to_string(),
        quantity_hl,
        description: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn allocation(capacity_hl: Decimal, allocated_volume_hl: Decimal) -> TankAllocation {
    TankAllocation {
        tank_id: Uuid::new_v4(),
        tank_name: "Cuve Inox".to_string(),
        capacity_hl,
        allocated_volume_hl,
    }
}

fn candidate(available_hl: Decimal, claimed: bool) -> CandidateTank {
    CandidateTank {
        tank_id: Uuid::new_v4(),
        name: format!("Cuve {}", available_hl),
        capacity_hl: available_hl,
        available_capacity_hl: available_hl,
        batch_id: claimed.then(Uuid::new_v4),
    }
}

// ============================================================================
// Property Test Strategies
// ============================================================================

/// Volumes in hL with two decimal places, up to 1000 hL
fn volume_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..=100_000).prop_map(|cents| Decimal::new(cents, 2))
}

/// A set of tank allocations with positive capacities and volumes
fn allocations_strategy() -> impl Strategy<Value = Vec<TankAllocation>> {
    prop::collection::vec(
        (volume_strategy(), volume_strategy())
            .prop_map(|(capacity, allocated)| allocation(capacity, allocated)),
        0..8,
    )
}

/// Candidate tanks, some claimed by other batches
fn candidates_strategy() -> impl Strategy<Value = Vec<CandidateTank>> {
    prop::collection::vec(
        (volume_strategy(), any::<bool>()).prop_map(|(v, claimed)| candidate(v, claimed)),
        0..8,
    )
}

// ============================================================================
// Unit Tests
// ============================================================================

mod allocation_summary {
    use super::*;

    #[test]
    fn sums_allocations_and_reports_remaining() {
        let b = batch(dec("100"));
        let summary = calculate_allocation(
            &b,
            &[
                allocation(dec("80"), dec("40")),
                allocation(dec("50"), dec("30")),
            ],
        );

        assert_eq!(summary.allocated_volume_hl, dec("70"));
        assert_eq!(summary.remaining_volume_hl, dec("30"));
        assert_eq!(summary.progress_percent, 70);
        assert!(!summary.is_fully_allocated);
    }

    #[test]
    fn zero_quantity_batch_reports_zero_progress() {
        let b = batch(Decimal::ZERO);
        let summary = calculate_allocation(&b, &[]);

        assert_eq!(summary.progress_percent, 0);
        assert!(summary.is_fully_allocated);
    }

    #[test]
    fn per_tank_utilization_against_capacity() {
        let b = batch(dec("100"));
        let summary = calculate_allocation(&b, &[allocation(dec("200"), dec("50"))]);

        assert_eq!(summary.tanks[0].utilization_percent, 25);
    }

    #[test]
    fn over_allocated_batch_clamps_remaining_and_exceeds_100_percent() {
        let b = batch(dec("50"));
        let summary = calculate_allocation(&b, &[allocation(dec("100"), dec("70"))]);

        assert_eq!(summary.remaining_volume_hl, Decimal::ZERO);
        assert_eq!(summary.progress_percent, 140);
    }
}

mod availability_search {
    use super::*;

    #[test]
    fn best_fit_sorts_smallest_first() {
        let tanks = vec![
            candidate(dec("100"), false),
            candidate(dec("30"), false),
            candidate(dec("60"), false),
        ];
        let found = find_available_tanks(&tanks, dec("25"), TankFillPolicy::BestFit);

        let availables: Vec<Decimal> = found.iter().map(|t| t.available_capacity_hl).collect();
        assert_eq!(availables, vec![dec("30"), dec("60"), dec("100")]);
    }

    #[test]
    fn worst_fit_sorts_largest_first() {
        let tanks = vec![
            candidate(dec("30"), false),
            candidate(dec("100"), false),
            candidate(dec("60"), false),
        ];
        let found = find_available_tanks(&tanks, dec("25"), TankFillPolicy::WorstFit);

        let availables: Vec<Decimal> = found.iter().map(|t| t.available_capacity_hl).collect();
        assert_eq!(availables, vec![dec("100"), dec("60"), dec("30")]);
    }

    #[test]
    fn claimed_tanks_are_never_candidates() {
        let tanks = vec![candidate(dec("100"), true), candidate(dec("60"), false)];
        let found = find_available_tanks(&tanks, dec("10"), TankFillPolicy::BestFit);

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].available_capacity_hl, dec("60"));
    }

    #[test]
    fn exact_fit_is_included() {
        let tanks = vec![candidate(dec("25"), false)];
        let found = find_available_tanks(&tanks, dec("25"), TankFillPolicy::BestFit);

        assert_eq!(found.len(), 1);
    }
}

mod greedy_suggestion {
    use super::*;

    #[test]
    fn fills_largest_tanks_first() {
        let tanks = vec![
            candidate(dec("30"), false),
            candidate(dec("100"), false),
            candidate(dec("60"), false),
        ];
        let suggestion = suggest_optimal_allocation(dec("120"), &tanks);

        assert!(suggestion.is_fully_covered);
        assert_eq!(suggestion.assignments[0].volume_hl, dec("100"));
        assert_eq!(suggestion.assignments[1].volume_hl, dec("20"));
    }

    #[test]
    fn overflow_is_reported_as_unallocated() {
        let tanks = vec![candidate(dec("30"), false)];
        let suggestion = suggest_optimal_allocation(dec("50"), &tanks);

        assert!(!suggestion.is_fully_covered);
        assert_eq!(suggestion.unallocated_hl, dec("20"));
    }

    #[test]
    fn no_candidates_leaves_everything_unallocated() {
        let suggestion = suggest_optimal_allocation(dec("40"), &[]);

        assert!(suggestion.assignments.is_empty());
        assert_eq!(suggestion.unallocated_hl, dec("40"));
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

proptest! {
    /// Volume conservation: allocated always equals the sum of tank rows,
    /// and remaining + allocated == quantity whenever not over-allocated
    #[test]
    fn test_allocation_conserves_volume(
        quantity in volume_strategy(),
        allocations in allocations_strategy()
    ) {
        let b = batch(quantity);
        let summary = calculate_allocation(&b, &allocations);

        let expected_total: Decimal =
            allocations.iter().map(|a| a.allocated_volume_hl).sum();
        prop_assert_eq!(summary.allocated_volume_hl, expected_total);

        if expected_total <= quantity {
            prop_assert_eq!(
                summary.remaining_volume_hl + summary.allocated_volume_hl,
                quantity
            );
        } else {
            prop_assert_eq!(summary.remaining_volume_hl, Decimal::ZERO);
        }
    }

    /// Remaining volume is never negative
    #[test]
    fn test_remaining_never_negative(
        quantity in volume_strategy(),
        allocations in allocations_strategy()
    ) {
        let summary = calculate_allocation(&batch(quantity), &allocations);
        prop_assert!(summary.remaining_volume_hl >= Decimal::ZERO);
    }

    /// Every availability result can actually hold the requested volume
    /// and is unclaimed
    #[test]
    fn test_available_tanks_fit_the_request(
        required in volume_strategy(),
        tanks in candidates_strategy()
    ) {
        let found = find_available_tanks(&tanks, required, TankFillPolicy::BestFit);
        for tank in &found {
            prop_assert!(tank.available_capacity_hl >= required);
            prop_assert!(tank.batch_id.is_none());
        }
    }

    /// The two fill policies return the same candidate set, reversed order
    #[test]
    fn test_fill_policies_agree_on_membership(
        required in volume_strategy(),
        tanks in candidates_strategy()
    ) {
        let best = find_available_tanks(&tanks, required, TankFillPolicy::BestFit);
        let worst = find_available_tanks(&tanks, required, TankFillPolicy::WorstFit);

        prop_assert_eq!(best.len(), worst.len());
        let best_ids: std::collections::HashSet<Uuid> =
            best.iter().map(|t| t.tank_id).collect();
        let worst_ids: std::collections::HashSet<Uuid> =
            worst.iter().map(|t| t.tank_id).collect();
        prop_assert_eq!(best_ids, worst_ids);
    }

    /// Greedy placement conserves the requested volume: placed + unallocated
    /// equals the request, and no assignment exceeds its tank's availability
    #[test]
    fn test_suggestion_conserves_volume(
        volume in volume_strategy(),
        tanks in candidates_strategy()
    ) {
        let suggestion = suggest_optimal_allocation(volume, &tanks);

        let placed: Decimal = suggestion.assignments.iter().map(|a| a.volume_hl).sum();
        prop_assert_eq!(placed + suggestion.unallocated_hl, volume);
        prop_assert_eq!(
            suggestion.is_fully_covered,
            suggestion.unallocated_hl == Decimal::ZERO
        );

        for assignment in &suggestion.assignments {
            let tank = tanks.iter().find(|t| t.tank_id == assignment.tank_id).unwrap();
            prop_assert!(assignment.volume_hl <= tank.available_capacity_hl);
            prop_assert!(assignment.volume_hl > Decimal::ZERO);
        }
    }
}
