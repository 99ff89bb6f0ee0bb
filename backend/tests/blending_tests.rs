//! Plot-to-tank blending property-based and unit tests
//!
//! Covers capacity and yield validation on transfers, weighted composition
//! upserts, tank status transitions, and proportional removal.

use chrono::{NaiveDate, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use shared::blending::{assign_plot_to_tank, current_tank_volume, remove_wine_from_tank};
use shared::error::DomainError;
use shared::models::{
    ActionType, AllocationMode, GrapeComposition, GrapeVariety, Plot, PlotTank, Tank,
    TankMaterial, TankStatus,
};

/// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn tank(capacity_hl: Decimal, status: TankStatus) -> Tank {
    Tank {
        id: Uuid::new_v4(),
        owner_id: Uuid::new_v4(),
        name: "Cuve Inox 1".to_string(),
        capacity_hl,
        status,
        material: TankMaterial::StainlessSteel,
        allocation_mode: AllocationMode::Multi,
        batch_id: None,
        allocated_volume_hl: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn plot(variety: GrapeVariety, surface_ha: Decimal) -> Plot {
    Plot {
        id: Uuid::new_v4(),
        owner_id: Uuid::new_v4(),
        name: "Les Graves".to_string(),
        grape_variety: variety,
        surface_ha,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn composition(tank_id: Uuid, variety: GrapeVariety, volume_hl: Decimal) -> GrapeComposition {
    GrapeComposition {
        id: Uuid::new_v4(),
        tank_id,
        grape_variety: variety,
        volume_hl,
        percentage: Decimal::ZERO,
        updated_at: Utc::now(),
    }
}

fn transfer(tank_id: Uuid, volume_hl: Decimal) -> PlotTank {
    PlotTank {
        id: Uuid::new_v4(),
        plot_id: Uuid::new_v4(),
        tank_id,
        volume_hl,
        harvest_date: NaiveDate::from_ymd_opt(2024, 9, 15).unwrap(),
        created_at: Utc::now(),
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

mod plot_assignment {
    use super::*;

    #[test]
    fn merlot_transfer_fills_empty_tank() {
        let t = tank(dec("100"), TankStatus::Empty);
        let p = plot(GrapeVariety::Merlot, dec("2"));
        let date = NaiveDate::from_ymd_opt(2024, 9, 15).unwrap();

        let outcome =
            assign_plot_to_tank(&t, &p, &[], &[], dec("80"), Some(date), dec("60")).unwrap();

        assert_eq!(outcome.plot_tank.volume_hl, dec("80"));
        assert_eq!(outcome.plot_tank.harvest_date, date);
        assert!(outcome.composition_is_new);
        assert_eq!(outcome.composition.grape_variety, GrapeVariety::Merlot);
        assert_eq!(outcome.composition.percentage, dec("80"));
        assert_eq!(outcome.tank_status, TankStatus::InUse);
        assert_eq!(outcome.action.action_type, ActionType::Remplissage);
        assert_eq!(outcome.action.start_date, date);
    }

    #[test]
    fn same_variety_transfer_merges_into_existing_row() {
        let t = tank(dec("100"), TankStatus::InUse);
        let p = plot(GrapeVariety::Merlot, dec("2"));
        let transfers = vec![transfer(t.id, dec("30"))];
        let comps = vec![composition(t.id, GrapeVariety::Merlot, dec("30"))];

        let outcome =
            assign_plot_to_tank(&t, &p, &transfers, &comps, dec("20"), None, dec("60")).unwrap();

        assert!(!outcome.composition_is_new);
        assert_eq!(outcome.composition.id, comps[0].id);
        assert_eq!(outcome.composition.volume_hl, dec("50"));
        assert_eq!(outcome.composition.percentage, dec("50"));
    }

    #[test]
    fn different_variety_gets_its_own_row() {
        let t = tank(dec("100"), TankStatus::InUse);
        let p = plot(GrapeVariety::CabernetFranc, dec("2"));
        let transfers = vec![transfer(t.id, dec("40"))];
        let comps = vec![composition(t.id, GrapeVariety::Merlot, dec("40"))];

        let outcome =
            assign_plot_to_tank(&t, &p, &transfers, &comps, dec("30"), None, dec("60")).unwrap();

        assert!(outcome.composition_is_new);
        assert_eq!(outcome.composition.grape_variety, GrapeVariety::CabernetFranc);
        assert_eq!(outcome.composition.volume_hl, dec("30"));
    }

    #[test]
    fn transfer_beyond_available_capacity_is_rejected() {
        let t = tank(dec("100"), TankStatus::InUse);
        let p = plot(GrapeVariety::Merlot, dec("10"));
        // 70 transferred, 10 classified: reconciled volume is 60, leaving 40
        let transfers = vec![transfer(t.id, dec("70"))];
        let comps = vec![composition(t.id, GrapeVariety::Merlot, dec("10"))];

        let err = assign_plot_to_tank(&t, &p, &transfers, &comps, dec("50"), None, dec("60"))
            .unwrap_err();

        assert_eq!(err, DomainError::ExceedsTankCapacity { available_hl: dec("40") });
    }

    #[test]
    fn transfer_beyond_plot_yield_is_rejected() {
        let t = tank(dec("500"), TankStatus::Empty);
        let p = plot(GrapeVariety::Syrah, dec("2"));

        // 2 ha × 60 hL/ha caps the harvest at 120 hL
        let err =
            assign_plot_to_tank(&t, &p, &[], &[], dec("150"), None, dec("60")).unwrap_err();

        assert_eq!(err, DomainError::ExceedsPlotYield { max_yield_hl: dec("120") });
    }

    #[test]
    fn non_positive_volume_is_rejected() {
        let t = tank(dec("100"), TankStatus::Empty);
        let p = plot(GrapeVariety::Merlot, dec("2"));

        let err = assign_plot_to_tank(&t, &p, &[], &[], Decimal::ZERO, None, dec("60"))
            .unwrap_err();

        assert_eq!(err, DomainError::NonPositiveVolume);
    }

    #[test]
    fn in_use_tank_keeps_its_status() {
        let t = tank(dec("100"), TankStatus::InUse);
        let p = plot(GrapeVariety::Merlot, dec("2"));

        let outcome =
            assign_plot_to_tank(&t, &p, &[], &[], dec("10"), None, dec("60")).unwrap();

        assert_eq!(outcome.tank_status, TankStatus::InUse);
    }
}

mod tank_volume {
    use super::*;

    #[test]
    fn reconciles_transfers_against_compositions() {
        let id = Uuid::new_v4();
        let transfers = vec![transfer(id, dec("70")), transfer(Uuid::new_v4(), dec("99"))];
        let comps = vec![composition(id, GrapeVariety::Merlot, dec("10"))];

        assert_eq!(current_tank_volume(id, &transfers, &comps), dec("60"));
    }

    #[test]
    fn empty_ledger_is_zero() {
        assert_eq!(current_tank_volume(Uuid::new_v4(), &[], &[]), Decimal::ZERO);
    }
}

mod wine_removal {
    use super::*;

    #[test]
    fn removal_is_proportional_to_composition_shares() {
        let t = tank(dec("100"), TankStatus::InUse);
        let comps = vec![
            composition(t.id, GrapeVariety::Merlot, dec("60")),
            composition(t.id, GrapeVariety::CabernetFranc, dec("20")),
        ];

        let outcome = remove_wine_from_tank(&t, &comps, dec("40")).unwrap();

        // 60:20 split of 40 removed is 30:10
        let merlot = outcome
            .updated_compositions
            .iter()
            .find(|c| c.grape_variety == GrapeVariety::Merlot)
            .unwrap();
        let franc = outcome
            .updated_compositions
            .iter()
            .find(|c| c.grape_variety == GrapeVariety::CabernetFranc)
            .unwrap();
        assert_eq!(merlot.volume_hl, dec("30"));
        assert_eq!(franc.volume_hl, dec("10"));
        assert_eq!(outcome.tank_status, TankStatus::InUse);
    }

    #[test]
    fn full_drain_removes_rows_and_sends_tank_to_maintenance() {
        let t = tank(dec("100"), TankStatus::InUse);
        let comps = vec![
            composition(t.id, GrapeVariety::Merlot, dec("60")),
            composition(t.id, GrapeVariety::CabernetFranc, dec("20")),
        ];

        let outcome = remove_wine_from_tank(&t, &comps, dec("80")).unwrap();

        assert!(outcome.updated_compositions.is_empty());
        assert_eq!(outcome.removed_composition_ids.len(), 2);
        assert_eq!(outcome.tank_status, TankStatus::Maintenance);
    }

    #[test]
    fn removing_more_than_composed_volume_is_rejected() {
        let t = tank(dec("100"), TankStatus::InUse);
        let comps = vec![composition(t.id, GrapeVariety::Merlot, dec("30"))];

        let err = remove_wine_from_tank(&t, &comps, dec("50")).unwrap_err();

        assert_eq!(err, DomainError::ExceedsComposedVolume { composed_hl: dec("30") });
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

/// Volumes in hL with two decimal places
fn volume_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..=50_000).prop_map(|cents| Decimal::new(cents, 2))
}

proptest! {
    /// A transfer within capacity and yield always succeeds and its
    /// composition percentage is volume over tank capacity
    #[test]
    fn test_valid_transfer_percentage(
        volume in volume_strategy(),
    ) {
        // Capacity double the transfer so it always fits; yield cap well above
        let capacity = volume * Decimal::from(2);
        let t = tank(capacity, TankStatus::Empty);
        let p = plot(GrapeVariety::Merlot, dec("1000"));

        let outcome = assign_plot_to_tank(&t, &p, &[], &[], volume, None, dec("60")).unwrap();

        prop_assert_eq!(outcome.composition.volume_hl, volume);
        prop_assert_eq!(
            outcome.composition.percentage,
            volume / capacity * Decimal::from(100)
        );
        prop_assert_eq!(outcome.tank_status, TankStatus::InUse);
    }

    /// Proportional removal conserves volume: the reductions across all
    /// rows sum to the removed volume, and no row goes negative
    #[test]
    fn test_removal_conserves_volume(
        a in volume_strategy(),
        b in volume_strategy(),
        fraction in 1u32..=99,
    ) {
        let t = tank(dec("100000"), TankStatus::InUse);
        let comps = vec![
            composition(t.id, GrapeVariety::Merlot, a),
            composition(t.id, GrapeVariety::Grenache, b),
        ];
        let total = a + b;
        let removed = (total * Decimal::from(fraction) / Decimal::from(100)).round_dp(2);
        prop_assume!(removed > Decimal::ZERO && removed < total);

        let outcome = remove_wine_from_tank(&t, &comps, removed).unwrap();

        let after: Decimal = outcome
            .updated_compositions
            .iter()
            .map(|c| c.volume_hl)
            .sum();
        let reduction = total - after;

        // Decimal division carries 28 significant digits, so per-row shares
        // can drift from the exact total only far below a centiliter
        prop_assert!((reduction - removed).abs() <= dec("0.000001"));
        for comp in &outcome.updated_compositions {
            prop_assert!(comp.volume_hl > Decimal::ZERO);
        }
    }
}
