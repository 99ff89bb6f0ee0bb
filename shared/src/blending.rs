//! Plot-to-tank blending engine
//!
//! Assigns a harvested plot's volume into a tank and maintains the tank's
//! per-variety grape composition as a weighted blend. The functions here
//! compute deltas only; the caller persists the returned rows and must wrap
//! the whole read-compute-write sequence in one database transaction.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{DomainError, DomainResult};
use crate::models::{
    Action, ActionType, GrapeComposition, Plot, PlotTank, Tank, TankStatus,
};

/// Deltas produced by a plot-to-tank transfer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlendingOutcome {
    /// New transfer row to insert
    pub plot_tank: PlotTank,
    /// Upserted (tank, variety) composition row
    pub composition: GrapeComposition,
    /// True when the composition row must be inserted rather than updated
    pub composition_is_new: bool,
    /// Tank status after the transfer (Empty tanks transition to InUse)
    pub tank_status: TankStatus,
    /// Traceability action recording the filling
    pub action: Action,
}

/// Deltas produced by removing wine from a tank
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemovalOutcome {
    /// Composition rows with reduced volumes, to update in place
    pub updated_compositions: Vec<GrapeComposition>,
    /// Composition rows that reached zero, to delete
    pub removed_composition_ids: Vec<Uuid>,
    /// Tank status after removal (full drain transitions to Maintenance)
    pub tank_status: TankStatus,
}

/// Raw transferred volume minus classified composition volume for a tank.
///
/// The asymmetry is deliberate: grape composition may lag the plot-tank
/// ledger while a transfer is being processed, and available capacity is
/// reckoned against the reconciled difference.
pub fn current_tank_volume(
    tank_id: Uuid,
    transfers: &[PlotTank],
    compositions: &[GrapeComposition],
) -> Decimal {
    let transferred: Decimal = transfers
        .iter()
        .filter(|t| t.tank_id == tank_id)
        .map(|t| t.volume_hl)
        .sum();
    let composed: Decimal = compositions
        .iter()
        .filter(|c| c.tank_id == tank_id)
        .map(|c| c.volume_hl)
        .sum();
    transferred - composed
}

/// Assign `volume_hl` of harvest from `plot` into `tank`.
///
/// Validates the volume against the tank's available capacity and the
/// plot's theoretical maximum yield (`surface × yield_ratio`), then returns
/// the rows to persist: a new `PlotTank`, the upserted `GrapeComposition`
/// for the plot's variety, the resulting tank status, and a REMPLISSAGE
/// traceability action dated at `harvest_date` (today when absent).
///
/// No record is mutated here; on error nothing is to be persisted.
pub fn assign_plot_to_tank(
    tank: &Tank,
    plot: &Plot,
    transfers: &[PlotTank],
    compositions: &[GrapeComposition],
    volume_hl: Decimal,
    harvest_date: Option<NaiveDate>,
    yield_ratio_hl_per_ha: Decimal,
) -> DomainResult<BlendingOutcome> {
    if volume_hl <= Decimal::ZERO {
        return Err(DomainError::NonPositiveVolume);
    }

    let used = current_tank_volume(tank.id, transfers, compositions);
    let available_hl = tank.capacity_hl - used;
    if volume_hl > available_hl {
        return Err(DomainError::ExceedsTankCapacity { available_hl });
    }

    let max_yield_hl = plot.max_yield_hl(yield_ratio_hl_per_ha);
    if volume_hl > max_yield_hl {
        return Err(DomainError::ExceedsPlotYield { max_yield_hl });
    }

    let date = harvest_date.unwrap_or_else(|| Utc::now().date_naive());
    let now = Utc::now();

    let existing = compositions
        .iter()
        .find(|c| c.tank_id == tank.id && c.grape_variety == plot.grape_variety);

    let composition = match existing {
        Some(row) => {
            let new_volume = row.volume_hl + volume_hl;
            GrapeComposition {
                id: row.id,
                tank_id: tank.id,
                grape_variety: plot.grape_variety.clone(),
                volume_hl: new_volume,
                percentage: new_volume / tank.capacity_hl * Decimal::from(100),
                updated_at: now,
            }
        }
        None => GrapeComposition {
            id: Uuid::new_v4(),
            tank_id: tank.id,
            grape_variety: plot.grape_variety.clone(),
            volume_hl,
            percentage: volume_hl / tank.capacity_hl * Decimal::from(100),
            updated_at: now,
        },
    };

    let tank_status = match tank.status {
        TankStatus::Empty => TankStatus::InUse,
        status => status,
    };

    Ok(BlendingOutcome {
        plot_tank: PlotTank {
            id: Uuid::new_v4(),
            plot_id: plot.id,
            tank_id: tank.id,
            volume_hl,
            harvest_date: date,
            created_at: now,
        },
        composition_is_new: existing.is_none(),
        composition,
        tank_status,
        action: Action {
            id: Uuid::new_v4(),
            tank_id: tank.id,
            process_id: None,
            action_type: ActionType::Remplissage,
            start_date: date,
            end_date: date,
            notes: None,
            created_at: now,
        },
    })
}

/// Remove `volume_hl` of wine from a tank, reducing every composition row
/// proportionally to its share of the composed volume.
///
/// Rows that reach zero are dropped. Removing the tank's entire composed
/// volume transitions it to Maintenance. Requesting more than the composed
/// volume is a validation error reporting the available total.
pub fn remove_wine_from_tank(
    tank: &Tank,
    compositions: &[GrapeComposition],
    volume_hl: Decimal,
) -> DomainResult<RemovalOutcome> {
    if volume_hl <= Decimal::ZERO {
        return Err(DomainError::NonPositiveVolume);
    }

    let rows: Vec<&GrapeComposition> = compositions
        .iter()
        .filter(|c| c.tank_id == tank.id)
        .collect();
    let composed_hl: Decimal = rows.iter().map(|c| c.volume_hl).sum();

    if volume_hl > composed_hl {
        return Err(DomainError::ExceedsComposedVolume { composed_hl });
    }

    let now = Utc::now();

    // Full drain: everything is removed and the tank goes to maintenance.
    if volume_hl == composed_hl {
        return Ok(RemovalOutcome {
            updated_compositions: Vec::new(),
            removed_composition_ids: rows.iter().map(|c| c.id).collect(),
            tank_status: TankStatus::Maintenance,
        });
    }

    let mut updated = Vec::new();
    let mut removed = Vec::new();

    for row in rows {
        let share = volume_hl * (row.volume_hl / composed_hl);
        let new_volume = row.volume_hl - share;
        if new_volume <= Decimal::ZERO {
            removed.push(row.id);
        } else {
            updated.push(GrapeComposition {
                id: row.id,
                tank_id: row.tank_id,
                grape_variety: row.grape_variety.clone(),
                volume_hl: new_volume,
                percentage: new_volume / tank.capacity_hl * Decimal::from(100),
                updated_at: now,
            });
        }
    }

    Ok(RemovalOutcome {
        updated_compositions: updated,
        removed_composition_ids: removed,
        tank_status: tank.status,
    })
}
