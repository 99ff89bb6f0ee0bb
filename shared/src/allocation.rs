//! Batch allocation calculator
//!
//! Pure projections over a batch and the tank allocations referencing it:
//! how much of the declared quantity is physically in tanks, what remains,
//! and per-tank utilization. These are display-oriented calculations and
//! never fail: degenerate inputs (zero quantity, zero capacity) degrade to
//! zero percentages so a page render cannot crash.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::Batch;

/// One tank's allocation for a given batch, as loaded from the
/// `tank_batches` join
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TankAllocation {
    pub tank_id: Uuid,
    pub tank_name: String,
    pub capacity_hl: Decimal,
    pub allocated_volume_hl: Decimal,
}

/// Per-tank view within a batch allocation summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TankAllocationView {
    pub tank_id: Uuid,
    pub tank_name: String,
    pub capacity_hl: Decimal,
    pub allocated_volume_hl: Decimal,
    /// round(allocated / capacity × 100), 0 when capacity ≤ 0
    pub utilization_percent: i32,
}

/// Allocation summary for a batch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchAllocation {
    pub batch_id: Uuid,
    pub quantity_hl: Decimal,
    pub allocated_volume_hl: Decimal,
    pub remaining_volume_hl: Decimal,
    /// round(allocated / quantity × 100), 0 when quantity ≤ 0
    pub progress_percent: i32,
    pub is_fully_allocated: bool,
    pub tanks: Vec<TankAllocationView>,
}

/// Tank candidate for allocation searches
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateTank {
    pub tank_id: Uuid,
    pub name: String,
    pub capacity_hl: Decimal,
    pub available_capacity_hl: Decimal,
    /// Set when the tank is already claimed by a batch (legacy single-batch
    /// mode, or a multi-batch tank treated as claimed by its first batch)
    pub batch_id: Option<Uuid>,
}

/// Sort policy for allocation candidate lists.
///
/// `BestFit` (smallest available capacity first) is the historical behavior
/// of the availability search; `WorstFit` (largest first) is what the
/// greedy suggestion uses. The two coexist on purpose; callers pick.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TankFillPolicy {
    BestFit,
    WorstFit,
}

/// One suggested tank assignment from the greedy placement heuristic
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuggestedAssignment {
    pub tank_id: Uuid,
    pub tank_name: String,
    pub volume_hl: Decimal,
}

/// Result of the greedy placement heuristic
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocationSuggestion {
    pub assignments: Vec<SuggestedAssignment>,
    /// Volume that could not be placed in any candidate tank
    pub unallocated_hl: Decimal,
    pub is_fully_covered: bool,
}

/// Rounded percentage of `part` over `whole`, 0 when `whole` ≤ 0
fn percentage(part: Decimal, whole: Decimal) -> i32 {
    if whole <= Decimal::ZERO {
        return 0;
    }
    (part / whole * Decimal::from(100))
        .round()
        .to_i32()
        .unwrap_or(0)
}

/// Compute the allocation summary for a batch given its tank allocations.
///
/// Pure projection, no side effects. Conservation holds exactly:
/// `allocated = Σ tank.allocated_volume_hl` and, whenever allocated does not
/// exceed the declared quantity, `remaining + allocated == quantity`.
pub fn calculate_allocation(batch: &Batch, allocations: &[TankAllocation]) -> BatchAllocation {
    let allocated_volume_hl: Decimal = allocations.iter().map(|a| a.allocated_volume_hl).sum();
    let remaining_volume_hl = (batch.quantity_hl - allocated_volume_hl).max(Decimal::ZERO);

    let tanks = allocations
        .iter()
        .map(|a| TankAllocationView {
            tank_id: a.tank_id,
            tank_name: a.tank_name.clone(),
            capacity_hl: a.capacity_hl,
            allocated_volume_hl: a.allocated_volume_hl,
            utilization_percent: percentage(a.allocated_volume_hl, a.capacity_hl),
        })
        .collect();

    BatchAllocation {
        batch_id: batch.id,
        quantity_hl: batch.quantity_hl,
        allocated_volume_hl,
        remaining_volume_hl,
        progress_percent: percentage(allocated_volume_hl, batch.quantity_hl),
        is_fully_allocated: remaining_volume_hl == Decimal::ZERO,
        tanks,
    }
}

/// Find unclaimed tanks able to hold `required_volume_hl`, sorted per the
/// given policy. The historical availability search uses `BestFit`.
pub fn find_available_tanks(
    tanks: &[CandidateTank],
    required_volume_hl: Decimal,
    policy: TankFillPolicy,
) -> Vec<CandidateTank> {
    let mut candidates: Vec<CandidateTank> = tanks
        .iter()
        .filter(|t| t.batch_id.is_none() && t.available_capacity_hl >= required_volume_hl)
        .cloned()
        .collect();

    match policy {
        TankFillPolicy::BestFit => {
            candidates.sort_by(|a, b| a.available_capacity_hl.cmp(&b.available_capacity_hl))
        }
        TankFillPolicy::WorstFit => {
            candidates.sort_by(|a, b| b.available_capacity_hl.cmp(&a.available_capacity_hl))
        }
    }
    candidates
}

/// Greedy placement of a batch volume across unclaimed tanks, largest
/// available capacity first.
///
/// First-fit-decreasing heuristic: assigns `min(remaining, available)` to
/// each candidate in order until the volume is placed or candidates run
/// out. Not globally optimal — it minimizes neither tank count nor
/// fragmentation.
pub fn suggest_optimal_allocation(
    batch_volume_hl: Decimal,
    tanks: &[CandidateTank],
) -> AllocationSuggestion {
    let mut candidates: Vec<CandidateTank> = tanks
        .iter()
        .filter(|t| t.batch_id.is_none() && t.available_capacity_hl > Decimal::ZERO)
        .cloned()
        .collect();
    candidates.sort_by(|a, b| b.available_capacity_hl.cmp(&a.available_capacity_hl));

    let mut remaining = batch_volume_hl.max(Decimal::ZERO);
    let mut assignments = Vec::new();

    for tank in candidates {
        if remaining == Decimal::ZERO {
            break;
        }
        let volume = remaining.min(tank.available_capacity_hl);
        assignments.push(SuggestedAssignment {
            tank_id: tank.tank_id,
            tank_name: tank.name,
            volume_hl: volume,
        });
        remaining -= volume;
    }

    AllocationSuggestion {
        assignments,
        unallocated_hl: remaining,
        is_fully_covered: remaining == Decimal::ZERO,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn batch(quantity: &str) -> Batch {
        Batch {
            id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            name: "Cuvée Prestige".to_string(),
            quantity_hl: dec(quantity),
            description: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn alloc(capacity: &str, allocated: &str) -> TankAllocation {
        TankAllocation {
            tank_id: Uuid::new_v4(),
            tank_name: "Cuve Inox 1".to_string(),
            capacity_hl: dec(capacity),
            allocated_volume_hl: dec(allocated),
        }
    }

    fn candidate(available: &str, claimed: bool) -> CandidateTank {
        CandidateTank {
            tank_id: Uuid::new_v4(),
            name: format!("Cuve {}", available),
            capacity_hl: dec(available),
            available_capacity_hl: dec(available),
            batch_id: claimed.then(Uuid::new_v4),
        }
    }

    #[test]
    fn allocation_sums_tanks_and_reports_remaining() {
        let b = batch("100");
        let summary = calculate_allocation(&b, &[alloc("80", "40"), alloc("50", "30")]);

        assert_eq!(summary.allocated_volume_hl, dec("70"));
        assert_eq!(summary.remaining_volume_hl, dec("30"));
        assert_eq!(summary.progress_percent, 70);
        assert!(!summary.is_fully_allocated);
    }

    #[test]
    fn fully_allocated_batch_has_zero_remaining() {
        let b = batch("60");
        let summary = calculate_allocation(&b, &[alloc("80", "60")]);

        assert_eq!(summary.remaining_volume_hl, Decimal::ZERO);
        assert_eq!(summary.progress_percent, 100);
        assert!(summary.is_fully_allocated);
    }

    #[test]
    fn zero_quantity_degrades_to_zero_percent() {
        let b = batch("0");
        let summary = calculate_allocation(&b, &[]);

        assert_eq!(summary.progress_percent, 0);
        assert_eq!(summary.remaining_volume_hl, Decimal::ZERO);
    }

    #[test]
    fn utilization_handles_zero_capacity() {
        let b = batch("100");
        let summary = calculate_allocation(&b, &[alloc("0", "10")]);

        assert_eq!(summary.tanks[0].utilization_percent, 0);
    }

    #[test]
    fn over_allocation_clamps_remaining_to_zero() {
        let b = batch("50");
        let summary = calculate_allocation(&b, &[alloc("80", "70")]);

        assert_eq!(summary.remaining_volume_hl, Decimal::ZERO);
        assert_eq!(summary.progress_percent, 140);
        assert!(summary.is_fully_allocated);
    }

    #[test]
    fn find_available_best_fit_sorts_ascending() {
        let tanks = vec![candidate("100", false), candidate("30", false), candidate("60", false)];
        let found = find_available_tanks(&tanks, dec("25"), TankFillPolicy::BestFit);

        let capacities: Vec<Decimal> = found.iter().map(|t| t.available_capacity_hl).collect();
        assert_eq!(capacities, vec![dec("30"), dec("60"), dec("100")]);
    }

    #[test]
    fn find_available_excludes_claimed_and_small_tanks() {
        let tanks = vec![candidate("100", true), candidate("20", false), candidate("60", false)];
        let found = find_available_tanks(&tanks, dec("25"), TankFillPolicy::BestFit);

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].available_capacity_hl, dec("60"));
    }

    #[test]
    fn suggestion_fills_largest_tanks_first() {
        let tanks = vec![candidate("30", false), candidate("100", false), candidate("60", false)];
        let suggestion = suggest_optimal_allocation(dec("120"), &tanks);

        assert!(suggestion.is_fully_covered);
        assert_eq!(suggestion.assignments.len(), 2);
        assert_eq!(suggestion.assignments[0].volume_hl, dec("100"));
        assert_eq!(suggestion.assignments[1].volume_hl, dec("20"));
    }

    #[test]
    fn suggestion_reports_unallocated_overflow() {
        let tanks = vec![candidate("30", false)];
        let suggestion = suggest_optimal_allocation(dec("50"), &tanks);

        assert!(!suggestion.is_fully_covered);
        assert_eq!(suggestion.unallocated_hl, dec("20"));
    }
}
