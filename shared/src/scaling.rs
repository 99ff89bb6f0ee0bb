//! Volume-scaling engine for consumable quantities
//!
//! When an action joins a process, its consumable recipe (written for the
//! process reference volume) is rescaled linearly to the actual tank
//! volume. The pre-scale quantity is kept in `original_quantity` so that
//! unassignment restores it exactly; scaling always starts from that
//! canonical value and never compounds from an already-scaled quantity.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::Consumable;

/// One consumable after scaling
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScaledConsumable {
    pub id: Uuid,
    pub name: String,
    pub unit: String,
    /// Quantity rescaled to the target volume, rounded to 2 decimals
    pub scaled_quantity: Decimal,
    /// The pre-scale value, preserved for reversal
    pub original_quantity: Decimal,
}

/// Rescale consumable quantities from `reference_volume_hl` to
/// `target_volume_hl`.
///
/// A non-positive reference or target volume yields the identity scaling
/// (no division by zero is ever attempted): the scaled quantity equals the
/// input quantity and `original_quantity` still records it, so reversal
/// behaves uniformly.
///
/// Quantities are always scaled from the canonical original: a consumable
/// that already carries an `original_quantity` is rescaled from that value,
/// not from its currently displayed quantity, so repeated assign/unassign
/// cycles cannot drift.
pub fn scale_consumables(
    consumables: &[Consumable],
    reference_volume_hl: Decimal,
    target_volume_hl: Decimal,
) -> Vec<ScaledConsumable> {
    let factor = if reference_volume_hl <= Decimal::ZERO || target_volume_hl <= Decimal::ZERO {
        None
    } else {
        Some(target_volume_hl / reference_volume_hl)
    };

    consumables
        .iter()
        .map(|c| {
            let original = c.original_quantity.unwrap_or(c.quantity);
            let scaled = match factor {
                Some(f) => (original * f).round_dp(2),
                None => original,
            };
            ScaledConsumable {
                id: c.id,
                name: c.name.clone(),
                unit: c.unit.clone(),
                scaled_quantity: scaled,
                original_quantity: original,
            }
        })
        .collect()
}

/// One consumable after restoration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestoredConsumable {
    pub id: Uuid,
    /// The quantity to write back (the stored original)
    pub quantity: Decimal,
}

/// Restore every consumable carrying an `original_quantity` to that value.
///
/// Consumables without a stored original were never scaled and are left
/// untouched (absent from the result). The caller clears
/// `original_quantity` to null when persisting.
pub fn restore_consumables(consumables: &[Consumable]) -> Vec<RestoredConsumable> {
    consumables
        .iter()
        .filter_map(|c| {
            c.original_quantity.map(|q| RestoredConsumable {
                id: c.id,
                quantity: q,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CommodityType;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn consumable(quantity: &str, original: Option<&str>) -> Consumable {
        Consumable {
            id: Uuid::new_v4(),
            action_id: Uuid::new_v4(),
            name: "SO2".to_string(),
            unit: "g".to_string(),
            quantity: dec(quantity),
            original_quantity: original.map(dec),
            commodity: CommodityType::Additive,
        }
    }

    #[test]
    fn scales_linearly_with_two_decimal_rounding() {
        let items = vec![consumable("10", None)];
        let scaled = scale_consumables(&items, dec("225"), dec("150"));

        // 10 × 150/225 = 6.666... → 6.67
        assert_eq!(scaled[0].scaled_quantity, dec("6.67"));
        assert_eq!(scaled[0].original_quantity, dec("10"));
    }

    #[test]
    fn zero_reference_volume_is_identity() {
        let items = vec![consumable("12.5", None)];
        let scaled = scale_consumables(&items, Decimal::ZERO, dec("100"));

        assert_eq!(scaled[0].scaled_quantity, dec("12.5"));
        assert_eq!(scaled[0].original_quantity, dec("12.5"));
    }

    #[test]
    fn zero_target_volume_is_identity() {
        let items = vec![consumable("12.5", None)];
        let scaled = scale_consumables(&items, dec("100"), Decimal::ZERO);

        assert_eq!(scaled[0].scaled_quantity, dec("12.5"));
    }

    #[test]
    fn rescaling_starts_from_stored_original() {
        // Already scaled once: quantity shows 6.67 but original is 10.
        let items = vec![consumable("6.67", Some("10"))];
        let scaled = scale_consumables(&items, dec("100"), dec("50"));

        // 10 × 0.5, not 6.67 × 0.5
        assert_eq!(scaled[0].scaled_quantity, dec("5"));
        assert_eq!(scaled[0].original_quantity, dec("10"));
    }

    #[test]
    fn restore_returns_exact_originals() {
        let items = vec![
            consumable("6.67", Some("10")),
            consumable("3", None),
        ];
        let restored = restore_consumables(&items);

        assert_eq!(restored.len(), 1);
        assert_eq!(restored[0].id, items[0].id);
        assert_eq!(restored[0].quantity, dec("10"));
    }

    #[test]
    fn repeated_cycles_do_not_drift() {
        let mut item = consumable("10", None);

        for target in ["150", "80", "225", "33"] {
            let scaled = &scale_consumables(&[item.clone()], dec("225"), dec(target))[0];
            item.quantity = scaled.scaled_quantity;
            item.original_quantity = Some(scaled.original_quantity);

            // Unassign: restore the original.
            let restored = &restore_consumables(&[item.clone()])[0];
            item.quantity = restored.quantity;
            item.original_quantity = None;
        }

        assert_eq!(item.quantity, dec("10"));
    }
}
