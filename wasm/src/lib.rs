//! WebAssembly module for the Winery Vinification Management Platform
//!
//! Provides client-side computation for:
//! - Batch allocation previews
//! - Consumable scaling previews
//! - Plot yield and composition calculations
//! - Offline data validation

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::models::*;
pub use shared::types::*;
pub use shared::validation::*;

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    // Set up panic hook for better error messages in browser console
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

fn to_decimal(value: f64) -> Decimal {
    Decimal::try_from(value).unwrap_or(Decimal::ZERO)
}

/// Allocation progress percentage for a batch, given its quantity and the
/// volume already placed in tanks. Zero when the quantity is not positive.
#[wasm_bindgen]
pub fn allocation_progress_percent(quantity_hl: f64, allocated_hl: f64) -> i32 {
    let quantity = to_decimal(quantity_hl);
    if quantity <= Decimal::ZERO {
        return 0;
    }
    (to_decimal(allocated_hl) / quantity * Decimal::from(100))
        .round()
        .to_i32()
        .unwrap_or(0)
}

/// Remaining volume of a batch after its tank allocations, never negative
#[wasm_bindgen]
pub fn remaining_volume_hl(quantity_hl: f64, allocated_hl: f64) -> f64 {
    let remaining = (to_decimal(quantity_hl) - to_decimal(allocated_hl)).max(Decimal::ZERO);
    remaining.to_string().parse().unwrap_or(0.0)
}

/// Preview of a consumable quantity rescaled from a process reference volume
/// to a tank volume, rounded to two decimals
#[wasm_bindgen]
pub fn scale_consumable_quantity(quantity: f64, reference_hl: f64, target_hl: f64) -> f64 {
    let reference = to_decimal(reference_hl);
    let target = to_decimal(target_hl);
    let original = to_decimal(quantity);

    let scaled = if reference <= Decimal::ZERO || target <= Decimal::ZERO {
        original
    } else {
        (original * (target / reference)).round_dp(2)
    };
    scaled.to_string().parse().unwrap_or(0.0)
}

/// Theoretical maximum harvest volume of a plot in hL
#[wasm_bindgen]
pub fn plot_max_yield_hl(surface_ha: f64, yield_ratio_hl_per_ha: f64) -> f64 {
    if surface_ha <= 0.0 || yield_ratio_hl_per_ha <= 0.0 {
        return 0.0;
    }
    surface_ha * yield_ratio_hl_per_ha
}

/// Composition percentage of a variety volume over the tank capacity
#[wasm_bindgen]
pub fn composition_percentage(volume_hl: f64, capacity_hl: f64) -> f64 {
    if capacity_hl <= 0.0 {
        return 0.0;
    }
    (volume_hl / capacity_hl) * 100.0
}

/// Validate that a volume is positive
#[wasm_bindgen]
pub fn is_valid_volume(volume_hl: f64) -> bool {
    volume_hl > 0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocation_progress_percent() {
        assert_eq!(allocation_progress_percent(100.0, 70.0), 70);
        assert_eq!(allocation_progress_percent(0.0, 50.0), 0);
        assert_eq!(allocation_progress_percent(50.0, 70.0), 140);
    }

    #[test]
    fn test_remaining_volume_clamps_to_zero() {
        assert_eq!(remaining_volume_hl(100.0, 30.0), 70.0);
        assert_eq!(remaining_volume_hl(50.0, 70.0), 0.0);
    }

    #[test]
    fn test_scale_consumable_quantity() {
        assert_eq!(scale_consumable_quantity(10.0, 225.0, 150.0), 6.67);
        // Degenerate volumes fall back to the input
        assert_eq!(scale_consumable_quantity(10.0, 0.0, 150.0), 10.0);
    }

    #[test]
    fn test_plot_max_yield() {
        assert_eq!(plot_max_yield_hl(2.0, 60.0), 120.0);
        assert_eq!(plot_max_yield_hl(0.0, 60.0), 0.0);
    }

    #[test]
    fn test_composition_percentage() {
        assert_eq!(composition_percentage(80.0, 100.0), 80.0);
        assert_eq!(composition_percentage(10.0, 0.0), 0.0);
    }
}
