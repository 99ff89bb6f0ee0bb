//! Stock models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A stocked consumable line
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stock {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub unit: String,
    /// Signed quantity; negative indicates a shortfall already incurred
    pub quantity: Decimal,
    /// Reorder threshold
    pub minimum_qty: Decimal,
    /// Derived: quantity ≤ minimum_qty, or forced true when a row is
    /// created at zero to record an unmet requirement
    pub is_out_of_stock: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Stock {
    /// Recompute the out-of-stock flag from the current quantity
    pub fn compute_out_of_stock(&self) -> bool {
        self.quantity <= self.minimum_qty
    }
}
