//! Batch ("cuvée") models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A production batch of wine tracked as a single unit ("cuvée")
///
/// The total volume already allocated to tanks is always derived from the
/// `tank_batches` rows referencing this batch, never stored here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Batch {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    /// Declared total volume to be produced, in hL, must be > 0
    pub quantity_hl: Decimal,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
