//! Grape composition models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::GrapeVariety;

/// Per-(tank, grape variety) blend aggregate.
///
/// `volume_hl` accumulates across plot-to-tank transfers; `percentage` is
/// recomputed against the tank capacity on every update. The sum of
/// percentages across all varieties in one tank never exceeds 100.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrapeComposition {
    pub id: Uuid,
    pub tank_id: Uuid,
    pub grape_variety: GrapeVariety,
    /// Volume contributed by this variety, in hL
    pub volume_hl: Decimal,
    /// volume_hl / tank capacity × 100
    pub percentage: Decimal,
    pub updated_at: DateTime<Utc>,
}
