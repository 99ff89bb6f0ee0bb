//! Vineyard plot models

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A vineyard plot ("parcelle")
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plot {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub grape_variety: GrapeVariety,
    /// Surface area in hectares
    pub surface_ha: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Plot {
    /// Theoretical maximum harvest volume in hL for a given yield ratio
    /// (hL per hectare)
    pub fn max_yield_hl(&self, yield_ratio_hl_per_ha: Decimal) -> Decimal {
        self.surface_ha * yield_ratio_hl_per_ha
    }
}

/// Grape varieties commonly grown in French vineyards
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum GrapeVariety {
    Merlot,
    CabernetSauvignon,
    CabernetFranc,
    Syrah,
    Grenache,
    PinotNoir,
    Chardonnay,
    SauvignonBlanc,
    Semillon,
    CheninBlanc,
    /// Custom variety with name
    Custom(String),
}

impl GrapeVariety {
    /// Stable snake_case code used for persistence
    pub fn code(&self) -> String {
        match self {
            GrapeVariety::Merlot => "merlot".to_string(),
            GrapeVariety::CabernetSauvignon => "cabernet_sauvignon".to_string(),
            GrapeVariety::CabernetFranc => "cabernet_franc".to_string(),
            GrapeVariety::Syrah => "syrah".to_string(),
            GrapeVariety::Grenache => "grenache".to_string(),
            GrapeVariety::PinotNoir => "pinot_noir".to_string(),
            GrapeVariety::Chardonnay => "chardonnay".to_string(),
            GrapeVariety::SauvignonBlanc => "sauvignon_blanc".to_string(),
            GrapeVariety::Semillon => "semillon".to_string(),
            GrapeVariety::CheninBlanc => "chenin_blanc".to_string(),
            GrapeVariety::Custom(name) => name.clone(),
        }
    }

    /// Parse a persisted code; unknown codes become `Custom`
    pub fn from_code(code: &str) -> Self {
        match code {
            "merlot" => GrapeVariety::Merlot,
            "cabernet_sauvignon" => GrapeVariety::CabernetSauvignon,
            "cabernet_franc" => GrapeVariety::CabernetFranc,
            "syrah" => GrapeVariety::Syrah,
            "grenache" => GrapeVariety::Grenache,
            "pinot_noir" => GrapeVariety::PinotNoir,
            "chardonnay" => GrapeVariety::Chardonnay,
            "sauvignon_blanc" => GrapeVariety::SauvignonBlanc,
            "semillon" => GrapeVariety::Semillon,
            "chenin_blanc" => GrapeVariety::CheninBlanc,
            other => GrapeVariety::Custom(other.to_string()),
        }
    }
}

impl std::fmt::Display for GrapeVariety {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GrapeVariety::Merlot => write!(f, "Merlot"),
            GrapeVariety::CabernetSauvignon => write!(f, "Cabernet Sauvignon"),
            GrapeVariety::CabernetFranc => write!(f, "Cabernet Franc"),
            GrapeVariety::Syrah => write!(f, "Syrah"),
            GrapeVariety::Grenache => write!(f, "Grenache"),
            GrapeVariety::PinotNoir => write!(f, "Pinot Noir"),
            GrapeVariety::Chardonnay => write!(f, "Chardonnay"),
            GrapeVariety::SauvignonBlanc => write!(f, "Sauvignon Blanc"),
            GrapeVariety::Semillon => write!(f, "Sémillon"),
            GrapeVariety::CheninBlanc => write!(f, "Chenin Blanc"),
            GrapeVariety::Custom(name) => write!(f, "{}", name),
        }
    }
}

/// Association record: `volume_hl` of harvest from a plot was transferred
/// into a tank on `harvest_date`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlotTank {
    pub id: Uuid,
    pub plot_id: Uuid,
    pub tank_id: Uuid,
    /// Transferred volume in hL
    pub volume_hl: Decimal,
    pub harvest_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}
