//! Consumable models

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A tracked input consumed by a production action (additive, filter
/// material, packaging, ...)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Consumable {
    pub id: Uuid,
    pub action_id: Uuid,
    pub name: String,
    pub unit: String,
    /// Current quantity, possibly scaled against a process reference volume
    pub quantity: Decimal,
    /// Pre-scaling reference value, set when the owning action is assigned
    /// to a process and cleared (with `quantity` restored) on unassignment
    pub original_quantity: Option<Decimal>,
    pub commodity: CommodityType,
}

/// Category of a consumable
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CommodityType {
    Additive,
    Filtration,
    Packaging,
    Cleaning,
    Analysis,
    Other,
}

impl std::str::FromStr for CommodityType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "additive" => Ok(CommodityType::Additive),
            "filtration" => Ok(CommodityType::Filtration),
            "packaging" => Ok(CommodityType::Packaging),
            "cleaning" => Ok(CommodityType::Cleaning),
            "analysis" => Ok(CommodityType::Analysis),
            "other" => Ok(CommodityType::Other),
            other => Err(format!("unknown commodity type: {}", other)),
        }
    }
}

impl CommodityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommodityType::Additive => "additive",
            CommodityType::Filtration => "filtration",
            CommodityType::Packaging => "packaging",
            CommodityType::Cleaning => "cleaning",
            CommodityType::Analysis => "analysis",
            CommodityType::Other => "other",
        }
    }
}
