//! Vinification tank models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A vinification tank ("cuve")
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tank {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    /// Volume ceiling in hectoliters, must be > 0
    pub capacity_hl: Decimal,
    pub status: TankStatus,
    pub material: TankMaterial,
    pub allocation_mode: AllocationMode,
    /// Legacy single-batch occupancy. Only meaningful when
    /// `allocation_mode == AllocationMode::Single`.
    pub batch_id: Option<Uuid>,
    /// Legacy single-batch allocated volume in hL. Only meaningful when
    /// `allocation_mode == AllocationMode::Single`.
    pub allocated_volume_hl: Option<Decimal>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Operational status of a tank
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TankStatus {
    Empty,
    InUse,
    Maintenance,
}

impl TankStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TankStatus::Empty => "empty",
            TankStatus::InUse => "in_use",
            TankStatus::Maintenance => "maintenance",
        }
    }
}

impl std::str::FromStr for TankStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "empty" => Ok(TankStatus::Empty),
            "in_use" => Ok(TankStatus::InUse),
            "maintenance" => Ok(TankStatus::Maintenance),
            other => Err(format!("unknown tank status: {}", other)),
        }
    }
}

impl std::fmt::Display for TankStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TankStatus::Empty => write!(f, "Empty"),
            TankStatus::InUse => write!(f, "In use"),
            TankStatus::Maintenance => write!(f, "Maintenance"),
        }
    }
}

/// Construction material of a tank
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TankMaterial {
    StainlessSteel,
    Concrete,
    Oak,
    Fiberglass,
    /// Custom material with name
    Custom(String),
}

impl TankMaterial {
    /// Stable snake_case code used for persistence
    pub fn code(&self) -> String {
        match self {
            TankMaterial::StainlessSteel => "stainless_steel".to_string(),
            TankMaterial::Concrete => "concrete".to_string(),
            TankMaterial::Oak => "oak".to_string(),
            TankMaterial::Fiberglass => "fiberglass".to_string(),
            TankMaterial::Custom(name) => name.clone(),
        }
    }

    /// Parse a persisted code; unknown codes become `Custom`
    pub fn from_code(code: &str) -> Self {
        match code {
            "stainless_steel" => TankMaterial::StainlessSteel,
            "concrete" => TankMaterial::Concrete,
            "oak" => TankMaterial::Oak,
            "fiberglass" => TankMaterial::Fiberglass,
            other => TankMaterial::Custom(other.to_string()),
        }
    }
}

impl std::fmt::Display for TankMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TankMaterial::StainlessSteel => write!(f, "Stainless steel"),
            TankMaterial::Concrete => write!(f, "Concrete"),
            TankMaterial::Oak => write!(f, "Oak"),
            TankMaterial::Fiberglass => write!(f, "Fiberglass"),
            TankMaterial::Custom(name) => write!(f, "{}", name),
        }
    }
}

/// How batch volume is tracked on a tank.
///
/// `Multi` (the `tank_batches` join table) is the primary model; `Single`
/// (one `batch_id` + `allocated_volume_hl` directly on the tank) survives as
/// a deprecated legacy path and is never written for new tanks.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum AllocationMode {
    Single,
    #[default]
    Multi,
}

impl AllocationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AllocationMode::Single => "single",
            AllocationMode::Multi => "multi",
        }
    }
}

impl std::str::FromStr for AllocationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "single" => Ok(AllocationMode::Single),
            "multi" => Ok(AllocationMode::Multi),
            other => Err(format!("unknown allocation mode: {}", other)),
        }
    }
}

/// A per-(tank, batch) volume allocation row from the `tank_batches` join
/// table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TankBatch {
    pub id: Uuid,
    pub tank_id: Uuid,
    pub batch_id: Uuid,
    /// Volume of the batch held in this tank, in hL
    pub allocated_volume_hl: Decimal,
    pub created_at: DateTime<Utc>,
}

impl Tank {
    /// Capacity not yet claimed by any batch, given this tank's allocation
    /// rows. Never negative.
    pub fn available_capacity_hl(&self, allocations: &[TankBatch]) -> Decimal {
        let allocated: Decimal = allocations
            .iter()
            .filter(|a| a.tank_id == self.id)
            .map(|a| a.allocated_volume_hl)
            .sum();
        (self.capacity_hl - allocated).max(Decimal::ZERO)
    }
}
