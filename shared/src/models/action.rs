//! Production action and process models

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A traceability action performed on a tank (filling, racking, sulfiting, ...)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Action {
    pub id: Uuid,
    pub tank_id: Uuid,
    /// Process this action is assigned to, if any. Assignment scales the
    /// action's consumables against the process reference volume.
    pub process_id: Option<Uuid>,
    pub action_type: ActionType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Kinds of production actions
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    /// Filling a tank from a harvest ("remplissage")
    Remplissage,
    /// Racking wine off its lees ("soutirage")
    Soutirage,
    /// Pumping over ("remontage")
    Remontage,
    /// Sulfite addition ("sulfitage")
    Sulfitage,
    /// Filtration
    Filtration,
    /// Bottling ("mise en bouteille")
    MiseEnBouteille,
    /// Custom action with name
    Custom(String),
}

impl ActionType {
    /// Stable uppercase code used for persistence and traceability exports
    pub fn code(&self) -> String {
        match self {
            ActionType::Remplissage => "REMPLISSAGE".to_string(),
            ActionType::Soutirage => "SOUTIRAGE".to_string(),
            ActionType::Remontage => "REMONTAGE".to_string(),
            ActionType::Sulfitage => "SULFITAGE".to_string(),
            ActionType::Filtration => "FILTRATION".to_string(),
            ActionType::MiseEnBouteille => "MISE_EN_BOUTEILLE".to_string(),
            ActionType::Custom(name) => name.to_uppercase().replace(' ', "_"),
        }
    }
}

impl ActionType {
    /// Parse a persisted code; unknown codes become `Custom`
    pub fn from_code(code: &str) -> Self {
        match code {
            "REMPLISSAGE" => ActionType::Remplissage,
            "SOUTIRAGE" => ActionType::Soutirage,
            "REMONTAGE" => ActionType::Remontage,
            "SULFITAGE" => ActionType::Sulfitage,
            "FILTRATION" => ActionType::Filtration,
            "MISE_EN_BOUTEILLE" => ActionType::MiseEnBouteille,
            other => ActionType::Custom(other.to_string()),
        }
    }
}

impl std::fmt::Display for ActionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A named group of actions carrying a reference volume, against which
/// consumable quantities of member actions are scaled
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Process {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    /// Reference volume in hL that member recipes were written for
    pub reference_volume_hl: Decimal,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}
