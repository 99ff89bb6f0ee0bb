//! Domain error types for the pure calculation engines
//!
//! Constraint violations carry the numeric limit that was exceeded so the
//! caller can surface it verbatim; nothing is ever silently clamped.

use rust_decimal::Decimal;
use thiserror::Error;

/// Errors raised by the pure domain calculations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("Volume must be greater than 0")]
    NonPositiveVolume,

    #[error("Volume exceeds available tank capacity: {available_hl} hL available")]
    ExceedsTankCapacity { available_hl: Decimal },

    #[error("Volume exceeds the plot's theoretical maximum yield of {max_yield_hl} hL")]
    ExceedsPlotYield { max_yield_hl: Decimal },

    #[error("Requested volume exceeds the tank's composed volume: {composed_hl} hL available")]
    ExceedsComposedVolume { composed_hl: Decimal },

    #[error("Volume exceeds the batch's remaining volume: {remaining_hl} hL remaining")]
    ExceedsBatchRemaining { remaining_hl: Decimal },

    #[error("Validation error: {message}")]
    Validation { field: String, message: String },
}

impl DomainError {
    /// French rendering of the error, mirroring `Display` for the UI
    pub fn message_fr(&self) -> String {
        match self {
            DomainError::NonPositiveVolume => "Le volume doit être supérieur à 0".to_string(),
            DomainError::ExceedsTankCapacity { available_hl } => format!(
                "Le volume dépasse la capacité disponible de la cuve : {} hL disponibles",
                available_hl
            ),
            DomainError::ExceedsPlotYield { max_yield_hl } => format!(
                "Le volume dépasse le rendement maximal théorique de la parcelle : {} hL",
                max_yield_hl
            ),
            DomainError::ExceedsComposedVolume { composed_hl } => format!(
                "Le volume demandé dépasse le volume composé de la cuve : {} hL disponibles",
                composed_hl
            ),
            DomainError::ExceedsBatchRemaining { remaining_hl } => format!(
                "Le volume dépasse le volume restant de la cuvée : {} hL restants",
                remaining_hl
            ),
            DomainError::Validation { message, .. } => {
                format!("Données invalides : {}", message)
            }
        }
    }
}

/// Result type alias for domain calculations
pub type DomainResult<T> = Result<T, DomainError>;
