//! Validation utilities for the Winery Vinification Management Platform

use rust_decimal::Decimal;

use crate::models::GrapeComposition;

// ============================================================================
// Vinification Validations
// ============================================================================

/// Validate that a volume is strictly positive
pub fn validate_positive_volume(volume_hl: Decimal) -> Result<(), &'static str> {
    if volume_hl <= Decimal::ZERO {
        return Err("Volume must be greater than 0");
    }
    Ok(())
}

/// Validate that a tank capacity is strictly positive
pub fn validate_tank_capacity(capacity_hl: Decimal) -> Result<(), &'static str> {
    if capacity_hl <= Decimal::ZERO {
        return Err("Tank capacity must be greater than 0");
    }
    Ok(())
}

/// Validate that a plot surface is strictly positive
pub fn validate_plot_surface(surface_ha: Decimal) -> Result<(), &'static str> {
    if surface_ha <= Decimal::ZERO {
        return Err("Plot surface must be greater than 0");
    }
    Ok(())
}

/// Validate that a yield ratio (hL/ha) is strictly positive
pub fn validate_yield_ratio(yield_ratio: Decimal) -> Result<(), &'static str> {
    if yield_ratio <= Decimal::ZERO {
        return Err("Yield ratio must be greater than 0");
    }
    Ok(())
}

/// Validate a tank's composition rows: no negative volumes, and the
/// percentage sum must not exceed 100 (equality only for a full tank of
/// classified content)
pub fn validate_composition(compositions: &[GrapeComposition]) -> Result<(), &'static str> {
    let mut total = Decimal::ZERO;
    for c in compositions {
        if c.volume_hl < Decimal::ZERO {
            return Err("Composition volume cannot be negative");
        }
        if c.percentage < Decimal::ZERO {
            return Err("Composition percentage cannot be negative");
        }
        total += c.percentage;
    }
    if total > Decimal::from(100) {
        return Err("Composition percentages cannot exceed 100%");
    }
    Ok(())
}

// ============================================================================
// General Validations
// ============================================================================

/// Validate email format (basic check)
pub fn validate_email(email: &str) -> Result<(), &'static str> {
    if email.contains('@') && email.contains('.') && email.len() >= 5 {
        Ok(())
    } else {
        Err("Invalid email format")
    }
}

/// Validate password strength
pub fn validate_password(password: &str) -> Result<(), &'static str> {
    if password.len() < 8 {
        return Err("Password must be at least 8 characters");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GrapeVariety;
    use chrono::Utc;
    use std::str::FromStr;
    use uuid::Uuid;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn comp(volume: &str, percentage: &str) -> GrapeComposition {
        GrapeComposition {
            id: Uuid::new_v4(),
            tank_id: Uuid::new_v4(),
            grape_variety: GrapeVariety::Merlot,
            volume_hl: dec(volume),
            percentage: dec(percentage),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn rejects_non_positive_volumes() {
        assert!(validate_positive_volume(Decimal::ZERO).is_err());
        assert!(validate_positive_volume(dec("-1")).is_err());
        assert!(validate_positive_volume(dec("0.1")).is_ok());
    }

    #[test]
    fn composition_sum_may_reach_but_not_exceed_100() {
        assert!(validate_composition(&[comp("60", "60"), comp("40", "40")]).is_ok());
        assert!(validate_composition(&[comp("60", "60"), comp("45", "45")]).is_err());
    }

    #[test]
    fn composition_rejects_negative_rows() {
        assert!(validate_composition(&[comp("-1", "10")]).is_err());
    }

    #[test]
    fn basic_email_check() {
        assert!(validate_email("cave@domaine.fr").is_ok());
        assert!(validate_email("not-an-email").is_err());
    }
}
