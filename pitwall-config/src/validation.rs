//! Custom validation functions for configuration.

use validator::ValidationError;

/// Vehicle ids appear in alert payloads and log fields; keep them short and plain.
pub fn validate_vehicle_id(id: &str) -> Result<(), ValidationError> {
    let re = regex::Regex::new("^[A-Za-z0-9_-]{1,32}$")
        .map_err(|_| ValidationError::new("invalid_regex"))?;
    if re.is_match(id) {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_vehicle_id"))
    }
}

/// Every ratio must be finite and non-negative; shape is checked by the engine.
pub fn validate_gear_ratios(ratios: &[f64]) -> Result<(), ValidationError> {
    if ratios.len() < 2 {
        return Err(ValidationError::new("too_few_gears"));
    }
    if ratios.iter().any(|r| !r.is_finite() || *r < 0.0) {
        return Err(ValidationError::new("invalid_gear_ratio"));
    }
    Ok(())
}

/// Validate log level names accepted by `EnvFilter`.
pub fn validate_log_level(level: &str) -> Result<(), ValidationError> {
    let valid = ["trace", "debug", "info", "warn", "error"].contains(&level.to_lowercase().as_str());
    if valid {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_log_level"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vehicle_ids() {
        assert!(validate_vehicle_id("car-44").is_ok());
        assert!(validate_vehicle_id("TEAM_7").is_ok());
        assert!(validate_vehicle_id("").is_err());
        assert!(validate_vehicle_id("car 44").is_err());
        assert!(validate_vehicle_id(&"x".repeat(33)).is_err());
    }

    #[test]
    fn gear_ratio_values() {
        assert!(validate_gear_ratios(&[0.0, 3.0, 2.0]).is_ok());
        assert!(validate_gear_ratios(&[0.0]).is_err());
        assert!(validate_gear_ratios(&[0.0, f64::NAN]).is_err());
        assert!(validate_gear_ratios(&[0.0, -1.0]).is_err());
    }

    #[test]
    fn log_levels() {
        assert!(validate_log_level("INFO").is_ok());
        assert!(validate_log_level("verbose").is_err());
    }
}
