use thiserror::Error;

/// Fatal, construction-time misconfiguration of an engine or store.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigurationError {
    #[error("Tick bounds must be positive (min={min_ms}ms, max={max_ms}ms)")]
    NonPositiveTickBounds { min_ms: u64, max_ms: u64 },

    #[error("Minimum tick delay {min_ms}ms exceeds maximum {max_ms}ms")]
    InvertedTickBounds { min_ms: u64, max_ms: u64 },

    #[error("Maximum RPM must be positive, got {0}")]
    NonPositiveMaxRpm(f64),

    #[error("Malformed gear ratio table: {0}")]
    GearRatios(String),

    #[error("Track geometry invalid: {0}")]
    Track(String),

    #[error("Rule '{rule}' misconfigured: {reason}")]
    Rule { rule: &'static str, reason: String },
}

/// A single sample violated a shape or range invariant.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Field '{field}' is not a finite number")]
    NotFinite { field: &'static str },

    #[error("Field '{field}' = {value} is outside [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("Gear {gear} exceeds maximum gear {max_gear}")]
    Gear { gear: u8, max_gear: u8 },

    #[error("Vehicle id must not be empty")]
    EmptyVehicleId,
}

/// Malformed range-query parameters, reported to the caller instead of a page.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("limit must be an integer in [1, {max}], got '{value}'")]
    InvalidLimit { value: String, max: u32 },

    #[error("'{field}' must be an integer epoch-millisecond timestamp, got '{value}'")]
    InvalidTimestamp { field: &'static str, value: String },
}
