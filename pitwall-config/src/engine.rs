//! Simulation engine configuration.
//!
//! Vehicle identity, tick scheduling bounds, drivetrain and track geometry.
//! Cross-field consistency (tick bound ordering, gear table length) is checked
//! when the engine is constructed.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::validation;

/// Parameters for one simulated vehicle.
#[derive(Debug, Serialize, Deserialize, Validate, Clone, PartialEq)]
pub struct EngineConfig {
    /// Identifier stamped on every sample.
    #[validate(custom(function = validation::validate_vehicle_id))]
    #[serde(default = "default_vehicle_id")]
    pub vehicle_id: String,

    /// Lower bound of the randomised inter-tick delay (milliseconds).
    #[validate(range(min = 1, max = 60_000))]
    #[serde(default = "default_min_tick_ms")]
    pub min_tick_ms: u64,

    /// Upper bound of the randomised inter-tick delay (milliseconds).
    #[validate(range(min = 1, max = 60_000))]
    #[serde(default = "default_max_tick_ms")]
    pub max_tick_ms: u64,

    /// Redline used for shift points.
    #[validate(range(min = 1000.0, max = 25_000.0))]
    #[serde(default = "default_max_rpm")]
    pub max_rpm: f64,

    /// Ratio per gear; index 0 is neutral and must be 0.
    #[validate(custom(function = validation::validate_gear_ratios))]
    #[serde(default = "default_gear_ratios")]
    pub gear_ratios: Vec<f64>,

    /// Lap length in metres.
    #[validate(range(min = 100.0, max = 50_000.0))]
    #[serde(default = "default_track_length")]
    pub track_length_m: f64,

    /// Number of timing sectors per lap.
    #[validate(range(min = 1, max = 32))]
    #[serde(default = "default_sector_count")]
    pub sector_count: u8,

    /// Centre of the placeholder track path.
    #[validate(range(min = -90.0, max = 90.0))]
    #[serde(default = "default_origin_lat")]
    pub origin_lat: f64,

    #[validate(range(min = -180.0, max = 180.0))]
    #[serde(default = "default_origin_lon")]
    pub origin_lon: f64,
}

fn default_vehicle_id() -> String {
    "car-1".into()
}

fn default_min_tick_ms() -> u64 {
    100
}

fn default_max_tick_ms() -> u64 {
    200
}

fn default_max_rpm() -> f64 {
    12_000.0
}

fn default_gear_ratios() -> Vec<f64> {
    vec![0.0, 3.20, 2.40, 1.90, 1.55, 1.30, 1.10]
}

fn default_track_length() -> f64 {
    5_000.0
}

fn default_sector_count() -> u8 {
    3
}

fn default_origin_lat() -> f64 {
    52.0786
}

fn default_origin_lon() -> f64 {
    -1.0169
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            vehicle_id: default_vehicle_id(),
            min_tick_ms: default_min_tick_ms(),
            max_tick_ms: default_max_tick_ms(),
            max_rpm: default_max_rpm(),
            gear_ratios: default_gear_ratios(),
            track_length_m: default_track_length(),
            sector_count: default_sector_count(),
            origin_lat: default_origin_lat(),
            origin_lon: default_origin_lon(),
        }
    }
}

impl EngineConfig {
    /// Highest forward gear implied by the ratio table.
    pub fn max_gear(&self) -> u8 {
        self.gear_ratios.len().saturating_sub(1).min(u8::MAX as usize) as u8
    }
}
