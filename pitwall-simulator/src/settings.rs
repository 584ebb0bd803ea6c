//! Engine settings checked once at construction.

use std::time::Duration;

use pitwall_config::EngineConfig;
use pitwall_core::ConfigurationError;

/// An [`EngineConfig`] that passed the construction-time consistency checks.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineSettings {
    pub vehicle_id: String,
    pub min_tick_ms: u64,
    pub max_tick_ms: u64,
    pub max_rpm: f64,
    pub gear_ratios: Vec<f64>,
    pub track_length_m: f64,
    pub sector_count: u8,
    pub origin_lat: f64,
    pub origin_lon: f64,
}

impl EngineSettings {
    pub fn from_config(config: &EngineConfig) -> Result<Self, ConfigurationError> {
        if config.min_tick_ms == 0 || config.max_tick_ms == 0 {
            return Err(ConfigurationError::NonPositiveTickBounds {
                min_ms: config.min_tick_ms,
                max_ms: config.max_tick_ms,
            });
        }
        if config.min_tick_ms > config.max_tick_ms {
            return Err(ConfigurationError::InvertedTickBounds {
                min_ms: config.min_tick_ms,
                max_ms: config.max_tick_ms,
            });
        }
        if !config.max_rpm.is_finite() || config.max_rpm <= 0.0 {
            return Err(ConfigurationError::NonPositiveMaxRpm(config.max_rpm));
        }
        check_gear_ratios(&config.gear_ratios)?;
        if !config.track_length_m.is_finite() || config.track_length_m <= 0.0 {
            return Err(ConfigurationError::Track(format!(
                "track length must be positive, got {}",
                config.track_length_m
            )));
        }
        if config.sector_count == 0 {
            return Err(ConfigurationError::Track(
                "sector count must be at least 1".into(),
            ));
        }

        Ok(Self {
            vehicle_id: config.vehicle_id.clone(),
            min_tick_ms: config.min_tick_ms,
            max_tick_ms: config.max_tick_ms,
            max_rpm: config.max_rpm,
            gear_ratios: config.gear_ratios.clone(),
            track_length_m: config.track_length_m,
            sector_count: config.sector_count,
            origin_lat: config.origin_lat,
            origin_lon: config.origin_lon,
        })
    }

    /// Highest forward gear; the table's index 0 is neutral.
    pub fn max_gear(&self) -> u8 {
        (self.gear_ratios.len() - 1) as u8
    }

    pub fn min_tick(&self) -> Duration {
        Duration::from_millis(self.min_tick_ms)
    }

    pub fn max_tick(&self) -> Duration {
        Duration::from_millis(self.max_tick_ms)
    }
}

fn check_gear_ratios(ratios: &[f64]) -> Result<(), ConfigurationError> {
    if ratios.len() < 2 {
        return Err(ConfigurationError::GearRatios(
            "need neutral plus at least one forward gear".into(),
        ));
    }
    if ratios.len() > usize::from(u8::MAX) {
        return Err(ConfigurationError::GearRatios(format!(
            "{} gears is more than a u8 can address",
            ratios.len()
        )));
    }
    if ratios[0] != 0.0 {
        return Err(ConfigurationError::GearRatios(format!(
            "neutral ratio must be 0, got {}",
            ratios[0]
        )));
    }
    if let Some((gear, ratio)) = ratios
        .iter()
        .enumerate()
        .skip(1)
        .find(|(_, r)| !r.is_finite() || **r <= 0.0)
    {
        return Err(ConfigurationError::GearRatios(format!(
            "gear {gear} has non-positive ratio {ratio}"
        )));
    }
    Ok(())
}
