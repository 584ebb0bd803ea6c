//! Alert rule thresholds.
//!
//! The rule set itself is fixed; only its thresholds are tunable. The
//! defaults are the literal values the dashboards were calibrated against,
//! including the hysteresis clear boundaries.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Thresholds for every built-in rule plus the history cap.
#[derive(Debug, Serialize, Deserialize, Validate, Clone, PartialEq)]
pub struct AlertsConfig {
    /// Cleared alerts retained in history, oldest evicted first.
    #[validate(range(min = 1, max = 100_000))]
    #[serde(default = "default_history_cap")]
    pub history_cap: usize,

    #[validate(nested)]
    #[serde(default)]
    pub rpm_sustained_high: RpmRuleConfig,

    #[validate(nested)]
    #[serde(default)]
    pub pedal_overlap: PedalOverlapRuleConfig,

    #[validate(nested)]
    #[serde(default = "default_coolant")]
    pub coolant_high: LevelRuleConfig,

    #[validate(nested)]
    #[serde(default = "default_tire_delta")]
    pub tire_delta: LevelRuleConfig,

    #[validate(nested)]
    #[serde(default = "default_battery_low")]
    pub battery_low: LevelRuleConfig,
}

fn default_history_cap() -> usize {
    300
}

fn default_coolant() -> LevelRuleConfig {
    LevelRuleConfig {
        warn: 105.0,
        critical: 115.0,
        clear: 100.0,
    }
}

fn default_tire_delta() -> LevelRuleConfig {
    LevelRuleConfig {
        warn: 15.0,
        critical: 25.0,
        clear: 10.0,
    }
}

fn default_battery_low() -> LevelRuleConfig {
    LevelRuleConfig {
        warn: 20.0,
        critical: 10.0,
        clear: 25.0,
    }
}

impl Default for AlertsConfig {
    fn default() -> Self {
        Self {
            history_cap: default_history_cap(),
            rpm_sustained_high: RpmRuleConfig::default(),
            pedal_overlap: PedalOverlapRuleConfig::default(),
            coolant_high: default_coolant(),
            tire_delta: default_tire_delta(),
            battery_low: default_battery_low(),
        }
    }
}

/// Sustained high engine speed.
#[derive(Debug, Serialize, Deserialize, Validate, Clone, PartialEq)]
#[serde(default)]
pub struct RpmRuleConfig {
    #[validate(range(min = 0.0, max = 25_000.0))]
    pub rpm: f64,
    #[validate(range(min = 1))]
    pub warn_ms: u64,
    #[validate(range(min = 1))]
    pub crit_ms: u64,
}

impl Default for RpmRuleConfig {
    fn default() -> Self {
        Self {
            rpm: 10_800.0,
            warn_ms: 3_000,
            crit_ms: 8_000,
        }
    }
}

/// Throttle and brake pressed together.
#[derive(Debug, Serialize, Deserialize, Validate, Clone, PartialEq)]
#[serde(default)]
pub struct PedalOverlapRuleConfig {
    #[validate(range(min = 0.0, max = 100.0))]
    pub throttle_pct: f64,
    #[validate(range(min = 0.0, max = 100.0))]
    pub brake_pct: f64,
    #[validate(range(min = 1))]
    pub warn_ms: u64,
    #[validate(range(min = 1))]
    pub crit_ms: u64,
}

impl Default for PedalOverlapRuleConfig {
    fn default() -> Self {
        Self {
            throttle_pct: 20.0,
            brake_pct: 20.0,
            warn_ms: 1_000,
            crit_ms: 3_000,
        }
    }
}

/// Level thresholds. For rising rules `clear < warn < critical`; for falling
/// rules (battery) `critical < warn < clear`.
#[derive(Debug, Serialize, Deserialize, Validate, Clone, Copy, PartialEq)]
pub struct LevelRuleConfig {
    pub warn: f64,
    pub critical: f64,
    pub clear: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_alerts_config_is_valid() {
        AlertsConfig::default()
            .validate()
            .expect("Default config should be valid");
    }

    #[test]
    fn rejects_zero_history_cap() {
        let config = AlertsConfig {
            history_cap: 0,
            ..AlertsConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
