//! # Pitwall Configuration System
//!
//! Hierarchical configuration for the telemetry generator, alert engine and
//! repository.
//!
//! ## Features
//! - **Unified Configuration**: one `PitwallConfig` shared by every component
//! - **Validation**: field-level range and format checks via `validator`
//! - **Layering**: defaults, YAML files, then `PITWALL_*` environment overrides

#![warn(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

mod alerts;
mod engine;
mod error;
mod storage;
mod telemetry;
mod validation;

pub use alerts::{AlertsConfig, LevelRuleConfig, PedalOverlapRuleConfig, RpmRuleConfig};
pub use engine::EngineConfig;
pub use error::ConfigError;
pub use storage::StorageConfig;
pub use telemetry::TelemetryConfig;

const BASE_FILE: &str = "config/pitwall.yaml";
const ENV_PREFIX: &str = "PITWALL_";

/// Top-level configuration container for all Pitwall components.
#[derive(Debug, Serialize, Deserialize, Validate, Default, Clone, PartialEq)]
pub struct PitwallConfig {
    /// Simulated vehicle and tick scheduling.
    #[validate(nested)]
    #[serde(default)]
    pub engine: EngineConfig,

    /// Repository retention and pagination.
    #[validate(nested)]
    #[serde(default)]
    pub storage: StorageConfig,

    /// Alert rule thresholds.
    #[validate(nested)]
    #[serde(default)]
    pub alerts: AlertsConfig,

    /// Logging and metrics.
    #[validate(nested)]
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

impl PitwallConfig {
    /// Load configuration from default files and environment.
    ///
    /// Hierarchy:
    /// 1. Default values
    /// 2. `config/pitwall.yaml`, when present
    /// 3. `config/<PITWALL_ENV>.yaml`, when present (`development` by default)
    /// 4. `PITWALL_*` environment variables, `__` separating nested keys
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(PitwallConfig::default()));

        if Path::new(BASE_FILE).exists() {
            figment = figment.merge(Yaml::file(BASE_FILE));
        }

        let env = std::env::var("PITWALL_ENV").unwrap_or_else(|_| "development".into());
        let env_file = format!("config/{}.yaml", env);
        if Path::new(&env_file).exists() {
            figment = figment.merge(Yaml::file(env_file));
        }

        Self::finish(figment)
    }

    /// Load configuration from a specific file layered over the defaults.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }

        let figment =
            Figment::from(Serialized::defaults(PitwallConfig::default())).merge(Yaml::file(path));
        Self::finish(figment)
    }

    /// `load_from_path` when a path is given, `load` otherwise.
    pub fn resolve<P: AsRef<Path>>(path: Option<P>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load_from_path(path),
            None => Self::load(),
        }
    }

    fn finish(figment: Figment) -> Result<Self, ConfigError> {
        figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .map_err(ConfigError::from)
            .and_then(|config: Self| {
                config.validate()?;
                Ok(config)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn full_config_validation() {
        let config = PitwallConfig::default();
        config.validate().expect("Default config should validate");
    }

    #[test]
    fn environment_override() {
        Jail::expect_with(|jail| {
            jail.set_env("PITWALL_STORAGE__RETENTION_MS", "1000");
            jail.set_env("PITWALL_ENGINE__VEHICLE_ID", "car-44");
            let config = PitwallConfig::load().expect("config should load");
            assert_eq!(config.storage.retention_ms, 1000);
            assert_eq!(config.engine.vehicle_id, "car-44");
            assert_eq!(config.storage.max_samples, 25_000);
            Ok(())
        });
    }

    #[test]
    fn yaml_file_layers_over_defaults() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "track.yaml",
                r#"
engine:
  min_tick_ms: 50
  max_tick_ms: 75
alerts:
  coolant_high:
    warn: 100.0
    critical: 110.0
    clear: 95.0
"#,
            )?;
            let config = PitwallConfig::load_from_path("track.yaml").expect("config should load");
            assert_eq!(config.engine.min_tick_ms, 50);
            assert_eq!(config.engine.max_tick_ms, 75);
            assert_eq!(config.engine.max_rpm, 12_000.0);
            assert_eq!(config.alerts.coolant_high.clear, 95.0);
            assert_eq!(config.alerts.history_cap, 300);
            Ok(())
        });
    }

    #[test]
    fn invalid_values_are_reported_by_field() {
        Jail::expect_with(|jail| {
            jail.create_file("bad.yaml", "storage:\n  max_limit: 0\n")?;
            let err = PitwallConfig::load_from_path("bad.yaml").unwrap_err();
            assert!(matches!(err, ConfigError::Validation(_)));
            assert!(err.to_string().contains("storage.max_limit"));
            Ok(())
        });
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = PitwallConfig::load_from_path("does/not/exist.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound(_)));
    }
}
