//! Telemetry repository retention and pagination limits.

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// Retention policy and query limits for the in-memory repository.
#[derive(Debug, Serialize, Deserialize, Validate, Clone, PartialEq)]
#[validate(schema(function = validate_limits))]
pub struct StorageConfig {
    /// Trailing time window kept, relative to the newest sample (milliseconds).
    #[validate(range(min = 1, max = 604_800_000))]
    #[serde(default = "default_retention_ms")]
    pub retention_ms: u64,

    /// Hard cap on stored samples; the oldest excess is dropped first.
    #[validate(range(min = 1, max = 10_000_000))]
    #[serde(default = "default_max_samples")]
    pub max_samples: usize,

    /// Page size used when a query does not specify one.
    #[validate(range(min = 1, max = 500))]
    #[serde(default = "default_limit")]
    pub default_limit: u32,

    /// Largest page a single query may request.
    #[validate(range(min = 1, max = 500))]
    #[serde(default = "default_max_limit")]
    pub max_limit: u32,
}

fn validate_limits(config: &StorageConfig) -> Result<(), ValidationError> {
    if config.default_limit > config.max_limit {
        let mut error = ValidationError::new("default_limit_exceeds_max_limit");
        error.message = Some("default_limit must not exceed max_limit".into());
        return Err(error);
    }
    Ok(())
}

fn default_retention_ms() -> u64 {
    3_600_000
}

fn default_max_samples() -> usize {
    25_000
}

fn default_limit() -> u32 {
    200
}

fn default_max_limit() -> u32 {
    500
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            retention_ms: default_retention_ms(),
            max_samples: default_max_samples(),
            default_limit: default_limit(),
            max_limit: default_max_limit(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_storage_config_is_valid() {
        StorageConfig::default()
            .validate()
            .expect("Default config should be valid");
    }

    #[test]
    fn rejects_default_limit_above_max_limit() {
        let config = StorageConfig {
            default_limit: 300,
            max_limit: 100,
            ..StorageConfig::default()
        };
        let errors = config.validate().unwrap_err();
        assert!(errors.to_string().contains("default_limit must not exceed max_limit"));
    }

    #[test]
    fn equal_limits_are_accepted() {
        let config = StorageConfig {
            default_limit: 50,
            max_limit: 50,
            ..StorageConfig::default()
        };
        assert!(config.validate().is_ok());
    }
}
