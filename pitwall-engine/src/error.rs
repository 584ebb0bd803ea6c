use thiserror::Error;

use pitwall_config::ConfigError;
use pitwall_core::ConfigurationError;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid component configuration: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("State hash mismatch: expected {expected}, got {actual}")]
    HashMismatch { expected: String, actual: String },

    #[error("Engine failed to start: {0}")]
    Start(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
