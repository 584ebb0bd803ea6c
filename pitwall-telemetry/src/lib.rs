//! # Pitwall Telemetry and Monitoring
//!
//! Structured logging setup and Prometheus metrics for the telemetry
//! pipeline.

pub mod logging;
pub mod metrics;

pub use logging::EventLogger;
pub use metrics::MetricsRecorder;
