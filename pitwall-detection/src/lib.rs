//! # Pitwall Detection Engine
//!
//! Threshold-based alerting over telemetry samples. Evaluation is a pure
//! function of one sample and the prior [`AlertState`]; independent vehicles
//! carry independent states.

pub mod alert;
pub mod engine;
pub mod rules;

pub use alert::{Alert, AlertState, RuleRuntimeState, Severity};
pub use engine::{AlertEngine, Evaluation};
