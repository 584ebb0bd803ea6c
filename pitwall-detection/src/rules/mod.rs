//! ## pitwall-detection::rules
//! **Fixed threshold rule set**
//!
//! - `duration`: a condition held continuously for a minimum time
//! - `level`: a value crossing thresholds, released only past a looser
//!   clear boundary (hysteresis)

use pitwall_config::AlertsConfig;
use pitwall_core::{ConfigurationError, Sample};

use crate::alert::{RuleRuntimeState, Severity};

pub mod duration;
pub mod level;

pub use duration::DurationRule;
pub use level::{Direction, LevelRule};

pub const RPM_SUSTAINED_HIGH: &str = "rpm-sustained-high";
pub const PEDAL_OVERLAP: &str = "pedal-overlap";
pub const COOLANT_HIGH: &str = "coolant-high";
pub const TIRE_DELTA: &str = "tire-delta";
pub const BATTERY_LOW: &str = "battery-low";

/// What a rule wants done with its alert after looking at one sample.
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    /// Create or refresh the alert at this severity.
    Raise { severity: Severity, message: String },
    /// Deactivate the alert if one is active.
    Clear,
    /// Leave things as they are.
    Quiet,
}

/// A single alert rule. Implementations keep all memory in the
/// [`RuleRuntimeState`] they are handed.
pub trait Rule: Send + Sync {
    fn id(&self) -> &'static str;

    fn evaluate(&self, sample: &Sample, runtime: &mut RuleRuntimeState) -> Verdict;
}

/// Builds the five built-in rules from configured thresholds.
pub fn builtin(config: &AlertsConfig) -> Result<Vec<Box<dyn Rule>>, ConfigurationError> {
    let rpm = config.rpm_sustained_high.clone();
    let pedals = config.pedal_overlap.clone();

    let rules: Vec<Box<dyn Rule>> = vec![
        Box::new(DurationRule::new(
            RPM_SUSTAINED_HIGH,
            rpm.warn_ms,
            rpm.crit_ms,
            move |s: &Sample| s.rpm >= rpm.rpm,
            |s: &Sample, held| format!("RPM {:.0} sustained for {held} ms", s.rpm),
        )?),
        Box::new(DurationRule::new(
            PEDAL_OVERLAP,
            pedals.warn_ms,
            pedals.crit_ms,
            move |s: &Sample| s.throttle_pct > pedals.throttle_pct && s.brake_pct > pedals.brake_pct,
            |s: &Sample, held| {
                format!(
                    "Throttle {:.0}% and brake {:.0}% overlapping for {held} ms",
                    s.throttle_pct, s.brake_pct
                )
            },
        )?),
        Box::new(LevelRule::new(
            COOLANT_HIGH,
            Direction::Rising,
            config.coolant_high,
            |s: &Sample| s.coolant_c,
            |v| format!("Coolant at {v:.1} °C"),
        )?),
        Box::new(LevelRule::new(
            TIRE_DELTA,
            Direction::Rising,
            config.tire_delta,
            |s: &Sample| s.tire_temps.spread(),
            |v| format!("Tire temperature spread {v:.1} °C"),
        )?),
        Box::new(LevelRule::new(
            BATTERY_LOW,
            Direction::Falling,
            config.battery_low,
            |s: &Sample| s.state_of_charge,
            |v| format!("Battery state of charge {v:.1}%"),
        )?),
    ];
    Ok(rules)
}
