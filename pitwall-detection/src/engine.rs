//! ## pitwall-detection::engine
//! **Replayable alert evaluation**
//!
//! `evaluate` takes the prior state by value and hands back the next one, so a
//! recorded sample stream replays to the same alerts. Nothing is shared
//! between two states.

use serde::Serialize;
use tracing::{debug, trace};

use pitwall_config::AlertsConfig;
use pitwall_core::{ConfigurationError, Sample};

use crate::alert::{Alert, AlertState, Severity};
use crate::rules::{self, Rule, Verdict};

/// Outcome of evaluating one sample.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Evaluation {
    pub state: AlertState,
    /// Alerts that became critical on this sample.
    pub newly_critical: Vec<Alert>,
    /// Alerts deactivated on this sample.
    pub cleared: Vec<Alert>,
}

pub struct AlertEngine {
    rules: Vec<Box<dyn Rule>>,
    history_cap: usize,
}

impl AlertEngine {
    /// Builds the built-in rule set with configured thresholds.
    pub fn new(config: &AlertsConfig) -> Result<Self, ConfigurationError> {
        if config.history_cap == 0 {
            return Err(ConfigurationError::Rule {
                rule: "history",
                reason: "history_cap must be positive".into(),
            });
        }
        Ok(Self {
            rules: rules::builtin(config)?,
            history_cap: config.history_cap,
        })
    }

    pub fn initial_state(&self) -> AlertState {
        AlertState::new()
    }

    pub fn rule_ids(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.rules.iter().map(|r| r.id())
    }

    pub fn evaluate(&self, sample: &Sample, prior: AlertState) -> Evaluation {
        let mut state = prior;
        let mut newly_critical = Vec::new();
        let mut cleared = Vec::new();

        for rule in &self.rules {
            let id = rule.id();
            let verdict = {
                let runtime = state.runtimes.entry(id.to_string()).or_default();
                let verdict = rule.evaluate(sample, runtime);
                match &verdict {
                    Verdict::Raise { severity, .. } => runtime.last_severity = Some(*severity),
                    Verdict::Clear => runtime.last_severity = None,
                    Verdict::Quiet => {}
                }
                verdict
            };

            match verdict {
                Verdict::Raise { severity, message } => {
                    let changed =
                        state.upsert(id, &sample.vehicle_id, severity, message, sample.timestamp);
                    if changed {
                        debug!(rule = id, %severity, at = sample.timestamp, "alert severity changed");
                    }
                    if changed && severity == Severity::Critical {
                        if let Some(alert) = state.active_alert(id) {
                            newly_critical.push(alert.clone());
                        }
                    }
                }
                Verdict::Clear => {
                    if let Some(alert) = state.clear(id, sample.timestamp, self.history_cap) {
                        debug!(rule = id, at = sample.timestamp, "alert cleared");
                        cleared.push(alert);
                    }
                }
                Verdict::Quiet => trace!(rule = id, "rule quiet"),
            }
        }

        Evaluation {
            state,
            newly_critical,
            cleared,
        }
    }
}
