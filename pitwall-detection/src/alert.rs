//! Alert records and the per-vehicle alert state threaded through evaluation.

use std::collections::{BTreeMap, VecDeque};
use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => f.write_str("warning"),
            Severity::Critical => f.write_str("critical"),
        }
    }
}

/// One raised alert. At most one active alert exists per rule; its id is the
/// rule id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub id: String,
    pub vehicle_id: String,
    pub rule_id: String,
    pub severity: Severity,
    pub message: String,
    pub first_seen: u64,
    pub last_seen: u64,
    pub active: bool,
}

/// Bookkeeping a rule keeps between samples.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleRuntimeState {
    /// When the current uninterrupted run of the condition began.
    pub condition_active_since: Option<u64>,
    /// Severity last reported, `None` while the rule is quiet.
    pub last_severity: Option<Severity>,
}

/// Everything evaluation needs to remember for one vehicle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertState {
    /// Active alerts keyed by rule id.
    pub active: BTreeMap<String, Alert>,
    /// Cleared alerts, oldest first.
    pub history: VecDeque<Alert>,
    pub runtimes: BTreeMap<String, RuleRuntimeState>,
}

impl AlertState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates or refreshes the active alert for `rule_id`.
    ///
    /// Returns `true` when the alert was created or its severity changed.
    pub fn upsert(
        &mut self,
        rule_id: &str,
        vehicle_id: &str,
        severity: Severity,
        message: String,
        at: u64,
    ) -> bool {
        match self.active.get_mut(rule_id) {
            Some(alert) => {
                let changed = alert.severity != severity;
                alert.severity = severity;
                alert.message = message;
                alert.last_seen = at;
                changed
            }
            None => {
                self.active.insert(
                    rule_id.to_string(),
                    Alert {
                        id: rule_id.to_string(),
                        vehicle_id: vehicle_id.to_string(),
                        rule_id: rule_id.to_string(),
                        severity,
                        message,
                        first_seen: at,
                        last_seen: at,
                        active: true,
                    },
                );
                true
            }
        }
    }

    /// Deactivates the alert for `rule_id` and moves it into history, evicting
    /// the oldest entries beyond `history_cap`.
    pub fn clear(&mut self, rule_id: &str, at: u64, history_cap: usize) -> Option<Alert> {
        let mut alert = self.active.remove(rule_id)?;
        alert.active = false;
        alert.last_seen = at;
        self.history.push_back(alert.clone());
        while self.history.len() > history_cap {
            self.history.pop_front();
        }
        Some(alert)
    }

    pub fn active_alert(&self, rule_id: &str) -> Option<&Alert> {
        self.active.get(rule_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upsert_reports_creation_and_severity_changes() {
        let mut state = AlertState::new();
        assert!(state.upsert("r", "car-1", Severity::Warning, "a".into(), 10));
        assert!(!state.upsert("r", "car-1", Severity::Warning, "b".into(), 20));
        assert!(state.upsert("r", "car-1", Severity::Critical, "c".into(), 30));

        let alert = state.active_alert("r").unwrap();
        assert_eq!(alert.first_seen, 10);
        assert_eq!(alert.last_seen, 30);
        assert_eq!(alert.message, "c");
        assert!(alert.active);
    }

    #[test]
    fn clear_moves_into_capped_history() {
        let mut state = AlertState::new();
        for i in 0..5 {
            state.upsert("r", "car-1", Severity::Warning, "m".into(), i);
            let cleared = state.clear("r", i + 1, 3).unwrap();
            assert!(!cleared.active);
            assert_eq!(cleared.last_seen, i + 1);
        }
        assert!(state.active.is_empty());
        assert_eq!(state.history.len(), 3);
        assert_eq!(state.history.front().unwrap().first_seen, 2);
        assert!(state.clear("r", 99, 3).is_none());
    }

    #[test]
    fn serializes_with_camel_case_fields() {
        let mut state = AlertState::new();
        state.upsert("coolant-high", "car-1", Severity::Critical, "hot".into(), 5);
        let yaml = serde_yaml::to_string(&state).unwrap();
        assert!(yaml.contains("firstSeen: 5"));
        assert!(yaml.contains("severity: critical"));
        assert!(yaml.contains("vehicleId: car-1"));
    }
}
