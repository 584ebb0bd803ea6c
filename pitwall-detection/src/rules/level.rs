//! Rules that compare one value against warn/critical levels with a separate
//! clear boundary.

use pitwall_config::LevelRuleConfig;
use pitwall_core::{ConfigurationError, Sample};

use super::{Rule, Verdict};
use crate::alert::{RuleRuntimeState, Severity};

type Extract = Box<dyn Fn(&Sample) -> f64 + Send + Sync>;
type Describe = Box<dyn Fn(f64) -> String + Send + Sync>;

/// Which way is bad.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Alert at or above the thresholds; clear strictly below `clear`.
    Rising,
    /// Alert at or below the thresholds; clear strictly above `clear`.
    Falling,
}

impl Direction {
    fn reaches(self, value: f64, threshold: f64) -> bool {
        match self {
            Direction::Rising => value >= threshold,
            Direction::Falling => value <= threshold,
        }
    }

    fn released(self, value: f64, clear: f64) -> bool {
        match self {
            Direction::Rising => value < clear,
            Direction::Falling => value > clear,
        }
    }
}

pub struct LevelRule {
    id: &'static str,
    direction: Direction,
    levels: LevelRuleConfig,
    extract: Extract,
    describe: Describe,
}

impl LevelRule {
    /// Fails unless the clear boundary sits on the safe side of warn, and warn
    /// on the safe side of critical.
    pub fn new<E, D>(
        id: &'static str,
        direction: Direction,
        levels: LevelRuleConfig,
        extract: E,
        describe: D,
    ) -> Result<Self, ConfigurationError>
    where
        E: Fn(&Sample) -> f64 + Send + Sync + 'static,
        D: Fn(f64) -> String + Send + Sync + 'static,
    {
        let LevelRuleConfig {
            warn,
            critical,
            clear,
        } = levels;
        if ![warn, critical, clear].iter().all(|v| v.is_finite()) {
            return Err(ConfigurationError::Rule {
                rule: id,
                reason: "thresholds must be finite".into(),
            });
        }
        let ordered = match direction {
            Direction::Rising => clear < warn && warn <= critical,
            Direction::Falling => critical <= warn && warn < clear,
        };
        if !ordered {
            return Err(ConfigurationError::Rule {
                rule: id,
                reason: format!(
                    "thresholds out of order for {direction:?} rule \
                     (warn={warn}, critical={critical}, clear={clear})"
                ),
            });
        }
        Ok(Self {
            id,
            direction,
            levels,
            extract: Box::new(extract),
            describe: Box::new(describe),
        })
    }
}

impl Rule for LevelRule {
    fn id(&self) -> &'static str {
        self.id
    }

    fn evaluate(&self, sample: &Sample, runtime: &mut RuleRuntimeState) -> Verdict {
        let value = (self.extract)(sample);
        let dir = self.direction;

        let severity = if dir.reaches(value, self.levels.critical) {
            Severity::Critical
        } else if dir.reaches(value, self.levels.warn) {
            Severity::Warning
        } else if runtime.last_severity.is_some() && !dir.released(value, self.levels.clear) {
            // Inside the hysteresis band of an active alert.
            Severity::Warning
        } else {
            return Verdict::Clear;
        };
        Verdict::Raise {
            severity,
            message: (self.describe)(value),
        }
    }
}
