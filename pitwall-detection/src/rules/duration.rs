//! Rules that fire once a condition has held for long enough.

use pitwall_core::{ConfigurationError, Sample};

use super::{Rule, Verdict};
use crate::alert::{RuleRuntimeState, Severity};

type Condition = Box<dyn Fn(&Sample) -> bool + Send + Sync>;
type Describe = Box<dyn Fn(&Sample, u64) -> String + Send + Sync>;

/// Warning after `warn_ms` of continuous condition, critical after `crit_ms`.
/// The first sample where the condition is false resets the timer and clears.
pub struct DurationRule {
    id: &'static str,
    warn_ms: u64,
    crit_ms: u64,
    condition: Condition,
    describe: Describe,
}

impl DurationRule {
    pub fn new<C, D>(
        id: &'static str,
        warn_ms: u64,
        crit_ms: u64,
        condition: C,
        describe: D,
    ) -> Result<Self, ConfigurationError>
    where
        C: Fn(&Sample) -> bool + Send + Sync + 'static,
        D: Fn(&Sample, u64) -> String + Send + Sync + 'static,
    {
        if warn_ms > crit_ms {
            return Err(ConfigurationError::Rule {
                rule: id,
                reason: format!("warn_ms {warn_ms} exceeds crit_ms {crit_ms}"),
            });
        }
        Ok(Self {
            id,
            warn_ms,
            crit_ms,
            condition: Box::new(condition),
            describe: Box::new(describe),
        })
    }
}

impl Rule for DurationRule {
    fn id(&self) -> &'static str {
        self.id
    }

    fn evaluate(&self, sample: &Sample, runtime: &mut RuleRuntimeState) -> Verdict {
        if !(self.condition)(sample) {
            runtime.condition_active_since = None;
            return Verdict::Clear;
        }

        let since = *runtime
            .condition_active_since
            .get_or_insert(sample.timestamp);
        let held = sample.timestamp.saturating_sub(since);

        let severity = if held >= self.crit_ms {
            Severity::Critical
        } else if held >= self.warn_ms {
            Severity::Warning
        } else {
            return Verdict::Quiet;
        };
        Verdict::Raise {
            severity,
            message: (self.describe)(sample, held),
        }
    }
}
