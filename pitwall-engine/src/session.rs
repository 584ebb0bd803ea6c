//! One vehicle's consumer side: storage, alert state and instrumentation.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Instant;

use opentelemetry::KeyValue;
use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, error, info, warn};

use pitwall_config::PitwallConfig;
use pitwall_core::{Sample, ValidationError};
use pitwall_detection::{Alert, AlertEngine, AlertState, Severity};
use pitwall_storage::{QueryPage, QueryParams, Repository, RepositoryOptions};
use pitwall_telemetry::{EventLogger, MetricsRecorder};

/// What happened to one ingested sample.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IngestOutcome {
    pub stored: bool,
    pub raised: Vec<Alert>,
    pub newly_critical: Vec<Alert>,
    pub cleared: Vec<Alert>,
}

/// Owns the repository and alert state of one vehicle stream.
pub struct VehicleSession {
    vehicle_id: String,
    repository: Repository,
    alerts: AlertEngine,
    state: Mutex<AlertState>,
    metrics: Arc<MetricsRecorder>,
}

impl VehicleSession {
    pub fn new(
        config: &PitwallConfig,
        metrics: Arc<MetricsRecorder>,
    ) -> Result<Self, pitwall_core::ConfigurationError> {
        let alerts = AlertEngine::new(&config.alerts)?;
        let options = RepositoryOptions::from_config(&config.storage, config.engine.max_gear());
        info!(vehicle = %config.engine.vehicle_id, "vehicle session opened");
        Ok(Self {
            vehicle_id: config.engine.vehicle_id.clone(),
            repository: Repository::new(options),
            state: Mutex::new(alerts.initial_state()),
            alerts,
            metrics,
        })
    }

    pub fn vehicle_id(&self) -> &str {
        &self.vehicle_id
    }

    /// Stores `sample`, evaluates alerts against it and records metrics.
    pub fn ingest(&self, sample: &Sample) -> IngestOutcome {
        let started = Instant::now();
        let stored = self.repository.add(sample.clone());
        if stored {
            self.metrics.samples_stored.inc();
        }
        self.metrics
            .repository_size
            .set(self.repository.size() as i64);

        let evaluation = {
            let mut state = self.state.lock();
            let prior = std::mem::take(&mut *state);
            let previously_active: BTreeSet<String> = prior.active.keys().cloned().collect();
            let mut evaluation = self.alerts.evaluate(sample, prior);
            let raised: Vec<Alert> = evaluation
                .state
                .active
                .values()
                .filter(|a| !previously_active.contains(&a.rule_id))
                .cloned()
                .collect();
            *state = std::mem::take(&mut evaluation.state);
            IngestOutcome {
                stored,
                raised,
                newly_critical: evaluation.newly_critical,
                cleared: evaluation.cleared,
            }
        };

        self.report(&evaluation);
        self.metrics
            .observe_tick_ns(started.elapsed().as_nanos() as u64);
        evaluation
    }

    /// Counts a sample produced by this vehicle's simulation. Samples handed
    /// to [`Self::ingest`] from elsewhere are not counted.
    pub fn record_emitted(&self) {
        self.metrics.samples_emitted.inc();
    }

    /// Counts a sample the generator discarded.
    pub fn record_dropped(&self, error: &ValidationError) {
        debug!(vehicle = %self.vehicle_id, %error, "sample dropped before ingest");
        self.metrics.samples_dropped.inc();
    }

    fn report(&self, outcome: &IngestOutcome) {
        for alert in &outcome.raised {
            self.metrics.alerts_raised.inc();
            if alert.severity == Severity::Warning {
                warn!(
                    vehicle = %alert.vehicle_id,
                    rule = %alert.rule_id,
                    at = alert.last_seen,
                    "alert raised: {}",
                    alert.message
                );
            }
        }
        for alert in &outcome.newly_critical {
            self.metrics.alerts_critical.inc();
            error!(
                vehicle = %alert.vehicle_id,
                rule = %alert.rule_id,
                at = alert.last_seen,
                "critical alert: {}",
                alert.message
            );
            EventLogger::log_event(
                "alert_critical",
                vec![
                    KeyValue::new("vehicle", alert.vehicle_id.clone()),
                    KeyValue::new("rule", alert.rule_id.clone()),
                    KeyValue::new("timestamp", alert.last_seen as i64),
                ],
            );
        }
        for alert in &outcome.cleared {
            self.metrics.alerts_cleared.inc();
            info!(
                vehicle = %alert.vehicle_id,
                rule = %alert.rule_id,
                duration_ms = alert.last_seen.saturating_sub(alert.first_seen),
                "alert cleared"
            );
        }
    }

    pub fn query(&self, params: &QueryParams) -> Result<QueryPage, pitwall_core::QueryError> {
        self.repository.query(params)
    }

    pub fn repository(&self) -> &Repository {
        &self.repository
    }

    pub fn active_alerts(&self) -> Vec<Alert> {
        self.state.lock().active.values().cloned().collect()
    }

    pub fn history_len(&self) -> usize {
        self.state.lock().history.len()
    }

    pub fn alert_state(&self) -> AlertState {
        self.state.lock().clone()
    }
}
