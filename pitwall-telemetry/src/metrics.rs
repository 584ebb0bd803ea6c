//! ## pitwall-telemetry::metrics
//! **Prometheus counters, gauge and tick-latency histogram**

use prometheus::{Encoder, Histogram, HistogramOpts, IntCounter, IntGauge, Registry, TextEncoder};

#[derive(Debug, Clone)]
pub struct MetricsRecorder {
    pub registry: Registry,
    pub samples_emitted: IntCounter,
    pub samples_dropped: IntCounter,
    pub samples_stored: IntCounter,
    pub alerts_raised: IntCounter,
    pub alerts_critical: IntCounter,
    pub alerts_cleared: IntCounter,
    pub repository_size: IntGauge,
    pub tick_duration: Histogram,
}

impl MetricsRecorder {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let counter = |name: &str, help: &str| -> Result<IntCounter, prometheus::Error> {
            let c = IntCounter::new(name, help)?;
            registry.register(Box::new(c.clone()))?;
            Ok(c)
        };

        let samples_emitted = counter("pitwall_samples_emitted_total", "Valid samples emitted")?;
        let samples_dropped =
            counter("pitwall_samples_dropped_total", "Samples dropped by validation")?;
        let samples_stored = counter("pitwall_samples_stored_total", "Samples accepted by storage")?;
        let alerts_raised = counter("pitwall_alerts_raised_total", "Alerts created")?;
        let alerts_critical =
            counter("pitwall_alerts_critical_total", "Alerts escalated to critical")?;
        let alerts_cleared = counter("pitwall_alerts_cleared_total", "Alerts cleared")?;

        let repository_size = IntGauge::new("pitwall_repository_size", "Samples currently stored")?;
        registry.register(Box::new(repository_size.clone()))?;

        let tick_duration = Histogram::with_opts(
            HistogramOpts::new("pitwall_tick_duration_ns", "Per-sample pipeline processing time")
                .buckets(vec![1_000.0, 10_000.0, 100_000.0, 1_000_000.0]),
        )?;
        registry.register(Box::new(tick_duration.clone()))?;

        Ok(Self {
            registry,
            samples_emitted,
            samples_dropped,
            samples_stored,
            alerts_raised,
            alerts_critical,
            alerts_cleared,
            repository_size,
            tick_duration,
        })
    }

    /// Renders all metrics in the Prometheus text exposition format.
    pub fn gather_metrics(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::<u8>::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }

    pub fn observe_tick_ns(&self, nanos: u64) {
        self.tick_duration.observe(nanos as f64);
    }
}
