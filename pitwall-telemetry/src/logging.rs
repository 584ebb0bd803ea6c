//! ## pitwall-telemetry::logging
//! **tracing subscriber setup and structured pipeline events**
//!
//! `RUST_LOG` wins over the configured default level when set.

use opentelemetry::KeyValue;
use tracing::info_span;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::{fmt, EnvFilter};

type InitError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Clone)]
pub struct EventLogger;

impl EventLogger {
    /// Installs the global fmt subscriber. Fails if one is already installed.
    pub fn init(default_level: &str) -> Result<(), InitError> {
        fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| EnvFilter::new(default_level)),
            )
            .with_thread_names(true)
            .with_span_events(FmtSpan::ENTER)
            .try_init()
    }

    /// Emits one structured pipeline event (alert raised, run finished, ...).
    #[inline]
    pub fn log_event(event_type: &str, metadata: Vec<KeyValue>) {
        let span = info_span!(
            "pitwall_event",
            event_type = event_type,
            otel.kind = "INTERNAL"
        );
        span.in_scope(|| {
            let fields: Vec<String> = metadata
                .iter()
                .map(|kv| format!("{}={}", kv.key.as_str(), kv.value))
                .collect();
            tracing::info!(metadata = %fields.join(" "), "Pipeline event");
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    #[traced_test]
    #[test]
    fn logs_event_with_metadata() {
        EventLogger::log_event(
            "alert_critical",
            vec![
                KeyValue::new("rule", "coolant-high"),
                KeyValue::new("timestamp", 1_500_i64),
            ],
        );
        assert!(logs_contain("Pipeline event"));
        assert!(logs_contain("rule=coolant-high"));
        assert!(logs_contain("timestamp=1500"));
    }
}
