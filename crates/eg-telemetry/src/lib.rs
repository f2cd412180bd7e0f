//! # eg-telemetry
//!
//! Best-effort HTTP delivery of guard telemetry to a dashboard.
//!
//! [`HttpTelemetrySink`] implements the guard's `TelemetrySink` trait by
//! queueing events onto a bounded channel drained by a background worker.
//! The decision path never waits on the network:
//!
//! - `emit` is a `try_send`; when the queue is full the event is dropped.
//! - Delivery failures (connection refused, timeout, 5xx) are logged at
//!   debug level and dropped. Nothing is retried.
//! - Requests carry a 1 second timeout so a slow dashboard cannot back up
//!   the queue indefinitely.
//!
//! Losing telemetry is always preferable to delaying or failing a
//! decision.

use std::io;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::mpsc;

use eg_guard::{TelemetryEvent, TelemetrySink};

/// Queue depth before events are dropped.
const QUEUE_CAPACITY: usize = 256;

/// Per-request timeout for dashboard delivery.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(1);

#[derive(Debug, Error)]
pub enum TelemetryError {
    /// The delivery worker's runtime could not be created.
    #[error("failed to start telemetry worker: {0}")]
    Worker(#[from] io::Error),
    /// The HTTP client could not be built.
    #[error("failed to build telemetry client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Fire-and-forget sink posting events to a dashboard over HTTP.
///
/// Decision events go to `{base_url}/api/decision`, state snapshots to
/// `{base_url}/api/state`. The worker runs on its own thread with a
/// single-threaded runtime, so the sink works from fully synchronous
/// hosts. Dropping the sink closes the queue; the worker drains what is
/// already queued and exits.
pub struct HttpTelemetrySink {
    tx: mpsc::Sender<TelemetryEvent>,
}

impl HttpTelemetrySink {
    /// Start the delivery worker for the given dashboard base URL.
    pub fn start(base_url: impl Into<String>) -> Result<Self, TelemetryError> {
        let base_url = base_url.into();
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        let (tx, rx) = mpsc::channel(QUEUE_CAPACITY);
        std::thread::Builder::new()
            .name("eg-telemetry".to_string())
            .spawn(move || runtime.block_on(deliver_loop(client, base_url, rx)))?;
        Ok(Self { tx })
    }
}

impl TelemetrySink for HttpTelemetrySink {
    fn emit(&self, event: TelemetryEvent) {
        if let Err(err) = self.tx.try_send(event) {
            tracing::debug!(%err, "telemetry queue full or closed; event dropped");
        }
    }
}

async fn deliver_loop(
    client: reqwest::Client,
    base_url: String,
    mut rx: mpsc::Receiver<TelemetryEvent>,
) {
    let base_url = base_url.trim_end_matches('/').to_string();
    while let Some(event) = rx.recv().await {
        let endpoint = match &event {
            TelemetryEvent::Decision { .. } => format!("{}/api/decision", base_url),
            TelemetryEvent::Snapshot { .. } => format!("{}/api/state", base_url),
        };
        match client.post(&endpoint).json(&event).send().await {
            Ok(response) if !response.status().is_success() => {
                tracing::debug!(
                    endpoint = %endpoint,
                    status = %response.status(),
                    "dashboard rejected telemetry event; dropped"
                );
            }
            Ok(_) => {}
            Err(err) => {
                tracing::debug!(endpoint = %endpoint, %err, "telemetry delivery failed; dropped");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use eg_anchor::RiskLevel;
    use uuid::Uuid;

    fn decision_event() -> TelemetryEvent {
        TelemetryEvent::Decision {
            session_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            operation: "web_fetch".to_string(),
            risk_level: RiskLevel::High,
            would_block: false,
            actually_blocked: false,
            reasons: Vec::new(),
            trust_score: 0.7,
            budget_remaining: 0.6,
        }
    }

    #[test]
    fn emit_never_blocks_when_dashboard_is_absent() {
        // No server is listening on this port; every delivery fails. The
        // caller must never notice.
        let sink = HttpTelemetrySink::start("http://127.0.0.1:59999").unwrap();
        for _ in 0..QUEUE_CAPACITY * 2 {
            sink.emit(decision_event());
        }
    }

    #[test]
    fn emit_after_worker_shutdown_is_harmless() {
        let sink = HttpTelemetrySink::start("http://127.0.0.1:59999").unwrap();
        let sink2 = HttpTelemetrySink::start("http://127.0.0.1:59999").unwrap();
        drop(sink2);
        sink.emit(decision_event());
    }

    #[test]
    fn base_url_trailing_slash_is_normalized() {
        let sink = HttpTelemetrySink::start("http://127.0.0.1:59999/").unwrap();
        sink.emit(decision_event());
    }
}
