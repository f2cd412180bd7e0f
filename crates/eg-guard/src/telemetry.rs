// telemetry.rs — Outbound observability events and the sink seam.
//
// Telemetry is strictly fire-and-forget: `emit` never blocks and never
// fails, and no sink failure may reach the decision path. The engine only
// knows the trait; the HTTP delivery implementation lives in eg-telemetry
// so this crate stays synchronous.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use eg_anchor::RiskLevel;

use crate::config::Mode;

/// An event reported to the observability sink.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TelemetryEvent {
    /// One decision, allowed or blocked.
    Decision {
        session_id: Uuid,
        timestamp: DateTime<Utc>,
        operation: String,
        risk_level: RiskLevel,
        /// Whether the tentative verdict was block (meaningful in shadow
        /// and soft modes, where it can differ from `actually_blocked`).
        would_block: bool,
        actually_blocked: bool,
        reasons: Vec<String>,
        trust_score: f64,
        budget_remaining: f64,
    },
    /// State snapshot, emitted on checkpoint.
    Snapshot {
        session_id: Uuid,
        mode: Mode,
        trust_score: f64,
        budget_remaining: f64,
    },
}

/// Where telemetry goes. Implementations must be non-blocking and
/// infallible from the caller's perspective: swallow your own failures.
pub trait TelemetrySink: Send + Sync {
    fn emit(&self, event: TelemetryEvent);
}

/// Discards everything. The default when no dashboard is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl TelemetrySink for NoopSink {
    fn emit(&self, _event: TelemetryEvent) {}
}
