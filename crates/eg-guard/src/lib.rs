//! # eg-guard
//!
//! The decision engine for Equilibrium Guard: gates every action an
//! autonomous agent requests against explicit constraints and the adaptive
//! trust/budget economy, producing an allow/block [`Decision`] with a
//! reason before the action executes.
//!
//! The [`DecisionEngine`] orchestrates the leaf components — risk
//! classification, constraint validation, the budget ledger, the trust
//! tracker, and drift detection — under a mode-specific policy:
//!
//! | mode       | behavior |
//! |------------|----------|
//! | `disabled` | allow everything, mutate nothing, log for observability |
//! | `shadow`   | allow everything, record what *would* have blocked |
//! | `soft`     | honor blocks only for High/Critical risk |
//! | `enforce`  | honor every block |
//!
//! This is not a sandbox: the engine cannot stop an action once allowed.
//! It decides, records, and signals — enforcement is the caller's job.

pub mod config;
pub mod engine;
pub mod error;
pub mod session;
pub mod state;
pub mod telemetry;

pub use config::{GuardConfig, Mode};
pub use engine::{Decision, DecisionEngine, OperationRequest};
pub use error::GuardError;
pub use session::SessionGuard;
pub use state::GuardState;
pub use telemetry::{NoopSink, TelemetryEvent, TelemetrySink};
