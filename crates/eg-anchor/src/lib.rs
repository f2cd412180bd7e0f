//! # eg-anchor
//!
//! The trust/budget economy ("the anchor") for Equilibrium Guard: risk
//! classification, the depletable autonomy budget, the bounded trust score,
//! the in-memory decision history, and drift detection over that history.
//!
//! The human is not a user — the human is the anchor. Every component here
//! measures how far the agent has drifted from its last human checkpoint:
//!
//! - [`RiskClassifier`] maps operation identifiers to an ordered
//!   [`RiskLevel`], totally (unknown ids resolve to `Medium`, never error).
//! - [`BudgetLedger`] depletes per operation by risk cost and refills only
//!   at a checkpoint. It never goes negative.
//! - [`TrustTracker`] is a bounded score in `[0, 1]` that builds with clean
//!   operations and human contact and drops on warnings and violations.
//! - [`AuditLog`] is a ring buffer of recent [`HistoryEntry`] decisions.
//! - [`DriftDetector`] scans that window for five behavioral anomaly
//!   patterns and reports findings; it mutates nothing.

pub mod budget;
pub mod drift;
pub mod error;
pub mod history;
pub mod risk;
pub mod trust;

pub use budget::{BudgetLedger, RiskCosts};
pub use drift::{DriftConfig, DriftDetector, DriftFinding, DriftSignal};
pub use error::AnchorError;
pub use history::{AuditLog, HistoryEntry};
pub use risk::{RiskClassifier, RiskLevel};
pub use trust::{TrustParams, TrustTracker};
