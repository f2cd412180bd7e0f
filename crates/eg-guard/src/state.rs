// state.rs — The single mutable aggregate for one supervised session.
//
// Exactly one GuardState exists per session; it is created at session
// start and lives for the session's duration. There is no process-wide
// singleton — independent sessions hold independent states. Persistence
// is optional: the state serializes to a JSON snapshot so short-lived
// hosts (the CLI) can carry it across invocations.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use eg_anchor::budget::{BudgetLedger, RiskCosts};
use eg_anchor::{AuditLog, DriftSignal, TrustTracker};

use crate::config::{GuardConfig, Mode};
use crate::error::GuardError;

/// Mutable state of one supervised agent session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuardState {
    /// Stable identifier for this session, carried in telemetry.
    pub session_id: Uuid,
    /// Current enforcement posture.
    pub mode: Mode,
    /// The depletable autonomy budget.
    pub budget: BudgetLedger,
    /// The bounded trust score.
    pub trust: TrustTracker,
    /// Operations decided since the last checkpoint.
    pub ops_since_checkpoint: u32,
    /// Consecutive clean (allowed, unflagged) operations.
    pub clean_streak: u32,
    /// When the human last interacted with this session.
    pub last_human: DateTime<Utc>,
    /// Set when drift detection demands a checkpoint; cleared only by one.
    pub forced_checkpoint: Option<DriftSignal>,
    /// Ring buffer of recent decisions.
    pub history: AuditLog,
}

impl GuardState {
    /// Build fresh session state from a validated configuration.
    pub fn new(config: &GuardConfig) -> Result<Self, GuardError> {
        let costs = RiskCosts::with_overrides(&config.risk_costs)?;
        Ok(Self {
            session_id: Uuid::new_v4(),
            mode: config.mode,
            budget: BudgetLedger::new(config.budget_size, costs)?,
            trust: TrustTracker::new(config.initial_trust, config.trust.clone())?,
            ops_since_checkpoint: 0,
            clean_streak: 0,
            last_human: Utc::now(),
            forced_checkpoint: None,
            history: AuditLog::new(config.history_size),
        })
    }

    /// Minutes elapsed since the last human interaction.
    pub fn minutes_since_human(&self) -> i64 {
        (Utc::now() - self.last_human).num_minutes()
    }

    /// Write a JSON snapshot of this state.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), GuardError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| GuardError::SnapshotIo {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).map_err(|source| GuardError::SnapshotIo {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load a previously saved snapshot. Returns `Ok(None)` if no snapshot
    /// exists at the path.
    pub fn load(path: impl AsRef<Path>) -> Result<Option<Self>, GuardError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(None);
        }
        let data = fs::read_to_string(path).map_err(|source| GuardError::SnapshotIo {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Some(serde_json::from_str(&data)?))
    }
}
