// commands/mod.rs — Shared session plumbing for all subcommands.

pub mod check;
pub mod checkpoint;
pub mod history;
pub mod mode;
pub mod status;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;

use eg_constraint::compliance_validator;
use eg_guard::{DecisionEngine, GuardConfig, GuardState};
use eg_telemetry::HttpTelemetrySink;

/// One CLI invocation's view of the supervised session: the engine plus
/// the snapshot path it persists to.
pub struct Session {
    pub engine: DecisionEngine,
    state_path: PathBuf,
}

impl Session {
    /// Load config and state, build the engine.
    ///
    /// A missing config file means defaults; a missing snapshot means a
    /// fresh session. The snapshot's state (including mode) wins over the
    /// config when both exist.
    pub fn open(config_path: &Path, state_path: &Path) -> anyhow::Result<Self> {
        let config = if config_path.exists() {
            GuardConfig::load(config_path)
                .with_context(|| format!("loading config {}", config_path.display()))?
        } else {
            GuardConfig::default()
        };

        let validator = compliance_validator().context("building compliance constraints")?;

        let mut engine = match GuardState::load(state_path)
            .with_context(|| format!("loading state snapshot {}", state_path.display()))?
        {
            Some(state) => DecisionEngine::with_state(config.clone(), validator, state)?,
            None => DecisionEngine::new(config.clone(), validator)?,
        };

        if let Some(url) = &config.telemetry_url {
            match HttpTelemetrySink::start(url.clone()) {
                Ok(sink) => engine = engine.with_sink(Arc::new(sink)),
                // The guard works without its dashboard.
                Err(err) => tracing::warn!(%err, "telemetry disabled"),
            }
        }

        Ok(Self {
            engine,
            state_path: state_path.to_path_buf(),
        })
    }

    /// Persist the session state for the next invocation.
    pub fn save(self) -> anyhow::Result<()> {
        let path = self.state_path;
        self.engine
            .into_state()
            .save(&path)
            .with_context(|| format!("saving state snapshot {}", path.display()))
    }
}
