// config.rs — The guard's configuration surface.
//
// Every knob is optional with a stated default; the file format is TOML:
//
//   mode = "enforce"
//   initial_trust = 0.7
//   budget_size = 1.0
//
//   [risk_costs]
//   HIGH = 0.5
//
//   [risk_overrides]
//   wiki_edit = "HIGH"
//
//   [drift]
//   repetition_threshold = 8
//
// Numeric ranges are validated at load time; a bad value is fatal then,
// never discovered mid-decision.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use eg_anchor::{AnchorError, DriftConfig, RiskLevel, TrustParams};

use crate::error::GuardError;

/// The global enforcement posture.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Allow everything; mutate nothing; log for observability only.
    Disabled,
    /// Allow everything, but record what would have blocked.
    Shadow,
    /// Honor blocks only at High/Critical risk.
    Soft,
    /// Honor every block.
    Enforce,
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mode::Disabled => write!(f, "disabled"),
            Mode::Shadow => write!(f, "shadow"),
            Mode::Soft => write!(f, "soft"),
            Mode::Enforce => write!(f, "enforce"),
        }
    }
}

impl FromStr for Mode {
    type Err = GuardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "disabled" => Ok(Mode::Disabled),
            "shadow" => Ok(Mode::Shadow),
            "soft" => Ok(Mode::Soft),
            "enforce" => Ok(Mode::Enforce),
            other => Err(GuardError::InvalidMode(other.to_string())),
        }
    }
}

/// Complete guard configuration. All fields optional in the file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardConfig {
    /// Operating mode at session start.
    pub mode: Mode,
    /// Starting trust score, within [0, 1].
    pub initial_trust: f64,
    /// Budget size the ledger starts at and resets to, within (0, 1].
    pub budget_size: f64,
    /// Decision history retention (ring buffer size).
    pub history_size: usize,
    /// After this many minutes without human interaction, Medium+ risk
    /// operations require a checkpoint.
    pub max_minutes_without_human: i64,
    /// Per-level budget cost overrides.
    pub risk_costs: HashMap<RiskLevel, f64>,
    /// Per-level minimum-trust overrides.
    pub trust_required: HashMap<RiskLevel, f64>,
    /// Per-operation-identifier risk level overrides.
    pub risk_overrides: HashMap<String, RiskLevel>,
    /// Trust adjustment parameters.
    pub trust: TrustParams,
    /// Drift detection thresholds.
    pub drift: DriftConfig,
    /// Dashboard base URL for telemetry; None disables delivery.
    pub telemetry_url: Option<String>,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            mode: Mode::Shadow,
            initial_trust: 0.7,
            budget_size: 1.0,
            history_size: 100,
            max_minutes_without_human: 60,
            risk_costs: HashMap::new(),
            trust_required: HashMap::new(),
            risk_overrides: HashMap::new(),
            trust: TrustParams::default(),
            drift: DriftConfig::default(),
            telemetry_url: None,
        }
    }
}

impl GuardConfig {
    /// Parse a TOML document and validate numeric ranges.
    pub fn from_toml_str(input: &str) -> Result<Self, GuardError> {
        let config: GuardConfig = toml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, GuardError> {
        let path = path.as_ref();
        let input = fs::read_to_string(path).map_err(|source| GuardError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&input)
    }

    /// Range-check every numeric knob. Fatal at load time.
    pub fn validate(&self) -> Result<(), GuardError> {
        AnchorError::check_range("initial_trust", self.initial_trust, 0.0, 1.0)?;
        AnchorError::check_range("budget_size", self.budget_size, f64::MIN_POSITIVE, 1.0)?;
        for value in self.risk_costs.values() {
            AnchorError::check_range("risk_costs", *value, 0.0, 1.0)?;
        }
        for value in self.trust_required.values() {
            AnchorError::check_range("trust_required", *value, 0.0, 1.0)?;
        }
        AnchorError::check_range("drift.external_ratio", self.drift.external_ratio, 0.0, 1.0)?;
        Ok(())
    }

    /// Minimum trust required at a level: the override if present,
    /// otherwise the level's default floor.
    pub fn min_trust(&self, level: RiskLevel) -> f64 {
        self.trust_required
            .get(&level)
            .copied()
            .unwrap_or_else(|| level.default_min_trust())
    }
}
