// error.rs — Error types for the guard subsystem.
//
// Everything here is a configuration or persistence error. A denied
// decision is NOT an error — it is a normal outcome of the decision path
// and is expressed as `Decision { allow: false, .. }`.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while configuring or persisting a guard.
#[derive(Debug, Error)]
pub enum GuardError {
    /// A numeric configuration value is outside its legal range.
    #[error(transparent)]
    Config(#[from] eg_anchor::AnchorError),

    /// A constraint registration failed (duplicate id).
    #[error(transparent)]
    Constraint(#[from] eg_constraint::ConstraintError),

    /// The mode string is not one of disabled/shadow/soft/enforce.
    #[error("invalid mode '{0}' (expected disabled, shadow, soft, or enforce)")]
    InvalidMode(String),

    /// Failed to read the configuration file.
    #[error("failed to read config at {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML.
    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Failed to read or write a state snapshot file.
    #[error("snapshot I/O at {path}: {source}")]
    SnapshotIo {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A state snapshot is not valid JSON.
    #[error("snapshot serialization: {0}")]
    SnapshotFormat(#[from] serde_json::Error),
}
