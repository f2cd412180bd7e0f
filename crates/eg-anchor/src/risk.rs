// risk.rs — Risk levels and the operation classifier.
//
// Classification is a total function over a merged lookup table: built-in
// defaults overridden by configuration, case-insensitive, with unknown
// identifiers resolving to Medium. Table-driven rather than heuristic so
// classifying the same identifier twice always yields the same level.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Risk level of an operation, ordered from harmless to irreversible.
///
/// `Ord` derives from declaration order: `Safe < Low < Medium < High <
/// Critical`. Serialized as the uppercase wire strings ("SAFE", ...).
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    /// Read-only, internal, reversible.
    Safe,
    /// Minor changes, easily reversible.
    Low,
    /// Significant changes, reversible with effort.
    Medium,
    /// External actions, hard to reverse.
    High,
    /// Irreversible, public, or security-sensitive.
    Critical,
}

impl RiskLevel {
    pub const ALL: [RiskLevel; 5] = [
        RiskLevel::Safe,
        RiskLevel::Low,
        RiskLevel::Medium,
        RiskLevel::High,
        RiskLevel::Critical,
    ];

    /// Default budget cost for operations at this level.
    pub fn default_cost(self) -> f64 {
        match self {
            RiskLevel::Safe => 0.0,
            RiskLevel::Low => 0.05,
            RiskLevel::Medium => 0.15,
            RiskLevel::High => 0.40,
            RiskLevel::Critical => 1.0,
        }
    }

    /// Default minimum trust score required to proceed at this level.
    pub fn default_min_trust(self) -> f64 {
        match self {
            RiskLevel::Safe => 0.0,
            RiskLevel::Low => 0.2,
            RiskLevel::Medium => 0.4,
            RiskLevel::High => 0.6,
            RiskLevel::Critical => 0.8,
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskLevel::Safe => write!(f, "SAFE"),
            RiskLevel::Low => write!(f, "LOW"),
            RiskLevel::Medium => write!(f, "MEDIUM"),
            RiskLevel::High => write!(f, "HIGH"),
            RiskLevel::Critical => write!(f, "CRITICAL"),
        }
    }
}

/// Built-in risk table: operation families the guard recognizes out of the
/// box. Read-like identifiers are free, mutations cost more the harder
/// they are to reverse, outward-facing actions are High, and identity or
/// production-touching actions are Critical.
const DEFAULT_RISK_TABLE: &[(&str, RiskLevel)] = &[
    ("file_read", RiskLevel::Safe),
    ("file_list", RiskLevel::Safe),
    ("search", RiskLevel::Safe),
    ("status_check", RiskLevel::Safe),
    ("file_write", RiskLevel::Low),
    ("file_create", RiskLevel::Low),
    ("file_update", RiskLevel::Low),
    ("db_insert", RiskLevel::Low),
    ("db_update", RiskLevel::Low),
    ("file_delete", RiskLevel::Medium),
    ("db_delete", RiskLevel::Medium),
    ("db_truncate", RiskLevel::Medium),
    ("shell_exec", RiskLevel::Medium),
    ("code_eval", RiskLevel::Medium),
    ("web_fetch", RiskLevel::High),
    ("http_post", RiskLevel::High),
    ("email_send", RiskLevel::High),
    ("message_send", RiskLevel::High),
    ("publish", RiskLevel::High),
    ("deploy_production", RiskLevel::Critical),
    ("credential_issue", RiskLevel::Critical),
    ("key_rotation", RiskLevel::Critical),
];

/// Fallback level for identifiers absent from the merged table.
const UNKNOWN_RISK: RiskLevel = RiskLevel::Medium;

/// Maps operation identifiers to risk levels.
///
/// Pure lookup, no side effects, total: `classify` never fails.
#[derive(Debug, Clone)]
pub struct RiskClassifier {
    table: HashMap<String, RiskLevel>,
}

impl RiskClassifier {
    /// Classifier with only the built-in table.
    pub fn new() -> Self {
        Self::with_overrides(&HashMap::new())
    }

    /// Classifier with the built-in table merged with per-identifier
    /// configuration overrides (overrides win).
    pub fn with_overrides(overrides: &HashMap<String, RiskLevel>) -> Self {
        let mut table: HashMap<String, RiskLevel> = DEFAULT_RISK_TABLE
            .iter()
            .map(|(op, level)| (op.to_string(), *level))
            .collect();
        for (op, level) in overrides {
            table.insert(op.to_lowercase(), *level);
        }
        Self { table }
    }

    /// Resolve an operation identifier to its risk level.
    ///
    /// Case-insensitive; unknown identifiers resolve to `Medium`.
    pub fn classify(&self, operation: &str) -> RiskLevel {
        self.table
            .get(&operation.to_lowercase())
            .copied()
            .unwrap_or(UNKNOWN_RISK)
    }
}

impl Default for RiskClassifier {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_operations_classify_from_table() {
        let classifier = RiskClassifier::new();
        assert_eq!(classifier.classify("file_read"), RiskLevel::Safe);
        assert_eq!(classifier.classify("file_write"), RiskLevel::Low);
        assert_eq!(classifier.classify("shell_exec"), RiskLevel::Medium);
        assert_eq!(classifier.classify("email_send"), RiskLevel::High);
        assert_eq!(classifier.classify("deploy_production"), RiskLevel::Critical);
    }

    #[test]
    fn classification_is_case_insensitive() {
        let classifier = RiskClassifier::new();
        assert_eq!(classifier.classify("Email_Send"), RiskLevel::High);
        assert_eq!(classifier.classify("FILE_READ"), RiskLevel::Safe);
    }

    #[test]
    fn unknown_operation_resolves_to_medium() {
        let classifier = RiskClassifier::new();
        assert_eq!(classifier.classify("quantum_flux"), RiskLevel::Medium);
    }

    #[test]
    fn classification_is_idempotent() {
        let classifier = RiskClassifier::new();
        assert_eq!(
            classifier.classify("web_fetch"),
            classifier.classify("web_fetch")
        );
    }

    #[test]
    fn overrides_win_over_builtin_table() {
        let mut overrides = HashMap::new();
        overrides.insert("file_read".to_string(), RiskLevel::High);
        overrides.insert("Custom_Op".to_string(), RiskLevel::Critical);
        let classifier = RiskClassifier::with_overrides(&overrides);
        assert_eq!(classifier.classify("file_read"), RiskLevel::High);
        assert_eq!(classifier.classify("custom_op"), RiskLevel::Critical);
        // Untouched entries keep their defaults.
        assert_eq!(classifier.classify("file_write"), RiskLevel::Low);
    }

    #[test]
    fn levels_are_ordered() {
        assert!(RiskLevel::Safe < RiskLevel::Low);
        assert!(RiskLevel::High < RiskLevel::Critical);
    }

    #[test]
    fn level_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&RiskLevel::High).unwrap(), "\"HIGH\"");
        let parsed: RiskLevel = serde_json::from_str("\"CRITICAL\"").unwrap();
        assert_eq!(parsed, RiskLevel::Critical);
    }
}
