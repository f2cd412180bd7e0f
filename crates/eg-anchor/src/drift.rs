// drift.rs — Behavioral drift detection.
//
// Scans the decision history window for patterns suggesting the agent is
// operating outside its supervised envelope. Five independent,
// order-insensitive checks, each producing at most one finding:
//
// 1. Escalating access — risk levels creeping upward
// 2. External drift — too many outward-facing (High/Critical) operations
// 3. Speed drift — operating faster than a human can plausibly follow
// 4. Repetition anomaly — the same operation/resource hammered in a loop
// 5. Warning accumulation — blocked or advisory-flagged decisions piling up
//
// The detector only reports findings. It never mutates trust, budget, or
// the history — acting on a finding is the mode controller's job.

use std::collections::HashMap;

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::history::{AuditLog, HistoryEntry};
use crate::risk::RiskLevel;

/// Which behavioral pattern was detected.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DriftSignal {
    /// Risk levels of recent operations are creeping upward.
    EscalatingAccess,
    /// Outward-facing operations dominate the window.
    ExternalDrift,
    /// Operations arriving faster than plausible human supervision.
    SpeedDrift,
    /// The same operation or resource repeated beyond the threshold.
    RepetitionAnomaly,
    /// Blocked or advisory-flagged decisions accumulating.
    WarningAccumulation,
}

impl std::fmt::Display for DriftSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DriftSignal::EscalatingAccess => write!(f, "escalating_access"),
            DriftSignal::ExternalDrift => write!(f, "external_drift"),
            DriftSignal::SpeedDrift => write!(f, "speed_drift"),
            DriftSignal::RepetitionAnomaly => write!(f, "repetition_anomaly"),
            DriftSignal::WarningAccumulation => write!(f, "warning_accumulation"),
        }
    }
}

/// A single detected drift pattern.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DriftFinding {
    pub signal: DriftSignal,
    /// Human-readable description of what tripped the check.
    pub description: String,
}

/// Thresholds for the five checks.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DriftConfig {
    /// How many trailing history entries the detector considers.
    pub window: usize,
    /// An escalating run must be longer than this many entries.
    pub escalation_run: usize,
    /// Fraction of High/Critical entries in the window that counts as
    /// external drift.
    pub external_ratio: f64,
    /// Operations within the trailing minute that count as speed drift.
    pub speed_per_minute: usize,
    /// Occurrences of one operation/resource that count as repetition.
    pub repetition_threshold: usize,
    /// Blocked/advisory entries in the window that count as accumulation.
    pub warning_threshold: usize,
}

impl Default for DriftConfig {
    fn default() -> Self {
        Self {
            window: 100,
            escalation_run: 5,
            external_ratio: 0.3,
            speed_per_minute: 60,
            repetition_threshold: 5,
            warning_threshold: 3,
        }
    }
}

/// Ratio-based checks need a minimum sample before they are meaningful.
const MIN_RATIO_SAMPLE: usize = 10;

/// Scans the audit history for drift patterns.
#[derive(Debug, Clone, Default)]
pub struct DriftDetector {
    config: DriftConfig,
}

impl DriftDetector {
    pub fn new(config: DriftConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DriftConfig {
        &self.config
    }

    /// Run all five checks over the trailing window.
    ///
    /// Returns every finding; an empty vector means no drift detected.
    pub fn scan(&self, log: &AuditLog) -> Vec<DriftFinding> {
        let window: Vec<&HistoryEntry> = log.recent(self.config.window).collect();
        let mut findings = Vec::new();

        if let Some(f) = self.escalating_access(&window) {
            findings.push(f);
        }
        if let Some(f) = self.external_drift(&window) {
            findings.push(f);
        }
        if let Some(f) = self.speed_drift(&window) {
            findings.push(f);
        }
        if let Some(f) = self.repetition_anomaly(&window) {
            findings.push(f);
        }
        if let Some(f) = self.warning_accumulation(&window) {
            findings.push(f);
        }

        findings
    }

    /// Check 1: the trailing run of non-decreasing risk levels exceeds the
    /// configured length and contains at least one actual increase.
    /// A constant-risk stream is not escalation — that is the repetition
    /// check's territory.
    fn escalating_access(&self, window: &[&HistoryEntry]) -> Option<DriftFinding> {
        let mut run = 1usize;
        for pair in window.windows(2).rev() {
            if pair[0].risk <= pair[1].risk {
                run += 1;
            } else {
                break;
            }
        }
        if run <= self.config.escalation_run || window.is_empty() {
            return None;
        }
        let start = &window[window.len() - run];
        let end = window[window.len() - 1];
        if start.risk >= end.risk {
            return None;
        }
        Some(DriftFinding {
            signal: DriftSignal::EscalatingAccess,
            description: format!(
                "risk non-decreasing across last {} operations ({} -> {})",
                run, start.risk, end.risk
            ),
        })
    }

    /// Check 2: the fraction of High/Critical operations in the window
    /// exceeds the configured ratio.
    fn external_drift(&self, window: &[&HistoryEntry]) -> Option<DriftFinding> {
        if window.len() < MIN_RATIO_SAMPLE {
            return None;
        }
        let external = window
            .iter()
            .filter(|e| e.risk >= RiskLevel::High)
            .count();
        let ratio = external as f64 / window.len() as f64;
        if ratio <= self.config.external_ratio {
            return None;
        }
        Some(DriftFinding {
            signal: DriftSignal::ExternalDrift,
            description: format!(
                "{:.0}% of the last {} operations were external-facing (limit {:.0}%)",
                ratio * 100.0,
                window.len(),
                self.config.external_ratio * 100.0
            ),
        })
    }

    /// Check 3: operation count within the trailing one-minute window
    /// exceeds the configured rate.
    fn speed_drift(&self, window: &[&HistoryEntry]) -> Option<DriftFinding> {
        let newest = window.last()?.timestamp;
        let cutoff = newest - Duration::seconds(60);
        let in_last_minute = window.iter().filter(|e| e.timestamp > cutoff).count();
        if in_last_minute <= self.config.speed_per_minute {
            return None;
        }
        Some(DriftFinding {
            signal: DriftSignal::SpeedDrift,
            description: format!(
                "{} operations in the trailing minute (limit {})",
                in_last_minute, self.config.speed_per_minute
            ),
        })
    }

    /// Check 4: the same operation identifier (or declared resource)
    /// appears more than the configured number of times in the window.
    fn repetition_anomaly(&self, window: &[&HistoryEntry]) -> Option<DriftFinding> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for entry in window {
            let key = entry
                .resource
                .as_deref()
                .unwrap_or(entry.operation.as_str());
            *counts.entry(key).or_insert(0) += 1;
        }
        let (key, count) = counts.into_iter().max_by_key(|(_, c)| *c)?;
        if count <= self.config.repetition_threshold {
            return None;
        }
        Some(DriftFinding {
            signal: DriftSignal::RepetitionAnomaly,
            description: format!(
                "'{}' touched {} times in the last {} operations (limit {})",
                key,
                count,
                window.len(),
                self.config.repetition_threshold
            ),
        })
    }

    /// Check 5: blocked or advisory-flagged entries meet the threshold.
    fn warning_accumulation(&self, window: &[&HistoryEntry]) -> Option<DriftFinding> {
        let flagged = window.iter().filter(|e| e.blocked || e.advisory).count();
        if flagged < self.config.warning_threshold {
            return None;
        }
        Some(DriftFinding {
            signal: DriftSignal::WarningAccumulation,
            description: format!(
                "{} blocked or advisory-flagged decisions in the window (limit {})",
                flagged, self.config.warning_threshold
            ),
        })
    }
}
