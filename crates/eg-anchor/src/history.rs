// history.rs — Bounded, time-ordered record of past decisions.
//
// A ring buffer, not an unbounded record: the log retains only the most
// recent N entries (default 100), oldest discarded first. It is read by
// the drift detector and exposed for explanation and replay.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::risk::RiskLevel;

/// Default retention size for the decision history.
pub const DEFAULT_HISTORY_SIZE: usize = 100;

/// One past decision, as the drift detector sees it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistoryEntry {
    /// When the decision was made (UTC).
    pub timestamp: DateTime<Utc>,
    /// The requested operation identifier.
    pub operation: String,
    /// The risk level the classifier resolved.
    pub risk: RiskLevel,
    /// Whether the final verdict was block.
    pub blocked: bool,
    /// Whether advisory violations were surfaced alongside the decision.
    pub advisory: bool,
    /// The primary resource touched, if the context declared one.
    pub resource: Option<String>,
}

impl HistoryEntry {
    pub fn new(operation: impl Into<String>, risk: RiskLevel) -> Self {
        Self {
            timestamp: Utc::now(),
            operation: operation.into(),
            risk,
            blocked: false,
            advisory: false,
            resource: None,
        }
    }

    pub fn blocked(mut self, blocked: bool) -> Self {
        self.blocked = blocked;
        self
    }

    pub fn advisory(mut self, advisory: bool) -> Self {
        self.advisory = advisory;
        self
    }

    pub fn with_resource(mut self, resource: Option<String>) -> Self {
        self.resource = resource;
        self
    }
}

/// In-memory ring buffer of recent decisions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditLog {
    entries: VecDeque<HistoryEntry>,
    capacity: usize,
}

impl AuditLog {
    /// Create a log retaining at most `capacity` entries.
    ///
    /// A zero capacity is coerced to 1 — a guard with no memory at all
    /// cannot feed drift detection.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append an entry, discarding the oldest when full.
    pub fn append(&mut self, entry: HistoryEntry) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Entries oldest-first.
    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    /// The most recent `n` entries, oldest-first.
    pub fn recent(&self, n: usize) -> impl Iterator<Item = &HistoryEntry> {
        let skip = self.entries.len().saturating_sub(n);
        self.entries.iter().skip(skip)
    }

    /// The newest entry, if any.
    pub fn last(&self) -> Option<&HistoryEntry> {
        self.entries.back()
    }
}

impl Default for AuditLog {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn length_never_exceeds_capacity() {
        let mut log = AuditLog::new(3);
        for i in 0..10 {
            log.append(HistoryEntry::new(format!("op_{}", i), RiskLevel::Safe));
        }
        assert_eq!(log.len(), 3);
    }

    #[test]
    fn oldest_entries_are_discarded_first() {
        let mut log = AuditLog::new(2);
        log.append(HistoryEntry::new("first", RiskLevel::Safe));
        log.append(HistoryEntry::new("second", RiskLevel::Safe));
        log.append(HistoryEntry::new("third", RiskLevel::Safe));
        let ops: Vec<&str> = log.iter().map(|e| e.operation.as_str()).collect();
        assert_eq!(ops, vec!["second", "third"]);
    }

    #[test]
    fn recent_returns_trailing_window_oldest_first() {
        let mut log = AuditLog::new(10);
        for i in 0..5 {
            log.append(HistoryEntry::new(format!("op_{}", i), RiskLevel::Safe));
        }
        let ops: Vec<&str> = log.recent(2).map(|e| e.operation.as_str()).collect();
        assert_eq!(ops, vec!["op_3", "op_4"]);
        // Asking for more than stored yields everything.
        assert_eq!(log.recent(100).count(), 5);
    }

    #[test]
    fn zero_capacity_is_coerced() {
        let mut log = AuditLog::new(0);
        log.append(HistoryEntry::new("op", RiskLevel::Safe));
        assert_eq!(log.len(), 1);
        assert_eq!(log.capacity(), 1);
    }

    #[test]
    fn log_serialization_round_trip() {
        let mut log = AuditLog::new(4);
        log.append(
            HistoryEntry::new("web_fetch", RiskLevel::High)
                .blocked(true)
                .with_resource(Some("https://example.com".to_string())),
        );
        let json = serde_json::to_string(&log).unwrap();
        let restored: AuditLog = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.len(), 1);
        assert_eq!(restored.last().unwrap().operation, "web_fetch");
        assert!(restored.last().unwrap().blocked);
    }
}
