// validator.rs — The constraint registry and aggregation rule.
//
// Every registered constraint applies to every request; a predicate opts
// out for irrelevant operations by returning true (e.g. "only checks PHI
// handling when the context says PHI is involved"). Aggregation:
//
//   any MANDATORY violation            → can_execute = false, always
//   any REQUIRED violation, no override → can_execute = false
//   REQUIRED violation + justification  → overridden, surfaced as warning
//   ADVISORY violations                 → warnings only

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::constraint::{Constraint, ConstraintOutcome, ConstraintSeverity};
use crate::context::OperationContext;
use crate::error::ConstraintError;

/// Context key that overrides REQUIRED-severity violations.
///
/// A non-empty string value counts as a justification; the violations are
/// still surfaced as warnings. MANDATORY violations are never overridable.
pub const OVERRIDE_KEY: &str = "override_justification";

/// Aggregated outcome of validating one operation against the registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    /// The operation that was validated.
    pub operation: String,
    /// Every violated constraint, in registry order.
    pub violations: Vec<ConstraintOutcome>,
    /// Justification carried by the context, if any.
    pub override_justification: Option<String>,
}

impl ValidationReport {
    /// The core question: CAN this operation proceed?
    pub fn can_execute(&self) -> bool {
        if self.violations(ConstraintSeverity::Mandatory).next().is_some() {
            return false;
        }
        if self.violations(ConstraintSeverity::Required).next().is_some()
            && self.override_justification.is_none()
        {
            return false;
        }
        true
    }

    /// Violations at exactly the given severity.
    pub fn violations(
        &self,
        severity: ConstraintSeverity,
    ) -> impl Iterator<Item = &ConstraintOutcome> {
        self.violations.iter().filter(move |v| v.severity == severity)
    }

    /// Messages for violations that block execution.
    pub fn blocking_messages(&self) -> Vec<String> {
        let mut messages: Vec<String> = self
            .violations(ConstraintSeverity::Mandatory)
            .map(|v| format!("[mandatory] {}", v.message))
            .collect();
        if self.override_justification.is_none() {
            messages.extend(
                self.violations(ConstraintSeverity::Required)
                    .map(|v| format!("[required] {}", v.message)),
            );
        }
        messages
    }

    /// Messages for violations that are surfaced but do not block:
    /// advisory violations and overridden required violations.
    pub fn warning_messages(&self) -> Vec<String> {
        let mut messages: Vec<String> = self
            .violations(ConstraintSeverity::Advisory)
            .map(|v| format!("[advisory] {}", v.message))
            .collect();
        if let Some(justification) = &self.override_justification {
            messages.extend(self.violations(ConstraintSeverity::Required).map(|v| {
                format!("[overridden] {} — justification: {}", v.message, justification)
            }));
        }
        messages
    }

    /// Number of advisory violations — feeds trust adjustment and the
    /// warning-accumulation drift check.
    pub fn advisory_count(&self) -> usize {
        self.violations(ConstraintSeverity::Advisory).count()
    }
}

/// The constraint registry.
///
/// `BTreeMap` keeps evaluation order deterministic (by constraint id), so
/// the same request always yields the same violation ordering.
#[derive(Default)]
pub struct ConstraintValidator {
    constraints: BTreeMap<String, Constraint>,
}

impl ConstraintValidator {
    /// Create an empty validator (every operation passes).
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a constraint.
    ///
    /// Fails if a constraint with the same id already exists — duplicate
    /// registration is a configuration error, not a runtime condition.
    pub fn register(&mut self, constraint: Constraint) -> Result<(), ConstraintError> {
        if self.constraints.contains_key(&constraint.id) {
            return Err(ConstraintError::DuplicateConstraint {
                id: constraint.id.clone(),
            });
        }
        self.constraints.insert(constraint.id.clone(), constraint);
        Ok(())
    }

    /// Number of registered constraints.
    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    /// Evaluate every registered constraint against the context.
    ///
    /// This is the single chokepoint on the constraint side — it never
    /// fails; unevaluable predicates surface as mandatory violations in
    /// the report.
    pub fn validate(&self, operation: &str, context: &OperationContext) -> ValidationReport {
        let violations: Vec<ConstraintOutcome> = self
            .constraints
            .values()
            .filter_map(|c| c.evaluate(context))
            .collect();

        let override_justification = context
            .text(OVERRIDE_KEY)
            .filter(|s| !s.trim().is_empty())
            .map(str::to_string);

        ValidationReport {
            operation: operation.to_string(),
            violations,
            override_justification,
        }
    }
}
