// constraint.rs — Constraint data model.
//
// A constraint is an explicit data record (id, predicate, severity,
// message) stored in a registry, not a function-wrapping decoration.
// Evaluation is fail-closed: a predicate that errors produces a violation
// at MANDATORY-equivalent severity rather than passing.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::context::OperationContext;
use crate::error::ConstraintEvalError;

/// How critical a constraint is.
///
/// Ordering matters: `Advisory < Required < Mandatory`, so the worst
/// severity in a report can be found with `max()`.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintSeverity {
    /// Violation is logged as a warning; execution still proceeds.
    Advisory,
    /// Violation blocks execution unless the context carries an
    /// `override_justification`.
    Required,
    /// Violation blocks execution unconditionally. No override.
    Mandatory,
}

impl fmt::Display for ConstraintSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstraintSeverity::Advisory => write!(f, "advisory"),
            ConstraintSeverity::Required => write!(f, "required"),
            ConstraintSeverity::Mandatory => write!(f, "mandatory"),
        }
    }
}

/// The predicate type: returns `Ok(true)` when the constraint is satisfied.
///
/// `Arc<dyn Fn>` so a `Constraint` stays `Clone` and can be shared across
/// sessions. Predicates read the context through its defaulting accessors
/// and must not error on missing keys.
pub type ConstraintCheck =
    Arc<dyn Fn(&OperationContext) -> Result<bool, ConstraintEvalError> + Send + Sync>;

/// A single constraint that must be satisfied for an operation to proceed.
#[derive(Clone)]
pub struct Constraint {
    /// Unique identifier (registry key).
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Predicate over the operation context.
    pub check: ConstraintCheck,
    /// How violations of this constraint are treated.
    pub severity: ConstraintSeverity,
    /// Message surfaced when the constraint is violated.
    pub error_message: String,
}

impl Constraint {
    /// Create a constraint from an infallible predicate closure.
    ///
    /// Most constraints are simple context lookups that cannot fail; this
    /// wraps them so they satisfy the fallible [`ConstraintCheck`] signature.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        severity: ConstraintSeverity,
        error_message: impl Into<String>,
        check: impl Fn(&OperationContext) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            check: Arc::new(move |ctx| Ok(check(ctx))),
            severity,
            error_message: error_message.into(),
        }
    }

    /// Create a constraint whose predicate can itself fail.
    pub fn fallible(
        id: impl Into<String>,
        name: impl Into<String>,
        severity: ConstraintSeverity,
        error_message: impl Into<String>,
        check: impl Fn(&OperationContext) -> Result<bool, ConstraintEvalError>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            check: Arc::new(check),
            severity,
            error_message: error_message.into(),
        }
    }

    /// Evaluate this constraint against a context.
    ///
    /// An erroring predicate is a violation at MANDATORY-equivalent
    /// severity — fail closed, never a crash.
    pub fn evaluate(&self, context: &OperationContext) -> Option<ConstraintOutcome> {
        match (self.check)(context) {
            Ok(true) => None,
            Ok(false) => Some(ConstraintOutcome {
                constraint_id: self.id.clone(),
                severity: self.severity,
                message: self.error_message.clone(),
            }),
            Err(err) => {
                tracing::warn!(
                    constraint = %self.id,
                    error = %err,
                    "constraint predicate failed to evaluate; treating as mandatory violation"
                );
                Some(ConstraintOutcome {
                    constraint_id: self.id.clone(),
                    severity: ConstraintSeverity::Mandatory,
                    message: format!("constraint '{}' unevaluable: {}", self.name, err),
                })
            }
        }
    }
}

impl fmt::Debug for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Constraint")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("severity", &self.severity)
            .finish()
    }
}

/// A single violated constraint within a [`ValidationReport`].
///
/// [`ValidationReport`]: crate::validator::ValidationReport
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConstraintOutcome {
    pub constraint_id: String,
    pub severity: ConstraintSeverity,
    pub message: String,
}
