//! # eg-constraint
//!
//! Constraint registry and validation for Equilibrium Guard.
//!
//! A [`Constraint`] is a named predicate over an [`OperationContext`] with a
//! severity. Constraints are registered once with a [`ConstraintValidator`]
//! and evaluated against every request; the aggregated [`ValidationReport`]
//! answers the core question: CAN this operation execute?
//!
//! ## Key invariants
//!
//! - **Fail closed**: a predicate that errors counts as a violation at
//!   MANDATORY-equivalent severity — an unevaluable constraint blocks,
//!   it never silently passes.
//! - **Mandatory is absolute**: any MANDATORY violation forces
//!   `can_execute = false`, with no override path.
//! - **Required is overridable**: REQUIRED violations block unless the
//!   context carries a non-empty `override_justification` string.
//! - **Advisory never blocks**: ADVISORY violations are surfaced for
//!   logging only.

pub mod compliance;
pub mod constraint;
pub mod context;
pub mod error;
pub mod validator;

pub use compliance::compliance_validator;
pub use constraint::{Constraint, ConstraintOutcome, ConstraintSeverity};
pub use context::OperationContext;
pub use error::{ConstraintError, ConstraintEvalError};
pub use validator::{ConstraintValidator, ValidationReport, OVERRIDE_KEY};
