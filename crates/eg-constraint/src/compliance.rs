// compliance.rs — Pre-built constraint sets.
//
// Turns abstract compliance requirements into executable checks layered on
// the registry: access control, data protection, and internal policy rules
// for agent-driven operations. Each predicate opts out (returns true) when
// the context says the rule is not applicable, so one registry can serve
// every operation.

use crate::constraint::{Constraint, ConstraintSeverity};
use crate::context::OperationContext;
use crate::error::ConstraintError;
use crate::validator::ConstraintValidator;

/// Access-control constraints.
pub fn access_constraints() -> Vec<Constraint> {
    vec![
        Constraint::new(
            "access_authenticated",
            "Authentication Required",
            ConstraintSeverity::Mandatory,
            "access denied: user not authenticated",
            |ctx| !ctx.flag("requires_auth") || ctx.flag("user_authenticated"),
        ),
        Constraint::new(
            "access_least_privilege",
            "Least Privilege",
            ConstraintSeverity::Required,
            "requested permissions exceed what the task requires",
            check_least_privilege,
        ),
        Constraint::new(
            "access_admin_account",
            "Admin Privilege Restriction",
            ConstraintSeverity::Mandatory,
            "admin operation requires a dedicated admin account",
            |ctx| !ctx.flag("is_admin_operation") || ctx.flag("using_admin_account"),
        ),
    ]
}

/// Data-protection constraints.
pub fn data_constraints() -> Vec<Constraint> {
    vec![
        Constraint::new(
            "data_confidential_encrypted",
            "Confidential Data Protection",
            ConstraintSeverity::Mandatory,
            "confidential data must be encrypted at rest and in transit",
            |ctx| {
                !ctx.flag("contains_confidential")
                    || (ctx.flag("encryption_at_rest") && ctx.flag("encryption_in_transit"))
            },
        ),
        Constraint::new(
            "data_need_to_know",
            "Need-to-Know Access",
            ConstraintSeverity::Required,
            "sensitive data access not justified by need-to-know",
            |ctx| !ctx.flag("is_sensitive") || ctx.flag("need_to_know_justified"),
        ),
    ]
}

/// Internal policy constraints for agent-driven operations.
pub fn policy_constraints() -> Vec<Constraint> {
    vec![
        Constraint::new(
            "policy_external_approval",
            "External Action Approval",
            ConstraintSeverity::Mandatory,
            "external actions require human approval",
            |ctx| !ctx.flag("is_external") || ctx.flag("human_approved"),
        ),
        Constraint::new(
            "policy_destructive_approval",
            "Destructive Action Approval",
            ConstraintSeverity::Mandatory,
            "destructive actions require explicit approval",
            |ctx| !ctx.flag("is_destructive") || ctx.flag("destruction_approved"),
        ),
        Constraint::new(
            "policy_path_boundary",
            "Filesystem Boundaries",
            ConstraintSeverity::Mandatory,
            "path outside authorized boundaries",
            check_path_authorized,
        ),
    ]
}

/// Operations must stay within declared path boundaries.
///
/// A path with no declared `authorized_paths` is denied — no boundaries
/// means fail closed, not open season.
fn check_path_authorized(ctx: &OperationContext) -> bool {
    let Some(path) = ctx.text("path") else {
        return true;
    };
    let authorized = ctx.texts("authorized_paths");
    if authorized.is_empty() {
        return false;
    }
    authorized.iter().any(|prefix| path.starts_with(prefix))
}

/// Requested permissions must be a subset of the required ones.
fn check_least_privilege(ctx: &OperationContext) -> bool {
    let required = ctx.texts("required_permissions");
    if required.is_empty() {
        return true;
    }
    ctx.texts("requested_permissions")
        .iter()
        .all(|p| required.contains(p))
}

/// A validator pre-loaded with every built-in constraint set.
pub fn compliance_validator() -> Result<ConstraintValidator, ConstraintError> {
    let mut validator = ConstraintValidator::new();
    for constraint in access_constraints()
        .into_iter()
        .chain(data_constraints())
        .chain(policy_constraints())
    {
        validator.register(constraint)?;
    }
    Ok(validator)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_sets_have_unique_ids() {
        // Registration fails on a duplicate id, so this doubles as the check.
        let validator = compliance_validator().unwrap();
        assert_eq!(validator.len(), 8);
    }

    #[test]
    fn external_action_requires_approval() {
        let validator = compliance_validator().unwrap();
        let ctx = OperationContext::new().with("is_external", true);
        assert!(!validator.validate("email_send", &ctx).can_execute());

        let approved = ctx.with("human_approved", true);
        assert!(validator.validate("email_send", &approved).can_execute());
    }

    #[test]
    fn internal_operation_passes_by_default() {
        let validator = compliance_validator().unwrap();
        let report = validator.validate("file_read", &OperationContext::new());
        assert!(report.can_execute());
    }

    #[test]
    fn path_without_boundaries_is_denied() {
        let validator = compliance_validator().unwrap();
        let ctx = OperationContext::new().with("path", "/etc/passwd");
        assert!(!validator.validate("file_read", &ctx).can_execute());
    }

    #[test]
    fn path_inside_boundary_is_allowed() {
        let validator = compliance_validator().unwrap();
        let ctx = OperationContext::new()
            .with("path", "/workspace/src/main.rs")
            .with("authorized_paths", vec!["/workspace"]);
        assert!(validator.validate("file_read", &ctx).can_execute());
    }

    #[test]
    fn least_privilege_blocks_excess_request() {
        let validator = compliance_validator().unwrap();
        let ctx = OperationContext::new()
            .with("requested_permissions", vec!["read", "write", "admin"])
            .with("required_permissions", vec!["read"]);
        let report = validator.validate("grant_access", &ctx);
        assert!(!report.can_execute());
        // Required severity: justification overrides it.
        let justified = OperationContext::new()
            .with("requested_permissions", vec!["read", "write", "admin"])
            .with("required_permissions", vec!["read"])
            .with(crate::validator::OVERRIDE_KEY, "migration window");
        assert!(validator.validate("grant_access", &justified).can_execute());
    }

    #[test]
    fn confidential_data_needs_both_encryption_flags() {
        let validator = compliance_validator().unwrap();
        let ctx = OperationContext::new()
            .with("contains_confidential", true)
            .with("encryption_at_rest", true);
        assert!(!validator.validate("data_export", &ctx).can_execute());
    }
}
