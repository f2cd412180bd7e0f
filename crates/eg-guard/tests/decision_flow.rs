// End-to-end decision flows through the engine: budget depletion and
// checkpoint recovery, mode policies, drift-forced checkpoints, and
// unknown-operation handling.

use std::sync::{Arc, Mutex};

use chrono::{Duration, Utc};

use eg_anchor::RiskLevel;
use eg_constraint::{Constraint, ConstraintSeverity, ConstraintValidator, OperationContext};
use eg_guard::{
    Decision, DecisionEngine, GuardConfig, GuardState, Mode, OperationRequest, TelemetryEvent,
    TelemetrySink,
};

fn engine(mode: Mode) -> DecisionEngine {
    let config = GuardConfig {
        mode,
        ..GuardConfig::default()
    };
    DecisionEngine::new(config, ConstraintValidator::new()).unwrap()
}

fn eval(engine: &mut DecisionEngine, operation: &str) -> Decision {
    engine.evaluate(&OperationRequest::new(operation))
}

#[test]
fn budget_depletes_then_checkpoint_restores() {
    let mut engine = engine(Mode::Enforce);

    // Two HIGH operations fit in the budget (1.0 -> 0.6 -> 0.2).
    assert!(eval(&mut engine, "web_fetch").allow);
    assert!(eval(&mut engine, "http_post").allow);

    // The third does not (0.2 < 0.4) and must not be charged.
    let blocked = eval(&mut engine, "email_send");
    assert!(!blocked.allow);
    assert!(blocked.reason().unwrap().contains("budget depleted"));
    assert!((engine.state().budget.remaining() - 0.2).abs() < 1e-9);

    // A checkpoint refills the budget; the same operation now passes.
    engine.human_interaction();
    assert!((engine.state().budget.remaining() - 1.0).abs() < 1e-9);
    assert!(eval(&mut engine, "email_send").allow);
}

#[test]
fn soft_mode_allows_medium_risk_tentative_block() {
    let mut validator = ConstraintValidator::new();
    validator
        .register(Constraint::new(
            "review",
            "Review Required",
            ConstraintSeverity::Required,
            "change not reviewed",
            |ctx| ctx.flag("reviewed"),
        ))
        .unwrap();
    let config = GuardConfig {
        mode: Mode::Soft,
        ..GuardConfig::default()
    };
    let mut engine = DecisionEngine::new(config, validator).unwrap();

    // Medium risk with an unoverridden required violation: soft mode
    // records the tentative block but lets the operation proceed.
    let decision = eval(&mut engine, "shell_exec");
    assert!(decision.allow);
    assert!(decision.would_block);

    // The same violation at High risk is honored.
    let decision = eval(&mut engine, "web_fetch");
    assert!(!decision.allow);
}

#[test]
fn repeated_resource_access_forces_checkpoint() {
    let mut engine = engine(Mode::Enforce);
    let request = OperationRequest::new("file_read")
        .with_context(OperationContext::new().with("resource", "/data/users.csv"));

    // Six reads of the same resource trip the repetition check.
    for _ in 0..6 {
        assert!(engine.evaluate(&request).allow);
    }
    assert!(engine.state().forced_checkpoint.is_some());

    // Safe operations still pass while the flag is pending.
    assert!(eval(&mut engine, "status_check").allow);

    // The next non-Safe operation blocks until a checkpoint.
    let blocked = eval(&mut engine, "file_write");
    assert!(!blocked.allow);
    assert!(blocked.reason().unwrap().contains("drift detected"));

    // The flag persists across further attempts.
    assert!(!eval(&mut engine, "file_write").allow);

    engine.human_interaction();
    assert!(engine.state().forced_checkpoint.is_none());
    assert!(eval(&mut engine, "file_write").allow);
}

#[test]
fn unknown_operation_treated_as_medium() {
    let mut engine = engine(Mode::Enforce);
    let decision = eval(&mut engine, "quantum_sync");
    assert_eq!(decision.risk, RiskLevel::Medium);
    assert!((decision.cost - 0.15).abs() < 1e-9);
    assert!(decision.allow);
    assert!((engine.state().budget.remaining() - 0.85).abs() < 1e-9);
}

#[test]
fn disabled_mode_never_blocks_and_never_mutates() {
    let mut engine = engine(Mode::Disabled);
    let trust_before = engine.state().trust.score();
    for op in ["deploy_production", "web_fetch", "key_rotation"] {
        let decision = eval(&mut engine, op);
        assert!(decision.allow);
        assert!(!decision.would_block);
    }
    assert_eq!(engine.state().trust.score(), trust_before);
    assert_eq!(engine.state().budget.remaining(), 1.0);
    assert_eq!(engine.state().clean_streak, 0);
}

#[test]
fn shadow_mode_never_blocks_but_reports_verdicts() {
    let mut engine = engine(Mode::Shadow);
    for _ in 0..10 {
        let decision = eval(&mut engine, "deploy_production");
        assert!(decision.allow);
        assert!(decision.would_block);
        assert!(decision.advisory);
    }
}

#[test]
fn enforce_mode_always_blocks_critical() {
    let mut engine = engine(Mode::Enforce);
    for op in ["deploy_production", "credential_issue", "key_rotation"] {
        let decision = eval(&mut engine, op);
        assert!(!decision.allow);
        assert!(decision
            .reason()
            .unwrap()
            .contains("requires human confirmation"));
    }
}

#[test]
fn stale_supervision_blocks_medium_and_above() {
    let config = GuardConfig {
        mode: Mode::Enforce,
        ..GuardConfig::default()
    };
    let mut state = GuardState::new(&config).unwrap();
    state.last_human = Utc::now() - Duration::minutes(90);
    let mut engine =
        DecisionEngine::with_state(config, ConstraintValidator::new(), state).unwrap();

    // Low risk is unaffected by stale supervision.
    assert!(eval(&mut engine, "file_write").allow);

    let blocked = eval(&mut engine, "shell_exec");
    assert!(!blocked.allow);
    assert!(blocked.reason().unwrap().contains("no human interaction"));

    // A checkpoint restores Medium-risk autonomy.
    engine.human_interaction();
    assert!(eval(&mut engine, "shell_exec").allow);
}

#[test]
fn trust_and_budget_stay_bounded_under_load() {
    let mut engine = engine(Mode::Enforce);
    for i in 0..500 {
        match i % 4 {
            0 => {
                eval(&mut engine, "file_write");
            }
            1 => {
                eval(&mut engine, "web_fetch");
            }
            2 => {
                eval(&mut engine, "deploy_production");
            }
            _ => engine.human_interaction(),
        }
        let state = engine.state();
        assert!((0.0..=1.0).contains(&state.trust.score()));
        assert!((0.0..=1.0).contains(&state.budget.remaining()));
        assert!(state.history.len() <= state.history.capacity());
    }
}

#[derive(Default)]
struct CapturingSink {
    events: Mutex<Vec<TelemetryEvent>>,
}

impl TelemetrySink for CapturingSink {
    fn emit(&self, event: TelemetryEvent) {
        self.events.lock().unwrap().push(event);
    }
}

#[test]
fn every_decision_emits_telemetry() {
    let sink = Arc::new(CapturingSink::default());
    let config = GuardConfig {
        mode: Mode::Enforce,
        ..GuardConfig::default()
    };
    let mut engine = DecisionEngine::new(config, ConstraintValidator::new())
        .unwrap()
        .with_sink(sink.clone());

    eval(&mut engine, "file_write");
    eval(&mut engine, "deploy_production");
    engine.human_interaction();

    let events = sink.events.lock().unwrap();
    assert_eq!(events.len(), 3);
    match &events[1] {
        TelemetryEvent::Decision {
            actually_blocked,
            would_block,
            risk_level,
            ..
        } => {
            assert!(*actually_blocked);
            assert!(*would_block);
            assert_eq!(*risk_level, RiskLevel::Critical);
        }
        other => panic!("expected decision event, got {:?}", other),
    }
    assert!(matches!(events[2], TelemetryEvent::Snapshot { .. }));
}

#[test]
fn risk_override_changes_gating() {
    let mut risk_overrides = std::collections::HashMap::new();
    risk_overrides.insert("wiki_edit".to_string(), RiskLevel::Critical);
    let config = GuardConfig {
        mode: Mode::Enforce,
        risk_overrides,
        ..GuardConfig::default()
    };
    let mut engine = DecisionEngine::new(config, ConstraintValidator::new()).unwrap();
    let decision = eval(&mut engine, "wiki_edit");
    assert_eq!(decision.risk, RiskLevel::Critical);
    assert!(!decision.allow);
}
