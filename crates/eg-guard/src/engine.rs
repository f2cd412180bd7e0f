// engine.rs — The decision engine / mode controller.
//
// Every operation the agent requests passes through `evaluate()`, which
// runs a fixed chain of checks and applies mode-specific policy:
//
// 1. Resolve the risk level and cost.
// 2. disabled mode → allow, mutate nothing, log for observability.
// 3. Constraint validation (mandatory/required violations block).
// 4. Drift-forced checkpoint pending → non-Safe operations block.
// 5. Critical risk → block, requires human confirmation.
// 6. Stale supervision → Medium+ blocks after too long without a human.
// 7. enforce mode: trust floor and budget capacity gates.
// 8. Mode policy: shadow allows everything (records the tentative
//    verdict), soft honors blocks only at High/Critical.
// 9. Apply the verdict: charge budget + boost trust on allow; penalize
//    trust on block (violation beats warning); append history; rescan
//    for drift.
//
// Each request yields exactly one Decision; nothing is retried. There is
// no I/O on this path — telemetry emission is handed to a sink that must
// not block.

use std::sync::Arc;

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};

use eg_anchor::{DriftDetector, HistoryEntry, RiskClassifier, RiskLevel};
use eg_constraint::{ConstraintValidator, OperationContext};

use crate::config::{GuardConfig, Mode};
use crate::error::GuardError;
use crate::state::GuardState;
use crate::telemetry::{NoopSink, TelemetryEvent, TelemetrySink};

/// A request to perform an operation, submitted before the action executes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationRequest {
    /// Operation identifier (case-insensitive).
    pub operation: String,
    /// Arbitrary facts about the operation.
    #[serde(default)]
    pub context: OperationContext,
}

impl OperationRequest {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            context: OperationContext::new(),
        }
    }

    pub fn with_context(mut self, context: OperationContext) -> Self {
        self.context = context;
        self
    }
}

/// The engine's verdict for one request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Decision {
    /// Whether the action may proceed.
    pub allow: bool,
    /// Why the tentative verdict was block (empty when clean).
    pub reasons: Vec<String>,
    /// The risk level the classifier resolved.
    pub risk: RiskLevel,
    /// The budget cost that applies at that level.
    pub cost: f64,
    /// True when the verdict is advisory-only (shadow mode).
    pub advisory: bool,
    /// The tentative verdict before mode policy was applied.
    pub would_block: bool,
}

impl Decision {
    /// The reasons joined into the single optional string the inbound
    /// interface exposes.
    pub fn reason(&self) -> Option<String> {
        if self.reasons.is_empty() {
            None
        } else {
            Some(self.reasons.join("; "))
        }
    }
}

/// Which rule produced the tentative block — decides the trust penalty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Blame {
    /// Budget, risk, drift, or supervision gate.
    Warning,
    /// A blocking constraint violation.
    Violation,
}

/// The orchestrator: combines classifier, validator, ledger, tracker, and
/// drift detector into one verdict per request.
pub struct DecisionEngine {
    config: GuardConfig,
    classifier: RiskClassifier,
    validator: ConstraintValidator,
    detector: DriftDetector,
    state: GuardState,
    sink: Arc<dyn TelemetrySink>,
}

impl DecisionEngine {
    /// Build an engine with fresh session state.
    pub fn new(config: GuardConfig, validator: ConstraintValidator) -> Result<Self, GuardError> {
        config.validate()?;
        let state = GuardState::new(&config)?;
        Ok(Self {
            classifier: RiskClassifier::with_overrides(&config.risk_overrides),
            detector: DriftDetector::new(config.drift.clone()),
            config,
            validator,
            state,
            sink: Arc::new(NoopSink),
        })
    }

    /// Build an engine resuming previously saved session state.
    pub fn with_state(
        config: GuardConfig,
        validator: ConstraintValidator,
        state: GuardState,
    ) -> Result<Self, GuardError> {
        config.validate()?;
        Ok(Self {
            classifier: RiskClassifier::with_overrides(&config.risk_overrides),
            detector: DriftDetector::new(config.drift.clone()),
            config,
            validator,
            state,
            sink: Arc::new(NoopSink),
        })
    }

    /// Attach a telemetry sink (builder style).
    pub fn with_sink(mut self, sink: Arc<dyn TelemetrySink>) -> Self {
        self.sink = sink;
        self
    }

    /// Read-only view of the session state.
    pub fn state(&self) -> &GuardState {
        &self.state
    }

    /// Consume the engine, yielding the session state for persistence.
    pub fn into_state(self) -> GuardState {
        self.state
    }

    /// Change the enforcement posture. Modes never self-transition; this
    /// is the only way the mode changes.
    pub fn set_mode(&mut self, mode: Mode) {
        if self.state.mode != mode {
            tracing::info!(from = %self.state.mode, to = %mode, "guard mode changed");
            self.state.mode = mode;
        }
    }

    /// Gate one requested operation. This is the single chokepoint.
    pub fn evaluate(&mut self, request: &OperationRequest) -> Decision {
        let risk = self.classifier.classify(&request.operation);
        let cost = self.state.budget.cost(risk);

        // Disabled mode: allow unconditionally, mutate nothing, but still
        // record the operation so the history remains explainable.
        if self.state.mode == Mode::Disabled {
            let decision = Decision {
                allow: true,
                reasons: Vec::new(),
                risk,
                cost,
                advisory: false,
                would_block: false,
            };
            self.state.history.append(
                HistoryEntry::new(&request.operation, risk)
                    .with_resource(request.context.resource().map(str::to_string)),
            );
            self.emit_decision(request, &decision);
            return decision;
        }

        let report = self.validator.validate(&request.operation, &request.context);

        let mut reasons: Vec<String> = Vec::new();
        let mut blame = Blame::Warning;

        // Constraint gate. Violation blame outranks every warning-class gate.
        if !report.can_execute() {
            reasons.extend(report.blocking_messages());
            blame = Blame::Violation;
        }

        // Drift-forced checkpoint: every non-Safe operation is treated as
        // Critical-equivalent until a human checkpoint clears the flag.
        if risk != RiskLevel::Safe {
            if let Some(signal) = self.state.forced_checkpoint {
                reasons.push(format!(
                    "drift detected ({}): human checkpoint required",
                    signal
                ));
            }
        }

        // Critical operations always require human confirmation.
        if risk == RiskLevel::Critical {
            reasons.push("critical operation requires human confirmation".to_string());
        }

        // Stale supervision: Medium+ operations need a recent human.
        let silent_for = Utc::now() - self.state.last_human;
        if risk >= RiskLevel::Medium
            && silent_for > Duration::minutes(self.config.max_minutes_without_human)
        {
            reasons.push(format!(
                "no human interaction for {} minutes: checkpoint required for {} operations",
                silent_for.num_minutes(),
                risk
            ));
        }

        // Enforce-mode gates: trust floor and budget capacity.
        if self.state.mode == Mode::Enforce {
            let min_trust = self.config.min_trust(risk);
            if self.state.trust.score() < min_trust {
                reasons.push(format!(
                    "trust {:.2} below the {:.2} floor for {} operations",
                    self.state.trust.score(),
                    min_trust,
                    risk
                ));
            }
            if !self.state.budget.has_capacity(risk) {
                reasons.push(format!(
                    "budget depleted ({:.2} remaining, {:.2} required): checkpoint required",
                    self.state.budget.remaining(),
                    cost
                ));
            }
        }

        let would_block = !reasons.is_empty();

        // Mode policy: how much of the tentative verdict is honored.
        let allow = match self.state.mode {
            Mode::Disabled => true, // handled above
            Mode::Shadow => true,
            Mode::Soft => {
                // Only High/Critical blocks are honored — but a pending
                // drift checkpoint is Critical-equivalent at any level.
                !(would_block
                    && (risk >= RiskLevel::High || self.state.forced_checkpoint.is_some()))
            }
            Mode::Enforce => !would_block,
        };

        // Apply the verdict to the economy.
        if allow {
            self.state.budget.charge(risk);
            self.state.clean_streak += 1;
            self.state.trust.on_clean(self.state.clean_streak);
            self.state.ops_since_checkpoint += 1;
        } else {
            match blame {
                Blame::Violation => self.state.trust.on_violation(),
                Blame::Warning => self.state.trust.on_warning(),
            }
            self.state.clean_streak = 0;
        }

        self.state.history.append(
            HistoryEntry::new(&request.operation, risk)
                .blocked(!allow)
                .advisory(report.advisory_count() > 0)
                .with_resource(request.context.resource().map(str::to_string)),
        );

        // Rescan for drift; a finding escalates the next checkpoint
        // requirement but never rewrites this decision.
        if self.state.forced_checkpoint.is_none() {
            if let Some(finding) = self.detector.scan(&self.state.history).into_iter().next() {
                tracing::warn!(
                    signal = %finding.signal,
                    detail = %finding.description,
                    "drift detected; forcing checkpoint on next non-safe operation"
                );
                self.state.forced_checkpoint = Some(finding.signal);
            }
        }

        // Non-blocking findings (advisories, overridden violations) ride
        // along in the reasons so callers can surface them.
        reasons.extend(report.warning_messages());

        let decision = Decision {
            allow,
            reasons,
            risk,
            cost,
            advisory: self.state.mode == Mode::Shadow,
            would_block,
        };
        self.emit_decision(request, &decision);
        decision
    }

    /// The human interacted: reset the budget and counters, boost trust,
    /// clear any pending drift checkpoint. Applied as one atomic step
    /// relative to in-flight decisions (the session wrapper serializes).
    pub fn human_interaction(&mut self) {
        self.state.budget.reset();
        self.state.trust.on_human_interaction();
        self.state.ops_since_checkpoint = 0;
        self.state.clean_streak = 0;
        self.state.forced_checkpoint = None;
        self.state.last_human = Utc::now();
        tracing::info!(
            trust = self.state.trust.score(),
            budget = self.state.budget.remaining(),
            "human checkpoint applied"
        );
        self.sink.emit(TelemetryEvent::Snapshot {
            session_id: self.state.session_id,
            mode: self.state.mode,
            trust_score: self.state.trust.score(),
            budget_remaining: self.state.budget.remaining(),
        });
    }

    /// Human-readable summary of the current state.
    pub fn explain(&self) -> String {
        let s = &self.state;
        let mut lines = vec![
            format!("Mode: {}", s.mode),
            format!("Trust: {:.2}", s.trust.score()),
            format!("Budget: {:.2} / {:.2}", s.budget.remaining(), s.budget.size()),
            format!("Ops since checkpoint: {}", s.ops_since_checkpoint),
            format!("Clean streak: {}", s.clean_streak),
            format!("Minutes since human: {}", s.minutes_since_human()),
        ];
        if let Some(signal) = s.forced_checkpoint {
            lines.push(format!("Drift: {} — checkpoint required", signal));
        }
        if s.budget.remaining() < 0.3 {
            lines.push("Low budget — checkpoint recommended".to_string());
        }
        lines.join("\n")
    }

    fn emit_decision(&self, request: &OperationRequest, decision: &Decision) {
        self.sink.emit(TelemetryEvent::Decision {
            session_id: self.state.session_id,
            timestamp: Utc::now(),
            operation: request.operation.clone(),
            risk_level: decision.risk,
            would_block: decision.would_block,
            actually_blocked: !decision.allow,
            reasons: decision.reasons.clone(),
            trust_score: self.state.trust.score(),
            budget_remaining: self.state.budget.remaining(),
        });
    }
}
