// session.rs — Thread-safe wrapper around one engine.
//
// All guard state is per-session and every mutation goes through the
// mutex, so concurrent callers observe decisions in a total order. A
// checkpoint holds the same lock as a decision, which makes its resets
// atomic with respect to in-flight evaluations.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::config::Mode;
use crate::engine::{Decision, DecisionEngine, OperationRequest};
use crate::state::GuardState;

/// Serialized access to a [`DecisionEngine`] for one supervised session.
///
/// Clone-cheap: clones share the same underlying engine.
#[derive(Clone)]
pub struct SessionGuard {
    inner: Arc<Mutex<DecisionEngine>>,
}

impl SessionGuard {
    pub fn new(engine: DecisionEngine) -> Self {
        Self {
            inner: Arc::new(Mutex::new(engine)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, DecisionEngine> {
        // A panic while holding the lock poisons it; the state itself is
        // still coherent (every mutation completes before unlock), so
        // recover rather than wedge the session.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Gate one requested operation.
    pub fn evaluate(&self, request: &OperationRequest) -> Decision {
        self.lock().evaluate(request)
    }

    /// Record a human checkpoint: budget refills, counters reset, any
    /// pending drift checkpoint clears.
    pub fn human_interaction(&self) {
        self.lock().human_interaction();
    }

    /// Change the enforcement posture.
    pub fn set_mode(&self, mode: Mode) {
        self.lock().set_mode(mode);
    }

    /// Snapshot of the current session state.
    pub fn snapshot(&self) -> GuardState {
        self.lock().state().clone()
    }

    /// Human-readable status summary.
    pub fn explain(&self) -> String {
        self.lock().explain()
    }
}
