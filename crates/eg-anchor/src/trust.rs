// trust.rs — The bounded trust score.
//
// Trust reflects accumulated confidence in the agent's recent behavior.
// It builds slowly (clean operations, human contact) and drops fast
// (violations). Every mutation clamps to [0, 1]; trust never resets to a
// fixed value after construction.

use serde::{Deserialize, Serialize};

use crate::error::AnchorError;

/// Tunable trust adjustment parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrustParams {
    /// Boost per clean operation.
    pub boost_clean: f64,
    /// Extra boost each time the clean streak crosses the threshold.
    pub boost_streak: f64,
    /// Clean-streak length at which the streak bonus applies.
    pub streak_threshold: u32,
    /// Boost when the human interacts.
    pub boost_interaction: f64,
    /// Penalty per advisory warning.
    pub penalty_warning: f64,
    /// Penalty per constraint violation.
    pub penalty_violation: f64,
}

impl Default for TrustParams {
    fn default() -> Self {
        Self {
            boost_clean: 0.005,
            boost_streak: 0.01,
            streak_threshold: 10,
            boost_interaction: 0.05,
            penalty_warning: 0.02,
            penalty_violation: 0.20,
        }
    }
}

/// Tracks the trust score for one session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrustTracker {
    trust: f64,
    params: TrustParams,
}

impl TrustTracker {
    /// Create a tracker starting at `initial` (must be within [0, 1]).
    pub fn new(initial: f64, params: TrustParams) -> Result<Self, AnchorError> {
        AnchorError::check_range("initial trust", initial, 0.0, 1.0)?;
        Ok(Self {
            trust: initial,
            params,
        })
    }

    /// Current trust score, always within [0, 1].
    pub fn score(&self) -> f64 {
        self.trust
    }

    /// A clean operation completed. `streak` is the clean-streak count
    /// after this operation, tracked by the caller; the streak bonus
    /// applies once per threshold crossing (streak 10, 20, 30, ...).
    pub fn on_clean(&mut self, streak: u32) {
        let mut delta = self.params.boost_clean;
        if self.params.streak_threshold > 0
            && streak > 0
            && streak % self.params.streak_threshold == 0
        {
            delta += self.params.boost_streak;
        }
        self.adjust(delta);
    }

    /// An operation was blocked by a budget/risk gate, or triggered
    /// advisory warnings.
    pub fn on_warning(&mut self) {
        self.adjust(-self.params.penalty_warning);
    }

    /// An operation violated a blocking constraint.
    pub fn on_violation(&mut self) {
        self.adjust(-self.params.penalty_violation);
    }

    /// The human interacted with the session.
    pub fn on_human_interaction(&mut self) {
        self.adjust(self.params.boost_interaction);
    }

    fn adjust(&mut self, delta: f64) {
        self.trust = (self.trust + delta).clamp(0.0, 1.0);
    }
}
