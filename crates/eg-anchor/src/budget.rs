// budget.rs — The depletable autonomy budget.
//
// The budget represents remaining unsupervised autonomy within the current
// checkpoint interval. It is charged per operation by risk cost, clamps at
// a floor of zero, and refills to its configured size only on checkpoint.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::AnchorError;
use crate::risk::RiskLevel;

/// Per-level budget costs: the defaults with optional configuration
/// overrides merged in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskCosts {
    costs: HashMap<RiskLevel, f64>,
}

impl RiskCosts {
    /// Default costs for every level.
    pub fn new() -> Self {
        Self {
            costs: RiskLevel::ALL
                .iter()
                .map(|level| (*level, level.default_cost()))
                .collect(),
        }
    }

    /// Defaults with configuration overrides. Overridden costs must stay
    /// within [0, 1].
    pub fn with_overrides(overrides: &HashMap<RiskLevel, f64>) -> Result<Self, AnchorError> {
        let mut costs = Self::new();
        for (level, cost) in overrides {
            AnchorError::check_range("risk cost", *cost, 0.0, 1.0)?;
            costs.costs.insert(*level, *cost);
        }
        Ok(costs)
    }

    /// Cost lookup is total — every level has an entry from construction.
    pub fn cost(&self, level: RiskLevel) -> f64 {
        self.costs
            .get(&level)
            .copied()
            .unwrap_or_else(|| level.default_cost())
    }
}

impl Default for RiskCosts {
    fn default() -> Self {
        Self::new()
    }
}

/// Tracks the remaining autonomy budget for one session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetLedger {
    budget: f64,
    size: f64,
    costs: RiskCosts,
}

impl BudgetLedger {
    /// Create a ledger initialized to `size` (also the reset target).
    ///
    /// `size` must be within (0, 1]; zero would make every non-Safe
    /// operation unaffordable from the start.
    pub fn new(size: f64, costs: RiskCosts) -> Result<Self, AnchorError> {
        AnchorError::check_range("budget size", size, f64::MIN_POSITIVE, 1.0)?;
        Ok(Self {
            budget: size,
            size,
            costs,
        })
    }

    /// Current remaining budget.
    pub fn remaining(&self) -> f64 {
        self.budget
    }

    /// The configured size the budget resets to.
    pub fn size(&self) -> f64 {
        self.size
    }

    /// Cost of one operation at the given level.
    pub fn cost(&self, level: RiskLevel) -> f64 {
        self.costs.cost(level)
    }

    /// Whether the current budget covers one operation at this level.
    pub fn has_capacity(&self, level: RiskLevel) -> bool {
        self.budget >= self.cost(level)
    }

    /// Deduct the cost of one operation. Safe operations are free; the
    /// budget clamps at zero and never goes negative.
    pub fn charge(&mut self, level: RiskLevel) {
        if level == RiskLevel::Safe {
            return;
        }
        self.budget = (self.budget - self.cost(level)).max(0.0);
    }

    /// Restore the budget to its configured size. Used only on checkpoint.
    pub fn reset(&mut self) {
        self.budget = self.size;
    }
}
