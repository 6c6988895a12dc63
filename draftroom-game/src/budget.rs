//! Scouting windows and the per-window budget ledger that gates every action.
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::CARRY_FRACTION;
use crate::evaluator::EvaluatorTraits;
use crate::numbers::round_f64_to_u32;

/// Bounded scouting period on the pre-draft calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScoutingWindow {
    Fall,
    AllStar,
    Combine,
    ProDay,
    PreDraft,
}

impl ScoutingWindow {
    /// Calendar order of the windows in one scouting season.
    pub const SEASON: [Self; 5] = [
        Self::Fall,
        Self::AllStar,
        Self::Combine,
        Self::ProDay,
        Self::PreDraft,
    ];

    #[must_use]
    pub const fn base_points(self) -> u32 {
        match self {
            Self::Fall | Self::ProDay => 10,
            Self::AllStar => 8,
            Self::Combine => 18,
            Self::PreDraft => 16,
        }
    }

    /// Points granted per unit of evaluation bandwidth.
    #[must_use]
    pub const fn bandwidth_factor(self) -> f64 {
        match self {
            Self::Fall => 0.10,
            Self::AllStar | Self::ProDay => 0.08,
            Self::Combine => 0.14,
            Self::PreDraft => 0.12,
        }
    }

    #[must_use]
    pub fn next(self) -> Option<Self> {
        let idx = Self::SEASON.iter().position(|w| *w == self)?;
        Self::SEASON.get(idx + 1).copied()
    }
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("cost {cost} exceeds remaining budget {remaining}")]
pub struct InsufficientBudget {
    pub cost: u32,
    pub remaining: u32,
}

/// Budget ledger for one evaluator in one window. `remaining` always equals
/// `total - spent`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoutingBudget {
    window: ScoutingWindow,
    total: u32,
    spent: u32,
    remaining: u32,
    carry_in: u32,
}

/// Compute a window's budget:
/// `base(window) + round(bandwidth * factor) + round(0.5 * previous_carry)`.
#[must_use]
pub fn compute_window_budget(
    window: ScoutingWindow,
    evaluation_bandwidth: f32,
    previous_carry: u32,
) -> ScoutingBudget {
    let bandwidth = f64::from(evaluation_bandwidth.clamp(0.0, 100.0));
    let from_bandwidth = round_f64_to_u32(bandwidth * window.bandwidth_factor());
    let carry_in = round_f64_to_u32(f64::from(previous_carry) * CARRY_FRACTION);
    let total = window
        .base_points()
        .saturating_add(from_bandwidth)
        .saturating_add(carry_in);
    ScoutingBudget {
        window,
        total,
        spent: 0,
        remaining: total,
        carry_in,
    }
}

impl ScoutingBudget {
    /// Budget for `window`, rolling forward half of whatever `previous` left unspent.
    #[must_use]
    pub fn for_window(
        window: ScoutingWindow,
        traits: &EvaluatorTraits,
        previous: Option<&Self>,
    ) -> Self {
        let carry = previous.map_or(0, Self::remaining);
        compute_window_budget(window, traits.sanitized().evaluation_bandwidth, carry)
    }

    #[must_use]
    pub const fn window(&self) -> ScoutingWindow {
        self.window
    }

    #[must_use]
    pub const fn total(&self) -> u32 {
        self.total
    }

    #[must_use]
    pub const fn spent(&self) -> u32 {
        self.spent
    }

    #[must_use]
    pub const fn remaining(&self) -> u32 {
        self.remaining
    }

    #[must_use]
    pub const fn carry_in(&self) -> u32 {
        self.carry_in
    }

    #[must_use]
    pub const fn can_afford(&self, cost: u32) -> bool {
        cost <= self.remaining
    }

    /// Deduct `cost`, or leave the ledger untouched when it cannot be covered.
    ///
    /// # Errors
    ///
    /// Returns [`InsufficientBudget`] when `cost` exceeds the remaining budget.
    pub const fn spend(&mut self, cost: u32) -> Result<(), InsufficientBudget> {
        if cost > self.remaining {
            return Err(InsufficientBudget {
                cost,
                remaining: self.remaining,
            });
        }
        self.spent += cost;
        self.remaining = self.total - self.spent;
        Ok(())
    }
}
