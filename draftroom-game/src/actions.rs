//! Scouting actions: the priced intel-gathering moves that raise clarity.
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use thiserror::Error;

use crate::belief::{IntelDimension, ScoutBeliefProfile};
use crate::budget::ScoutingBudget;
use crate::constants::{
    CLARITY_MAX, LOG_TARGET_SCOUTING, RETURNS_FLOOR_MULT, RETURNS_TIERS, TRAIT_MAX,
    TRAIT_MULT_BASE, TRAIT_MULT_SPAN, WINDOW_CAP_TOLERANCE, WINDOW_GAIN_CAP,
};
use crate::evaluator::EvaluatorTraits;

/// Per-dimension clarity change. At most four entries, kept inline.
pub type ClarityDeltas = SmallVec<[(IntelDimension, f32); 4]>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScoutingAction {
    FilmQuick,
    FilmDeep,
    BackgroundCheck,
    MedicalRequest,
    Interview,
    PrivateWorkout,
    #[serde(rename = "TOP30_VISIT")]
    Top30Visit,
}

impl ScoutingAction {
    pub const ALL: [Self; 7] = [
        Self::FilmQuick,
        Self::FilmDeep,
        Self::BackgroundCheck,
        Self::MedicalRequest,
        Self::Interview,
        Self::PrivateWorkout,
        Self::Top30Visit,
    ];

    #[must_use]
    pub const fn cost(self) -> u32 {
        match self {
            Self::FilmQuick => 2,
            Self::FilmDeep => 5,
            Self::BackgroundCheck | Self::Interview => 3,
            Self::MedicalRequest => 4,
            Self::PrivateWorkout => 6,
            Self::Top30Visit => 8,
        }
    }

    /// Nominal clarity yield before returns, traits and the window cap.
    #[must_use]
    pub const fn base_yield(self, dim: IntelDimension) -> f32 {
        // [ability, medical, character, fit]
        let row: [f32; 4] = match self {
            Self::FilmQuick => [10.0, 0.0, 0.0, 4.0],
            Self::FilmDeep => [22.0, 0.0, 2.0, 8.0],
            Self::BackgroundCheck => [0.0, 0.0, 18.0, 0.0],
            Self::MedicalRequest => [0.0, 24.0, 0.0, 0.0],
            Self::Interview => [2.0, 0.0, 14.0, 8.0],
            Self::PrivateWorkout => [12.0, 6.0, 4.0, 10.0],
            Self::Top30Visit => [6.0, 14.0, 16.0, 12.0],
        };
        match dim {
            IntelDimension::Ability => row[0],
            IntelDimension::Medical => row[1],
            IntelDimension::Character => row[2],
            IntelDimension::Fit => row[3],
        }
    }
}

/// Rejections from the action economy. State is never mutated on error.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum ScoutingError {
    #[error("action costs {cost} but only {remaining} budget remains")]
    NotEnoughBudget { cost: u32, remaining: u32 },
    #[error("prospect already gained {cap:.1} clarity this window")]
    TargetWindowCapReached { cap: f32 },
}

impl ScoutingError {
    /// Stable result code for collaborators persisting or displaying failures.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::NotEnoughBudget { .. } => "NOT_ENOUGH_BUDGET",
            Self::TargetWindowCapReached { .. } => "TARGET_WINDOW_CAP_REACHED",
        }
    }
}

/// Authoritative result of an applied action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionOutcome {
    pub action: ScoutingAction,
    pub cost: u32,
    pub deltas: ClarityDeltas,
    pub total_gain: f32,
    /// True when the window cap forced a proportional scale-down.
    pub capped: bool,
}

/// Marginal multiplier for clarity already at `current`.
#[must_use]
pub fn diminishing_returns(current: f32) -> f32 {
    RETURNS_TIERS
        .iter()
        .find(|(below, _)| current < *below)
        .map_or(RETURNS_FLOOR_MULT, |(_, mult)| *mult)
}

/// Evaluator skill multiplier for gains in one dimension.
#[must_use]
pub fn trait_multiplier(traits: &EvaluatorTraits, dim: IntelDimension) -> f32 {
    let dial = match dim {
        IntelDimension::Ability => traits.film_process,
        IntelDimension::Medical => (traits.intel_network + traits.risk_management) / 2.0,
        IntelDimension::Character => (traits.intel_network + traits.discipline) / 2.0,
        IntelDimension::Fit => (traits.film_process + traits.analytics_orientation) / 2.0,
    };
    TRAIT_MULT_BASE + TRAIT_MULT_SPAN * (dial / TRAIT_MAX)
}

/// Apply one scouting action to an organization's belief, paid from its budget.
///
/// Gains pass through diminishing returns and the evaluator's trait
/// multipliers, are clamped to the clarity range, and are scaled down
/// proportionally when they would overrun the per-window gain cap. The
/// returned deltas are what was actually committed.
///
/// # Errors
///
/// [`ScoutingError::NotEnoughBudget`] when the cost exceeds the remaining
/// budget; [`ScoutingError::TargetWindowCapReached`] when the prospect has
/// no cap room left this window. Neither case mutates any state.
pub fn apply_scouting_action(
    belief: &mut ScoutBeliefProfile,
    budget: &mut ScoutingBudget,
    action: ScoutingAction,
    traits: &EvaluatorTraits,
) -> Result<ActionOutcome, ScoutingError> {
    let cost = action.cost();
    if !budget.can_afford(cost) {
        log::debug!(
            target: LOG_TARGET_SCOUTING,
            "{} rejected {action:?} on {}: cost {cost}, remaining {}",
            belief.evaluator(),
            belief.prospect(),
            budget.remaining()
        );
        return Err(ScoutingError::NotEnoughBudget {
            cost,
            remaining: budget.remaining(),
        });
    }
    let room = (WINDOW_GAIN_CAP - belief.window_gain()).max(0.0);
    if room <= WINDOW_CAP_TOLERANCE {
        log::debug!(
            target: LOG_TARGET_SCOUTING,
            "{} rejected {action:?} on {}: window cap reached",
            belief.evaluator(),
            belief.prospect()
        );
        return Err(ScoutingError::TargetWindowCapReached {
            cap: WINDOW_GAIN_CAP,
        });
    }

    let traits = traits.sanitized();
    let clarity = *belief.clarity();
    let mut deltas = ClarityDeltas::new();
    for dim in IntelDimension::ALL {
        let nominal = action.base_yield(dim);
        if nominal <= 0.0 {
            continue;
        }
        let current = clarity.get(dim);
        let raw = nominal * diminishing_returns(current) * trait_multiplier(&traits, dim);
        let actual = (current + raw).clamp(0.0, CLARITY_MAX) - current;
        if actual > 0.0 {
            deltas.push((dim, actual));
        }
    }

    let requested: f32 = deltas.iter().map(|(_, d)| d).sum();
    let capped = requested > room;
    if capped {
        let scale = room / requested;
        for (_, delta) in &mut deltas {
            *delta *= scale;
        }
    }

    budget
        .spend(cost)
        .map_err(|e| ScoutingError::NotEnoughBudget {
            cost: e.cost,
            remaining: e.remaining,
        })?;
    let total_gain = belief.commit_clarity(&deltas);

    log::trace!(
        target: LOG_TARGET_SCOUTING,
        "{} applied {action:?} on {}: +{total_gain:.2} clarity{}",
        belief.evaluator(),
        belief.prospect(),
        if capped { " (capped)" } else { "" }
    );

    Ok(ActionOutcome {
        action,
        cost,
        deltas,
        total_gain,
        capped,
    })
}
