//! Scout belief profiles: one organization's uncertain estimate of one prospect.
//!
//! Fields are private; every write goes through methods that re-establish
//! `GRADE_MIN <= est_low <= est_center <= est_high <= GRADE_MAX`, the width
//! floor, and clarity bounds.
use serde::{Deserialize, Serialize};

use crate::constants::{
    BELIEF_SIGMA_ANALYTICS_K, BELIEF_SIGMA_BASE, BELIEF_SIGMA_FILM_K, BELIEF_SIGMA_MAX,
    BELIEF_SIGMA_MIN, BELIEF_WIDTH_FLOOR, BELIEF_WIDTH_MAX, BELIEF_WIDTH_MIN, CLARITY_MAX,
    CONFIDENCE_MAX, CONFIDENCE_MIN, CONFIDENCE_PER_WIDTH, DOMAIN_BELIEF_INIT,
    DOMAIN_BELIEF_TIGHTEN, GRADE_MAX, GRADE_MIN, STOCK_ARROW_DELTA, TIGHTEN_EFFORT_K,
    TIGHTEN_NOISE_SCALE, TIGHTEN_SKILL_BASE, TIGHTEN_SKILL_DIVISOR, TIGHTEN_TRUTH_PULL,
};
use crate::evaluator::{EvaluatorTraits, OrgId};
use crate::numbers::{clamp_f64_to_f32, finite_or};
use crate::prospect::{CharacterTier, LeadershipTag, MedicalTier, Prospect, ProspectId, TrueProspectProfile};
use crate::rng::RollKey;

/// The four intel dimensions scouting effort accrues into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntelDimension {
    Ability,
    Medical,
    Character,
    Fit,
}

impl IntelDimension {
    pub const ALL: [Self; 4] = [Self::Ability, Self::Medical, Self::Character, Self::Fit];
}

/// Per-dimension clarity on a 0–100 scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Clarity {
    pub ability: f32,
    pub medical: f32,
    pub character: f32,
    pub fit: f32,
}

impl Clarity {
    #[must_use]
    pub const fn get(&self, dim: IntelDimension) -> f32 {
        match dim {
            IntelDimension::Ability => self.ability,
            IntelDimension::Medical => self.medical,
            IntelDimension::Character => self.character,
            IntelDimension::Fit => self.fit,
        }
    }

    pub(crate) fn set(&mut self, dim: IntelDimension, value: f32) {
        let value = finite_or(value, 0.0).clamp(0.0, CLARITY_MAX);
        match dim {
            IntelDimension::Ability => self.ability = value,
            IntelDimension::Medical => self.medical = value,
            IntelDimension::Character => self.character = value,
            IntelDimension::Fit => self.fit = value,
        }
    }

    #[must_use]
    pub fn total(&self) -> f32 {
        self.ability + self.medical + self.character + self.fit
    }
}

/// Movement of the grade since the last window snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum StockArrow {
    Up,
    Down,
    #[default]
    Flat,
}

impl StockArrow {
    #[must_use]
    pub fn from_delta(delta: f32) -> Self {
        if delta >= STOCK_ARROW_DELTA {
            Self::Up
        } else if delta <= -STOCK_ARROW_DELTA {
            Self::Down
        } else {
            Self::Flat
        }
    }
}

/// Disclosed slices of the hidden profile. Fields only ever go from `None`
/// to `Some`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Revealed {
    #[serde(default)]
    pub medical_tier: Option<MedicalTier>,
    #[serde(default)]
    pub recurrence01: Option<f32>,
    #[serde(default)]
    pub degenerative: Option<bool>,
    #[serde(default)]
    pub character_tier: Option<CharacterTier>,
    #[serde(default)]
    pub leadership: Option<LeadershipTag>,
}

fn fill<T>(slot: &mut Option<T>, value: T) -> bool {
    if slot.is_some() {
        return false;
    }
    *slot = Some(value);
    true
}

impl Revealed {
    pub(crate) fn disclose_medical_tier(&mut self, tier: MedicalTier) -> bool {
        fill(&mut self.medical_tier, tier)
    }

    pub(crate) fn disclose_medical_secondary(&mut self, recurrence01: f32, degenerative: bool) -> bool {
        let a = fill(&mut self.recurrence01, recurrence01);
        let b = fill(&mut self.degenerative, degenerative);
        a || b
    }

    pub(crate) fn disclose_character_tier(&mut self, tier: CharacterTier) -> bool {
        fill(&mut self.character_tier, tier)
    }

    pub(crate) fn disclose_leadership(&mut self, tag: LeadershipTag) -> bool {
        fill(&mut self.leadership, tag)
    }
}

/// Result of one band-tightening pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TightenOutcome {
    pub effort_used: f32,
    pub width_before: f32,
    pub width_after: f32,
    pub center_before: f32,
    pub center_after: f32,
    pub stock_arrow: StockArrow,
}

impl TightenOutcome {
    #[must_use]
    pub fn tightened(&self) -> bool {
        self.width_after < self.width_before
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoutBeliefProfile {
    evaluator: OrgId,
    prospect: ProspectId,
    est_center: f32,
    est_width: f32,
    est_low: f32,
    est_high: f32,
    confidence: f32,
    clarity: Clarity,
    revealed: Revealed,
    stock_arrow: StockArrow,
    #[serde(default)]
    snapshot_center: Option<f32>,
    #[serde(default)]
    window_gain: f32,
    #[serde(default)]
    window_effort: f32,
    #[serde(default)]
    tighten_passes: u32,
    #[serde(default)]
    medical_rolls: u32,
    #[serde(default)]
    character_rolls: u32,
}

/// Confidence implied by a band width: `clamp(100 - 4 * width, 5, 95)`.
#[must_use]
pub fn confidence_for_width(width: f32) -> f32 {
    (100.0 - CONFIDENCE_PER_WIDTH * width).clamp(CONFIDENCE_MIN, CONFIDENCE_MAX)
}

fn init_sigma(traits: &EvaluatorTraits) -> f64 {
    let film = f64::from(traits.film_process);
    let analytics = f64::from(traits.analytics_orientation);
    (BELIEF_SIGMA_BASE - BELIEF_SIGMA_FILM_K * film - BELIEF_SIGMA_ANALYTICS_K * analytics)
        .clamp(BELIEF_SIGMA_MIN, BELIEF_SIGMA_MAX)
}

/// Create an organization's opening estimate of a prospect at the start of
/// the scouting season.
#[must_use]
pub fn init_belief_profile(
    seed: u64,
    evaluator: &OrgId,
    prospect: &Prospect,
    truth: &TrueProspectProfile,
    traits: &EvaluatorTraits,
) -> ScoutBeliefProfile {
    let traits = traits.sanitized();
    let z = RollKey::new(seed, DOMAIN_BELIEF_INIT)
        .with(evaluator.as_str())
        .with(prospect.id.as_str())
        .standard_normal();
    let noise = clamp_f64_to_f32(z * init_sigma(&traits));
    let center = truth.true_ovr + noise;
    let width = prospect
        .position
        .base_band_width()
        .clamp(BELIEF_WIDTH_MIN, BELIEF_WIDTH_MAX);

    let mut profile = ScoutBeliefProfile {
        evaluator: evaluator.clone(),
        prospect: prospect.id.clone(),
        est_center: GRADE_MIN,
        est_width: width,
        est_low: GRADE_MIN,
        est_high: GRADE_MIN,
        confidence: CONFIDENCE_MIN,
        clarity: Clarity::default(),
        revealed: Revealed::default(),
        stock_arrow: StockArrow::Flat,
        snapshot_center: None,
        window_gain: 0.0,
        window_effort: 0.0,
        tighten_passes: 0,
        medical_rolls: 0,
        character_rolls: 0,
    };
    profile.set_band(center, width);
    profile
}

impl ScoutBeliefProfile {
    fn set_band(&mut self, center: f32, width: f32) {
        let center = finite_or(center, GRADE_MIN).clamp(GRADE_MIN, GRADE_MAX);
        let width = finite_or(width, BELIEF_WIDTH_MAX).clamp(BELIEF_WIDTH_FLOOR, BELIEF_WIDTH_MAX);
        let half = width / 2.0;
        self.est_center = center;
        self.est_width = width;
        self.est_low = (center - half).clamp(GRADE_MIN, GRADE_MAX);
        self.est_high = (center + half).clamp(GRADE_MIN, GRADE_MAX);
        self.confidence = confidence_for_width(width);
    }

    #[must_use]
    pub const fn evaluator(&self) -> &OrgId {
        &self.evaluator
    }

    #[must_use]
    pub const fn prospect(&self) -> &ProspectId {
        &self.prospect
    }

    #[must_use]
    pub const fn est_center(&self) -> f32 {
        self.est_center
    }

    #[must_use]
    pub const fn est_width(&self) -> f32 {
        self.est_width
    }

    #[must_use]
    pub const fn est_low(&self) -> f32 {
        self.est_low
    }

    #[must_use]
    pub const fn est_high(&self) -> f32 {
        self.est_high
    }

    #[must_use]
    pub const fn confidence(&self) -> f32 {
        self.confidence
    }

    #[must_use]
    pub const fn clarity(&self) -> &Clarity {
        &self.clarity
    }

    #[must_use]
    pub const fn revealed(&self) -> &Revealed {
        &self.revealed
    }

    #[must_use]
    pub const fn stock_arrow(&self) -> StockArrow {
        self.stock_arrow
    }

    /// Clarity gained by this prospect in the current window.
    #[must_use]
    pub const fn window_gain(&self) -> f32 {
        self.window_gain
    }

    /// Effort banked since the last tightening pass.
    #[must_use]
    pub const fn window_effort(&self) -> f32 {
        self.window_effort
    }

    #[must_use]
    pub const fn snapshot_center(&self) -> Option<f32> {
        self.snapshot_center
    }

    /// True when the band and clarity invariants all hold.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        let band = GRADE_MIN <= self.est_low
            && self.est_low <= self.est_center
            && self.est_center <= self.est_high
            && self.est_high <= GRADE_MAX;
        let width = self.est_width >= BELIEF_WIDTH_FLOOR && self.est_width <= BELIEF_WIDTH_MAX;
        let clarity = IntelDimension::ALL
            .iter()
            .all(|d| (0.0..=CLARITY_MAX).contains(&self.clarity.get(*d)));
        band && width && clarity && (self.confidence - confidence_for_width(self.est_width)).abs() < 1e-4
    }

    /// Open a new scouting window: snapshot the grade and reset the per-window gain.
    pub fn begin_window(&mut self) {
        self.snapshot_center = Some(self.est_center);
        self.window_gain = 0.0;
    }

    pub(crate) fn commit_clarity(&mut self, deltas: &[(IntelDimension, f32)]) -> f32 {
        let mut applied = 0.0;
        for (dim, delta) in deltas {
            let before = self.clarity.get(*dim);
            self.clarity.set(*dim, before + delta);
            applied += self.clarity.get(*dim) - before;
        }
        self.window_gain += applied;
        self.window_effort += applied;
        applied
    }

    pub(crate) const fn revealed_mut(&mut self) -> &mut Revealed {
        &mut self.revealed
    }

    pub(crate) fn next_medical_roll(&mut self) -> u32 {
        let roll = self.medical_rolls;
        self.medical_rolls = self.medical_rolls.saturating_add(1);
        roll
    }

    pub(crate) fn next_character_roll(&mut self) -> u32 {
        let roll = self.character_rolls;
        self.character_rolls = self.character_rolls.saturating_add(1);
        roll
    }
}

/// Narrow the estimate band using effort banked since the last pass.
///
/// Shrink is proportional to effort and evaluator skill, the center drifts
/// toward the truth with a little keyed noise, and the stock arrow is
/// recomputed against the window snapshot. Width never drops below
/// [`BELIEF_WIDTH_FLOOR`]. With no banked effort the profile is untouched.
pub fn tighten_band(
    seed: u64,
    belief: &mut ScoutBeliefProfile,
    truth: &TrueProspectProfile,
    traits: &EvaluatorTraits,
) -> TightenOutcome {
    let traits = traits.sanitized();
    let effort = belief.window_effort.max(0.0);
    let width_before = belief.est_width;
    let center_before = belief.est_center;

    let skill = TIGHTEN_SKILL_BASE
        + (traits.film_process + traits.analytics_orientation) / TIGHTEN_SKILL_DIVISOR;
    let target_width = (width_before - effort * TIGHTEN_EFFORT_K * skill).max(BELIEF_WIDTH_FLOOR);
    let shrink = width_before - target_width;
    belief.window_effort = 0.0;

    if shrink <= f32::EPSILON {
        return TightenOutcome {
            effort_used: effort,
            width_before,
            width_after: width_before,
            center_before,
            center_after: center_before,
            stock_arrow: belief.stock_arrow,
        };
    }

    let ratio = (shrink / width_before).clamp(0.0, 1.0);
    let z = RollKey::new(seed, DOMAIN_BELIEF_TIGHTEN)
        .with(belief.evaluator.as_str())
        .with(belief.prospect.as_str())
        .with_index(u64::from(belief.tighten_passes))
        .standard_normal();
    belief.tighten_passes = belief.tighten_passes.saturating_add(1);

    let pull = (truth.true_ovr - center_before) * TIGHTEN_TRUTH_PULL * ratio;
    let jitter = clamp_f64_to_f32(z) * TIGHTEN_NOISE_SCALE * ratio;
    belief.set_band(center_before + pull + jitter, target_width);

    belief.stock_arrow = belief
        .snapshot_center
        .map_or(StockArrow::Flat, |snap| StockArrow::from_delta(belief.est_center - snap));

    TightenOutcome {
        effort_used: effort,
        width_before,
        width_after: belief.est_width,
        center_before,
        center_after: belief.est_center,
        stock_arrow: belief.stock_arrow,
    }
}
