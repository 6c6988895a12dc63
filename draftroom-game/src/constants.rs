//! Centralized balance and tuning constants for Draftroom scouting and draft logic.
//!
//! These values define the deterministic math for the core simulation.
//! Keeping them together ensures that evaluation can only be adjusted via
//! code changes reviewed in version control, rather than through external
//! JSON assets.

// Logging targets ----------------------------------------------------------
pub(crate) const LOG_TARGET_SCOUTING: &str = "draftroom::scouting";
pub(crate) const LOG_TARGET_REVEAL: &str = "draftroom::reveal";
pub(crate) const LOG_TARGET_DRAFT: &str = "draftroom::draft";
pub(crate) const LOG_TARGET_PERSONNEL: &str = "draftroom::personnel";

// Random source domains ------------------------------------------------------
pub(crate) const DOMAIN_TRUE_PROFILE: &str = "prospect.truth";
pub(crate) const DOMAIN_BELIEF_INIT: &str = "belief.init";
pub(crate) const DOMAIN_BELIEF_TIGHTEN: &str = "belief.tighten";
pub(crate) const DOMAIN_REVEAL_MEDICAL: &str = "reveal.medical";
pub(crate) const DOMAIN_REVEAL_CHARACTER: &str = "reveal.character";
pub(crate) const DOMAIN_DRAFT_NOISE: &str = "draft.noise";
pub(crate) const DOMAIN_DRAFT_TIEBREAK: &str = "draft.tiebreak";

// Grade scale ----------------------------------------------------------------
pub const GRADE_MIN: f32 = 40.0;
pub const GRADE_MAX: f32 = 99.0;

// Belief initialization ------------------------------------------------------
pub(crate) const BELIEF_SIGMA_BASE: f64 = 6.0;
pub(crate) const BELIEF_SIGMA_FILM_K: f64 = 0.03;
pub(crate) const BELIEF_SIGMA_ANALYTICS_K: f64 = 0.02;
pub(crate) const BELIEF_SIGMA_MIN: f64 = 1.5;
pub(crate) const BELIEF_SIGMA_MAX: f64 = 6.0;
pub const BELIEF_WIDTH_MIN: f32 = 10.0;
pub const BELIEF_WIDTH_MAX: f32 = 22.0;
pub const BELIEF_WIDTH_FLOOR: f32 = 4.0;
pub(crate) const CONFIDENCE_PER_WIDTH: f32 = 4.0;
pub(crate) const CONFIDENCE_MIN: f32 = 5.0;
pub(crate) const CONFIDENCE_MAX: f32 = 95.0;

// Band tightening ------------------------------------------------------------
pub(crate) const TIGHTEN_EFFORT_K: f32 = 0.12;
pub(crate) const TIGHTEN_SKILL_BASE: f32 = 0.6;
pub(crate) const TIGHTEN_SKILL_DIVISOR: f32 = 250.0;
pub(crate) const TIGHTEN_TRUTH_PULL: f32 = 0.5;
pub(crate) const TIGHTEN_NOISE_SCALE: f32 = 0.75;
pub(crate) const STOCK_ARROW_DELTA: f32 = 2.0;

// Clarity economy ------------------------------------------------------------
pub const CLARITY_MAX: f32 = 100.0;
pub const WINDOW_GAIN_CAP: f32 = 35.0;
/// Cap room at or below this counts as exhausted.
pub(crate) const WINDOW_CAP_TOLERANCE: f32 = 1e-3;
pub(crate) const RETURNS_TIERS: [(f32, f32); 3] = [(30.0, 1.0), (60.0, 0.75), (80.0, 0.55)];
pub(crate) const RETURNS_FLOOR_MULT: f32 = 0.35;
pub(crate) const TRAIT_MULT_BASE: f32 = 0.7;
pub(crate) const TRAIT_MULT_SPAN: f32 = 0.6;

// Reveal thresholds ----------------------------------------------------------
pub const REVEAL_PROBABLE_AT: f32 = 35.0;
pub const REVEAL_CERTAIN_AT: f32 = 70.0;
pub const REVEAL_SECONDARY_AT: f32 = 85.0;
pub(crate) const REVEAL_MISS_BASE: f64 = 0.30;
pub(crate) const REVEAL_MISS_RISK_K: f64 = 0.0015;
pub(crate) const REVEAL_MISS_CLARITY_K: f64 = 0.004;
pub(crate) const REVEAL_MISS_MIN: f64 = 0.03;
pub(crate) const REVEAL_MISS_MAX: f64 = 0.30;

// Window budgets -------------------------------------------------------------
pub(crate) const CARRY_FRACTION: f64 = 0.5;

// Draft valuation ------------------------------------------------------------
pub(crate) const BASE_VALUE_CEILING: f32 = 96.0;
pub(crate) const BASE_VALUE_FLOOR: f32 = 66.0;
pub(crate) const BASE_VALUE_SLOPE: f32 = 0.12;
pub(crate) const RANK_MIN: u16 = 1;
pub(crate) const RANK_MAX: u16 = 400;
pub(crate) const NEED_WEIGHT: f32 = 3.5;
pub(crate) const VALUE_BIAS_WEIGHT: f32 = 0.01;
pub(crate) const BIAS_ELITE_K: f32 = 0.04;
pub(crate) const BIAS_CEILING_K: f32 = 0.03;
pub(crate) const BIAS_ATHLETIC_K: f32 = 0.03;
pub(crate) const BIAS_TRENCH_K: f32 = 0.03;
pub(crate) const BIAS_DEFENSE_K: f32 = 0.03;
pub(crate) const BIAS_NEED_K: f32 = 0.02;
pub(crate) const BIAS_RISK_PENALTY: f32 = 2.0;
pub(crate) const SIGMA_BASE: f32 = 2.4;
pub(crate) const SIGMA_ANALYTICS_K: f32 = 0.008;
pub(crate) const SIGMA_FILM_K: f32 = 0.006;
pub(crate) const SIGMA_INTEL_K: f32 = 0.004;
pub(crate) const SIGMA_URGENCY_K: f32 = 0.01;
pub(crate) const SIGMA_MIN: f32 = 0.6;
pub(crate) const SIGMA_MAX: f32 = 4.0;

// Trait dials ----------------------------------------------------------------
pub const TRAIT_MIN: f32 = 0.0;
pub const TRAIT_MAX: f32 = 100.0;
pub const TRAIT_NEUTRAL: f32 = 50.0;
