//! CPU draft valuation: base value by rank, evaluator bias, noise and need.
use serde::{Deserialize, Serialize};

use crate::belief::ScoutBeliefProfile;
use crate::constants::{
    BASE_VALUE_CEILING, BASE_VALUE_FLOOR, BASE_VALUE_SLOPE, BIAS_ATHLETIC_K, BIAS_CEILING_K,
    BIAS_DEFENSE_K, BIAS_ELITE_K, BIAS_NEED_K, BIAS_RISK_PENALTY, BIAS_TRENCH_K, GRADE_MAX,
    GRADE_MIN, NEED_WEIGHT, RANK_MAX, RANK_MIN, SIGMA_ANALYTICS_K, SIGMA_BASE, SIGMA_FILM_K,
    SIGMA_INTEL_K, SIGMA_MAX, SIGMA_MIN, SIGMA_URGENCY_K, TRAIT_MAX, TRAIT_NEUTRAL,
    VALUE_BIAS_WEIGHT,
};
use crate::evaluator::EvaluatorTraits;
use crate::numbers::u16_to_f32;
use crate::position::PositionBucket;
use crate::prospect::{Prospect, ProspectSignal};

/// Consensus value of a draft rank: 96 at the top, sliding to a floor of 66.
#[must_use]
pub fn base_value(rank: u16) -> f32 {
    let rank = rank.clamp(RANK_MIN, RANK_MAX);
    (BASE_VALUE_CEILING - BASE_VALUE_SLOPE * u16_to_f32(rank - RANK_MIN))
        .clamp(BASE_VALUE_FLOOR, BASE_VALUE_CEILING)
}

/// Scarcity of a bucket: `clamp((min_starters - have) / min_starters, 0, 1)`.
#[must_use]
pub fn need_index(bucket: PositionBucket, have: u16) -> f32 {
    let min = u16_to_f32(bucket.min_starters());
    if min <= 0.0 {
        return 0.0;
    }
    ((min - u16_to_f32(have)) / min).clamp(0.0, 1.0)
}

/// Spread of a team's valuation noise. Process-driven front offices are
/// steadier; urgent ones are more erratic.
#[must_use]
pub fn noise_sigma(traits: &EvaluatorTraits) -> f32 {
    (SIGMA_BASE - SIGMA_ANALYTICS_K * traits.analytics_orientation
        - SIGMA_FILM_K * traits.film_process
        - SIGMA_INTEL_K * traits.intel_network
        + SIGMA_URGENCY_K * traits.urgency_bias)
        .clamp(SIGMA_MIN, SIGMA_MAX)
}

/// Count of risk signals, including red-flag tiers the team has uncovered.
#[must_use]
pub fn risk_signals(prospect: &Prospect, belief: Option<&ScoutBeliefProfile>) -> u8 {
    let signals = prospect.signals();
    let mut medical = signals.contains(&ProspectSignal::MedicalRisk);
    let mut character = signals.contains(&ProspectSignal::CharacterRisk);
    if let Some(revealed) = belief.map(ScoutBeliefProfile::revealed) {
        medical |= revealed.medical_tier.is_some_and(|t| t.is_red_flag());
        character |= revealed.character_tier.is_some_and(|t| t.is_red_flag());
    }
    u8::from(medical) + u8::from(character)
}

/// Weighted sum of the prospect's signals, each scaled by the matching bias
/// dial. Discipline turns risk signals into a penalty.
#[must_use]
pub fn signal_bias(
    traits: &EvaluatorTraits,
    prospect: &Prospect,
    need: f32,
    belief: Option<&ScoutBeliefProfile>,
) -> f32 {
    let signals = prospect.signals();
    let bucket = prospect.position.bucket();
    let lean = |dial: f32, k: f32| (dial - TRAIT_NEUTRAL) * k;

    let mut bias = 0.0;
    if signals.contains(&ProspectSignal::EliteTrait) {
        bias += lean(traits.star_bias, BIAS_ELITE_K);
    }
    if signals.contains(&ProspectSignal::HighCeiling) {
        bias += lean(traits.aggression, BIAS_CEILING_K);
    }
    if signals.contains(&ProspectSignal::Athletic) {
        bias += lean(traits.athleticism_bias, BIAS_ATHLETIC_K);
    }
    if bucket.is_trench() {
        bias += lean(traits.trench_bias, BIAS_TRENCH_K);
    }
    if bucket.is_defense() {
        bias += lean(traits.defense_bias, BIAS_DEFENSE_K);
    }
    bias += need * lean(traits.urgency_bias, BIAS_NEED_K);
    bias -= f32::from(risk_signals(prospect, belief))
        * (traits.discipline / TRAIT_MAX)
        * BIAS_RISK_PENALTY;
    bias
}

/// Base value, pulled toward the team's own estimate in proportion to its confidence.
#[must_use]
pub fn anchored_base(prospect: &Prospect, belief: Option<&ScoutBeliefProfile>) -> f32 {
    let base = base_value(prospect.clamped_rank());
    belief.map_or(base, |b| {
        let weight = (b.confidence() / 100.0).clamp(0.0, 1.0);
        base + (b.est_center() - base) * weight
    })
}

/// One candidate's valuation at one slot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CandidateValue {
    pub base: f32,
    pub bias: f32,
    pub noise: f32,
    pub scouted: f32,
    pub need: f32,
    pub score: f32,
}

/// `score = scouted + need * 3.5 + (value_bias - 50) * 0.01`, where
/// `scouted = clamp(base + bias + noise, 40, 99)` and `noise` is a standard
/// normal draw already scaled by [`noise_sigma`].
#[must_use]
pub fn candidate_value(
    traits: &EvaluatorTraits,
    prospect: &Prospect,
    need: f32,
    noise: f32,
    belief: Option<&ScoutBeliefProfile>,
) -> CandidateValue {
    let base = anchored_base(prospect, belief);
    let bias = signal_bias(traits, prospect, need, belief);
    let scouted = (base + bias + noise).clamp(GRADE_MIN, GRADE_MAX);
    let score =
        scouted + need * NEED_WEIGHT + (traits.value_bias - TRAIT_NEUTRAL) * VALUE_BIAS_WEIGHT;
    CandidateValue {
        base,
        bias,
        noise,
        scouted,
        need,
        score,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::belief::init_belief_profile;
    use crate::evaluator::OrgId;
    use crate::position::Position;
    use crate::prospect::{CharacterTier, Measurables, MedicalTier, ProspectId, TrueProspectProfile};

    fn prospect(position: Position, rank: u16, signals: &[ProspectSignal]) -> Prospect {
        Prospect {
            id: ProspectId::new("v-1"),
            name: "Value Case".to_string(),
            position,
            rank,
            measurables: Measurables::default(),
            signals: signals.iter().copied().collect(),
        }
    }

    /// A board entry with a pinned center and confidence.
    fn board_belief(p: &Prospect, center: f32, confidence: f32) -> ScoutBeliefProfile {
        let truth = TrueProspectProfile::generate(1, p);
        let belief =
            init_belief_profile(1, &OrgId::new("val"), p, &truth, &EvaluatorTraits::default());
        let mut value = serde_json::to_value(&belief).unwrap();
        value["est_center"] = serde_json::json!(center);
        value["confidence"] = serde_json::json!(confidence);
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn base_value_is_monotone_and_clamped() {
        assert!((base_value(1) - 96.0).abs() < f32::EPSILON);
        assert!((base_value(0) - 96.0).abs() < f32::EPSILON);
        assert!((base_value(u16::MAX) - 66.0).abs() < f32::EPSILON);
        let mut previous = f32::MAX;
        for rank in 1..=400 {
            let value = base_value(rank);
            assert!(value <= previous);
            previous = value;
        }
    }

    #[test]
    fn need_index_tracks_missing_starters() {
        let bucket = PositionBucket::Corner;
        assert!((need_index(bucket, 0) - 1.0).abs() < f32::EPSILON);
        assert!((need_index(bucket, 2) - 0.5).abs() < f32::EPSILON);
        assert!(need_index(bucket, 9).abs() < f32::EPSILON);
    }

    #[test]
    fn sigma_shrinks_with_process_and_grows_with_urgency() {
        let neutral = noise_sigma(&EvaluatorTraits::default());
        let mut process = EvaluatorTraits::default();
        process.analytics_orientation = 95.0;
        process.film_process = 95.0;
        let mut urgent = EvaluatorTraits::default();
        urgent.urgency_bias = 95.0;
        assert!(noise_sigma(&process) < neutral);
        assert!(noise_sigma(&urgent) > neutral);
        assert!(noise_sigma(&EvaluatorTraits::uniform(0.0)) <= SIGMA_MAX);
    }

    #[test]
    fn neutral_traits_carry_no_bias_without_risk() {
        let traits = EvaluatorTraits::default();
        let p = prospect(Position::Edge, 5, &[ProspectSignal::EliteTrait, ProspectSignal::Athletic]);
        assert!(signal_bias(&traits, &p, 1.0, None).abs() < 1e-6);
    }

    #[test]
    fn discipline_penalizes_risk_signals() {
        let mut traits = EvaluatorTraits::default();
        traits.discipline = 100.0;
        let risky = prospect(
            Position::Wr,
            5,
            &[ProspectSignal::MedicalRisk, ProspectSignal::CharacterRisk],
        );
        assert!((signal_bias(&traits, &risky, 0.0, None) + 4.0).abs() < 1e-5);
    }

    #[test]
    fn star_bias_rewards_elite_traits() {
        let mut traits = EvaluatorTraits::default();
        traits.star_bias = 100.0;
        let elite = prospect(Position::Wr, 5, &[ProspectSignal::EliteTrait]);
        let plain = prospect(Position::Wr, 5, &[]);
        assert!(signal_bias(&traits, &elite, 0.0, None) > signal_bias(&traits, &plain, 0.0, None));
    }

    #[test]
    fn top_rank_scores_near_ceiling_and_never_above_grade_max() {
        let traits = EvaluatorTraits::default();
        let p = prospect(Position::Qb, 1, &[]);
        let calm = candidate_value(&traits, &p, 0.0, 0.0, None);
        assert!((calm.scouted - 96.0).abs() < f32::EPSILON);
        let hot = candidate_value(&traits, &p, 0.0, 12.0, None);
        assert!((hot.scouted - GRADE_MAX).abs() < f32::EPSILON);
        let needy = candidate_value(&traits, &p, 1.0, 0.0, None);
        assert!((needy.score - calm.score - NEED_WEIGHT).abs() < 1e-4);
    }

    #[test]
    fn zero_confidence_leaves_base_alone() {
        let p = prospect(Position::Lb, 20, &[]);
        let belief = board_belief(&p, 70.0, 0.0);
        assert!((anchored_base(&p, Some(&belief)) - base_value(20)).abs() < 1e-5);
        assert!((anchored_base(&p, None) - base_value(20)).abs() < f32::EPSILON);
    }

    #[test]
    fn board_belief_pulls_base_by_confidence() {
        let p = prospect(Position::Lb, 20, &[]);
        let base = base_value(20);
        let half = anchored_base(&p, Some(&board_belief(&p, 70.0, 50.0)));
        let firm = anchored_base(&p, Some(&board_belief(&p, 70.0, 90.0)));
        assert!((half - (base + (70.0 - base) * 0.5)).abs() < 1e-4);
        assert!((firm - (base + (70.0 - base) * 0.9)).abs() < 1e-4);
        assert!(firm < half && half < base);

        let traits = EvaluatorTraits::default();
        let blended = candidate_value(&traits, &p, 0.0, 0.0, Some(&board_belief(&p, 70.0, 90.0)));
        assert!((blended.base - firm).abs() < f32::EPSILON);
    }

    #[test]
    fn revealed_red_flag_counts_as_risk() {
        let p = prospect(Position::Wr, 5, &[]);
        let mut belief = board_belief(&p, 90.0, 50.0);
        assert_eq!(risk_signals(&p, Some(&belief)), 0);
        assert!(belief.revealed_mut().disclose_medical_tier(MedicalTier::Red));
        assert_eq!(risk_signals(&p, Some(&belief)), 1);

        let mut strict = EvaluatorTraits::default();
        strict.discipline = 100.0;
        let unscouted = signal_bias(&strict, &p, 0.0, None);
        let flagged = signal_bias(&strict, &p, 0.0, Some(&belief));
        assert!((unscouted - flagged - BIAS_RISK_PENALTY).abs() < 1e-5);

        let mut lax = EvaluatorTraits::default();
        lax.discipline = 0.0;
        let diff = signal_bias(&lax, &p, 0.0, None) - signal_bias(&lax, &p, 0.0, Some(&belief));
        assert!(diff.abs() < 1e-6);

        // A revealed flag matching a listed risk signal is not double counted.
        let listed = prospect(Position::Wr, 5, &[ProspectSignal::MedicalRisk]);
        assert_eq!(risk_signals(&listed, Some(&belief)), 1);
    }

    #[test]
    fn clean_revealed_tiers_add_no_risk() {
        let p = prospect(Position::Cb, 12, &[]);
        let mut belief = board_belief(&p, 85.0, 60.0);
        assert!(belief.revealed_mut().disclose_medical_tier(MedicalTier::Orange));
        assert!(belief.revealed_mut().disclose_character_tier(CharacterTier::Yellow));
        assert_eq!(risk_signals(&p, Some(&belief)), 0);

        let mut strict = EvaluatorTraits::default();
        strict.discipline = 100.0;
        let diff =
            signal_bias(&strict, &p, 0.0, None) - signal_bias(&strict, &p, 0.0, Some(&belief));
        assert!(diff.abs() < 1e-6);
    }
}
