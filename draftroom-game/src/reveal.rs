//! Reveal engine: turns medical and character clarity into disclosed truth.
use serde::{Deserialize, Serialize};

use crate::belief::ScoutBeliefProfile;
use crate::constants::{
    DOMAIN_REVEAL_CHARACTER, DOMAIN_REVEAL_MEDICAL, LOG_TARGET_REVEAL, REVEAL_CERTAIN_AT,
    REVEAL_MISS_BASE, REVEAL_MISS_CLARITY_K, REVEAL_MISS_MAX, REVEAL_MISS_MIN,
    REVEAL_MISS_RISK_K, REVEAL_PROBABLE_AT, REVEAL_SECONDARY_AT, TRAIT_MAX, TRAIT_MIN,
    TRAIT_NEUTRAL,
};
use crate::evaluator::EvaluatorTraits;
use crate::numbers::finite_or;
use crate::prospect::TrueProspectProfile;
use crate::rng::RollKey;

/// What a reveal call did to the caller's belief.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevealOutcome {
    /// Clarity below the probable band; no roll was made.
    Hidden,
    /// A roll was made and missed.
    Missed,
    /// The tier became visible on this call.
    TierRevealed,
    /// Secondary attributes became visible on this call (tier included if new).
    SecondaryRevealed,
    /// Everything reachable at this clarity was already visible.
    AlreadyKnown,
}

/// Probability that a probable-band roll fails to surface the tier. A
/// non-finite `risk_management` counts as neutral.
#[must_use]
pub fn miss_probability(clarity: f32, risk_management: f32) -> f64 {
    let clarity_over = f64::from((finite_or(clarity, 0.0) - REVEAL_PROBABLE_AT).max(0.0));
    let risk = f64::from(finite_or(risk_management, TRAIT_NEUTRAL).clamp(TRAIT_MIN, TRAIT_MAX));
    (REVEAL_MISS_BASE - REVEAL_MISS_RISK_K * risk - REVEAL_MISS_CLARITY_K * clarity_over)
        .clamp(REVEAL_MISS_MIN, REVEAL_MISS_MAX)
}

enum Gate {
    Hidden,
    Roll,
    Certain,
    Secondary,
}

fn gate(clarity: f32) -> Gate {
    if clarity >= REVEAL_SECONDARY_AT {
        Gate::Secondary
    } else if clarity >= REVEAL_CERTAIN_AT {
        Gate::Certain
    } else if clarity >= REVEAL_PROBABLE_AT {
        Gate::Roll
    } else {
        Gate::Hidden
    }
}

/// Attempt to disclose the medical tier (and, at high clarity, recurrence
/// and degenerative status) into the caller's own belief.
pub fn reveal_medical(
    seed: u64,
    belief: &mut ScoutBeliefProfile,
    truth: &TrueProspectProfile,
    traits: &EvaluatorTraits,
) -> RevealOutcome {
    let traits = traits.sanitized();
    let clarity = belief.clarity().medical;
    let known = belief.revealed().medical_tier.is_some();
    let tier_shown = match gate(clarity) {
        Gate::Hidden => return RevealOutcome::Hidden,
        Gate::Roll if known => return RevealOutcome::AlreadyKnown,
        Gate::Roll => {
            let roll = belief.next_medical_roll();
            let draw = RollKey::new(seed, DOMAIN_REVEAL_MEDICAL)
                .with(belief.evaluator().as_str())
                .with(belief.prospect().as_str())
                .with_index(u64::from(roll))
                .unit();
            if draw <= miss_probability(clarity, traits.risk_management) {
                return RevealOutcome::Missed;
            }
            belief.revealed_mut().disclose_medical_tier(truth.medical.tier)
        }
        Gate::Certain | Gate::Secondary => {
            belief.revealed_mut().disclose_medical_tier(truth.medical.tier)
        }
    };

    let secondary_shown = clarity >= REVEAL_SECONDARY_AT
        && belief
            .revealed_mut()
            .disclose_medical_secondary(truth.medical.recurrence01, truth.medical.degenerative);

    if tier_shown || secondary_shown {
        log::debug!(
            target: LOG_TARGET_REVEAL,
            "{} medical on {} revealed at clarity {clarity:.1}",
            belief.evaluator(),
            belief.prospect()
        );
    }
    classify(tier_shown, secondary_shown)
}

/// Attempt to disclose the character tier (and, at high clarity, the
/// leadership tag) into the caller's own belief.
pub fn reveal_character(
    seed: u64,
    belief: &mut ScoutBeliefProfile,
    truth: &TrueProspectProfile,
    traits: &EvaluatorTraits,
) -> RevealOutcome {
    let traits = traits.sanitized();
    let clarity = belief.clarity().character;
    let known = belief.revealed().character_tier.is_some();
    let tier_shown = match gate(clarity) {
        Gate::Hidden => return RevealOutcome::Hidden,
        Gate::Roll if known => return RevealOutcome::AlreadyKnown,
        Gate::Roll => {
            let roll = belief.next_character_roll();
            let draw = RollKey::new(seed, DOMAIN_REVEAL_CHARACTER)
                .with(belief.evaluator().as_str())
                .with(belief.prospect().as_str())
                .with_index(u64::from(roll))
                .unit();
            if draw <= miss_probability(clarity, traits.risk_management) {
                return RevealOutcome::Missed;
            }
            belief.revealed_mut().disclose_character_tier(truth.character.tier)
        }
        Gate::Certain | Gate::Secondary => belief
            .revealed_mut()
            .disclose_character_tier(truth.character.tier),
    };

    let secondary_shown = clarity >= REVEAL_SECONDARY_AT
        && belief
            .revealed_mut()
            .disclose_leadership(truth.character.leadership);

    if tier_shown || secondary_shown {
        log::debug!(
            target: LOG_TARGET_REVEAL,
            "{} character on {} revealed at clarity {clarity:.1}",
            belief.evaluator(),
            belief.prospect()
        );
    }
    classify(tier_shown, secondary_shown)
}

const fn classify(tier_shown: bool, secondary_shown: bool) -> RevealOutcome {
    match (tier_shown, secondary_shown) {
        (_, true) => RevealOutcome::SecondaryRevealed,
        (true, false) => RevealOutcome::TierRevealed,
        (false, false) => RevealOutcome::AlreadyKnown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::{ScoutingAction, apply_scouting_action};
    use crate::belief::init_belief_profile;
    use crate::budget::{ScoutingWindow, compute_window_budget};
    use crate::evaluator::OrgId;
    use crate::position::Position;
    use crate::prospect::{Measurables, Prospect, ProspectId, SignalSet};

    fn setup(id: &str) -> (ScoutBeliefProfile, TrueProspectProfile, EvaluatorTraits) {
        let prospect = Prospect {
            id: ProspectId::new(id),
            name: "Reveal Target".to_string(),
            position: Position::Rb,
            rank: 25,
            measurables: Measurables::default(),
            signals: SignalSet::new(),
        };
        let truth = TrueProspectProfile::generate(3, &prospect);
        let traits = EvaluatorTraits::default();
        let belief = init_belief_profile(3, &OrgId::new("org"), &prospect, &truth, &traits);
        (belief, truth, traits)
    }

    /// Push medical clarity with repeated medical requests, one per window.
    fn scout_medical_to(belief: &mut ScoutBeliefProfile, traits: &EvaluatorTraits, target: f32) {
        while belief.clarity().medical < target {
            belief.begin_window();
            let mut budget = compute_window_budget(ScoutingWindow::Combine, 100.0, 0);
            apply_scouting_action(belief, &mut budget, ScoutingAction::MedicalRequest, traits)
                .unwrap();
        }
    }

    #[test]
    fn miss_probability_is_bounded_and_monotone() {
        assert!((miss_probability(35.0, 0.0) - 0.30).abs() < 1e-9);
        assert!((miss_probability(69.0, 100.0) - 0.03).abs() < 1e-9);
        let mut previous = 1.0;
        for clarity in 35..70 {
            #[allow(clippy::cast_precision_loss)]
            let p = miss_probability(clarity as f32, 50.0);
            assert!(p <= previous);
            assert!((0.03..=0.30).contains(&p));
            previous = p;
        }
        assert!(miss_probability(50.0, 90.0) < miss_probability(50.0, 10.0));
    }

    #[test]
    fn non_finite_risk_management_rolls_as_neutral() {
        let neutral_p = miss_probability(50.0, TRAIT_NEUTRAL);
        assert!((miss_probability(50.0, f32::NAN) - neutral_p).abs() < 1e-12);
        assert!((miss_probability(50.0, f32::INFINITY) - neutral_p).abs() < 1e-12);

        let mut broken = EvaluatorTraits::default();
        broken.risk_management = f32::NAN;
        let mut misses = 0;
        for i in 0..80 {
            let (mut belief, truth, traits) = setup(&format!("nan-{i}"));
            scout_medical_to(&mut belief, &traits, REVEAL_PROBABLE_AT);
            let mut neutral = belief.clone();
            let outcome = reveal_medical(4, &mut belief, &truth, &broken);
            assert_eq!(outcome, reveal_medical(4, &mut neutral, &truth, &traits));
            if outcome == RevealOutcome::Missed {
                misses += 1;
            }
        }
        assert!(misses > 0, "probable band never missed");
    }

    #[test]
    fn low_clarity_reveals_nothing() {
        let (mut belief, truth, traits) = setup("low");
        assert_eq!(reveal_medical(1, &mut belief, &truth, &traits), RevealOutcome::Hidden);
        assert_eq!(reveal_character(1, &mut belief, &truth, &traits), RevealOutcome::Hidden);
        assert!(belief.revealed().medical_tier.is_none());
    }

    #[test]
    fn certain_band_always_reveals_tier_only() {
        let (mut belief, truth, traits) = setup("certain");
        scout_medical_to(&mut belief, &traits, REVEAL_CERTAIN_AT);
        assert!(belief.clarity().medical < REVEAL_SECONDARY_AT);
        assert_eq!(
            reveal_medical(1, &mut belief, &truth, &traits),
            RevealOutcome::TierRevealed
        );
        assert_eq!(belief.revealed().medical_tier, Some(truth.medical.tier));
        assert!(belief.revealed().degenerative.is_none());
        assert_eq!(
            reveal_medical(1, &mut belief, &truth, &traits),
            RevealOutcome::AlreadyKnown
        );
    }

    #[test]
    fn secondary_medical_appears_only_at_high_clarity() {
        let (mut belief, truth, traits) = setup("secondary");
        scout_medical_to(&mut belief, &traits, 60.0);
        let _ = reveal_medical(1, &mut belief, &truth, &traits);
        assert!(belief.revealed().degenerative.is_none());
        assert!(belief.revealed().recurrence01.is_none());

        scout_medical_to(&mut belief, &traits, REVEAL_SECONDARY_AT);
        assert_eq!(
            reveal_medical(1, &mut belief, &truth, &traits),
            RevealOutcome::SecondaryRevealed
        );
        assert_eq!(belief.revealed().degenerative, Some(truth.medical.degenerative));
        assert_eq!(belief.revealed().recurrence01, Some(truth.medical.recurrence01));
        assert_eq!(belief.revealed().medical_tier, Some(truth.medical.tier));
    }

    #[test]
    fn probable_band_rolls_are_fresh_and_eventually_hit() {
        let (mut belief, truth, traits) = setup("probable");
        scout_medical_to(&mut belief, &traits, REVEAL_PROBABLE_AT);
        assert!(belief.clarity().medical < REVEAL_CERTAIN_AT);
        let mut hit = false;
        for _ in 0..40 {
            match reveal_medical(8, &mut belief, &truth, &traits) {
                RevealOutcome::TierRevealed => hit = true,
                RevealOutcome::AlreadyKnown => assert!(hit),
                RevealOutcome::Missed => assert!(!hit),
                other => panic!("unexpected outcome {other:?}"),
            }
        }
        assert!(hit);
        assert_eq!(belief.revealed().medical_tier, Some(truth.medical.tier));
    }

    #[test]
    fn reveal_rolls_replay_identically() {
        let (mut a, truth, traits) = setup("replay");
        scout_medical_to(&mut a, &traits, REVEAL_PROBABLE_AT);
        let mut b = a.clone();
        let run_a: Vec<_> = (0..5).map(|_| reveal_medical(21, &mut a, &truth, &traits)).collect();
        let run_b: Vec<_> = (0..5).map(|_| reveal_medical(21, &mut b, &truth, &traits)).collect();
        assert_eq!(run_a, run_b);
        assert_eq!(a, b);
    }

    #[test]
    fn character_secondary_discloses_leadership() {
        let (mut belief, truth, traits) = setup("character");
        while belief.clarity().character < REVEAL_SECONDARY_AT {
            belief.begin_window();
            let mut budget = compute_window_budget(ScoutingWindow::Combine, 100.0, 0);
            apply_scouting_action(&mut belief, &mut budget, ScoutingAction::BackgroundCheck, &traits)
                .unwrap();
        }
        assert_eq!(
            reveal_character(2, &mut belief, &truth, &traits),
            RevealOutcome::SecondaryRevealed
        );
        assert_eq!(belief.revealed().leadership, Some(truth.character.leadership));
        assert_eq!(belief.revealed().character_tier, Some(truth.character.tier));
    }
}
