//! Evaluator trait profiles: the static scouting philosophy of each organization.
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::constants::{LOG_TARGET_PERSONNEL, TRAIT_MAX, TRAIT_MIN, TRAIT_NEUTRAL};
use crate::numbers::finite_or;

/// Organization (team front office) identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrgId(pub String);

impl OrgId {
    #[must_use]
    pub fn new(value: &str) -> Self {
        Self(value.trim().to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrgId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for OrgId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Dials on a 0–100 scale. Bias dials read as neutral at 50; values above
/// lean toward the named profile, values below lean away from it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluatorTraits {
    pub evaluation_bandwidth: f32,
    pub film_process: f32,
    pub intel_network: f32,
    pub risk_management: f32,
    pub analytics_orientation: f32,
    pub urgency_bias: f32,
    pub aggression: f32,
    pub discipline: f32,
    pub star_bias: f32,
    pub value_bias: f32,
    pub trench_bias: f32,
    pub athleticism_bias: f32,
    pub defense_bias: f32,
}

impl Default for EvaluatorTraits {
    fn default() -> Self {
        Self::uniform(TRAIT_NEUTRAL)
    }
}

impl EvaluatorTraits {
    /// Every dial set to the same value. Handy for fixtures and sweeps.
    #[must_use]
    pub const fn uniform(value: f32) -> Self {
        Self {
            evaluation_bandwidth: value,
            film_process: value,
            intel_network: value,
            risk_management: value,
            analytics_orientation: value,
            urgency_bias: value,
            aggression: value,
            discipline: value,
            star_bias: value,
            value_bias: value,
            trench_bias: value,
            athleticism_bias: value,
            defense_bias: value,
        }
    }

    /// Copy with every dial forced into `[0, 100]`; non-finite values become neutral.
    #[must_use]
    pub fn sanitized(self) -> Self {
        let fix = |v: f32| finite_or(v, TRAIT_NEUTRAL).clamp(TRAIT_MIN, TRAIT_MAX);
        Self {
            evaluation_bandwidth: fix(self.evaluation_bandwidth),
            film_process: fix(self.film_process),
            intel_network: fix(self.intel_network),
            risk_management: fix(self.risk_management),
            analytics_orientation: fix(self.analytics_orientation),
            urgency_bias: fix(self.urgency_bias),
            aggression: fix(self.aggression),
            discipline: fix(self.discipline),
            star_bias: fix(self.star_bias),
            value_bias: fix(self.value_bias),
            trench_bias: fix(self.trench_bias),
            athleticism_bias: fix(self.athleticism_bias),
            defense_bias: fix(self.defense_bias),
        }
    }
}

/// Trait profiles keyed by organization, as loaded from `evaluators.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct EvaluatorDirectory(pub BTreeMap<OrgId, EvaluatorTraits>);

impl EvaluatorDirectory {
    #[must_use]
    pub const fn empty() -> Self {
        Self(BTreeMap::new())
    }

    /// Load evaluator profiles from a JSON object keyed by organization id.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed into trait profiles.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let raw: BTreeMap<OrgId, EvaluatorTraits> = serde_json::from_str(json)?;
        Ok(Self(
            raw.into_iter()
                .map(|(id, traits)| (id, traits.sanitized()))
                .collect(),
        ))
    }

    #[must_use]
    pub fn get(&self, id: &OrgId) -> Option<&EvaluatorTraits> {
        self.0.get(id)
    }

    /// Resolve a profile, falling back to the neutral default for unknown ids.
    #[must_use]
    pub fn resolve(&self, id: &OrgId) -> EvaluatorTraits {
        if let Some(traits) = self.get(id) {
            return traits.sanitized();
        }
        log::debug!(
            target: LOG_TARGET_PERSONNEL,
            "no evaluator profile for '{id}', using default traits"
        );
        EvaluatorTraits::default()
    }

    pub fn insert(&mut self, id: OrgId, traits: EvaluatorTraits) {
        self.0.insert(id, traits.sanitized());
    }

    pub fn iter(&self) -> std::collections::btree_map::Iter<'_, OrgId, EvaluatorTraits> {
        self.0.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(OrgId, EvaluatorTraits)> for EvaluatorDirectory {
    fn from_iter<I: IntoIterator<Item = (OrgId, EvaluatorTraits)>>(iter: I) -> Self {
        let mut dir = Self::empty();
        for (id, traits) in iter {
            dir.insert(id, traits);
        }
        dir
    }
}

impl<'a> IntoIterator for &'a EvaluatorDirectory {
    type Item = (&'a OrgId, &'a EvaluatorTraits);
    type IntoIter = std::collections::btree_map::Iter<'a, OrgId, EvaluatorTraits>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
