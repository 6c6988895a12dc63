//! Prospect catalog records and the hidden ground truth behind them.
use serde::{Deserialize, Deserializer, Serialize};
use smallvec::SmallVec;
use std::fmt;

use crate::constants::{DOMAIN_TRUE_PROFILE, GRADE_MAX, GRADE_MIN, RANK_MAX, RANK_MIN};
use crate::draft::value::base_value;
use crate::numbers::clamp_f64_to_f32;
use crate::position::Position;
use crate::rng::RollKey;

const TRUE_OVR_SPREAD: f64 = 4.0;
const RISK_FLAG_SHIFT: f64 = 0.25;
const FAST_FORTY_SECS: f32 = 4.45;
const EXPLOSIVE_VERTICAL_IN: f32 = 38.0;

/// Prospect identifier, stable for the life of a draft class.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProspectId(pub String);

impl ProspectId {
    #[must_use]
    pub fn new(value: &str) -> Self {
        Self(value.trim().to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProspectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProspectId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Medical grade, ordered from clean to undraftable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MedicalTier {
    Green,
    Yellow,
    Orange,
    Red,
    Black,
}

impl MedicalTier {
    const ORDER: [Self; 5] = [Self::Green, Self::Yellow, Self::Orange, Self::Red, Self::Black];
    const CUMULATIVE: [f64; 4] = [0.55, 0.80, 0.92, 0.98];

    const fn index(self) -> usize {
        match self {
            Self::Green => 0,
            Self::Yellow => 1,
            Self::Orange => 2,
            Self::Red => 3,
            Self::Black => 4,
        }
    }

    #[must_use]
    pub const fn is_red_flag(self) -> bool {
        matches!(self, Self::Red | Self::Black)
    }
}

/// Character grade, ordered from model citizen to off the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CharacterTier {
    Blue,
    Green,
    Yellow,
    Red,
    Black,
}

impl CharacterTier {
    const ORDER: [Self; 5] = [Self::Blue, Self::Green, Self::Yellow, Self::Red, Self::Black];
    const CUMULATIVE: [f64; 4] = [0.45, 0.80, 0.92, 0.98];

    const fn index(self) -> usize {
        match self {
            Self::Blue => 0,
            Self::Green => 1,
            Self::Yellow => 2,
            Self::Red => 3,
            Self::Black => 4,
        }
    }

    #[must_use]
    pub const fn is_red_flag(self) -> bool {
        matches!(self, Self::Red | Self::Black)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LeadershipTag {
    Low,
    Med,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrueMedical {
    pub tier: MedicalTier,
    pub recurrence01: f32,
    pub degenerative: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrueCharacter {
    pub tier: CharacterTier,
    pub volatility01: f32,
    pub leadership: LeadershipTag,
}

/// Hidden ground truth for one prospect. Created once per class and never
/// mutated; every organization's belief is measured against it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrueProspectProfile {
    pub true_ovr: f32,
    pub medical: TrueMedical,
    pub character: TrueCharacter,
}

fn pick_tier<T: Copy>(order: &[T; 5], cumulative: &[f64; 4], draw: f64) -> T {
    let idx = cumulative
        .iter()
        .position(|edge| draw < *edge)
        .unwrap_or(cumulative.len());
    order[idx]
}

impl TrueProspectProfile {
    /// Deterministically generate the hidden profile for a catalog entry.
    #[must_use]
    pub fn generate(class_seed: u64, prospect: &Prospect) -> Self {
        let key = RollKey::new(class_seed, DOMAIN_TRUE_PROFILE).with(prospect.id.as_str());
        let signals = prospect.signals();

        let noise = key.clone().with("ovr").standard_normal() * TRUE_OVR_SPREAD;
        let true_ovr = (base_value(prospect.rank) + clamp_f64_to_f32(noise)).clamp(GRADE_MIN, GRADE_MAX);

        let mut medical_draw = key.clone().with("medical.tier").unit();
        if signals.contains(&ProspectSignal::MedicalRisk) {
            medical_draw = (medical_draw + RISK_FLAG_SHIFT).min(0.999);
        }
        let medical_tier = pick_tier(&MedicalTier::ORDER, &MedicalTier::CUMULATIVE, medical_draw);
        let recurrence_base = [0.03, 0.10, 0.22, 0.40, 0.65][medical_tier.index()];
        let recurrence = recurrence_base + key.clone().with("medical.recurrence").unit() * 0.1;
        let degenerative_odds = [0.01, 0.04, 0.10, 0.25, 0.50][medical_tier.index()];
        let degenerative = key.clone().with("medical.degenerative").unit() < degenerative_odds;

        let mut character_draw = key.clone().with("character.tier").unit();
        if signals.contains(&ProspectSignal::CharacterRisk) {
            character_draw = (character_draw + RISK_FLAG_SHIFT).min(0.999);
        }
        let character_tier =
            pick_tier(&CharacterTier::ORDER, &CharacterTier::CUMULATIVE, character_draw);
        let volatility_base = [0.05, 0.15, 0.30, 0.50, 0.75][character_tier.index()];
        let volatility = volatility_base + key.clone().with("character.volatility").unit() * 0.15;
        let leadership_draw = key.with("character.leadership").unit();
        let leadership = if leadership_draw < 0.25 {
            LeadershipTag::High
        } else if leadership_draw < 0.70 {
            LeadershipTag::Med
        } else {
            LeadershipTag::Low
        };

        Self {
            true_ovr,
            medical: TrueMedical {
                tier: medical_tier,
                recurrence01: clamp_f64_to_f32(recurrence).clamp(0.0, 1.0),
                degenerative,
            },
            character: TrueCharacter {
                tier: character_tier,
                volatility01: clamp_f64_to_f32(volatility).clamp(0.0, 1.0),
                leadership,
            },
        }
    }
}

/// Scouting flags attached to a catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProspectSignal {
    EliteTrait,
    HighCeiling,
    Athletic,
    MedicalRisk,
    CharacterRisk,
}

impl ProspectSignal {
    #[must_use]
    pub const fn is_risk(self) -> bool {
        matches!(self, Self::MedicalRisk | Self::CharacterRisk)
    }
}

/// Signals rarely exceed a handful per prospect; keep them inline.
pub type SignalSet = SmallVec<[ProspectSignal; 4]>;

/// Combine-style measurables. Any may be missing for a given prospect.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Measurables {
    #[serde(default)]
    pub height_in: Option<f32>,
    #[serde(default)]
    pub weight_lb: Option<f32>,
    #[serde(default)]
    pub forty_secs: Option<f32>,
    #[serde(default)]
    pub vertical_in: Option<f32>,
    #[serde(default)]
    pub bench_reps: Option<u16>,
}

impl Measurables {
    #[must_use]
    pub fn is_explosive(&self) -> bool {
        self.forty_secs.is_some_and(|t| t > 0.0 && t < FAST_FORTY_SECS)
            || self.vertical_in.is_some_and(|v| v >= EXPLOSIVE_VERTICAL_IN)
    }
}

fn deserialize_position<'de, D>(deserializer: D) -> Result<Position, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    raw.parse().map_err(serde::de::Error::custom)
}

/// Catalog entry supplied by the data-loading collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prospect {
    pub id: ProspectId,
    pub name: String,
    #[serde(deserialize_with = "deserialize_position")]
    pub position: Position,
    pub rank: u16,
    #[serde(default)]
    pub measurables: Measurables,
    #[serde(default)]
    pub signals: SignalSet,
}

impl Prospect {
    /// Catalog rank forced into the supported range.
    #[must_use]
    pub fn clamped_rank(&self) -> u16 {
        self.rank.clamp(RANK_MIN, RANK_MAX)
    }

    /// Catalog flags plus those implied by measurables, without duplicates.
    #[must_use]
    pub fn signals(&self) -> SignalSet {
        let mut out = SignalSet::new();
        for signal in &self.signals {
            if !out.contains(signal) {
                out.push(*signal);
            }
        }
        if self.measurables.is_explosive() && !out.contains(&ProspectSignal::Athletic) {
            out.push(ProspectSignal::Athletic);
        }
        out
    }
}

/// Ordered prospect list for one draft class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct ProspectCatalog(pub Vec<Prospect>);

impl ProspectCatalog {
    #[must_use]
    pub const fn empty() -> Self {
        Self(Vec::new())
    }

    /// Load the catalog from a JSON array of prospects.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed into prospect records.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    #[must_use]
    pub fn get(&self, id: &ProspectId) -> Option<&Prospect> {
        self.0.iter().find(|p| &p.id == id)
    }

    /// Prospects sorted by rank, then id, for stable iteration.
    #[must_use]
    pub fn by_rank(&self) -> Vec<&Prospect> {
        let mut sorted: Vec<&Prospect> = self.0.iter().collect();
        sorted.sort_by(|a, b| a.clamped_rank().cmp(&b.clamped_rank()).then_with(|| a.id.cmp(&b.id)));
        sorted
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Prospect> {
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

impl<'a> IntoIterator for &'a ProspectCatalog {
    type Item = &'a Prospect;
    type IntoIter = std::slice::Iter<'a, Prospect>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(id: &str, rank: u16) -> Prospect {
        Prospect {
            id: ProspectId::new(id),
            name: format!("Prospect {id}"),
            position: Position::Wr,
            rank,
            measurables: Measurables::default(),
            signals: SignalSet::new(),
        }
    }

    #[test]
    fn catalog_parses_aliases_and_defaults() {
        let json = r#"[
            { "id": "p1", "name": "A. Arm", "position": "qb", "rank": 3 },
            { "id": "p2", "name": "B. Wall", "position": "IOL", "rank": 40,
              "measurables": { "weight_lb": 315.0 },
              "signals": ["athletic", "medical_risk"] }
        ]"#;
        let catalog = ProspectCatalog::from_json(json).unwrap();
        assert_eq!(catalog.len(), 2);
        let wall = catalog.get(&ProspectId::new("p2")).unwrap();
        assert_eq!(wall.position, Position::Og);
        assert!(wall.signals().contains(&ProspectSignal::MedicalRisk));
        assert!(catalog.get(&ProspectId::new("p1")).unwrap().signals().is_empty());
    }

    #[test]
    fn unknown_position_fails_to_load() {
        let json = r#"[{ "id": "p1", "name": "X", "position": "QBX", "rank": 1 }]"#;
        assert!(ProspectCatalog::from_json(json).is_err());
    }

    #[test]
    fn explosive_measurables_imply_athletic_signal_once() {
        let mut prospect = sample("p3", 12);
        prospect.measurables.forty_secs = Some(4.38);
        prospect.signals.push(ProspectSignal::Athletic);
        let signals = prospect.signals();
        assert_eq!(
            signals.iter().filter(|s| **s == ProspectSignal::Athletic).count(),
            1
        );
    }

    #[test]
    fn truth_generation_is_deterministic_and_bounded() {
        for rank in [1_u16, 30, 120, 260, 999] {
            let prospect = sample(&format!("r{rank}"), rank);
            let a = TrueProspectProfile::generate(77, &prospect);
            let b = TrueProspectProfile::generate(77, &prospect);
            assert_eq!(a, b);
            assert!((GRADE_MIN..=GRADE_MAX).contains(&a.true_ovr));
            assert!((0.0..=1.0).contains(&a.medical.recurrence01));
            assert!((0.0..=1.0).contains(&a.character.volatility01));
        }
    }

    #[test]
    fn truth_depends_on_class_seed() {
        let prospect = sample("p9", 20);
        let differs = (0..16_u64).any(|seed| {
            TrueProspectProfile::generate(seed, &prospect)
                != TrueProspectProfile::generate(seed + 100, &prospect)
        });
        assert!(differs);
    }

    #[test]
    fn medical_risk_flag_skews_toward_worse_tiers() {
        let mut flagged_worse = 0;
        for i in 0..200 {
            let clean = sample(&format!("m{i}"), 50);
            let mut risky = clean.clone();
            risky.signals.push(ProspectSignal::MedicalRisk);
            let clean_tier = TrueProspectProfile::generate(5, &clean).medical.tier;
            let risky_tier = TrueProspectProfile::generate(5, &risky).medical.tier;
            assert!(risky_tier >= clean_tier);
            if risky_tier > clean_tier {
                flagged_worse += 1;
            }
        }
        assert!(flagged_worse > 0);
    }

    #[test]
    fn by_rank_orders_and_clamps() {
        let catalog = ProspectCatalog(vec![sample("b", 5), sample("a", 0), sample("c", 2)]);
        let ids: Vec<_> = catalog.by_rank().into_iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c", "b"]);
        assert_eq!(catalog.get(&ProspectId::new("a")).unwrap().clamped_rank(), 1);
    }
}
