//! Read-only view of league personnel the draft engine consults: evaluator
//! traits, roster depth by bucket, and each team's scouting board.
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::belief::ScoutBeliefProfile;
use crate::constants::LOG_TARGET_PERSONNEL;
use crate::evaluator::{EvaluatorDirectory, EvaluatorTraits, OrgId};
use crate::position::PositionBucket;
use crate::prospect::ProspectId;

/// Narrow lookup interface supplied by the roster/personnel collaborator.
pub trait PersonnelLookup {
    /// Trait profile for a team, if one is known.
    fn evaluator_traits(&self, team: &OrgId) -> Option<EvaluatorTraits>;

    /// Players the team already rosters in `bucket`.
    fn roster_count(&self, team: &OrgId, bucket: PositionBucket) -> u16;

    /// The team's own estimate of a prospect, when it scouted one.
    fn scouting_belief(&self, _team: &OrgId, _prospect: &ProspectId) -> Option<&ScoutBeliefProfile> {
        None
    }
}

/// Traits for `team`, or the neutral profile when the lookup has none.
pub fn resolve_traits<P: PersonnelLookup + ?Sized>(personnel: &P, team: &OrgId) -> EvaluatorTraits {
    personnel.evaluator_traits(team).map_or_else(
        || {
            log::debug!(
                target: LOG_TARGET_PERSONNEL,
                "team '{team}' has no evaluator profile, valuing with defaults"
            );
            EvaluatorTraits::default()
        },
        EvaluatorTraits::sanitized,
    )
}

/// Roster depth keyed by team and bucket, as loaded from `rosters.json`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RosterBook(pub BTreeMap<OrgId, BTreeMap<PositionBucket, u16>>);

impl RosterBook {
    /// Load roster counts from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed into roster counts.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    #[must_use]
    pub fn count(&self, team: &OrgId, bucket: PositionBucket) -> u16 {
        self.0
            .get(team)
            .and_then(|depth| depth.get(&bucket))
            .copied()
            .unwrap_or(0)
    }

    pub fn set(&mut self, team: OrgId, bucket: PositionBucket, count: u16) {
        self.0.entry(team).or_default().insert(bucket, count);
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

/// In-memory personnel source backed by loaded data files.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LeaguePersonnel {
    pub evaluators: EvaluatorDirectory,
    pub rosters: RosterBook,
    #[serde(default)]
    pub boards: BTreeMap<OrgId, BTreeMap<ProspectId, ScoutBeliefProfile>>,
}

impl LeaguePersonnel {
    #[must_use]
    pub fn new(evaluators: EvaluatorDirectory, rosters: RosterBook) -> Self {
        Self {
            evaluators,
            rosters,
            boards: BTreeMap::new(),
        }
    }

    /// Install (or replace) a team's scouting board.
    pub fn set_board(&mut self, team: OrgId, board: BTreeMap<ProspectId, ScoutBeliefProfile>) {
        self.boards.insert(team, board);
    }
}

impl PersonnelLookup for LeaguePersonnel {
    fn evaluator_traits(&self, team: &OrgId) -> Option<EvaluatorTraits> {
        self.evaluators.get(team).copied()
    }

    fn roster_count(&self, team: &OrgId, bucket: PositionBucket) -> u16 {
        self.rosters.count(team, bucket)
    }

    fn scouting_belief(&self, team: &OrgId, prospect: &ProspectId) -> Option<&ScoutBeliefProfile> {
        self.boards.get(team).and_then(|board| board.get(prospect))
    }
}
