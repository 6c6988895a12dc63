//! Draft order table, slots, selections and the draft session state machine.
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

use crate::evaluator::OrgId;
use crate::position::Position;
use crate::prospect::ProspectId;

mod session;
pub mod value;

pub use session::{AdvanceReport, AdvanceStop, DraftPhase, DraftSession, SessionStateError};
pub use value::{CandidateValue, base_value, candidate_value, need_index, noise_sigma};

/// One row of the round/pick ordering table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftOrderEntry {
    pub round: u8,
    pub pick: u8,
    pub team: OrgId,
}

/// Errors raised when a draft order table is malformed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DraftOrderError {
    #[error("draft order for season {season} has no picks")]
    Empty { season: u16 },
    #[error("round and pick numbers start at 1 (got round {round}, pick {pick})")]
    ZeroIndex { round: u8, pick: u8 },
    #[error("round {round} pick {pick} has no team")]
    MissingTeam { round: u8, pick: u8 },
    #[error("round {round} pick {pick} is listed more than once")]
    DuplicatePick { round: u8, pick: u8 },
    #[error("draft order has {count} picks, more than a session can address")]
    TooManyPicks { count: usize },
}

#[derive(Debug, Clone, Deserialize)]
struct RawDraftOrder {
    season: u16,
    picks: Vec<DraftOrderEntry>,
}

/// Validated round/pick ordering for one season. Construction (including
/// deserialization) fails fast on malformed tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawDraftOrder")]
pub struct DraftOrderTable {
    season: u16,
    picks: Vec<DraftOrderEntry>,
}

impl TryFrom<RawDraftOrder> for DraftOrderTable {
    type Error = DraftOrderError;

    fn try_from(raw: RawDraftOrder) -> Result<Self, Self::Error> {
        Self::new(raw.season, raw.picks)
    }
}

impl DraftOrderTable {
    /// Validate and wrap an ordering table.
    ///
    /// # Errors
    ///
    /// Returns a [`DraftOrderError`] for empty tables, zero-based indices,
    /// blank team ids, or duplicate (round, pick) entries.
    pub fn new(season: u16, picks: Vec<DraftOrderEntry>) -> Result<Self, DraftOrderError> {
        if picks.is_empty() {
            return Err(DraftOrderError::Empty { season });
        }
        if u16::try_from(picks.len()).is_err() {
            return Err(DraftOrderError::TooManyPicks { count: picks.len() });
        }
        let mut seen = HashSet::with_capacity(picks.len());
        for entry in &picks {
            let (round, pick) = (entry.round, entry.pick);
            if round == 0 || pick == 0 {
                return Err(DraftOrderError::ZeroIndex { round, pick });
            }
            if entry.team.as_str().trim().is_empty() {
                return Err(DraftOrderError::MissingTeam { round, pick });
            }
            if !seen.insert((round, pick)) {
                return Err(DraftOrderError::DuplicatePick { round, pick });
            }
        }
        Ok(Self { season, picks })
    }

    /// Build a straight order where each round lists teams in pick order.
    ///
    /// # Errors
    ///
    /// Same conditions as [`DraftOrderTable::new`].
    pub fn from_rounds(season: u16, rounds: &[Vec<OrgId>]) -> Result<Self, DraftOrderError> {
        let mut picks = Vec::new();
        for (r, teams) in rounds.iter().enumerate() {
            let round = u8::try_from(r + 1).unwrap_or(u8::MAX);
            for (p, team) in teams.iter().enumerate() {
                picks.push(DraftOrderEntry {
                    round,
                    pick: u8::try_from(p + 1).unwrap_or(u8::MAX),
                    team: team.clone(),
                });
            }
        }
        Self::new(season, picks)
    }

    /// Load and validate an ordering table from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or fails validation.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    #[must_use]
    pub const fn season(&self) -> u16 {
        self.season
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.picks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.picks.is_empty()
    }

    /// Slots sorted by (round, pick) and numbered overall from 1.
    #[must_use]
    pub fn generate_slots(&self) -> Vec<DraftSlot> {
        let mut ordered: Vec<&DraftOrderEntry> = self.picks.iter().collect();
        ordered.sort_by_key(|e| (e.round, e.pick));
        ordered
            .into_iter()
            .zip(1_u16..)
            .map(|(entry, overall)| DraftSlot {
                overall,
                round: entry.round,
                pick_in_round: entry.pick,
                team: entry.team.clone(),
            })
            .collect()
    }

    /// Distinct teams in first-appearance pick order.
    #[must_use]
    pub fn teams(&self) -> Vec<OrgId> {
        let mut out: Vec<OrgId> = Vec::new();
        for slot in self.generate_slots() {
            if !out.contains(&slot.team) {
                out.push(slot.team);
            }
        }
        out
    }
}

/// A position in the draft order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DraftSlot {
    pub overall: u16,
    pub round: u8,
    pub pick_in_round: u8,
    pub team: OrgId,
}

/// A resolved pick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftSelection {
    pub slot: DraftSlot,
    pub prospect: ProspectId,
    pub name: String,
    pub position: Position,
    pub rank: u16,
    pub by_user: bool,
}

/// Rejections for user-submitted picks.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DraftError {
    #[error("draft session is already complete")]
    SessionComplete,
    #[error("prospect {0} is not in the catalog")]
    UnknownProspect(ProspectId),
    #[error("prospect {0} has already been selected or is not eligible")]
    ProspectUnavailable(ProspectId),
}
