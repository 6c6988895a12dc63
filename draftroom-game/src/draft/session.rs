use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::hash::Hasher;
use thiserror::Error;
use twox_hash::XxHash64;

use super::value::{candidate_value, need_index, noise_sigma};
use super::{DraftError, DraftOrderTable, DraftSelection, DraftSlot};
use crate::constants::{DOMAIN_DRAFT_NOISE, DOMAIN_DRAFT_TIEBREAK, LOG_TARGET_DRAFT};
use crate::evaluator::OrgId;
use crate::numbers::clamp_f64_to_f32;
use crate::personnel::{PersonnelLookup, resolve_traits};
use crate::position::PositionBucket;
use crate::prospect::{Prospect, ProspectCatalog, ProspectId};
use crate::rng::RollKey;

/// Lifecycle of a draft session. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DraftPhase {
    NotStarted,
    InProgress,
    Complete,
}

/// Why [`DraftSession::advance_until_user_slot`] returned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AdvanceStop {
    /// The slot at the cursor belongs to the user team.
    UserSlot { slot: DraftSlot },
    Complete,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvanceReport {
    pub picks: Vec<DraftSelection>,
    pub stop: AdvanceStop,
}

/// Saved session state that contradicts itself.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionStateError {
    #[error("cursor {cursor} is past the last of {slots} slots")]
    CursorOutOfRange { cursor: usize, slots: usize },
    #[error("complete flag is {complete} but the cursor is at {cursor} of {slots}")]
    CompletionMismatch {
        complete: bool,
        cursor: usize,
        slots: usize,
    },
    #[error("{selections} selections and {forfeited} forfeits do not account for cursor {cursor}")]
    LedgerMismatch {
        selections: usize,
        forfeited: usize,
        cursor: usize,
    },
    #[error("taken set does not match the selection ledger")]
    TakenMismatch,
}

#[derive(Debug, Clone, Deserialize)]
struct RawDraftSession {
    seed: u64,
    season: u16,
    user_team: Option<OrgId>,
    slots: Vec<DraftSlot>,
    cursor: usize,
    selections: Vec<DraftSelection>,
    pool: Vec<Prospect>,
    taken: BTreeSet<ProspectId>,
    drafted_by_bucket: BTreeMap<OrgId, BTreeMap<PositionBucket, u16>>,
    #[serde(default)]
    started: bool,
    complete: bool,
    forfeited: usize,
}

/// One draft run: slots, cursor, the remaining pool, and the append-only
/// selection ledger. Deserialization rejects states no session could reach.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawDraftSession")]
pub struct DraftSession {
    seed: u64,
    season: u16,
    user_team: Option<OrgId>,
    slots: Vec<DraftSlot>,
    cursor: usize,
    selections: Vec<DraftSelection>,
    pool: Vec<Prospect>,
    taken: BTreeSet<ProspectId>,
    drafted_by_bucket: BTreeMap<OrgId, BTreeMap<PositionBucket, u16>>,
    started: bool,
    complete: bool,
    forfeited: usize,
}

impl TryFrom<RawDraftSession> for DraftSession {
    type Error = SessionStateError;

    fn try_from(raw: RawDraftSession) -> Result<Self, Self::Error> {
        let slots = raw.slots.len();
        if raw.cursor > slots {
            return Err(SessionStateError::CursorOutOfRange {
                cursor: raw.cursor,
                slots,
            });
        }
        if raw.complete != (raw.cursor == slots) {
            return Err(SessionStateError::CompletionMismatch {
                complete: raw.complete,
                cursor: raw.cursor,
                slots,
            });
        }
        if raw.selections.len() + raw.forfeited != raw.cursor {
            return Err(SessionStateError::LedgerMismatch {
                selections: raw.selections.len(),
                forfeited: raw.forfeited,
                cursor: raw.cursor,
            });
        }
        let picked: BTreeSet<&ProspectId> = raw.selections.iter().map(|s| &s.prospect).collect();
        if picked.len() != raw.selections.len()
            || picked.len() != raw.taken.len()
            || !raw.taken.iter().all(|id| picked.contains(id))
            || raw.pool.iter().any(|p| raw.taken.contains(&p.id))
        {
            return Err(SessionStateError::TakenMismatch);
        }
        Ok(Self {
            seed: raw.seed,
            season: raw.season,
            user_team: raw.user_team,
            slots: raw.slots,
            cursor: raw.cursor,
            started: raw.started || raw.cursor > 0,
            selections: raw.selections,
            pool: raw.pool,
            taken: raw.taken,
            drafted_by_bucket: raw.drafted_by_bucket,
            complete: raw.complete,
            forfeited: raw.forfeited,
        })
    }
}

struct Candidate {
    index: usize,
    score: f32,
    tiebreak: f64,
}

impl DraftSession {
    /// Open a session for `table` over the prospects in `catalog`. Duplicate
    /// catalog ids keep their first entry.
    #[must_use]
    pub fn new(
        seed: u64,
        table: &DraftOrderTable,
        catalog: &ProspectCatalog,
        user_team: Option<OrgId>,
    ) -> Self {
        let mut seen = BTreeSet::new();
        let pool: Vec<Prospect> = catalog
            .by_rank()
            .into_iter()
            .filter(|p| seen.insert(p.id.clone()))
            .cloned()
            .collect();
        Self {
            seed,
            season: table.season(),
            user_team,
            slots: table.generate_slots(),
            cursor: 0,
            selections: Vec::new(),
            pool,
            taken: BTreeSet::new(),
            drafted_by_bucket: BTreeMap::new(),
            started: false,
            complete: false,
            forfeited: 0,
        }
    }

    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    #[must_use]
    pub const fn season(&self) -> u16 {
        self.season
    }

    #[must_use]
    pub const fn user_team(&self) -> Option<&OrgId> {
        self.user_team.as_ref()
    }

    #[must_use]
    pub fn slots(&self) -> &[DraftSlot] {
        &self.slots
    }

    #[must_use]
    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    /// The slot on the clock, or `None` once the draft is over.
    #[must_use]
    pub fn current_slot(&self) -> Option<&DraftSlot> {
        if self.complete {
            return None;
        }
        self.slots.get(self.cursor)
    }

    #[must_use]
    pub fn selections(&self) -> &[DraftSelection] {
        &self.selections
    }

    /// Prospects still on the board, best rank first.
    #[must_use]
    pub fn available(&self) -> &[Prospect] {
        &self.pool
    }

    #[must_use]
    pub fn is_taken(&self, id: &ProspectId) -> bool {
        self.taken.contains(id)
    }

    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.complete
    }

    /// Slots skipped because the pool ran dry.
    #[must_use]
    pub const fn forfeited(&self) -> usize {
        self.forfeited
    }

    #[must_use]
    pub fn phase(&self) -> DraftPhase {
        if self.complete {
            DraftPhase::Complete
        } else if !self.started {
            DraftPhase::NotStarted
        } else {
            DraftPhase::InProgress
        }
    }

    /// Players `team` has taken in `bucket` during this session.
    #[must_use]
    pub fn drafted_count(&self, team: &OrgId, bucket: PositionBucket) -> u16 {
        self.drafted_by_bucket
            .get(team)
            .and_then(|counts| counts.get(&bucket))
            .copied()
            .unwrap_or(0)
    }

    /// Selections grouped by team, in pick order.
    #[must_use]
    pub fn picks_by_team(&self) -> BTreeMap<OrgId, Vec<&DraftSelection>> {
        let mut out: BTreeMap<OrgId, Vec<&DraftSelection>> = BTreeMap::new();
        for selection in &self.selections {
            out.entry(selection.slot.team.clone())
                .or_default()
                .push(selection);
        }
        out
    }

    fn is_user_slot(&self, slot: &DraftSlot) -> bool {
        self.user_team.as_ref() == Some(&slot.team)
    }

    /// Resolve CPU picks until the user team is on the clock or the draft
    /// ends. Running out of prospects forfeits every remaining slot.
    pub fn advance_until_user_slot<P: PersonnelLookup + ?Sized>(
        &mut self,
        personnel: &P,
    ) -> AdvanceReport {
        self.started = true;
        let mut picks = Vec::new();
        loop {
            if self.complete {
                break;
            }
            if self.cursor >= self.slots.len() {
                self.complete = true;
                break;
            }
            if self.pool.is_empty() {
                self.forfeit_remaining();
                break;
            }
            let slot = self.slots[self.cursor].clone();
            if self.is_user_slot(&slot) {
                return AdvanceReport {
                    picks,
                    stop: AdvanceStop::UserSlot { slot },
                };
            }
            if let Some(selection) = self.resolve_cpu_pick(slot, personnel) {
                picks.push(selection);
            }
        }
        AdvanceReport {
            picks,
            stop: AdvanceStop::Complete,
        }
    }

    /// Resolve the slot on the clock with CPU valuation, whoever owns it.
    /// Used to auto-draft for an absent user.
    pub fn auto_pick<P: PersonnelLookup + ?Sized>(&mut self, personnel: &P) -> Option<DraftSelection> {
        let slot = self.current_slot()?.clone();
        self.started = true;
        if self.pool.is_empty() {
            self.forfeit_remaining();
            return None;
        }
        self.resolve_cpu_pick(slot, personnel)
    }

    /// Run the whole draft, auto-drafting user slots as well.
    pub fn run_to_completion<P: PersonnelLookup + ?Sized>(&mut self, personnel: &P) -> usize {
        let before = self.selections.len();
        while !self.complete {
            let report = self.advance_until_user_slot(personnel);
            if matches!(report.stop, AdvanceStop::UserSlot { .. }) {
                let _ = self.auto_pick(personnel);
            }
        }
        self.selections.len() - before
    }

    /// Record a manual pick for the slot on the clock. The selection is
    /// flagged `by_user` only when the slot belongs to the user team.
    ///
    /// # Errors
    ///
    /// Returns [`DraftError::SessionComplete`] once every slot is resolved,
    /// [`DraftError::ProspectUnavailable`] for a prospect already taken, and
    /// [`DraftError::UnknownProspect`] for ids outside the class. The session
    /// is unchanged on error.
    pub fn apply_selection(&mut self, prospect: &ProspectId) -> Result<DraftSelection, DraftError> {
        let Some(slot) = self.current_slot().cloned() else {
            return Err(DraftError::SessionComplete);
        };
        let Some(index) = self.pool.iter().position(|p| &p.id == prospect) else {
            if self.taken.contains(prospect) {
                return Err(DraftError::ProspectUnavailable(prospect.clone()));
            }
            return Err(DraftError::UnknownProspect(prospect.clone()));
        };
        self.started = true;
        let by_user = self.is_user_slot(&slot);
        Ok(self.commit(slot, index, by_user))
    }

    /// Deterministic fingerprint of the resolved draft. Identical seeds and
    /// inputs produce identical digests.
    #[must_use]
    pub fn digest(&self) -> u64 {
        let mut hasher = XxHash64::with_seed(0);
        hasher.write(&self.seed.to_le_bytes());
        for selection in &self.selections {
            hasher.write(&selection.slot.overall.to_le_bytes());
            hasher.write(selection.slot.team.as_str().as_bytes());
            hasher.write_u8(0xff);
            hasher.write(selection.prospect.as_str().as_bytes());
            hasher.write_u8(0xff);
            hasher.write_u8(u8::from(selection.by_user));
        }
        for id in &self.taken {
            hasher.write(id.as_str().as_bytes());
            hasher.write_u8(0xfe);
        }
        hasher.write_u64(u64::try_from(self.forfeited).unwrap_or(u64::MAX));
        hasher.finish()
    }

    fn forfeit_remaining(&mut self) {
        let remaining = self.slots.len().saturating_sub(self.cursor);
        if remaining > 0 {
            log::debug!(
                target: LOG_TARGET_DRAFT,
                "prospect pool exhausted at overall {}, forfeiting {remaining} slot(s)",
                self.cursor + 1
            );
        }
        self.forfeited += remaining;
        self.cursor = self.slots.len();
        self.complete = true;
    }

    fn resolve_cpu_pick<P: PersonnelLookup + ?Sized>(
        &mut self,
        slot: DraftSlot,
        personnel: &P,
    ) -> Option<DraftSelection> {
        let index = self.best_candidate(&slot, personnel)?;
        Some(self.commit(slot, index, false))
    }

    fn best_candidate<P: PersonnelLookup + ?Sized>(
        &self,
        slot: &DraftSlot,
        personnel: &P,
    ) -> Option<usize> {
        let team = &slot.team;
        let traits = resolve_traits(personnel, team);
        let sigma = noise_sigma(&traits);

        let mut best: Option<Candidate> = None;
        for (index, prospect) in self.pool.iter().enumerate() {
            let bucket = prospect.position.bucket();
            let have = personnel
                .roster_count(team, bucket)
                .saturating_add(self.drafted_count(team, bucket));
            let need = need_index(bucket, have);
            let z = RollKey::new(self.seed, DOMAIN_DRAFT_NOISE)
                .with(team.as_str())
                .with(prospect.id.as_str())
                .standard_normal();
            let noise = clamp_f64_to_f32(z) * sigma;
            let belief = personnel.scouting_belief(team, &prospect.id);
            let value = candidate_value(&traits, prospect, need, noise, belief);
            let candidate = Candidate {
                index,
                score: value.score,
                tiebreak: RollKey::new(self.seed, DOMAIN_DRAFT_TIEBREAK)
                    .with_index(u64::from(slot.overall))
                    .with(prospect.id.as_str())
                    .unit(),
            };
            let replace = best
                .as_ref()
                .is_none_or(|current| self.outranks(&candidate, current) == Ordering::Greater);
            if replace {
                best = Some(candidate);
            }
        }
        best.map(|c| c.index)
    }

    /// Score first, then the keyed tiebreak draw, then the lower prospect id.
    fn outranks(&self, a: &Candidate, b: &Candidate) -> Ordering {
        a.score
            .total_cmp(&b.score)
            .then_with(|| a.tiebreak.total_cmp(&b.tiebreak))
            .then_with(|| self.pool[b.index].id.cmp(&self.pool[a.index].id))
    }

    fn commit(&mut self, slot: DraftSlot, index: usize, by_user: bool) -> DraftSelection {
        let prospect = self.pool.remove(index);
        let bucket = prospect.position.bucket();
        let counts = self
            .drafted_by_bucket
            .entry(slot.team.clone())
            .or_default()
            .entry(bucket)
            .or_insert(0);
        *counts = counts.saturating_add(1);
        self.taken.insert(prospect.id.clone());

        let selection = DraftSelection {
            slot,
            rank: prospect.clamped_rank(),
            position: prospect.position,
            name: prospect.name,
            prospect: prospect.id,
            by_user,
        };
        log::trace!(
            target: LOG_TARGET_DRAFT,
            "#{} {} selects {} ({}, rank {})",
            selection.slot.overall,
            selection.slot.team,
            selection.name,
            selection.position,
            selection.rank
        );
        self.selections.push(selection.clone());
        self.cursor += 1;
        if self.cursor >= self.slots.len() {
            self.complete = true;
        }
        selection
    }
}
