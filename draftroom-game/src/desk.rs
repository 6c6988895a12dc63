//! Scouting desk: one organization's budget, belief board and action log
//! across the windows of a scouting season.
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

use crate::actions::{ActionOutcome, ScoutingAction, ScoutingError, apply_scouting_action};
use crate::belief::{ScoutBeliefProfile, TightenOutcome, init_belief_profile, tighten_band};
use crate::budget::{ScoutingBudget, ScoutingWindow};
use crate::constants::LOG_TARGET_SCOUTING;
use crate::evaluator::{EvaluatorTraits, OrgId};
use crate::prospect::{Prospect, ProspectCatalog, ProspectId, TrueProspectProfile};
use crate::reveal::{RevealOutcome, reveal_character, reveal_medical};

/// A draft class: the public catalog plus the hidden truth behind each entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftClass {
    class_seed: u64,
    catalog: ProspectCatalog,
    truths: BTreeMap<ProspectId, TrueProspectProfile>,
}

impl DraftClass {
    /// Generate ground truth for every catalog entry from `class_seed`.
    #[must_use]
    pub fn new(class_seed: u64, catalog: ProspectCatalog) -> Self {
        let truths = catalog
            .iter()
            .map(|p| (p.id.clone(), TrueProspectProfile::generate(class_seed, p)))
            .collect();
        Self {
            class_seed,
            catalog,
            truths,
        }
    }

    #[must_use]
    pub const fn class_seed(&self) -> u64 {
        self.class_seed
    }

    #[must_use]
    pub const fn catalog(&self) -> &ProspectCatalog {
        &self.catalog
    }

    #[must_use]
    pub fn prospect(&self, id: &ProspectId) -> Option<&Prospect> {
        self.catalog.get(id)
    }

    #[must_use]
    pub fn truth(&self, id: &ProspectId) -> Option<&TrueProspectProfile> {
        self.truths.get(id)
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum DeskError {
    #[error("no scouting window is open")]
    NoOpenWindow,
    #[error("window {0:?} is still open")]
    WindowStillOpen(ScoutingWindow),
    #[error("window {requested:?} cannot follow {last:?}")]
    WindowOutOfOrder {
        last: ScoutingWindow,
        requested: ScoutingWindow,
    },
    #[error("prospect {0} is not in this draft class")]
    UnknownProspect(ProspectId),
    #[error(transparent)]
    Scouting(#[from] ScoutingError),
}

impl DeskError {
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::NoOpenWindow => "NO_OPEN_WINDOW",
            Self::WindowStillOpen(_) => "WINDOW_STILL_OPEN",
            Self::WindowOutOfOrder { .. } => "WINDOW_OUT_OF_ORDER",
            Self::UnknownProspect(_) => "UNKNOWN_PROSPECT",
            Self::Scouting(err) => err.code(),
        }
    }
}

/// Replayable record of everything a desk did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DeskEntry {
    Begin { window: ScoutingWindow },
    Scout { prospect: ProspectId, action: ScoutingAction },
    Close,
}

/// What closing a window did to one prospect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProspectWindowReport {
    pub prospect: ProspectId,
    pub tighten: TightenOutcome,
    pub medical: RevealOutcome,
    pub character: RevealOutcome,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowReport {
    pub window: ScoutingWindow,
    pub budget: ScoutingBudget,
    pub prospects: Vec<ProspectWindowReport>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoutingDesk {
    org: OrgId,
    seed: u64,
    traits: EvaluatorTraits,
    budget: Option<ScoutingBudget>,
    open: bool,
    board: BTreeMap<ProspectId, ScoutBeliefProfile>,
    touched: BTreeSet<ProspectId>,
    log: Vec<DeskEntry>,
}

impl ScoutingDesk {
    #[must_use]
    pub fn new(org: OrgId, seed: u64, traits: EvaluatorTraits) -> Self {
        Self {
            org,
            seed,
            traits: traits.sanitized(),
            budget: None,
            open: false,
            board: BTreeMap::new(),
            touched: BTreeSet::new(),
            log: Vec::new(),
        }
    }

    /// Rebuild a desk by re-running a recorded log. Keyed randomness makes
    /// the result identical to the desk that produced the log.
    ///
    /// # Errors
    ///
    /// Fails on the first entry the original desk would also have rejected.
    pub fn replay(
        org: OrgId,
        seed: u64,
        traits: EvaluatorTraits,
        class: &DraftClass,
        log: &[DeskEntry],
    ) -> Result<Self, DeskError> {
        let mut desk = Self::new(org, seed, traits);
        for entry in log {
            match entry {
                DeskEntry::Begin { window } => {
                    desk.begin_window(*window)?;
                }
                DeskEntry::Scout { prospect, action } => {
                    desk.scout(class, prospect, *action)?;
                }
                DeskEntry::Close => {
                    desk.close_window(class)?;
                }
            }
        }
        Ok(desk)
    }

    #[must_use]
    pub const fn org(&self) -> &OrgId {
        &self.org
    }

    #[must_use]
    pub const fn traits(&self) -> &EvaluatorTraits {
        &self.traits
    }

    /// Budget of the open window, or of the last closed one.
    #[must_use]
    pub const fn budget(&self) -> Option<&ScoutingBudget> {
        self.budget.as_ref()
    }

    #[must_use]
    pub fn open_window(&self) -> Option<ScoutingWindow> {
        if self.open {
            self.budget.map(|b| b.window())
        } else {
            None
        }
    }

    #[must_use]
    pub fn log(&self) -> &[DeskEntry] {
        &self.log
    }

    #[must_use]
    pub fn belief(&self, id: &ProspectId) -> Option<&ScoutBeliefProfile> {
        self.board.get(id)
    }

    /// Scouted prospects, highest estimated grade first.
    #[must_use]
    pub fn board(&self) -> Vec<&ScoutBeliefProfile> {
        let mut ranked: Vec<&ScoutBeliefProfile> = self.board.values().collect();
        ranked.sort_by(|a, b| {
            b.est_center()
                .total_cmp(&a.est_center())
                .then_with(|| a.prospect().cmp(b.prospect()))
        });
        ranked
    }

    /// Hand the board over to the draft engine's personnel lookup.
    #[must_use]
    pub fn into_board(self) -> BTreeMap<ProspectId, ScoutBeliefProfile> {
        self.board
    }

    /// Open `window`, carrying half of the previous window's unspent points.
    ///
    /// # Errors
    ///
    /// Rejects a window while another is open, or one that does not come
    /// after the last window in the season calendar.
    pub fn begin_window(&mut self, window: ScoutingWindow) -> Result<&ScoutingBudget, DeskError> {
        if let Some(current) = self.open_window() {
            return Err(DeskError::WindowStillOpen(current));
        }
        if let Some(last) = self.budget.map(|b| b.window())
            && window <= last
        {
            return Err(DeskError::WindowOutOfOrder {
                last,
                requested: window,
            });
        }
        let budget = ScoutingBudget::for_window(window, &self.traits, self.budget.as_ref());
        for belief in self.board.values_mut() {
            belief.begin_window();
        }
        self.touched.clear();
        self.open = true;
        self.log.push(DeskEntry::Begin { window });
        log::debug!(
            target: LOG_TARGET_SCOUTING,
            "{} opens {window:?} with {} points ({} carried)",
            self.org,
            budget.total(),
            budget.carry_in()
        );
        Ok(&*self.budget.insert(budget))
    }

    /// Spend on one prospect. The first touch creates the organization's
    /// opening belief.
    ///
    /// # Errors
    ///
    /// [`DeskError::NoOpenWindow`] outside a window, [`DeskError::UnknownProspect`]
    /// for ids outside the class, and any [`ScoutingError`] from the action.
    /// Nothing changes on error.
    pub fn scout(
        &mut self,
        class: &DraftClass,
        prospect: &ProspectId,
        action: ScoutingAction,
    ) -> Result<ActionOutcome, DeskError> {
        if !self.open {
            return Err(DeskError::NoOpenWindow);
        }
        let Some(budget) = self.budget.as_mut() else {
            return Err(DeskError::NoOpenWindow);
        };
        let (Some(entry), Some(truth)) = (class.prospect(prospect), class.truth(prospect)) else {
            return Err(DeskError::UnknownProspect(prospect.clone()));
        };

        let outcome = if let Some(belief) = self.board.get_mut(prospect) {
            apply_scouting_action(belief, budget, action, &self.traits)?
        } else {
            let mut belief = init_belief_profile(self.seed, &self.org, entry, truth, &self.traits);
            belief.begin_window();
            let outcome = apply_scouting_action(&mut belief, budget, action, &self.traits)?;
            self.board.insert(prospect.clone(), belief);
            outcome
        };
        self.touched.insert(prospect.clone());
        self.log.push(DeskEntry::Scout {
            prospect: prospect.clone(),
            action,
        });
        Ok(outcome)
    }

    /// Close the open window: tighten every prospect worked this window and
    /// run both reveal checks on it.
    ///
    /// # Errors
    ///
    /// [`DeskError::NoOpenWindow`] when nothing is open.
    pub fn close_window(&mut self, class: &DraftClass) -> Result<WindowReport, DeskError> {
        let (true, Some(budget)) = (self.open, self.budget) else {
            return Err(DeskError::NoOpenWindow);
        };
        let mut prospects = Vec::with_capacity(self.touched.len());
        for id in &self.touched {
            let (Some(belief), Some(truth)) = (self.board.get_mut(id), class.truth(id)) else {
                continue;
            };
            let tighten = tighten_band(self.seed, belief, truth, &self.traits);
            let medical = reveal_medical(self.seed, belief, truth, &self.traits);
            let character = reveal_character(self.seed, belief, truth, &self.traits);
            prospects.push(ProspectWindowReport {
                prospect: id.clone(),
                tighten,
                medical,
                character,
            });
        }
        self.touched.clear();
        self.open = false;
        self.log.push(DeskEntry::Close);
        log::debug!(
            target: LOG_TARGET_SCOUTING,
            "{} closes {:?}: {} prospect(s) worked, {} point(s) unspent",
            self.org,
            budget.window(),
            prospects.len(),
            budget.remaining()
        );
        Ok(WindowReport {
            window: budget.window(),
            budget,
            prospects,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::Position;
    use crate::prospect::{Measurables, SignalSet};

    fn class() -> DraftClass {
        let catalog = ProspectCatalog(
            [(1, Position::Qb), (2, Position::Edge), (3, Position::Cb)]
                .into_iter()
                .map(|(rank, position)| Prospect {
                    id: ProspectId(format!("d{rank}")),
                    name: format!("Desk {rank}"),
                    position,
                    rank,
                    measurables: Measurables::default(),
                    signals: SignalSet::new(),
                })
                .collect(),
        );
        DraftClass::new(77, catalog)
    }

    fn desk() -> ScoutingDesk {
        ScoutingDesk::new(OrgId::new("chi"), 77, EvaluatorTraits::default())
    }

    #[test]
    fn scouting_requires_an_open_window() {
        let class = class();
        let mut desk = desk();
        let id = ProspectId::new("d1");
        assert_eq!(
            desk.scout(&class, &id, ScoutingAction::FilmQuick),
            Err(DeskError::NoOpenWindow)
        );
        desk.begin_window(ScoutingWindow::Fall).unwrap();
        assert!(desk.scout(&class, &id, ScoutingAction::FilmQuick).is_ok());
        assert_eq!(
            desk.begin_window(ScoutingWindow::AllStar).unwrap_err(),
            DeskError::WindowStillOpen(ScoutingWindow::Fall)
        );
    }

    #[test]
    fn unknown_prospect_is_rejected_without_charge() {
        let class = class();
        let mut desk = desk();
        desk.begin_window(ScoutingWindow::Fall).unwrap();
        let ghost = ProspectId::new("ghost");
        let err = desk.scout(&class, &ghost, ScoutingAction::Interview).unwrap_err();
        assert_eq!(err.code(), "UNKNOWN_PROSPECT");
        assert_eq!(desk.budget().unwrap().spent(), 0);
        assert!(desk.belief(&ghost).is_none());
    }

    #[test]
    fn failed_first_touch_leaves_no_belief() {
        let class = class();
        let mut desk = desk();
        desk.begin_window(ScoutingWindow::AllStar).unwrap();
        let remaining = desk.budget().unwrap().remaining();
        let id = ProspectId::new("d2");
        while desk.budget().unwrap().remaining() >= ScoutingAction::FilmQuick.cost() {
            let target = ProspectId::new("d1");
            if desk.scout(&class, &target, ScoutingAction::FilmQuick).is_err() {
                break;
            }
        }
        assert!(desk.budget().unwrap().remaining() < remaining);
        let err = desk.scout(&class, &id, ScoutingAction::Top30Visit).unwrap_err();
        assert_eq!(err.code(), "NOT_ENOUGH_BUDGET");
        assert!(desk.belief(&id).is_none());
    }

    #[test]
    fn windows_must_advance_through_the_calendar() {
        let class = class();
        let mut desk = desk();
        desk.begin_window(ScoutingWindow::Combine).unwrap();
        desk.close_window(&class).unwrap();
        assert_eq!(
            desk.begin_window(ScoutingWindow::Fall).unwrap_err(),
            DeskError::WindowOutOfOrder {
                last: ScoutingWindow::Combine,
                requested: ScoutingWindow::Fall,
            }
        );
        assert!(desk.begin_window(ScoutingWindow::PreDraft).is_ok());
    }

    #[test]
    fn unspent_points_carry_into_the_next_window() {
        let class = class();
        let mut desk = desk();
        let fall_total = desk.begin_window(ScoutingWindow::Fall).unwrap().total();
        desk.close_window(&class).unwrap();
        let all_star = *desk.begin_window(ScoutingWindow::AllStar).unwrap();
        // round(15 * 0.5)
        assert_eq!(fall_total, 15);
        assert_eq!(all_star.carry_in(), 8);
    }

    #[test]
    fn closing_tightens_worked_prospects_only() {
        let class = class();
        let mut desk = desk();
        desk.begin_window(ScoutingWindow::Combine).unwrap();
        let id = ProspectId::new("d3");
        desk.scout(&class, &id, ScoutingAction::FilmDeep).unwrap();
        desk.scout(&class, &id, ScoutingAction::MedicalRequest).unwrap();
        let width_before = desk.belief(&id).unwrap().est_width();
        let report = desk.close_window(&class).unwrap();
        assert_eq!(report.prospects.len(), 1);
        assert!(report.prospects[0].tighten.tightened());
        assert!(desk.belief(&id).unwrap().est_width() < width_before);
        assert!(desk.belief(&id).unwrap().is_consistent());
        assert_eq!(desk.close_window(&class).unwrap_err(), DeskError::NoOpenWindow);
    }

    #[test]
    fn replay_rebuilds_identical_state() {
        let class = class();
        let mut desk = desk();
        for window in ScoutingWindow::SEASON {
            desk.begin_window(window).unwrap();
            for id in ["d1", "d2", "d3"] {
                let _ = desk.scout(&class, &ProspectId::new(id), ScoutingAction::Interview);
                let _ = desk.scout(&class, &ProspectId::new(id), ScoutingAction::MedicalRequest);
            }
            desk.close_window(&class).unwrap();
        }
        let rebuilt = ScoutingDesk::replay(
            OrgId::new("chi"),
            77,
            EvaluatorTraits::default(),
            &class,
            desk.log(),
        )
        .unwrap();
        assert_eq!(rebuilt, desk);
        let ranked = rebuilt.board();
        assert_eq!(ranked.len(), 3);
        assert!(ranked.windows(2).all(|w| w[0].est_center() >= w[1].est_center()));
    }
}
