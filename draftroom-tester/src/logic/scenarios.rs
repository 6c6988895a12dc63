use draftroom_game::constants::WINDOW_GAIN_CAP;
use draftroom_game::{
    DeskError, DraftClass, DraftSession, LeaguePersonnel, OrgId, ProspectId, ScoutingAction,
    ScoutingDesk, ScoutingWindow, compute_window_budget,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

use super::assets::TesterAssets;

#[derive(Debug, Error)]
pub enum CheckFailure {
    #[error("{what}: expected {expected}, got {actual}")]
    Mismatch {
        what: &'static str,
        expected: String,
        actual: String,
    },
    #[error("invariant violated: {0}")]
    Invariant(String),
    #[error("scouting desk rejected a replayed step: {0}")]
    Desk(#[from] DeskError),
}

fn ensure(condition: bool, message: impl FnOnce() -> String) -> Result<(), CheckFailure> {
    if condition {
        Ok(())
    } else {
        Err(CheckFailure::Invariant(message()))
    }
}

fn expect_eq<T: PartialEq + std::fmt::Debug>(
    what: &'static str,
    expected: &T,
    actual: &T,
) -> Result<(), CheckFailure> {
    if expected == actual {
        Ok(())
    } else {
        Err(CheckFailure::Mismatch {
            what,
            expected: format!("{expected:?}"),
            actual: format!("{actual:?}"),
        })
    }
}

/// First eight bytes of SHA-256 over the value's JSON form.
fn json_digest<T: Serialize>(value: &T) -> u64 {
    let bytes = serde_json::to_vec(value).unwrap_or_default();
    let hash = Sha256::digest(&bytes);
    let mut head = [0_u8; 8];
    head.copy_from_slice(&hash[..8]);
    u64::from_le_bytes(head)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenarioKind {
    DraftDeterminism,
    ScoutingInvariants,
    BudgetEconomy,
    RevealMonotonic,
    FullCycle,
}

impl ScenarioKind {
    pub const ALL: [Self; 5] = [
        Self::DraftDeterminism,
        Self::ScoutingInvariants,
        Self::BudgetEconomy,
        Self::RevealMonotonic,
        Self::FullCycle,
    ];

    pub const fn key(self) -> &'static str {
        match self {
            Self::DraftDeterminism => "draft-determinism",
            Self::ScoutingInvariants => "scouting-invariants",
            Self::BudgetEconomy => "budget-economy",
            Self::RevealMonotonic => "reveal-monotonic",
            Self::FullCycle => "full-cycle",
        }
    }

    pub const fn description(self) -> &'static str {
        match self {
            Self::DraftDeterminism => "CPU-only draft replays identically and fills every slot once",
            Self::ScoutingInvariants => "Random scouting keeps bands, clarity and budgets valid",
            Self::BudgetEconomy => "Window budgets follow the carry-forward formula",
            Self::RevealMonotonic => "Reveals match truth and never regress",
            Self::FullCycle => "League-wide scouting season, replay, then the draft",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.key().eq_ignore_ascii_case(key))
    }

    /// Run one iteration, returning a digest of the run for fingerprinting.
    pub fn run(self, assets: &TesterAssets, seed: u64) -> Result<u64, CheckFailure> {
        match self {
            Self::DraftDeterminism => draft_determinism(assets, seed),
            Self::ScoutingInvariants => scouting_invariants(assets, seed),
            Self::BudgetEconomy => budget_economy(assets, seed),
            Self::RevealMonotonic => reveal_monotonic(assets, seed),
            Self::FullCycle => full_cycle(assets, seed),
        }
    }
}

fn team_for_seed(assets: &TesterAssets, seed: u64) -> OrgId {
    let teams = assets.league().order.teams();
    let idx = usize::try_from(seed % teams.len() as u64).unwrap_or(0);
    teams[idx].clone()
}

fn top_targets(class: &DraftClass, count: usize) -> Vec<ProspectId> {
    class
        .catalog()
        .by_rank()
        .into_iter()
        .take(count)
        .map(|p| p.id.clone())
        .collect()
}

fn check_draft(session: &DraftSession) -> Result<(), CheckFailure> {
    ensure(session.is_complete(), || "draft did not complete".to_string())?;
    expect_eq("cursor", &session.slots().len(), &session.cursor())?;
    expect_eq(
        "resolved slots",
        &session.slots().len(),
        &(session.selections().len() + session.forfeited()),
    )?;
    let unique: BTreeSet<_> = session.selections().iter().map(|s| &s.prospect).collect();
    expect_eq("unique selections", &session.selections().len(), &unique.len())?;
    for (selection, slot) in session.selections().iter().zip(session.slots()) {
        ensure(&selection.slot == slot, || {
            format!("selection at #{} recorded for #{}", slot.overall, selection.slot.overall)
        })?;
    }
    Ok(())
}

fn draft_determinism(assets: &TesterAssets, seed: u64) -> Result<u64, CheckFailure> {
    let league = assets.league();
    let run = || {
        let mut session =
            DraftSession::new(seed, &league.order, league.class.catalog(), None);
        session.run_to_completion(&league.personnel);
        session
    };
    let first = run();
    let second = run();
    check_draft(&first)?;
    expect_eq("draft digest", &first.digest(), &second.digest())?;
    Ok(first.digest())
}

fn scouting_invariants(assets: &TesterAssets, seed: u64) -> Result<u64, CheckFailure> {
    let mut rng = ChaCha20Rng::seed_from_u64(seed);
    let class = assets.class_for(seed);
    let team = team_for_seed(assets, seed);
    let traits = assets.league().personnel.evaluators.resolve(&team);
    let mut desk = ScoutingDesk::new(team, seed, traits);
    let targets = top_targets(&class, 30);
    ensure(!targets.is_empty(), || "prospect catalog is empty".to_string())?;

    for window in ScoutingWindow::SEASON {
        desk.begin_window(window)?;
        for _ in 0..10 {
            let Some(target) = targets.get(rng.gen_range(0..targets.len())) else {
                continue;
            };
            let action = ScoutingAction::ALL[rng.gen_range(0..ScoutingAction::ALL.len())];
            let before = desk.clone();
            if desk.scout(&class, target, action).is_err() {
                ensure(desk == before, || {
                    format!("rejected {action:?} on {target} still changed the desk")
                })?;
            }
            let budget = desk.budget().copied();
            ensure(
                budget.is_some_and(|b| b.total() == b.spent() + b.remaining()),
                || format!("budget ledger out of balance: {budget:?}"),
            )?;
        }
        desk.close_window(&class)?;
        for belief in desk.board() {
            ensure(belief.is_consistent(), || {
                format!("{} belief inconsistent after {window:?}", belief.prospect())
            })?;
            ensure(belief.window_gain() <= WINDOW_GAIN_CAP + 1e-3, || {
                format!("{} gained {} in {window:?}", belief.prospect(), belief.window_gain())
            })?;
        }
    }
    Ok(json_digest(&desk.board()))
}

fn budget_economy(assets: &TesterAssets, seed: u64) -> Result<u64, CheckFailure> {
    let class = assets.class_for(seed);
    let team = team_for_seed(assets, seed);
    let traits = assets.league().personnel.evaluators.resolve(&team);
    let mut desk = ScoutingDesk::new(team, seed, traits);
    let targets = top_targets(&class, 40);
    let mut ledger = Vec::new();
    let mut carry = 0;

    for (round, window) in ScoutingWindow::SEASON.into_iter().enumerate() {
        let budget = *desk.begin_window(window)?;
        let expected = compute_window_budget(window, desk.traits().evaluation_bandwidth, carry);
        expect_eq("window budget", &expected, &budget)?;

        // Alternate between spending down and banking points.
        if round % 2 == 0 {
            for id in &targets {
                if desk.scout(&class, id, ScoutingAction::FilmQuick).is_err()
                    && !desk
                        .budget()
                        .is_some_and(|b| b.can_afford(ScoutingAction::FilmQuick.cost()))
                {
                    break;
                }
            }
        }

        let report = desk.close_window(&class)?;
        let closing = report.budget;
        ensure(closing.total() == closing.spent() + closing.remaining(), || {
            format!("{window:?} ledger out of balance")
        })?;
        carry = closing.remaining();
        ledger.push(closing);
    }
    Ok(json_digest(&ledger))
}

fn reveal_monotonic(assets: &TesterAssets, seed: u64) -> Result<u64, CheckFailure> {
    let class = assets.class_for(seed);
    let team = team_for_seed(assets, seed);
    let traits = assets.league().personnel.evaluators.resolve(&team);
    let mut desk = ScoutingDesk::new(team, seed, traits);
    let targets = top_targets(&class, 4);
    let mut seen = BTreeMap::new();

    for window in ScoutingWindow::SEASON {
        desk.begin_window(window)?;
        for id in &targets {
            let _ = desk.scout(&class, id, ScoutingAction::MedicalRequest);
            let _ = desk.scout(&class, id, ScoutingAction::BackgroundCheck);
        }
        desk.close_window(&class)?;

        for id in &targets {
            let (Some(belief), Some(truth)) = (desk.belief(id), class.truth(id)) else {
                continue;
            };
            let revealed = belief.revealed();
            if let Some(tier) = revealed.medical_tier {
                expect_eq("medical tier", &truth.medical.tier, &tier)?;
            }
            if let Some(tier) = revealed.character_tier {
                expect_eq("character tier", &truth.character.tier, &tier)?;
            }
            let now = (revealed.medical_tier.is_some(), revealed.character_tier.is_some());
            if let Some(before) = seen.insert(id.clone(), now) {
                ensure(now.0 >= before.0 && now.1 >= before.1, || {
                    format!("{id} lost a revealed tier during {window:?}")
                })?;
            }
        }
    }
    Ok(json_digest(&seen))
}

fn full_cycle(assets: &TesterAssets, seed: u64) -> Result<u64, CheckFailure> {
    let class = assets.class_for(seed);
    let league = assets.league();
    let targets = top_targets(&class, 15);
    let mut personnel = LeaguePersonnel::new(
        league.personnel.evaluators.clone(),
        league.personnel.rosters.clone(),
    );
    let mut replayed = personnel.clone();

    for team in league.order.teams() {
        let traits = league.personnel.evaluators.resolve(&team);
        let mut desk = ScoutingDesk::new(team.clone(), seed, traits);
        for window in ScoutingWindow::SEASON {
            desk.begin_window(window)?;
            for (i, id) in targets.iter().enumerate() {
                let action = ScoutingAction::ALL[(i + window as usize) % ScoutingAction::ALL.len()];
                let _ = desk.scout(&class, id, action);
            }
            desk.close_window(&class)?;
        }
        let rebuilt = ScoutingDesk::replay(team.clone(), seed, traits, &class, desk.log())?;
        ensure(rebuilt == desk, || format!("{team} desk replay diverged"))?;
        replayed.set_board(team.clone(), rebuilt.into_board());
        personnel.set_board(team, desk.into_board());
    }

    let draft = |personnel: &LeaguePersonnel| {
        let mut session = DraftSession::new(seed, &league.order, class.catalog(), None);
        session.run_to_completion(personnel);
        session
    };
    let session = draft(&personnel);
    check_draft(&session)?;
    expect_eq("replayed draft digest", &session.digest(), &draft(&replayed).digest())?;
    Ok(session.digest())
}
