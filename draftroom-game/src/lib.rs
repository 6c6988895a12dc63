//! Draftroom Engine
//!
//! Platform-agnostic scouting belief model and deterministic draft selection
//! engine for the Draftroom franchise game. This crate carries no rendering,
//! persistence or UI concerns; collaborators feed it plain serializable records.

pub mod actions;
pub mod belief;
pub mod budget;
pub mod constants;
pub mod desk;
pub mod draft;
pub mod evaluator;
pub mod numbers;
pub mod personnel;
pub mod position;
pub mod prospect;
pub mod reveal;
pub mod rng;

use anyhow::Context;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

// Re-export commonly used types
pub use actions::{
    ActionOutcome, ClarityDeltas, ScoutingAction, ScoutingError, apply_scouting_action,
};
pub use belief::{
    Clarity, IntelDimension, Revealed, ScoutBeliefProfile, StockArrow, TightenOutcome,
    init_belief_profile, tighten_band,
};
pub use budget::{InsufficientBudget, ScoutingBudget, ScoutingWindow, compute_window_budget};
pub use desk::{DeskEntry, DeskError, DraftClass, ScoutingDesk, WindowReport};
pub use draft::{
    AdvanceReport, AdvanceStop, DraftError, DraftOrderEntry, DraftOrderError, DraftOrderTable,
    DraftPhase, DraftSelection, DraftSession, DraftSlot, SessionStateError,
};
pub use evaluator::{EvaluatorDirectory, EvaluatorTraits, OrgId};
pub use personnel::{LeaguePersonnel, PersonnelLookup, RosterBook, resolve_traits};
pub use position::{Position, PositionBucket, UnknownPosition};
pub use prospect::{
    CharacterTier, LeadershipTag, Measurables, MedicalTier, Prospect, ProspectCatalog,
    ProspectId, ProspectSignal, SignalSet, TrueProspectProfile,
};
pub use reveal::{RevealOutcome, reveal_character, reveal_medical};
pub use rng::RollKey;

/// Data file names understood by [`LeagueDataLoader`].
pub const PROSPECTS_CONFIG: &str = "prospects";
pub const DRAFT_ORDER_CONFIG: &str = "draft_order";
pub const EVALUATORS_CONFIG: &str = "evaluators";
pub const ROSTERS_CONFIG: &str = "rosters";

/// Trait for abstracting data loading operations.
/// Platform-specific implementations should provide this.
pub trait LeagueDataLoader {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load and deserialize one named data file.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded or parsed.
    fn load_config<T>(&self, config_name: &str) -> Result<T, Self::Error>
    where
        T: DeserializeOwned;

    /// # Errors
    ///
    /// Returns an error if the prospect catalog cannot be loaded.
    fn load_prospects(&self) -> Result<ProspectCatalog, Self::Error> {
        self.load_config(PROSPECTS_CONFIG)
    }

    /// # Errors
    ///
    /// Returns an error if the draft order cannot be loaded or fails validation.
    fn load_draft_order(&self) -> Result<DraftOrderTable, Self::Error> {
        self.load_config(DRAFT_ORDER_CONFIG)
    }

    /// # Errors
    ///
    /// Returns an error if the evaluator profiles cannot be loaded.
    fn load_evaluators(&self) -> Result<EvaluatorDirectory, Self::Error> {
        self.load_config::<EvaluatorDirectory>(EVALUATORS_CONFIG)
            .map(|dir| dir.iter().map(|(id, t)| (id.clone(), *t)).collect())
    }

    /// # Errors
    ///
    /// Returns an error if roster counts cannot be loaded.
    fn load_rosters(&self) -> Result<RosterBook, Self::Error> {
        self.load_config(ROSTERS_CONFIG)
    }
}

#[derive(Debug, Error)]
pub enum DataError {
    #[error("failed to read {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {name}")]
    Parse {
        name: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Loads `<name>.json` files from a directory on disk.
#[derive(Debug, Clone)]
pub struct AssetDirLoader {
    root: PathBuf,
}

impl AssetDirLoader {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl LeagueDataLoader for AssetDirLoader {
    type Error = DataError;

    fn load_config<T>(&self, config_name: &str) -> Result<T, Self::Error>
    where
        T: DeserializeOwned,
    {
        let path = self.root.join(format!("{config_name}.json"));
        let json = fs::read_to_string(&path).map_err(|source| DataError::Io {
            path: path.clone(),
            source,
        })?;
        serde_json::from_str(&json).map_err(|source| DataError::Parse {
            name: config_name.to_string(),
            source,
        })
    }
}

/// Everything loaded for one draft class: the class itself, the order, and
/// league personnel.
#[derive(Debug, Clone)]
pub struct League {
    pub class: DraftClass,
    pub order: DraftOrderTable,
    pub personnel: LeaguePersonnel,
}

/// Main engine binding a data source to scouting desks and draft sessions.
pub struct DraftroomEngine<L>
where
    L: LeagueDataLoader,
{
    data_loader: L,
}

impl<L> DraftroomEngine<L>
where
    L: LeagueDataLoader,
{
    /// Create a new engine with the provided data loader
    pub const fn new(data_loader: L) -> Self {
        Self { data_loader }
    }

    pub const fn data_loader(&self) -> &L {
        &self.data_loader
    }

    /// Load the whole league for a draft class seeded by `class_seed`.
    ///
    /// # Errors
    ///
    /// Returns an error naming the data file that failed to load.
    pub fn load_league(&self, class_seed: u64) -> anyhow::Result<League> {
        let catalog = self
            .data_loader
            .load_prospects()
            .context("loading prospect catalog")?;
        let order = self
            .data_loader
            .load_draft_order()
            .context("loading draft order")?;
        let evaluators = self
            .data_loader
            .load_evaluators()
            .context("loading evaluator profiles")?;
        let rosters = self
            .data_loader
            .load_rosters()
            .context("loading roster counts")?;
        Ok(League {
            class: DraftClass::new(class_seed, catalog),
            order,
            personnel: LeaguePersonnel::new(evaluators, rosters),
        })
    }

    /// Open a scouting desk for `org`, with its profile from the evaluator data.
    ///
    /// # Errors
    ///
    /// Returns an error if evaluator profiles cannot be loaded.
    pub fn create_desk(&self, org: OrgId, seed: u64) -> Result<ScoutingDesk, L::Error> {
        let evaluators = self.data_loader.load_evaluators()?;
        let traits = evaluators.resolve(&org);
        Ok(ScoutingDesk::new(org, seed, traits))
    }

    /// Construct a draft session over the loaded prospects and order.
    ///
    /// # Errors
    ///
    /// Returns an error if the prospect catalog or draft order cannot be loaded.
    pub fn create_session(
        &self,
        seed: u64,
        user_team: Option<OrgId>,
    ) -> Result<DraftSession, L::Error> {
        let catalog = self.data_loader.load_prospects()?;
        let order = self.data_loader.load_draft_order()?;
        Ok(DraftSession::new(seed, &order, &catalog, user_team))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const PROSPECTS: &str = r#"[
        { "id": "a1", "name": "Arlo Vance", "position": "QB", "rank": 1 },
        { "id": "a2", "name": "Bo Keene", "position": "edge", "rank": 2, "signals": ["elite_trait"] },
        { "id": "a3", "name": "Cy Dorsey", "position": "CB", "rank": 3 },
        { "id": "a4", "name": "Dax Hollis", "position": "OT", "rank": 4 }
    ]"#;
    const ORDER: &str = r#"{ "season": 2026, "picks": [
        { "round": 1, "pick": 1, "team": "north" },
        { "round": 1, "pick": 2, "team": "south" }
    ] }"#;
    const EVALUATORS: &str = r#"{ "north": { "film_process": 250, "star_bias": 80 } }"#;
    const ROSTERS: &str = r#"{ "north": { "quarterback": 2 } }"#;

    #[derive(Default)]
    struct FixtureLoader {
        files: HashMap<&'static str, &'static str>,
    }

    impl FixtureLoader {
        fn league() -> Self {
            let files = HashMap::from([
                (PROSPECTS_CONFIG, PROSPECTS),
                (DRAFT_ORDER_CONFIG, ORDER),
                (EVALUATORS_CONFIG, EVALUATORS),
                (ROSTERS_CONFIG, ROSTERS),
            ]);
            Self { files }
        }
    }

    impl LeagueDataLoader for FixtureLoader {
        type Error = serde_json::Error;

        fn load_config<T>(&self, config_name: &str) -> Result<T, Self::Error>
        where
            T: DeserializeOwned,
        {
            serde_json::from_str(self.files.get(config_name).copied().unwrap_or("null"))
        }
    }

    #[test]
    fn engine_loads_league_and_sanitizes_traits() {
        let engine = DraftroomEngine::new(FixtureLoader::league());
        let league = engine.load_league(9).unwrap();
        assert_eq!(league.class.catalog().len(), 4);
        assert_eq!(league.order.len(), 2);
        let north = league.personnel.evaluators.resolve(&OrgId::new("north"));
        assert!((north.film_process - 100.0).abs() < f32::EPSILON);
        assert!((north.discipline - 50.0).abs() < f32::EPSILON);
        assert_eq!(
            league
                .personnel
                .rosters
                .count(&OrgId::new("north"), PositionBucket::Quarterback),
            2
        );
    }

    #[test]
    fn missing_data_reports_context() {
        let engine = DraftroomEngine::new(FixtureLoader::default());
        let err = engine.load_league(1).unwrap_err();
        assert!(format!("{err:#}").contains("loading prospect catalog"));
    }

    #[test]
    fn engine_sessions_replay_by_seed() {
        let engine = DraftroomEngine::new(FixtureLoader::league());
        let league = engine.load_league(3).unwrap();
        let mut first = engine.create_session(3, None).unwrap();
        let mut second = engine.create_session(3, None).unwrap();
        first.advance_until_user_slot(&league.personnel);
        second.advance_until_user_slot(&league.personnel);
        assert!(first.is_complete());
        assert_eq!(first.digest(), second.digest());
    }

    #[test]
    fn engine_desk_uses_loaded_profile() {
        let engine = DraftroomEngine::new(FixtureLoader::league());
        let desk = engine.create_desk(OrgId::new("north"), 5).unwrap();
        assert!((desk.traits().star_bias - 80.0).abs() < f32::EPSILON);
        let unknown = engine.create_desk(OrgId::new("east"), 5).unwrap();
        assert_eq!(*unknown.traits(), EvaluatorTraits::default());
    }

    #[test]
    fn asset_loader_reports_missing_files() {
        let loader = AssetDirLoader::new("/definitely/not/here");
        let err = loader.load_prospects().unwrap_err();
        assert!(matches!(err, DataError::Io { .. }));
    }
}
