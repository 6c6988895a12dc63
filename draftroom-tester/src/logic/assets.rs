use anyhow::{Context, Result};
use draftroom_game::{AssetDirLoader, DraftClass, DraftroomEngine, League};
use std::path::{Path, PathBuf};

/// League data shared by every scenario run.
#[derive(Debug, Clone)]
pub struct TesterAssets {
    league: League,
}

impl TesterAssets {
    pub fn default_root() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("assets")
            .join("data")
    }

    pub fn load(root: &Path) -> Result<Self> {
        let engine = DraftroomEngine::new(AssetDirLoader::new(root));
        let league = engine
            .load_league(0)
            .with_context(|| format!("loading league data from {}", root.display()))?;
        Ok(Self::from_league(league))
    }

    pub const fn from_league(league: League) -> Self {
        Self { league }
    }

    pub fn load_default() -> Result<Self> {
        Self::load(&Self::default_root())
    }

    pub const fn league(&self) -> &League {
        &self.league
    }

    /// The shipped catalog with ground truth drawn from `class_seed`.
    pub fn class_for(&self, class_seed: u64) -> DraftClass {
        DraftClass::new(class_seed, self.league.class.catalog().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_shipped_league() {
        let assets = TesterAssets::load_default().unwrap();
        assert!(!assets.league().order.is_empty());
        let class = assets.class_for(9);
        assert_eq!(class.class_seed(), 9);
        assert_eq!(class.catalog().len(), assets.league().class.catalog().len());
    }

    #[test]
    fn missing_directory_names_the_path() {
        let err = TesterAssets::load(Path::new("/no/such/league")).unwrap_err();
        assert!(format!("{err:#}").contains("/no/such/league"));
    }
}
