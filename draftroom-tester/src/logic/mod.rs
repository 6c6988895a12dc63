pub mod assets;
pub mod reports;
pub mod scenarios;
pub mod seeds;
pub mod tester;

pub use assets::TesterAssets;
pub use scenarios::ScenarioKind;
pub use seeds::resolve_seed_inputs;
pub use tester::*;
