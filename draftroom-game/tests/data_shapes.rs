use std::collections::{BTreeMap, BTreeSet};
use std::hash::Hasher;

use draftroom_game::{
    DraftOrderTable, DraftSession, EvaluatorDirectory, LeaguePersonnel, OrgId, PositionBucket,
    ProspectCatalog, RosterBook, ScoutingAction, ScoutingDesk, ScoutingWindow,
    desk::DraftClass,
};
use serde_json::{Map, Value};
use twox_hash::XxHash64;

fn load_catalog() -> ProspectCatalog {
    ProspectCatalog::from_json(include_str!("../../assets/data/prospects.json")).unwrap()
}

fn load_order() -> DraftOrderTable {
    DraftOrderTable::from_json(include_str!("../../assets/data/draft_order.json")).unwrap()
}

fn load_evaluators() -> EvaluatorDirectory {
    EvaluatorDirectory::from_json(include_str!("../../assets/data/evaluators.json")).unwrap()
}

fn load_rosters() -> RosterBook {
    RosterBook::from_json(include_str!("../../assets/data/rosters.json")).unwrap()
}

fn snapshot_hash(bytes: &[u8]) -> u64 {
    let mut hasher = XxHash64::with_seed(0);
    hasher.write(bytes);
    hasher.finish()
}

fn canonicalize_value(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let sorted: BTreeMap<String, Value> = map
                .into_iter()
                .map(|(k, v)| (k, canonicalize_value(v)))
                .collect();
            Value::Object(sorted.into_iter().collect::<Map<String, Value>>())
        }
        Value::Array(items) => Value::Array(items.into_iter().map(canonicalize_value).collect()),
        other => other,
    }
}

#[test]
fn shipped_data_files_agree_with_each_other() {
    let catalog = load_catalog();
    let order = load_order();
    let evaluators = load_evaluators();
    let rosters = load_rosters();

    assert!(catalog.len() > order.len(), "class must outnumber the slots");
    let ids: BTreeSet<_> = catalog.iter().map(|p| p.id.clone()).collect();
    assert_eq!(ids.len(), catalog.len(), "prospect ids must be unique");

    let slots = order.generate_slots();
    assert_eq!(slots.len(), order.len());
    assert_eq!(slots.first().map(|s| s.overall), Some(1));
    for team in order.teams() {
        assert!(evaluators.get(&team).is_some(), "{team} has no evaluator profile");
        assert!(
            PositionBucket::ALL
                .iter()
                .any(|b| rosters.count(&team, *b) > 0),
            "{team} has an empty roster"
        );
    }
    for (_, traits) in &evaluators {
        assert_eq!(*traits, traits.sanitized());
    }
}

#[test]
fn config_snapshot_is_stable_across_loads() {
    let render = || {
        let value = serde_json::json!({
            "order": load_order(),
            "evaluators": load_evaluators(),
            "rosters": load_rosters(),
        });
        serde_json::to_string_pretty(&canonicalize_value(value)).unwrap()
    };
    let first = render();
    let second = render();
    assert_eq!(snapshot_hash(first.as_bytes()), snapshot_hash(second.as_bytes()));
}

#[test]
fn draft_order_round_trips_through_json() {
    let order = load_order();
    let json = serde_json::to_string(&order).unwrap();
    let back = DraftOrderTable::from_json(&json).unwrap();
    assert_eq!(back, order);
}

#[test]
fn mid_draft_session_survives_serialization() {
    let catalog = load_catalog();
    let order = load_order();
    let personnel = LeaguePersonnel::new(load_evaluators(), load_rosters());
    let user = order.generate_slots()[40].team.clone();

    let mut session = DraftSession::new(0xD12A_F700, &order, &catalog, Some(user));
    session.advance_until_user_slot(&personnel);

    let saved = serde_json::to_string(&session).unwrap();
    let mut restored: DraftSession = serde_json::from_str(&saved).unwrap();
    assert_eq!(
        serde_json::to_value(&session).unwrap(),
        serde_json::to_value(&restored).unwrap(),
        "round-trip mismatch"
    );

    // Both copies continue identically.
    session.run_to_completion(&personnel);
    restored.run_to_completion(&personnel);
    assert_eq!(session.digest(), restored.digest());
}

#[test]
fn scouting_desk_survives_serialization() {
    let class = DraftClass::new(31, load_catalog());
    let org = OrgId::new("sea");
    let traits = load_evaluators().resolve(&org);
    let mut desk = ScoutingDesk::new(org, 31, traits);
    desk.begin_window(ScoutingWindow::Fall).unwrap();
    let target = class.catalog().by_rank()[0].id.clone();
    desk.scout(&class, &target, ScoutingAction::FilmDeep).unwrap();
    desk.close_window(&class).unwrap();

    let saved = serde_json::to_string(&desk).unwrap();
    let restored: ScoutingDesk = serde_json::from_str(&saved).unwrap();
    assert_eq!(restored, desk);
}
