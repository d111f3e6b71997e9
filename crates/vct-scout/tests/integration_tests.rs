// Integration tests for vct-scout.
//
// These run the full pipeline against the JSON fixtures: directory loading
// with merge and skip behaviour, linking with exact and fuzzy resolution,
// question answering across store and scrape, prompt assembly, and
// snapshot refresh.

use std::path::PathBuf;

use vct_core::{
    Entity, EntityKind, MatchKind, QueryOutcome, ReferenceStore, ScrapedPlayer, Snapshot,
};
use vct_scout::config::{Config, DataConfig, MatchingConfig, PromptConfig};
use vct_scout::loader::{DataSource, DirectorySource, LoadError};
use vct_scout::session::{resolve_question, Session};

// ===========================================================================
// Test helpers
// ===========================================================================

/// Relative to the package root, where integration tests run.
const FIXTURES: &str = "tests/fixtures";

fn inline_config(fuzzy_teams: bool) -> Config {
    Config {
        base_dir: PathBuf::from(FIXTURES),
        data: DataConfig {
            dir: "data".into(),
            scrape_file: Some("scrape/na_60d.json".into()),
        },
        matching: MatchingConfig {
            fuzzy_teams,
            ..MatchingConfig::default()
        },
        prompt: PromptConfig::default(),
    }
}

fn open_session(fuzzy_teams: bool) -> Session {
    let config = inline_config(fuzzy_teams);
    let source = DirectorySource::from_config(&config);
    Session::open(config, &source).expect("fixtures should load")
}

/// A source that hands back a prepared snapshot.
struct FixedSource(Snapshot);

impl DataSource for FixedSource {
    fn load(&self) -> Result<Snapshot, LoadError> {
        Ok(self.0.clone())
    }
}

// ===========================================================================
// Loading
// ===========================================================================

#[test]
fn fixture_directory_loads_and_skips_broken_file() {
    let config = inline_config(true);
    let (snapshot, report) = DirectorySource::from_config(&config)
        .load_with_report()
        .unwrap();

    assert_eq!(snapshot.store.len(EntityKind::Player), 4);
    assert_eq!(snapshot.store.len(EntityKind::Team), 3);
    assert_eq!(snapshot.store.len(EntityKind::Tournament), 2);
    assert_eq!(snapshot.store.len(EntityKind::League), 1);
    assert_eq!(snapshot.mappings.len(), 3);
    assert_eq!(snapshot.scraped.len(), 4);

    assert_eq!(report.skipped.len(), 1);
    assert!(report.skipped[0].0.ends_with("teams_broken.json"));
}

#[test]
fn v2_player_file_overrides_base() {
    let snapshot = DirectorySource::from_config(&inline_config(true)).load().unwrap();
    let less = snapshot.store.get(EntityKind::Player, "less").unwrap();
    assert_eq!(less.get_str("status"), Some("active"));
    assert_eq!(less.get_str("first_name"), Some("Felipe"));
}

#[test]
fn scrape_roles_derived_when_missing() {
    let snapshot = DirectorySource::from_config(&inline_config(true)).load().unwrap();
    let boaster = snapshot.scraped.iter().find(|p| p.player == "Boaster").unwrap();
    assert_eq!(boaster.roles, vec!["Controller", "Initiator"]);
    assert_eq!(boaster.headshot_percentage, "N/A");
}

// ===========================================================================
// Linking
// ===========================================================================

#[test]
fn linked_records_follow_mapping_order() {
    let linked = open_session(true).linked();
    let ids: Vec<_> = linked.iter().map(|l| l.platform_game_id.as_str()).collect();
    assert_eq!(ids, vec!["val:g1", "val:g2", "val:g3"]);
}

#[test]
fn first_match_resolves_exact_fuzzy_and_drops_unknowns() {
    let linked = open_session(true).linked();
    let g1 = &linked[0];

    assert_eq!(g1.teams.keys().collect::<Vec<_>>(), vec!["loud", "sen"]);
    assert_eq!(
        g1.participants.keys().collect::<Vec<_>>(),
        vec!["less", "tenz01", "zekken"]
    );
    assert_eq!(g1.participants["tenz01"].get_str("handle"), Some("TenZ"));
    assert_eq!(g1.tournament_info.get_str("name"), Some("VCT Americas Stage 1"));
    assert_eq!(g1.league_info.get_str("name"), Some("VCT Americas"));
}

#[test]
fn fuzzy_team_fallback_follows_config() {
    let linked = open_session(true).linked();
    assert_eq!(linked[1].teams.keys().collect::<Vec<_>>(), vec!["lev"]);
    assert_eq!(linked[1].tournament_info.get_str("name"), Some("Masters Madrid"));
    assert!(linked[1].league_info.is_empty());

    let linked = open_session(false).linked();
    assert!(linked[1].teams.is_empty());
    assert_eq!(linked[1].participants.len(), 1);
}

#[test]
fn mapping_without_fields_links_to_empty_record() {
    let linked = open_session(true).linked();
    let g3 = &linked[2];
    assert_eq!(g3.tournament_id, "missing");
    assert!(g3.teams.is_empty());
    assert!(g3.participants.is_empty());
    assert!(g3.tournament_info.is_empty());
    assert!(g3.league_info.is_empty());
}

#[test]
fn linked_json_uses_wire_names() {
    let linked = open_session(true).linked();
    let value = serde_json::to_value(&linked).unwrap();
    assert_eq!(value[0]["platformGameId"], "val:g1");
    assert_eq!(value[0]["teams"]["sen"]["name"], "Sentinels");
    assert_eq!(value[0]["leagueInfo"]["region"], "AMER");
    assert_eq!(value[2]["tournamentInfo"], serde_json::json!({}));
}

// ===========================================================================
// Questions
// ===========================================================================

#[test]
fn answer_from_store_exact() {
    let session = open_session(true);
    let answer = session.answer("Who is TenZ?");
    assert!(answer.starts_with("TenZ\n"), "got {answer}");
    assert!(answer.contains("id: tenz01"));
}

#[test]
fn answer_falls_back_to_scrape() {
    let session = open_session(true);
    let answer = session.answer("who is demon1");
    assert!(answer.starts_with("Demon1\n"), "got {answer}");
    assert!(answer.contains("org: EG"));
}

#[test]
fn answer_reports_missing_data() {
    let session = open_session(true);
    assert_eq!(session.answer("who is yay"), "no data available for yay");
}

#[test]
fn answer_without_entity() {
    let session = open_session(true);
    assert_eq!(
        session.answer("what comp should we run"),
        "no specific player or team in question"
    );
}

#[test]
fn team_question_searches_teams() {
    let snapshot = DirectorySource::from_config(&inline_config(true)).load().unwrap();
    let scraped = snapshot.scraped_entities();
    let resolver = inline_config(true).query_resolver();
    let outcome = resolve_question(&resolver, &snapshot, &scraped, "how good is team sentinels");
    assert_eq!(
        outcome.entity().and_then(|e| e.get_str("acronym")),
        Some("SEN")
    );
}

#[test]
fn exact_scraped_name_beats_partial_store_name() {
    let mut store = ReferenceStore::new();
    store.put(EntityKind::Player, "tenzing", Entity::new().with("handle", "Tenzing"));
    let scraped: ScrapedPlayer =
        serde_json::from_value(serde_json::json!({"player": "TenZ", "org": "SEN"})).unwrap();
    let snapshot = Snapshot::new(store, Vec::new(), vec![scraped]);
    let rows = snapshot.scraped_entities();

    let resolver = inline_config(true).query_resolver();
    match resolve_question(&resolver, &snapshot, &rows, "who is tenz") {
        QueryOutcome::Found { entity, match_kind } => {
            assert_eq!(match_kind, MatchKind::Exact);
            assert_eq!(entity.get_str("player"), Some("TenZ"));
        }
        other => panic!("expected exact scraped match, got {other:?}"),
    }

    // Without an exact hit anywhere, the store's partial match still wins.
    let outcome = resolve_question(&resolver, &snapshot, &rows, "who is tenzin");
    assert_eq!(
        outcome.entity().and_then(|e| e.get_str("handle")),
        Some("Tenzing")
    );
}

#[test]
fn keyword_after_who_is_narrows_to_teams() {
    let session = open_session(true);
    let answer = session.answer("who is team sentinels");
    assert!(answer.starts_with("Sentinels\n"), "got {answer}");

    let answer = session.answer("tell me about player zekken");
    assert!(answer.starts_with("zekken\n"), "got {answer}");
}

#[test]
fn prompt_contains_focus_stats_and_matches() {
    let session = open_session(true);
    let prompt = session.prompt("who is tenz");
    assert!(prompt.contains("## FOCUS\nfirst_name: Tyson"));
    assert!(prompt.contains("- Player: TenZ, Org: SEN"));
    assert!(prompt.contains("- Player: Demon1"));
    assert!(!prompt.contains("- Player: Boaster"), "player list capped at 3");
    assert!(prompt.contains("Platform Game ID: val:g1, Teams: LOUD, Sentinels"));
}

// ===========================================================================
// Refresh
// ===========================================================================

#[test]
fn refresh_swaps_snapshot() {
    let session = open_session(true);
    let before = session.snapshot();
    assert_eq!(before.mappings.len(), 3);

    let mut store = ReferenceStore::new();
    store.put(EntityKind::Player, "yay", Entity::new().with("handle", "yay"));
    let after = session
        .refresh(&FixedSource(Snapshot::new(store, Vec::new(), Vec::new())))
        .unwrap();

    assert!(after.mappings.is_empty());
    assert!(session.linked().is_empty());
    assert!(session.answer("who is yay").starts_with("yay\n"));
    // The handle taken before the refresh still sees the old data.
    assert_eq!(before.mappings.len(), 3);
}

#[test]
fn failed_refresh_keeps_current_snapshot() {
    let session = open_session(true);
    let missing = DirectorySource::new(PathBuf::from(FIXTURES).join("no-such-dir"));
    assert!(matches!(session.refresh(&missing), Err(LoadError::DataDir { .. })));
    assert_eq!(session.snapshot().mappings.len(), 3);
}

#[test]
fn query_outcome_is_distinct_from_empty_entity() {
    let snapshot = Snapshot::default();
    let resolver = inline_config(true).query_resolver();
    let outcome = resolve_question(&resolver, &snapshot, &[], "who is ghost");
    assert_eq!(outcome, QueryOutcome::NotFound { name: "ghost".into() });
}
