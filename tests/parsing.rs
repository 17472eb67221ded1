use std::fs;
use std::path::PathBuf;

use rinkside::event::{EventKind, StrengthState, Zone};
use rinkside::provider::{GameDataSource, JsonFileSource, parse_game_json};

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

#[test]
fn parses_full_game_fixture() {
    let raw = read_fixture("game_2024020555.json");
    let input = parse_game_json(&raw).expect("fixture should parse");
    assert_eq!(input.game_id, "2024020555");
    assert_eq!(input.home_id, 10);
    assert_eq!(input.away_id, 8);
    assert_eq!(input.events.len(), 16);
}

#[test]
fn goal_play_carries_ordered_assists() {
    let raw = read_fixture("game_2024020555.json");
    let input = parse_game_json(&raw).expect("fixture should parse");
    let goal = input
        .events
        .iter()
        .find(|e| matches!(&e.kind, EventKind::Goal { .. }) && e.team_id == 8)
        .expect("away goal should exist");
    match &goal.kind {
        EventKind::Goal { shooter, assists, .. } => {
            assert_eq!(*shooter, Some(80002));
            assert_eq!(assists, &vec![80003, 80004]);
        }
        _ => unreachable!(),
    }
    assert_eq!(goal.zone, Some(Zone::Offensive));
}

#[test]
fn situation_field_maps_to_strength_state() {
    let raw = read_fixture("game_2024020555.json");
    let input = parse_game_json(&raw).expect("fixture should parse");
    let pp_goal = input
        .events
        .iter()
        .find(|e| matches!(&e.kind, EventKind::Goal { .. }) && e.team_id == 10)
        .expect("home goal should exist");
    assert_eq!(pp_goal.strength, StrengthState::Pp);
    assert_eq!(pp_goal.period, 3);
    assert_eq!(pp_goal.clock_seconds, 1170);
}

#[test]
fn penalty_play_keeps_drawn_by_credit() {
    let raw = read_fixture("game_2024020555.json");
    let input = parse_game_json(&raw).expect("fixture should parse");
    let penalty = input
        .events
        .iter()
        .find(|e| matches!(&e.kind, EventKind::Penalty { .. }))
        .expect("penalty should exist");
    match &penalty.kind {
        EventKind::Penalty {
            minutes,
            committed_by,
            drawn_by,
        } => {
            assert_eq!(*minutes, 2);
            assert_eq!(*committed_by, Some(80005));
            assert_eq!(*drawn_by, Some(101004));
        }
        _ => unreachable!(),
    }
}

#[test]
fn ownerless_stoppage_survives_parsing() {
    let raw = read_fixture("game_2024020555.json");
    let input = parse_game_json(&raw).expect("fixture should parse");
    assert!(
        input
            .events
            .iter()
            .any(|e| matches!(e.kind, EventKind::Stoppage))
    );
}

#[test]
fn file_source_fetches_by_game_id() {
    let mut dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    dir.push("tests");
    dir.push("fixtures");
    let source = JsonFileSource { dir };
    let input = source.fetch_game("game_2024020555").unwrap();
    assert_eq!(input.home_id, 10);
    assert!(source.fetch_game("no-such-game").is_err());
}

#[test]
fn boxscore_totals_and_skaters_parse() {
    let raw = read_fixture("game_2024020555.json");
    let input = parse_game_json(&raw).expect("fixture should parse");
    assert_eq!(input.boxscore.home.score, 1);
    assert_eq!(input.boxscore.home.pp_opportunities, Some(3));
    assert_eq!(input.boxscore.away.sog, Some(28));
    assert_eq!(input.boxscore.skaters.len(), 6);
    let renaud = input
        .boxscore
        .skaters
        .iter()
        .find(|s| s.player_id == 101003)
        .unwrap();
    assert_eq!(renaud.goals, 1);
    assert_eq!(renaud.shots, 5);
    let leclerc = input
        .boxscore
        .skaters
        .iter()
        .find(|s| s.player_id == 80002)
        .unwrap();
    assert_eq!(leclerc.shots, 4);
}
