use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::boxscore::{Boxscore, SkaterLine, TeamBoxscore};
use crate::error::AnalyticsError;
use crate::event::{EventKind, RawEvent, ShotType, StrengthState, Zone};
use crate::pipeline::GameInput;

/// Supplies `(boxscore, play_by_play, team_ids)` for a game id. How the data
/// is obtained (HTTP, cache, retry) is entirely the implementation's
/// concern; the engine only sees the parsed `GameInput`.
pub trait GameDataSource {
    fn fetch_game(&self, game_id: &str) -> Result<GameInput, AnalyticsError>;
}

/// File-backed source: reads `<dir>/<game_id>.json` in the provider wire
/// shape. Used by the CLI and tests; a network-backed source plugs in
/// through the same trait.
pub struct JsonFileSource {
    pub dir: PathBuf,
}

impl GameDataSource for JsonFileSource {
    fn fetch_game(&self, game_id: &str) -> Result<GameInput, AnalyticsError> {
        let path = self.dir.join(format!("{game_id}.json"));
        let raw = fs::read_to_string(&path)
            .map_err(|e| AnalyticsError::MissingEvents(format!("{}: {e}", path.display())))?;
        parse_game_json(&raw)
            .map_err(|e| AnalyticsError::MissingEvents(format!("{}: {e:#}", path.display())))
    }
}

// Wire shapes below mirror the provider payload loosely; everything
// domain-facing goes through the typed `RawEvent`/`Boxscore` conversion so
// feed quirks stay contained here.

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireGame {
    game_id: String,
    home_team: WireTeam,
    away_team: WireTeam,
    #[serde(default)]
    plays: Option<Vec<WirePlay>>,
    #[serde(default)]
    boxscore: Option<WireBoxscore>,
}

#[derive(Debug, Deserialize)]
struct WireTeam {
    id: u32,
    #[serde(default)]
    #[allow(dead_code)]
    abbrev: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WirePlay {
    period: u32,
    /// Elapsed "MM:SS" within the period.
    time_in_period: String,
    type_desc_key: String,
    #[serde(default)]
    situation: Option<String>,
    #[serde(default)]
    details: WirePlayDetails,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WirePlayDetails {
    #[serde(default)]
    event_owner_team_id: Option<u32>,
    #[serde(default)]
    x_coord: Option<f64>,
    #[serde(default)]
    y_coord: Option<f64>,
    #[serde(default)]
    zone_code: Option<String>,
    #[serde(default)]
    shooting_player_id: Option<u32>,
    #[serde(default)]
    shot_type: Option<String>,
    #[serde(default)]
    scoring_player_id: Option<u32>,
    #[serde(default)]
    assist1_player_id: Option<u32>,
    #[serde(default)]
    assist2_player_id: Option<u32>,
    #[serde(default)]
    winning_player_id: Option<u32>,
    #[serde(default)]
    losing_player_id: Option<u32>,
    #[serde(default)]
    hitting_player_id: Option<u32>,
    #[serde(default)]
    player_id: Option<u32>,
    #[serde(default)]
    committed_by_player_id: Option<u32>,
    #[serde(default)]
    drawn_by_player_id: Option<u32>,
    #[serde(default)]
    duration: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireBoxscore {
    teams: Vec<WireTeamBox>,
    #[serde(default)]
    skaters: Vec<WireSkater>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireTeamBox {
    team_id: u32,
    score: u32,
    #[serde(default)]
    sog: Option<u32>,
    #[serde(default)]
    hits: Option<u32>,
    #[serde(default)]
    pim: Option<u32>,
    #[serde(default)]
    giveaways: Option<u32>,
    #[serde(default)]
    takeaways: Option<u32>,
    #[serde(default)]
    blocked_shots: Option<u32>,
    #[serde(default)]
    faceoff_wins: Option<u32>,
    #[serde(default)]
    faceoff_losses: Option<u32>,
    #[serde(default)]
    power_play_goals: Option<u32>,
    #[serde(default)]
    power_play_opportunities: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireSkater {
    player_id: u32,
    team_id: u32,
    name: String,
    #[serde(default)]
    goals: u32,
    #[serde(default)]
    assists: u32,
    #[serde(default)]
    shots: u32,
    #[serde(default)]
    blocked_shots: u32,
    #[serde(default)]
    pim: u32,
    #[serde(default)]
    faceoff_wins: u32,
    #[serde(default)]
    faceoff_losses: u32,
    #[serde(default)]
    plus_minus: i32,
}

/// Parses one provider game payload into a `GameInput`. A wholly missing or
/// unparseable play list or boxscore fails the game; an individual play of
/// an unknown type is skipped (the normalizer handles per-event validity).
pub fn parse_game_json(raw: &str) -> Result<GameInput> {
    let wire: WireGame = serde_json::from_str(raw).context("parse game payload")?;

    let plays = wire.plays.context("payload has no play-by-play list")?;
    let boxscore = wire.boxscore.context("payload has no boxscore")?;

    let mut events = Vec::with_capacity(plays.len());
    for play in &plays {
        match convert_play(play, wire.home_team.id) {
            Ok(Some(ev)) => events.push(ev),
            Ok(None) => {}
            Err(err) => log::debug!("skipping play ({}): {err:#}", play.type_desc_key),
        }
    }

    Ok(GameInput {
        game_id: wire.game_id,
        home_id: wire.home_team.id,
        away_id: wire.away_team.id,
        events,
        boxscore: convert_boxscore(&boxscore, wire.home_team.id, wire.away_team.id)?,
    })
}

fn convert_play(play: &WirePlay, home_id: u32) -> Result<Option<RawEvent>> {
    let d = &play.details;
    let shooter = d.shooting_player_id.or(d.scoring_player_id);
    let shot_type = d.shot_type.as_deref().and_then(parse_shot_type);

    let kind = match play.type_desc_key.as_str() {
        "shot-on-goal" => EventKind::Shot { shooter, shot_type },
        "goal" => EventKind::Goal {
            shooter,
            shot_type,
            assists: [d.assist1_player_id, d.assist2_player_id]
                .into_iter()
                .flatten()
                .collect(),
        },
        "missed-shot" => EventKind::MissedShot { shooter, shot_type },
        "blocked-shot" => EventKind::BlockedShot { shooter, shot_type },
        "faceoff" => EventKind::Faceoff {
            winner: d.winning_player_id,
            loser: d.losing_player_id,
        },
        "stoppage" | "whistle" | "icing" | "offside" => EventKind::Stoppage,
        "penalty" => EventKind::Penalty {
            minutes: d.duration.unwrap_or(2),
            committed_by: d.committed_by_player_id,
            drawn_by: d.drawn_by_player_id,
        },
        "hit" => EventKind::Hit {
            hitter: d.hitting_player_id,
        },
        "giveaway" => EventKind::Giveaway { player: d.player_id },
        "takeaway" => EventKind::Takeaway { player: d.player_id },
        // Period markers, goalie changes and the like carry nothing the
        // engine derives metrics from.
        _ => return Ok(None),
    };

    let team_id = match d.event_owner_team_id {
        Some(id) => id,
        // Neutral stoppages have no owner. The classifier treats a stoppage
        // as breaking windows for both teams, so home attribution is safe.
        None if matches!(kind, EventKind::Stoppage) => home_id,
        None => anyhow::bail!("play has no owning team"),
    };

    let coords = match (d.x_coord, d.y_coord) {
        (Some(x), Some(y)) => Some((x, y)),
        _ => None,
    };

    Ok(Some(RawEvent {
        period: play.period,
        clock_seconds: parse_clock(&play.time_in_period)?,
        team_id,
        kind,
        coords,
        strength: parse_strength(play.situation.as_deref()),
        zone: d.zone_code.as_deref().and_then(parse_zone),
    }))
}

fn convert_boxscore(wire: &WireBoxscore, home_id: u32, away_id: u32) -> Result<Boxscore> {
    let team = |id: u32| -> Option<TeamBoxscore> {
        wire.teams.iter().find(|t| t.team_id == id).map(|t| TeamBoxscore {
            team_id: t.team_id,
            score: t.score,
            sog: t.sog,
            hits: t.hits,
            pim: t.pim,
            giveaways: t.giveaways,
            takeaways: t.takeaways,
            blocked_shots: t.blocked_shots,
            faceoff_wins: t.faceoff_wins,
            faceoff_losses: t.faceoff_losses,
            pp_goals: t.power_play_goals,
            pp_opportunities: t.power_play_opportunities,
        })
    };

    let home = team(home_id).context("boxscore missing home team totals")?;
    let away = team(away_id).context("boxscore missing away team totals")?;

    Ok(Boxscore {
        home,
        away,
        skaters: wire
            .skaters
            .iter()
            .map(|s| SkaterLine {
                player_id: s.player_id,
                team_id: s.team_id,
                name: s.name.clone(),
                goals: s.goals,
                assists: s.assists,
                shots: s.shots,
                blocked_shots: s.blocked_shots,
                pim: s.pim,
                faceoff_wins: s.faceoff_wins,
                faceoff_losses: s.faceoff_losses,
                plus_minus: s.plus_minus,
            })
            .collect(),
    })
}

/// "MM:SS" elapsed within the period.
fn parse_clock(raw: &str) -> Result<i64> {
    let (m, s) = raw
        .trim()
        .split_once(':')
        .with_context(|| format!("bad clock {raw:?}"))?;
    let minutes: i64 = m.parse().with_context(|| format!("bad clock {raw:?}"))?;
    let seconds: i64 = s.parse().with_context(|| format!("bad clock {raw:?}"))?;
    Ok(minutes * 60 + seconds)
}

fn parse_strength(raw: Option<&str>) -> StrengthState {
    match raw.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
        Some("pp") => StrengthState::Pp,
        Some("pk") | Some("sh") => StrengthState::Pk,
        _ => StrengthState::Ev,
    }
}

fn parse_zone(raw: &str) -> Option<Zone> {
    match raw.trim().to_ascii_uppercase().as_str() {
        "O" => Some(Zone::Offensive),
        "N" => Some(Zone::Neutral),
        "D" => Some(Zone::Defensive),
        _ => None,
    }
}

fn parse_shot_type(raw: &str) -> Option<ShotType> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "wrist" => Some(ShotType::Wrist),
        "slap" => Some(ShotType::Slap),
        "snap" => Some(ShotType::Snap),
        "backhand" => Some(ShotType::Backhand),
        "tip-in" | "tip" => Some(ShotType::Tip),
        "deflected" | "deflection" => Some(ShotType::Deflection),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_parses_elapsed_minutes_seconds() {
        assert_eq!(parse_clock("00:45").unwrap(), 45);
        assert_eq!(parse_clock("19:59").unwrap(), 1199);
        assert!(parse_clock("1234").is_err());
    }

    #[test]
    fn strength_defaults_to_even() {
        assert_eq!(parse_strength(None), StrengthState::Ev);
        assert_eq!(parse_strength(Some("PP")), StrengthState::Pp);
        assert_eq!(parse_strength(Some("sh")), StrengthState::Pk);
    }

    #[test]
    fn unknown_play_types_are_skipped_not_fatal() {
        let raw = r#"{
            "gameId": "g", "homeTeam": {"id": 1}, "awayTeam": {"id": 2},
            "plays": [
                {"period": 1, "timeInPeriod": "00:10", "typeDescKey": "period-start"},
                {"period": 1, "timeInPeriod": "00:30", "typeDescKey": "hit",
                 "details": {"eventOwnerTeamId": 1}}
            ],
            "boxscore": {"teams": [
                {"teamId": 1, "score": 0}, {"teamId": 2, "score": 0}
            ]}
        }"#;
        let input = parse_game_json(raw).unwrap();
        assert_eq!(input.events.len(), 1);
        assert!(matches!(input.events[0].kind, EventKind::Hit { .. }));
    }

    #[test]
    fn missing_boxscore_is_fatal() {
        let raw = r#"{
            "gameId": "g", "homeTeam": {"id": 1}, "awayTeam": {"id": 2},
            "plays": []
        }"#;
        assert!(parse_game_json(raw).is_err());
    }
}
