use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::aggregate::TeamPeriodStats;
use crate::boxscore::Boxscore;
use crate::error::DataQualityFlag;
use crate::event::{Event, EventKind, PlayerId, TeamId};

// Game Score weights. PIM/2 stands in for penalties taken; that is a known
// approximation, not something to "fix" here.
const W_GOAL: f64 = 0.75;
const W_PRIMARY_ASSIST: f64 = 0.70;
const W_SECONDARY_ASSIST: f64 = 0.55;
const W_SOG: f64 = 0.075;
const W_BLOCK: f64 = 0.05;
const W_PENALTY_DRAWN: f64 = 0.15;
const W_PIM_HALF: f64 = 0.15;
const W_FACEOFF_WIN: f64 = 0.01;
const W_FACEOFF_LOSS: f64 = 0.01;
const W_PLUS: f64 = 0.15;
const W_MINUS: f64 = 0.15;

/// Whole-game rollup for one team: period sums plus ratio metrics. Derived
/// and recomputed from the period rows, never mutated independently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamGameStats {
    pub team_id: TeamId,
    pub goals: u32,
    pub shots: u32,
    pub sog: u32,
    pub xg_sum: f64,
    pub hdc_count: u32,
    pub hdca_count: u32,
    pub corsi_for: u32,
    pub corsi_against: u32,
    pub rush_count: u32,
    pub cycle_count: u32,
    pub hits: u32,
    pub pim: u32,
    pub giveaways: u32,
    pub takeaways: u32,
    pub blocked_shots: u32,
    pub faceoff_wins: u32,
    pub faceoff_losses: u32,
    pub pp_goals: Option<u32>,
    pub pp_opportunities: Option<u32>,
    /// Ratios are `None` when their denominator is zero or a required
    /// boxscore field is missing — "not applicable", never a divide by zero.
    pub corsi_pct: Option<f64>,
    pub faceoff_pct: Option<f64>,
    pub pp_pct: Option<f64>,
    pub pk_pct: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerGameScore {
    pub player_id: PlayerId,
    pub team_id: TeamId,
    pub name: String,
    pub goals: u32,
    pub primary_assists: u32,
    pub secondary_assists: u32,
    pub shots: u32,
    pub blocked_shots: u32,
    pub penalties_drawn: u32,
    pub penalty_minutes: u32,
    pub faceoff_wins: u32,
    pub faceoff_losses: u32,
    pub plus_minus: i32,
    /// Weighted sum of the fields above, rounded to one decimal.
    pub game_score: f64,
}

/// Merges period rollups with boxscore totals into per-team game stats.
/// Boxscore counts win over event-derived counts when present; each missing
/// ratio input is flagged and that ratio reported unavailable.
pub fn compute_game_stats(
    periods: &[TeamPeriodStats],
    boxscore: &Boxscore,
    home_id: TeamId,
    away_id: TeamId,
) -> (Vec<TeamGameStats>, Vec<DataQualityFlag>) {
    let mut warnings = Vec::new();
    let mut out = Vec::with_capacity(2);

    for &team_id in &[home_id, away_id] {
        let opp_id = if team_id == home_id { away_id } else { home_id };
        let mut stats = sum_periods(periods, team_id);

        let team_box = boxscore.team(team_id);
        if let Some(tb) = team_box {
            stats.goals = stats.goals.max(tb.score);
            override_count(&mut stats.sog, tb.sog);
            override_count(&mut stats.hits, tb.hits);
            override_count(&mut stats.pim, tb.pim);
            override_count(&mut stats.giveaways, tb.giveaways);
            override_count(&mut stats.takeaways, tb.takeaways);
            override_count(&mut stats.blocked_shots, tb.blocked_shots);
            override_count(&mut stats.faceoff_wins, tb.faceoff_wins);
            override_count(&mut stats.faceoff_losses, tb.faceoff_losses);
            stats.pp_goals = tb.pp_goals;
            stats.pp_opportunities = tb.pp_opportunities;
        }

        stats.corsi_pct = ratio(stats.corsi_for, stats.corsi_for + stats.corsi_against);
        stats.faceoff_pct = ratio(
            stats.faceoff_wins,
            stats.faceoff_wins + stats.faceoff_losses,
        );

        stats.pp_pct = match (stats.pp_goals, stats.pp_opportunities) {
            (Some(g), Some(o)) => ratio(g, o),
            _ => {
                warnings.push(DataQualityFlag::InsufficientData {
                    team_id,
                    field: "pp_goals/pp_opportunities".to_string(),
                });
                None
            }
        };

        let opp_box = boxscore.team(opp_id);
        stats.pk_pct = match opp_box.and_then(|b| Some((b.pp_goals?, b.pp_opportunities?))) {
            Some((g, o)) if o > 0 => Some(f64::from(o - o.min(g)) / f64::from(o)),
            Some(_) => None,
            None => {
                warnings.push(DataQualityFlag::InsufficientData {
                    team_id,
                    field: "opponent pp_goals/pp_opportunities".to_string(),
                });
                None
            }
        };

        out.push(stats);
    }

    (out, warnings)
}

fn sum_periods(periods: &[TeamPeriodStats], team_id: TeamId) -> TeamGameStats {
    let mut s = TeamGameStats {
        team_id,
        goals: 0,
        shots: 0,
        sog: 0,
        xg_sum: 0.0,
        hdc_count: 0,
        hdca_count: 0,
        corsi_for: 0,
        corsi_against: 0,
        rush_count: 0,
        cycle_count: 0,
        hits: 0,
        pim: 0,
        giveaways: 0,
        takeaways: 0,
        blocked_shots: 0,
        faceoff_wins: 0,
        faceoff_losses: 0,
        pp_goals: None,
        pp_opportunities: None,
        corsi_pct: None,
        faceoff_pct: None,
        pp_pct: None,
        pk_pct: None,
    };
    for p in periods.iter().filter(|p| p.team_id == team_id) {
        s.goals += p.goals;
        s.shots += p.shots;
        s.sog += p.sog;
        s.xg_sum += p.xg_sum;
        s.hdc_count += p.hdc_count;
        s.hdca_count += p.hdca_count;
        s.corsi_for += p.corsi_for;
        s.corsi_against += p.corsi_against;
        s.rush_count += p.rush_count;
        s.cycle_count += p.cycle_count;
        s.hits += p.hits;
        s.pim += p.pim;
        s.giveaways += p.giveaways;
        s.takeaways += p.takeaways;
        s.blocked_shots += p.blocked_shots;
        s.faceoff_wins += p.faceoff_wins;
        s.faceoff_losses += p.faceoff_losses;
    }
    s
}

fn override_count(slot: &mut u32, from_box: Option<u32>) {
    if let Some(v) = from_box {
        *slot = v;
    }
}

fn ratio(numer: u32, denom: u32) -> Option<f64> {
    if denom == 0 {
        None
    } else {
        Some(f64::from(numer) / f64::from(denom))
    }
}

/// Builds per-skater Game Scores from boxscore lines plus event credit for
/// assist ordering and penalties drawn. Skaters seen only in events (no
/// boxscore line) still get a row from event-derived counts.
pub fn compute_player_scores(
    events: &[Event],
    boxscore: &Boxscore,
) -> Vec<PlayerGameScore> {
    let mut players: BTreeMap<PlayerId, PlayerGameScore> = BTreeMap::new();

    for line in &boxscore.skaters {
        players.insert(
            line.player_id,
            PlayerGameScore {
                player_id: line.player_id,
                team_id: line.team_id,
                name: line.name.clone(),
                goals: line.goals,
                primary_assists: 0,
                secondary_assists: line.assists,
                shots: line.shots,
                blocked_shots: line.blocked_shots,
                penalties_drawn: 0,
                penalty_minutes: line.pim,
                faceoff_wins: line.faceoff_wins,
                faceoff_losses: line.faceoff_losses,
                plus_minus: line.plus_minus,
                game_score: 0.0,
            },
        );
    }

    let has_line: std::collections::HashSet<PlayerId> =
        boxscore.skaters.iter().map(|l| l.player_id).collect();

    // Faceoff and penalty events carry one team id but credit players on
    // both sides; the loser and the drawer belong to the other club.
    let (home_id, away_id) = (boxscore.home.team_id, boxscore.away.team_id);
    let opposite = |team: TeamId| if team == home_id { away_id } else { home_id };

    for ev in events {
        match &ev.kind {
            EventKind::Goal { shooter, assists, .. } => {
                // Boxscore lines carry total assists; event order splits
                // primary from secondary. Players without a line get their
                // full credit from events instead.
                if let Some(&a1) = assists.first() {
                    let known = has_line.contains(&a1);
                    let p = entry(&mut players, a1, ev.team_id);
                    p.primary_assists += 1;
                    if known {
                        p.secondary_assists = p.secondary_assists.saturating_sub(1);
                    }
                }
                if let Some(&a2) = assists.get(1)
                    && !has_line.contains(&a2)
                {
                    entry(&mut players, a2, ev.team_id).secondary_assists += 1;
                }
                if let Some(id) = shooter
                    && !has_line.contains(id)
                {
                    let p = entry(&mut players, *id, ev.team_id);
                    p.goals += 1;
                    p.shots += 1;
                }
            }
            EventKind::Shot { shooter, .. } => {
                if let Some(id) = shooter
                    && !has_line.contains(id)
                {
                    entry(&mut players, *id, ev.team_id).shots += 1;
                }
            }
            EventKind::Faceoff { winner, loser } => {
                if let Some(id) = winner
                    && !has_line.contains(id)
                {
                    entry(&mut players, *id, ev.team_id).faceoff_wins += 1;
                }
                if let Some(id) = loser
                    && !has_line.contains(id)
                {
                    entry(&mut players, *id, opposite(ev.team_id)).faceoff_losses += 1;
                }
            }
            EventKind::Penalty {
                minutes,
                committed_by,
                drawn_by,
            } => {
                if let Some(id) = committed_by
                    && !has_line.contains(id)
                {
                    entry(&mut players, *id, ev.team_id).penalty_minutes += minutes;
                }
                if let Some(id) = drawn_by {
                    entry(&mut players, *id, opposite(ev.team_id)).penalties_drawn += 1;
                }
            }
            _ => {}
        }
    }

    let mut out: Vec<PlayerGameScore> = players
        .into_values()
        .map(|mut p| {
            p.game_score = game_score(&p);
            p
        })
        .collect();
    out.sort_by(|a, b| {
        a.team_id
            .cmp(&b.team_id)
            .then(
                b.game_score
                    .partial_cmp(&a.game_score)
                    .unwrap_or(std::cmp::Ordering::Equal),
            )
            .then(a.player_id.cmp(&b.player_id))
    });
    out
}

fn entry(
    players: &mut BTreeMap<PlayerId, PlayerGameScore>,
    id: PlayerId,
    team: TeamId,
) -> &mut PlayerGameScore {
    players.entry(id).or_insert_with(|| PlayerGameScore {
        player_id: id,
        team_id: team,
        name: format!("#{id}"),
        goals: 0,
        primary_assists: 0,
        secondary_assists: 0,
        shots: 0,
        blocked_shots: 0,
        penalties_drawn: 0,
        penalty_minutes: 0,
        faceoff_wins: 0,
        faceoff_losses: 0,
        plus_minus: 0,
        game_score: 0.0,
    })
}

/// Weighted single-game skater rating, rounded to one decimal. Pure
/// function of the counting fields; recomputed, never independently set.
pub fn game_score(p: &PlayerGameScore) -> f64 {
    let pm = f64::from(p.plus_minus);
    let raw = W_GOAL * f64::from(p.goals)
        + W_PRIMARY_ASSIST * f64::from(p.primary_assists)
        + W_SECONDARY_ASSIST * f64::from(p.secondary_assists)
        + W_SOG * f64::from(p.shots)
        + W_BLOCK * f64::from(p.blocked_shots)
        + W_PENALTY_DRAWN * f64::from(p.penalties_drawn)
        - W_PIM_HALF * (f64::from(p.penalty_minutes) / 2.0)
        + W_FACEOFF_WIN * f64::from(p.faceoff_wins)
        - W_FACEOFF_LOSS * f64::from(p.faceoff_losses)
        + W_PLUS * pm.max(0.0)
        - W_MINUS * (-pm).max(0.0);
    (raw * 10.0).round() / 10.0
}
