use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::classify::{AttemptKind, DangerTier, ShotRecord};
use crate::event::{Event, EventKind, TeamId};

/// Per-team, per-period tallies. Created empty, mutated only while the
/// period's events are folded in, then read-only.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TeamPeriodStats {
    pub team_id: TeamId,
    pub period: u32,
    /// Shot attempts of any kind (on goal, missed, blocked, goal).
    pub shots: u32,
    /// Shots on goal: saved or scored.
    pub sog: u32,
    pub goals: u32,
    pub xg_sum: f64,
    pub hdc_count: u32,
    pub hdca_count: u32,
    pub corsi_for: u32,
    pub corsi_against: u32,
    pub rush_count: u32,
    pub cycle_count: u32,
    pub pim: u32,
    pub hits: u32,
    /// Blocks made by this team (opponent attempts blocked).
    pub blocked_shots: u32,
    pub giveaways: u32,
    pub takeaways: u32,
    pub faceoff_wins: u32,
    pub faceoff_losses: u32,
}

/// Folds the normalized event stream plus both teams' classified shots into
/// period rows, ordered by (period, home-first).
pub fn fold_period_stats(
    events: &[Event],
    home_id: TeamId,
    away_id: TeamId,
    home_shots: &[ShotRecord],
    away_shots: &[ShotRecord],
) -> Vec<TeamPeriodStats> {
    let mut rows: BTreeMap<(u32, TeamId), TeamPeriodStats> = BTreeMap::new();

    for ev in events {
        let team = ev.team_id;
        let opp = other_team(team, home_id, away_id);
        ensure_row(&mut rows, ev.period, team);
        ensure_row(&mut rows, ev.period, opp);

        match &ev.kind {
            EventKind::Hit { .. } => {
                rows.get_mut(&(ev.period, team)).unwrap().hits += 1;
            }
            EventKind::Penalty { minutes, .. } => {
                rows.get_mut(&(ev.period, team)).unwrap().pim += minutes;
            }
            EventKind::Giveaway { .. } => {
                rows.get_mut(&(ev.period, team)).unwrap().giveaways += 1;
            }
            EventKind::Takeaway { .. } => {
                rows.get_mut(&(ev.period, team)).unwrap().takeaways += 1;
            }
            EventKind::Faceoff { .. } => {
                rows.get_mut(&(ev.period, team)).unwrap().faceoff_wins += 1;
                rows.get_mut(&(ev.period, opp)).unwrap().faceoff_losses += 1;
            }
            // Attempt by `team`, block credited to the defending side.
            EventKind::BlockedShot { .. } => {
                rows.get_mut(&(ev.period, opp)).unwrap().blocked_shots += 1;
            }
            EventKind::Goal { .. } => {
                rows.get_mut(&(ev.period, team)).unwrap().goals += 1;
            }
            EventKind::Shot { .. }
            | EventKind::MissedShot { .. }
            | EventKind::Stoppage => {}
        }
    }

    for shot in home_shots.iter().chain(away_shots) {
        let opp = other_team(shot.team_id, home_id, away_id);
        ensure_row(&mut rows, shot.period, shot.team_id);
        ensure_row(&mut rows, shot.period, opp);
        // One mutable row at a time: shooter's side first, then the opponent's.
        fold_shot_for(rows.get_mut(&(shot.period, shot.team_id)).unwrap(), shot);
        fold_shot_against(rows.get_mut(&(shot.period, opp)).unwrap(), shot);
    }

    // Home row first within each period, matching report layout.
    let mut out: Vec<TeamPeriodStats> = rows.into_values().collect();
    out.sort_by_key(|r| (r.period, r.team_id != home_id));
    out
}

fn fold_shot_for(own: &mut TeamPeriodStats, shot: &ShotRecord) {
    own.shots += 1;
    // Every attempt counts once in Corsi; a goal is an attempt, never
    // double-counted.
    own.corsi_for += 1;

    if matches!(shot.attempt, AttemptKind::OnGoal | AttemptKind::Goal) {
        own.sog += 1;
    }
    if let Some(xg) = shot.xg {
        own.xg_sum += xg;
    }
    if shot.danger_tier == Some(DangerTier::High) {
        own.hdc_count += 1;
    }
    if shot.is_rush {
        own.rush_count += 1;
    }
    if shot.is_sustained_pressure {
        own.cycle_count += 1;
    }
}

fn fold_shot_against(opp: &mut TeamPeriodStats, shot: &ShotRecord) {
    opp.corsi_against += 1;
    if shot.danger_tier == Some(DangerTier::High) {
        opp.hdca_count += 1;
    }
}

fn ensure_row(rows: &mut BTreeMap<(u32, TeamId), TeamPeriodStats>, period: u32, team: TeamId) {
    rows.entry((period, team)).or_insert_with(|| TeamPeriodStats {
        team_id: team,
        period,
        ..TeamPeriodStats::default()
    });
}

fn other_team(team: TeamId, home_id: TeamId, away_id: TeamId) -> TeamId {
    if team == home_id { away_id } else { home_id }
}
