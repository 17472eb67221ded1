use serde::{Deserialize, Serialize};

use crate::error::DataQualityFlag;
use crate::event::{Event, EventKind, PlayerId, ShotType, StrengthState, TeamId, Zone};
use crate::xg::{ShotContext, XgModel, shot_angle, shot_distance};

/// High-danger boundary, inclusive: xg of exactly 0.15 is high danger.
/// Not configurable; downstream consumers assume this exact boundary.
pub const HIGH_DANGER_XG: f64 = 0.15;
pub const MEDIUM_DANGER_XG: f64 = 0.07;

#[derive(Debug, Clone, Copy)]
pub struct ClassifierConfig {
    /// Max seconds between an N/D-zone touch and the shot for a rush.
    pub rush_window_secs: f64,
    /// Min unbroken offensive-zone possession before a cycle shot.
    pub cycle_min_secs: f64,
    /// Max seconds since a prior attempt for the rebound feature.
    pub rebound_window_secs: f64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            rush_window_secs: 4.0,
            cycle_min_secs: 8.0,
            rebound_window_secs: 3.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DangerTier {
    Low,
    Medium,
    High,
}

impl DangerTier {
    pub fn from_xg(xg: f64) -> Self {
        if xg >= HIGH_DANGER_XG {
            DangerTier::High
        } else if xg >= MEDIUM_DANGER_XG {
            DangerTier::Medium
        } else {
            DangerTier::Low
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptKind {
    OnGoal,
    Goal,
    Missed,
    Blocked,
}

/// One classified shot attempt. Geometry/xg are absent when the provider
/// gave no coordinates or the model failed for this shot; the attempt still
/// participates in count aggregates either way.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShotRecord {
    pub team_id: TeamId,
    pub period: u32,
    pub clock_seconds: u32,
    pub attempt: AttemptKind,
    pub shooter: Option<PlayerId>,
    pub shot_type: Option<ShotType>,
    pub strength: StrengthState,
    pub distance: Option<f64>,
    pub angle: Option<f64>,
    pub xg: Option<f64>,
    pub danger_tier: Option<DangerTier>,
    pub zone_origin: Option<Zone>,
    pub is_rebound: bool,
    pub is_rush: bool,
    pub is_sustained_pressure: bool,
    /// Playback index of the N/D-zone event a rush classification cites.
    pub rush_source: Option<usize>,
}

/// Scans one team's view of the full playback-ordered stream and emits a
/// `ShotRecord` per shot attempt by that team.
///
/// The zone cursor tracks the most recent zone-tagged event for the team; a
/// shot without its own zone tag inherits the cursor. Rush and cycle windows
/// never cross a period boundary and are broken by any stoppage (faceoff or
/// whistle) for either team.
pub fn classify_shots(
    events: &[Event],
    team_id: TeamId,
    model: &dyn XgModel,
    config: &ClassifierConfig,
) -> (Vec<ShotRecord>, Vec<DataQualityFlag>) {
    let mut shots = Vec::new();
    let mut warnings = Vec::new();
    let mut zone_cursor: Option<Zone> = None;

    for (idx, ev) in events.iter().enumerate() {
        if ev.team_id == team_id && ev.zone.is_some() {
            zone_cursor = ev.zone;
        }
        if ev.team_id != team_id || !ev.kind.is_shot_attempt() {
            continue;
        }

        let zone_origin = ev.zone.or(zone_cursor);
        let classifiable = zone_origin.is_some();
        if !classifiable {
            warnings.push(DataQualityFlag::NoZoneEstablished {
                team_id,
                period: ev.period,
                clock_seconds: ev.clock_seconds,
            });
        }

        let (is_rush, rush_source) = if classifiable {
            detect_rush(events, idx, team_id, config.rush_window_secs)
        } else {
            (false, None)
        };
        let is_cycle = classifiable && detect_cycle(events, idx, team_id, config.cycle_min_secs);
        let is_rebound = detect_rebound(events, idx, team_id, config.rebound_window_secs);

        let (distance, angle) = match ev.coords {
            Some((x, y)) => (Some(shot_distance(x, y)), Some(shot_angle(x, y))),
            None => (None, None),
        };

        let xg = match (distance, angle) {
            (Some(d), Some(a)) => {
                let ctx = ShotContext {
                    distance: d,
                    angle: a,
                    shot_type: ev.kind.shot_type(),
                    rebound: is_rebound,
                    rush: is_rush,
                    strength: ev.strength,
                };
                let value = model.estimate(&ctx);
                if value.is_finite() && (0.0..=1.0).contains(&value) {
                    Some(value)
                } else {
                    warnings.push(DataQualityFlag::ModelError {
                        team_id,
                        period: ev.period,
                        clock_seconds: ev.clock_seconds,
                        detail: format!("model returned {value}"),
                    });
                    None
                }
            }
            _ => None,
        };

        shots.push(ShotRecord {
            team_id,
            period: ev.period,
            clock_seconds: ev.clock_seconds,
            attempt: attempt_kind(&ev.kind),
            shooter: ev.kind.shooter(),
            shot_type: ev.kind.shot_type(),
            strength: ev.strength,
            distance,
            angle,
            xg,
            danger_tier: xg.map(DangerTier::from_xg),
            zone_origin,
            is_rebound,
            is_rush,
            is_sustained_pressure: is_cycle,
            rush_source,
        });
    }

    (shots, warnings)
}

/// A shot is a rush when a same-team N/D-zone touch sits within the window
/// with no stoppage strictly between. Walking backward, the first qualifying
/// touch found is the most recent one, which is the one cited.
fn detect_rush(
    events: &[Event],
    shot_idx: usize,
    team_id: TeamId,
    window_secs: f64,
) -> (bool, Option<usize>) {
    let shot = &events[shot_idx];
    let shot_abs = shot.abs_seconds();

    for j in (0..shot_idx).rev() {
        let prior = &events[j];
        if prior.period != shot.period {
            break;
        }
        let dt = f64::from(shot_abs - prior.abs_seconds());
        if dt > window_secs {
            break;
        }
        if prior.kind.is_stoppage() {
            break;
        }
        if prior.team_id == team_id
            && matches!(prior.zone, Some(Zone::Neutral) | Some(Zone::Defensive))
        {
            return (true, Some(j));
        }
    }
    (false, None)
}

/// Sustained pressure: an unbroken run of the team's own offensive-zone
/// events immediately before the shot, long enough to clear the threshold.
/// The run breaks on any stoppage, on a same-team D/N-zone event, or at the
/// period boundary.
fn detect_cycle(events: &[Event], shot_idx: usize, team_id: TeamId, min_secs: f64) -> bool {
    let shot = &events[shot_idx];
    let shot_abs = shot.abs_seconds();
    let mut run_start: Option<u32> = None;

    for j in (0..shot_idx).rev() {
        let prior = &events[j];
        if prior.period != shot.period || prior.kind.is_stoppage() {
            break;
        }
        if prior.team_id == team_id {
            match prior.zone {
                Some(Zone::Offensive) => run_start = Some(prior.abs_seconds()),
                Some(Zone::Neutral) | Some(Zone::Defensive) => break,
                None => {}
            }
        }
    }

    match run_start {
        Some(start) => f64::from(shot_abs - start) >= min_secs,
        None => false,
    }
}

fn detect_rebound(events: &[Event], shot_idx: usize, team_id: TeamId, window_secs: f64) -> bool {
    let shot = &events[shot_idx];
    let shot_abs = shot.abs_seconds();

    for j in (0..shot_idx).rev() {
        let prior = &events[j];
        if prior.period != shot.period {
            break;
        }
        let dt = f64::from(shot_abs - prior.abs_seconds());
        if dt > window_secs {
            break;
        }
        if prior.kind.is_stoppage() {
            break;
        }
        if prior.team_id == team_id && prior.kind.is_shot_attempt() {
            return true;
        }
    }
    false
}

fn attempt_kind(kind: &EventKind) -> AttemptKind {
    match kind {
        EventKind::Shot { .. } => AttemptKind::OnGoal,
        EventKind::Goal { .. } => AttemptKind::Goal,
        EventKind::MissedShot { .. } => AttemptKind::Missed,
        EventKind::BlockedShot { .. } => AttemptKind::Blocked,
        _ => unreachable!("attempt_kind called on non-attempt event"),
    }
}
