use serde::{Deserialize, Serialize};

use crate::aggregate::TeamPeriodStats;
use crate::event::TeamId;
use crate::metrics::TeamGameStats;

const K_SHOT_SHARE: f64 = 0.6;
const K_PP_EDGE: f64 = 0.1;
const K_FACEOFF_TREND: f64 = 0.3;

/// Momentum factors the live win-probability blender consumes alongside its
/// pre-game model. The engine only emits the signal; how it is blended is
/// the caller's business.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MomentumSignal {
    pub team_id: TeamId,
    /// Attempt share in the most recent period, centered on 0.
    pub recent_shot_share: f64,
    /// Power-play opportunity edge over the opponent, full game.
    pub pp_edge: f64,
    /// Most recent period's faceoff share vs. the full-game share.
    pub faceoff_trend: f64,
    /// Weighted combination, clamped to [-1, 1].
    pub composite: f64,
}

pub fn momentum_signal(
    periods: &[TeamPeriodStats],
    game: &[TeamGameStats],
    team_id: TeamId,
) -> MomentumSignal {
    let last_period = periods
        .iter()
        .filter(|p| p.team_id == team_id)
        .map(|p| p.period)
        .max();

    let recent_shot_share = last_period
        .and_then(|lp| periods.iter().find(|p| p.team_id == team_id && p.period == lp))
        .and_then(|p| share(p.corsi_for, p.corsi_against))
        .map(|s| s - 0.5)
        .unwrap_or(0.0);

    let own = game.iter().find(|g| g.team_id == team_id);
    let opp = game.iter().find(|g| g.team_id != team_id);

    let pp_edge = match (
        own.and_then(|g| g.pp_opportunities),
        opp.and_then(|g| g.pp_opportunities),
    ) {
        (Some(a), Some(b)) => f64::from(a) - f64::from(b),
        _ => 0.0,
    };

    let game_fo = own.and_then(|g| share(g.faceoff_wins, g.faceoff_losses));
    let recent_fo = last_period
        .and_then(|lp| periods.iter().find(|p| p.team_id == team_id && p.period == lp))
        .and_then(|p| share(p.faceoff_wins, p.faceoff_losses));
    let faceoff_trend = match (recent_fo, game_fo) {
        (Some(r), Some(g)) => r - g,
        _ => 0.0,
    };

    let composite = (K_SHOT_SHARE * recent_shot_share
        + K_PP_EDGE * pp_edge
        + K_FACEOFF_TREND * faceoff_trend)
        .clamp(-1.0, 1.0);

    MomentumSignal {
        team_id,
        recent_shot_share,
        pp_edge,
        faceoff_trend,
        composite,
    }
}

fn share(a: u32, b: u32) -> Option<f64> {
    let total = a + b;
    if total == 0 {
        None
    } else {
        Some(f64::from(a) / f64::from(total))
    }
}
