use serde::{Deserialize, Serialize};

/// Regulation period length in seconds. Overtime periods reuse the same
/// elapsed-clock convention even though they end early.
pub const PERIOD_SECONDS: u32 = 1200;

pub type TeamId = u32;
pub type PlayerId = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Zone {
    #[serde(rename = "O")]
    Offensive,
    #[serde(rename = "N")]
    Neutral,
    #[serde(rename = "D")]
    Defensive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum StrengthState {
    Ev,
    Pp,
    Pk,
}

impl Default for StrengthState {
    fn default() -> Self {
        StrengthState::Ev
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShotType {
    Wrist,
    Slap,
    Snap,
    Backhand,
    Tip,
    Deflection,
}

/// One kind per play type so the classifier's handling is exhaustively
/// checkable instead of switching on loose type strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventKind {
    /// Shot on goal, saved.
    Shot {
        shooter: Option<PlayerId>,
        shot_type: Option<ShotType>,
    },
    Goal {
        shooter: Option<PlayerId>,
        shot_type: Option<ShotType>,
        /// Assists in credit order: primary first, secondary second.
        assists: Vec<PlayerId>,
    },
    MissedShot {
        shooter: Option<PlayerId>,
        shot_type: Option<ShotType>,
    },
    /// Attempt by this event's team, blocked by the opponent.
    BlockedShot {
        shooter: Option<PlayerId>,
        shot_type: Option<ShotType>,
    },
    /// `team_id` on the event is the winning team.
    Faceoff {
        winner: Option<PlayerId>,
        loser: Option<PlayerId>,
    },
    Stoppage,
    Penalty {
        minutes: u32,
        committed_by: Option<PlayerId>,
        drawn_by: Option<PlayerId>,
    },
    Hit {
        hitter: Option<PlayerId>,
    },
    Giveaway {
        player: Option<PlayerId>,
    },
    Takeaway {
        player: Option<PlayerId>,
    },
}

impl EventKind {
    /// Shot attempt kinds: on goal, goal, missed, blocked. A goal is itself
    /// an attempt and is counted exactly once.
    pub fn is_shot_attempt(&self) -> bool {
        matches!(
            self,
            EventKind::Shot { .. }
                | EventKind::Goal { .. }
                | EventKind::MissedShot { .. }
                | EventKind::BlockedShot { .. }
        )
    }

    /// Play-stopping kinds that break rush/cycle windows for both teams.
    pub fn is_stoppage(&self) -> bool {
        matches!(self, EventKind::Faceoff { .. } | EventKind::Stoppage)
    }

    pub fn shot_type(&self) -> Option<ShotType> {
        match self {
            EventKind::Shot { shot_type, .. }
            | EventKind::Goal { shot_type, .. }
            | EventKind::MissedShot { shot_type, .. }
            | EventKind::BlockedShot { shot_type, .. } => *shot_type,
            _ => None,
        }
    }

    pub fn shooter(&self) -> Option<PlayerId> {
        match self {
            EventKind::Shot { shooter, .. }
            | EventKind::Goal { shooter, .. }
            | EventKind::MissedShot { shooter, .. }
            | EventKind::BlockedShot { shooter, .. } => *shooter,
            _ => None,
        }
    }
}

/// One canonical, validated play-by-play event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub period: u32,
    /// Elapsed seconds within the period, 0..=1200.
    pub clock_seconds: u32,
    pub team_id: TeamId,
    pub kind: EventKind,
    /// Rink coordinates in feet; absent for events some providers report
    /// without location (hits, penalties). Coordinate-less events are kept
    /// for counting aggregates but excluded from shot/zone classification.
    pub coords: Option<(f64, f64)>,
    pub strength: StrengthState,
    /// Zone relative to this event's team, when the provider tagged one.
    pub zone: Option<Zone>,
}

impl Event {
    /// Absolute game time in seconds under the elapsed-clock convention.
    pub fn abs_seconds(&self) -> u32 {
        (self.period - 1) * PERIOD_SECONDS + self.clock_seconds
    }
}

/// Provider-shaped record before validation. Field meanings mirror `Event`
/// but nothing is trusted yet: the normalizer owns range checks, dedup and
/// ordering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawEvent {
    pub period: u32,
    pub clock_seconds: i64,
    pub team_id: TeamId,
    pub kind: EventKind,
    #[serde(default)]
    pub coords: Option<(f64, f64)>,
    #[serde(default)]
    pub strength: StrengthState,
    #[serde(default)]
    pub zone: Option<Zone>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn abs_seconds_uses_elapsed_convention() {
        let ev = Event {
            period: 2,
            clock_seconds: 30,
            team_id: 1,
            kind: EventKind::Stoppage,
            coords: None,
            strength: StrengthState::Ev,
            zone: None,
        };
        assert_eq!(ev.abs_seconds(), 1230);
    }

    #[test]
    fn goal_counts_as_shot_attempt() {
        let kind = EventKind::Goal {
            shooter: Some(9),
            shot_type: Some(ShotType::Wrist),
            assists: vec![11, 12],
        };
        assert!(kind.is_shot_attempt());
        assert!(!kind.is_stoppage());
    }

    #[test]
    fn faceoff_is_a_stoppage() {
        let kind = EventKind::Faceoff {
            winner: Some(1),
            loser: Some(2),
        };
        assert!(kind.is_stoppage());
        assert!(!kind.is_shot_attempt());
    }
}
