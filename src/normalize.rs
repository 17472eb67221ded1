use std::collections::HashSet;

use crate::error::DataQualityFlag;
use crate::event::{Event, EventKind, PERIOD_SECONDS, RawEvent, TeamId};

/// Canonical event stream for one game, in playback order (non-decreasing
/// absolute game time; provider order breaks ties via stable sort).
#[derive(Debug, Clone, Default)]
pub struct NormalizedEvents {
    pub events: Vec<Event>,
    pub warnings: Vec<DataQualityFlag>,
}

impl NormalizedEvents {
    pub fn for_team(&self, team_id: TeamId) -> impl Iterator<Item = &Event> {
        self.events.iter().filter(move |e| e.team_id == team_id)
    }
}

/// Validates, dedupes and orders a provider event list.
///
/// Rules:
/// - events missing coordinates are kept (they still feed count aggregates)
/// - exact duplicates (kind, team, period, clock, coords) keep the first
/// - clock outside 0..=1200, period 0 or unknown team drops that event with
///   a recorded warning; the rest of the stream still processes
pub fn normalize_events(raw: &[RawEvent], home_id: TeamId, away_id: TeamId) -> NormalizedEvents {
    let mut out = NormalizedEvents::default();
    let mut seen: HashSet<String> = HashSet::with_capacity(raw.len());

    for (index, r) in raw.iter().enumerate() {
        if let Some(reason) = validate(r, home_id, away_id) {
            log::warn!("dropping malformed event #{index}: {reason}");
            out.warnings
                .push(DataQualityFlag::MalformedEvent { index, reason });
            continue;
        }

        let key = dedup_key(r);
        if !seen.insert(key) {
            continue;
        }

        out.events.push(Event {
            period: r.period,
            clock_seconds: r.clock_seconds as u32,
            team_id: r.team_id,
            kind: r.kind.clone(),
            coords: r.coords,
            strength: r.strength,
            zone: r.zone,
        });
    }

    // Stable: equal timestamps keep provider order, which also fixes which
    // event rush provenance cites.
    out.events.sort_by_key(|e| e.abs_seconds());
    out
}

fn validate(r: &RawEvent, home_id: TeamId, away_id: TeamId) -> Option<String> {
    if r.period < 1 {
        return Some(format!("period {} out of range", r.period));
    }
    if r.clock_seconds < 0 || r.clock_seconds > i64::from(PERIOD_SECONDS) {
        return Some(format!("clock {}s outside [0,1200]", r.clock_seconds));
    }
    if r.team_id != home_id && r.team_id != away_id {
        return Some(format!("unknown team id {}", r.team_id));
    }
    None
}

fn dedup_key(r: &RawEvent) -> String {
    // Exact bit patterns: nearby-but-distinct coordinates are not duplicates.
    let coords = match r.coords {
        Some((x, y)) => format!("{:x},{:x}", x.to_bits(), y.to_bits()),
        None => "-".to_string(),
    };
    format!(
        "{}|{}|{}|{}|{}",
        kind_tag(&r.kind),
        r.team_id,
        r.period,
        r.clock_seconds,
        coords
    )
}

fn kind_tag(kind: &EventKind) -> &'static str {
    match kind {
        EventKind::Shot { .. } => "shot",
        EventKind::Goal { .. } => "goal",
        EventKind::MissedShot { .. } => "missed_shot",
        EventKind::BlockedShot { .. } => "blocked_shot",
        EventKind::Faceoff { .. } => "faceoff",
        EventKind::Stoppage => "stoppage",
        EventKind::Penalty { .. } => "penalty",
        EventKind::Hit { .. } => "hit",
        EventKind::Giveaway { .. } => "giveaway",
        EventKind::Takeaway { .. } => "takeaway",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{EventKind, StrengthState, Zone};

    fn raw(period: u32, clock: i64, team: TeamId, kind: EventKind) -> RawEvent {
        RawEvent {
            period,
            clock_seconds: clock,
            team_id: team,
            kind,
            coords: None,
            strength: StrengthState::Ev,
            zone: None,
        }
    }

    #[test]
    fn orders_by_absolute_game_time() {
        let events = vec![
            raw(2, 10, 1, EventKind::Stoppage),
            raw(1, 500, 2, EventKind::Hit { hitter: None }),
            raw(1, 20, 1, EventKind::Stoppage),
        ];
        let norm = normalize_events(&events, 1, 2);
        let times: Vec<u32> = norm.events.iter().map(|e| e.abs_seconds()).collect();
        assert_eq!(times, vec![20, 500, 1210]);
        assert!(norm.warnings.is_empty());
    }

    #[test]
    fn drops_out_of_range_clock_and_unknown_team_with_warning() {
        let events = vec![
            raw(1, 1300, 1, EventKind::Stoppage),
            raw(1, 30, 9, EventKind::Stoppage),
            raw(1, 30, 2, EventKind::Stoppage),
        ];
        let norm = normalize_events(&events, 1, 2);
        assert_eq!(norm.events.len(), 1);
        assert_eq!(norm.warnings.len(), 2);
        assert!(matches!(
            norm.warnings[0],
            DataQualityFlag::MalformedEvent { index: 0, .. }
        ));
    }

    #[test]
    fn removes_duplicates_keeping_first() {
        let mut a = raw(1, 100, 1, EventKind::Hit { hitter: Some(7) });
        a.coords = Some((30.0, -5.0));
        let mut b = raw(1, 100, 1, EventKind::Hit { hitter: Some(7) });
        b.coords = Some((30.0, -5.0));
        let norm = normalize_events(&[a, b], 1, 2);
        assert_eq!(norm.events.len(), 1);
    }

    #[test]
    fn nearby_coordinates_are_distinct_events() {
        let mut a = raw(1, 100, 1, EventKind::Hit { hitter: Some(7) });
        a.coords = Some((30.0, -5.0));
        let mut b = raw(1, 100, 1, EventKind::Hit { hitter: Some(7) });
        b.coords = Some((30.01, -5.0));
        let norm = normalize_events(&[a, b], 1, 2);
        assert_eq!(norm.events.len(), 2);
    }

    #[test]
    fn same_clock_different_kind_is_not_a_duplicate() {
        let a = raw(1, 100, 1, EventKind::Hit { hitter: None });
        let b = raw(1, 100, 1, EventKind::Giveaway { player: None });
        let norm = normalize_events(&[a, b], 1, 2);
        assert_eq!(norm.events.len(), 2);
    }

    #[test]
    fn keeps_coordinate_less_events() {
        let mut a = raw(1, 50, 1, EventKind::Hit { hitter: None });
        a.coords = None;
        let norm = normalize_events(&[a], 1, 2);
        assert_eq!(norm.events.len(), 1);
    }

    #[test]
    fn zone_tag_survives_normalization() {
        let mut a = raw(1, 60, 1, EventKind::Stoppage);
        a.zone = Some(Zone::Offensive);
        let norm = normalize_events(&[a], 1, 2);
        assert_eq!(norm.events[0].zone, Some(Zone::Offensive));
    }
}
