use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::aggregate::{TeamPeriodStats, fold_period_stats};
use crate::boxscore::Boxscore;
use crate::classify::{ClassifierConfig, ShotRecord, classify_shots};
use crate::error::{AnalyticsError, DataQualityFlag};
use crate::event::{RawEvent, TeamId};
use crate::metrics::{PlayerGameScore, TeamGameStats, compute_game_stats, compute_player_scores};
use crate::normalize::normalize_events;
use crate::xg::{DefaultXgModel, XgModel};

/// Everything the engine needs for one game. How this was obtained (HTTP,
/// cache, file) is the data source's business, not the engine's.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameInput {
    pub game_id: String,
    pub home_id: TeamId,
    pub away_id: TeamId,
    pub events: Vec<RawEvent>,
    pub boxscore: Boxscore,
}

/// Full derived output for one game: a pure function of the input, safe to
/// recompute or cache keyed by game id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameAnalytics {
    pub game_id: String,
    pub home_id: TeamId,
    pub away_id: TeamId,
    pub period_stats: Vec<TeamPeriodStats>,
    pub game_stats: Vec<TeamGameStats>,
    pub shots: Vec<ShotRecord>,
    pub player_scores: Vec<PlayerGameScore>,
    pub warnings: Vec<DataQualityFlag>,
}

/// Synchronous, side-effect-free analytics engine. The xG model is an
/// injected strategy so a calibrated model can replace the placeholder
/// without touching the pipeline.
pub struct AnalyticsEngine {
    model: Box<dyn XgModel>,
    config: ClassifierConfig,
}

impl Default for AnalyticsEngine {
    fn default() -> Self {
        Self::new(Box::new(DefaultXgModel), ClassifierConfig::default())
    }
}

impl AnalyticsEngine {
    pub fn new(model: Box<dyn XgModel>, config: ClassifierConfig) -> Self {
        Self { model, config }
    }

    /// Runs the whole pipeline for one game. Per-event and per-shot problems
    /// degrade to warnings; the only fatal case is an input whose boxscore
    /// identifies neither team (the provider layer already rejects missing
    /// event lists and unparseable boxscores).
    pub fn analyze_game(&self, input: &GameInput) -> Result<GameAnalytics, AnalyticsError> {
        if input.boxscore.team(input.home_id).is_none()
            && input.boxscore.team(input.away_id).is_none()
        {
            return Err(AnalyticsError::MissingBoxscore(format!(
                "boxscore names neither team {} nor {}",
                input.home_id, input.away_id
            )));
        }

        let normalized = normalize_events(&input.events, input.home_id, input.away_id);
        let mut warnings = normalized.warnings.clone();

        let (home_shots, home_warnings) = classify_shots(
            &normalized.events,
            input.home_id,
            self.model.as_ref(),
            &self.config,
        );
        let (away_shots, away_warnings) = classify_shots(
            &normalized.events,
            input.away_id,
            self.model.as_ref(),
            &self.config,
        );
        warnings.extend(home_warnings);
        warnings.extend(away_warnings);

        let period_stats = fold_period_stats(
            &normalized.events,
            input.home_id,
            input.away_id,
            &home_shots,
            &away_shots,
        );

        let (game_stats, metric_warnings) = compute_game_stats(
            &period_stats,
            &input.boxscore,
            input.home_id,
            input.away_id,
        );
        warnings.extend(metric_warnings);

        let player_scores = compute_player_scores(&normalized.events, &input.boxscore);

        let mut shots = home_shots;
        shots.extend(away_shots);
        shots.sort_by_key(|s| ((s.period - 1) * 1200 + s.clock_seconds, s.team_id));

        if !warnings.is_empty() {
            log::debug!(
                "game {}: {} data-quality warnings",
                input.game_id,
                warnings.len()
            );
        }

        Ok(GameAnalytics {
            game_id: input.game_id.clone(),
            home_id: input.home_id,
            away_id: input.away_id,
            period_stats,
            game_stats,
            shots,
            player_scores,
            warnings,
        })
    }

    /// Independent games are trivially parallel: one task per game, no
    /// cross-task state. Output order matches input order.
    pub fn analyze_games(
        &self,
        inputs: &[GameInput],
    ) -> Vec<(String, Result<GameAnalytics, AnalyticsError>)> {
        inputs
            .par_iter()
            .map(|input| (input.game_id.clone(), self.analyze_game(input)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boxscore::TeamBoxscore;
    use crate::event::{EventKind, ShotType, StrengthState, Zone};

    fn raw_shot(period: u32, clock: i64, team: TeamId, zone: Option<Zone>) -> RawEvent {
        RawEvent {
            period,
            clock_seconds: clock,
            team_id: team,
            kind: EventKind::Shot {
                shooter: Some(9),
                shot_type: Some(ShotType::Wrist),
            },
            coords: Some((75.0, 3.0)),
            strength: StrengthState::Ev,
            zone,
        }
    }

    fn input(events: Vec<RawEvent>) -> GameInput {
        GameInput {
            game_id: "g1".to_string(),
            home_id: 1,
            away_id: 2,
            events,
            boxscore: Boxscore {
                home: TeamBoxscore {
                    team_id: 1,
                    score: 0,
                    ..TeamBoxscore::default()
                },
                away: TeamBoxscore {
                    team_id: 2,
                    score: 0,
                    ..TeamBoxscore::default()
                },
                skaters: Vec::new(),
            },
        }
    }

    #[test]
    fn corsi_conserves_across_teams() {
        let events = vec![
            raw_shot(1, 100, 1, Some(Zone::Offensive)),
            raw_shot(1, 300, 2, Some(Zone::Offensive)),
            raw_shot(2, 200, 1, Some(Zone::Offensive)),
        ];
        let out = AnalyticsEngine::default().analyze_game(&input(events)).unwrap();
        let home = &out.game_stats[0];
        let away = &out.game_stats[1];
        assert_eq!(home.corsi_for, away.corsi_against);
        assert_eq!(home.corsi_against, away.corsi_for);
    }

    #[test]
    fn identical_input_yields_identical_output() {
        let events = vec![
            raw_shot(1, 100, 1, Some(Zone::Offensive)),
            raw_shot(1, 102, 1, Some(Zone::Offensive)),
            raw_shot(2, 40, 2, Some(Zone::Offensive)),
        ];
        let engine = AnalyticsEngine::default();
        let a = engine.analyze_game(&input(events.clone())).unwrap();
        let b = engine.analyze_game(&input(events)).unwrap();
        assert_eq!(
            serde_json::to_vec(&a).unwrap(),
            serde_json::to_vec(&b).unwrap()
        );
    }

    #[test]
    fn boxscore_naming_neither_team_is_fatal() {
        let mut bad = input(Vec::new());
        bad.boxscore.home.team_id = 8;
        bad.boxscore.away.team_id = 9;
        let err = AnalyticsEngine::default().analyze_game(&bad).unwrap_err();
        assert!(matches!(err, AnalyticsError::MissingBoxscore(_)));
    }

    #[test]
    fn batch_preserves_input_order() {
        let inputs: Vec<GameInput> = (0..4)
            .map(|i| {
                let mut g = input(vec![raw_shot(1, 100, 1, Some(Zone::Offensive))]);
                g.game_id = format!("g{i}");
                g
            })
            .collect();
        let results = AnalyticsEngine::default().analyze_games(&inputs);
        let ids: Vec<&str> = results.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, vec!["g0", "g1", "g2", "g3"]);
        assert!(results.iter().all(|(_, r)| r.is_ok()));
    }
}
