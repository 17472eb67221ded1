use serde::{Deserialize, Serialize};

use crate::momentum::{MomentumSignal, momentum_signal};
use crate::pipeline::GameAnalytics;

/// Format-agnostic report record for the rendering layer: plain structured
/// data, nothing about layout. Also carries the momentum signals the live
/// win-probability blender reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameReport {
    pub game_id: String,
    pub generated_at: String,
    pub teams: Vec<crate::metrics::TeamGameStats>,
    pub periods: Vec<crate::aggregate::TeamPeriodStats>,
    pub players: Vec<crate::metrics::PlayerGameScore>,
    pub momentum: Vec<MomentumSignal>,
    pub warnings: Vec<crate::error::DataQualityFlag>,
}

pub fn build_report(analytics: &GameAnalytics) -> GameReport {
    build_report_at(analytics, chrono::Utc::now().to_rfc3339())
}

/// Timestamp-injected variant so identical analytics render byte-identical
/// reports in tests.
pub fn build_report_at(analytics: &GameAnalytics, generated_at: String) -> GameReport {
    GameReport {
        game_id: analytics.game_id.clone(),
        generated_at,
        teams: analytics.game_stats.clone(),
        periods: analytics.period_stats.clone(),
        players: analytics.player_scores.clone(),
        momentum: vec![
            momentum_signal(
                &analytics.period_stats,
                &analytics.game_stats,
                analytics.home_id,
            ),
            momentum_signal(
                &analytics.period_stats,
                &analytics.game_stats,
                analytics.away_id,
            ),
        ],
        warnings: analytics.warnings.clone(),
    }
}

/// One-screen text summary for the CLI. The rendering layer proper consumes
/// the structured record instead.
pub fn render_text(report: &GameReport) -> String {
    let mut out = String::new();
    out.push_str(&format!("game {}\n", report.game_id));
    for t in &report.teams {
        out.push_str(&format!(
            "  team {:>4}  G {:<2} SOG {:<3} xG {:>5.2}  HDC {:<2} CF% {}  FO% {}\n",
            t.team_id,
            t.goals,
            t.sog,
            t.xg_sum,
            t.hdc_count,
            fmt_pct(t.corsi_pct),
            fmt_pct(t.faceoff_pct),
        ));
    }
    for p in report.players.iter().filter(|p| p.game_score != 0.0) {
        out.push_str(&format!(
            "  {:<20} {:>5.1}\n",
            p.name, p.game_score
        ));
    }
    if !report.warnings.is_empty() {
        out.push_str(&format!("  {} data-quality warning(s)\n", report.warnings.len()));
    }
    out
}

fn fmt_pct(v: Option<f64>) -> String {
    match v {
        Some(v) => format!("{:.1}", v * 100.0),
        None => "n/a".to_string(),
    }
}
