use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fatal failures: the whole game cannot be analyzed. Anything recoverable
/// is downgraded to a [`DataQualityFlag`] and the rest of the game still
/// processes.
#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error("missing or unparseable event list: {0}")]
    MissingEvents(String),
    #[error("missing or unparseable boxscore: {0}")]
    MissingBoxscore(String),
}

/// Non-fatal data problems, recorded on the output instead of aborting.
/// Kept serializable so reruns on identical input produce identical flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "flag", rename_all = "snake_case")]
pub enum DataQualityFlag {
    /// One raw event was unusable and got dropped.
    MalformedEvent { index: usize, reason: String },
    /// A boxscore field needed for a ratio was missing; the ratio is
    /// reported as unavailable.
    InsufficientData { team_id: u32, field: String },
    /// The injected xG model returned an out-of-range or non-finite value;
    /// the shot stays in shot/Corsi counts but is excluded from xg_sum.
    ModelError {
        team_id: u32,
        period: u32,
        clock_seconds: u32,
        detail: String,
    },
    /// A shot attempt had no zone ever established for its team; counted in
    /// shots/Corsi/xg but excluded from rush/cycle tallies.
    NoZoneEstablished {
        team_id: u32,
        period: u32,
        clock_seconds: u32,
    },
}
