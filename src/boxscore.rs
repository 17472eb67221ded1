use serde::{Deserialize, Serialize};

use crate::event::{PlayerId, TeamId};

/// Provider boxscore totals for one team. Fields are optional because real
/// feeds omit them irregularly; a missing field needed for a ratio downgrades
/// that ratio to "not applicable" instead of failing the game.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TeamBoxscore {
    pub team_id: TeamId,
    pub score: u32,
    #[serde(default)]
    pub sog: Option<u32>,
    #[serde(default)]
    pub hits: Option<u32>,
    #[serde(default)]
    pub pim: Option<u32>,
    #[serde(default)]
    pub giveaways: Option<u32>,
    #[serde(default)]
    pub takeaways: Option<u32>,
    #[serde(default)]
    pub blocked_shots: Option<u32>,
    #[serde(default)]
    pub faceoff_wins: Option<u32>,
    #[serde(default)]
    pub faceoff_losses: Option<u32>,
    #[serde(default)]
    pub pp_goals: Option<u32>,
    #[serde(default)]
    pub pp_opportunities: Option<u32>,
}

/// Per-skater boxscore line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkaterLine {
    pub player_id: PlayerId,
    pub team_id: TeamId,
    pub name: String,
    #[serde(default)]
    pub goals: u32,
    #[serde(default)]
    pub assists: u32,
    #[serde(default)]
    pub shots: u32,
    #[serde(default)]
    pub blocked_shots: u32,
    #[serde(default)]
    pub pim: u32,
    #[serde(default)]
    pub faceoff_wins: u32,
    #[serde(default)]
    pub faceoff_losses: u32,
    #[serde(default)]
    pub plus_minus: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Boxscore {
    pub home: TeamBoxscore,
    pub away: TeamBoxscore,
    #[serde(default)]
    pub skaters: Vec<SkaterLine>,
}

impl Boxscore {
    pub fn team(&self, team_id: TeamId) -> Option<&TeamBoxscore> {
        if self.home.team_id == team_id {
            Some(&self.home)
        } else if self.away.team_id == team_id {
            Some(&self.away)
        } else {
            None
        }
    }
}
