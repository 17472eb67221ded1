use crate::event::{ShotType, StrengthState};

/// Goal-mouth center sits on the goal line, 89 ft from center ice, y = 0.
const GOAL_LINE_X: f64 = 89.0;

const XG_FLOOR: f64 = 0.01;
const XG_CEIL: f64 = 0.97;

// Placeholder logistic coefficients. These are NOT fitted against historical
// shot data; they are shaped to satisfy the documented monotonicity
// requirements (distance down, rebound/rush/PP up) until a calibrated model
// is dropped in through the `XgModel` seam.
const B_INTERCEPT: f64 = -0.50;
const B_DISTANCE: f64 = -0.070;
const B_ANGLE: f64 = -0.020;
const B_REBOUND: f64 = 0.45;
const B_RUSH: f64 = 0.35;
const B_PP: f64 = 0.25;
const B_PK: f64 = -0.15;

/// Situational features of one shot attempt, as seen by the xG model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShotContext {
    /// Feet from the goal-mouth center.
    pub distance: f64,
    /// Degrees off the center line, 0 (head-on) to 90 (goal-line level).
    pub angle: f64,
    pub shot_type: Option<ShotType>,
    /// Prior shot attempt by the same team within the rebound window.
    pub rebound: bool,
    pub rush: bool,
    pub strength: StrengthState,
}

/// Injected shot-quality strategy. Implementations must be pure and
/// deterministic; the pipeline treats out-of-range or non-finite output as a
/// model error for that shot.
pub trait XgModel: Send + Sync {
    fn estimate(&self, shot: &ShotContext) -> f64;
}

/// Uncalibrated logistic placeholder satisfying the required monotonicity:
/// xg strictly decreases with distance (down to a 0.01 floor), and rebound,
/// rush and power-play situations never lower it.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultXgModel;

impl XgModel for DefaultXgModel {
    fn estimate(&self, shot: &ShotContext) -> f64 {
        let mut z = B_INTERCEPT;
        z += B_DISTANCE * shot.distance.max(0.0);
        z += B_ANGLE * shot.angle.clamp(0.0, 90.0);
        z += shot_type_adjustment(shot.shot_type);
        if shot.rebound {
            z += B_REBOUND;
        }
        if shot.rush {
            z += B_RUSH;
        }
        z += match shot.strength {
            StrengthState::Ev => 0.0,
            StrengthState::Pp => B_PP,
            StrengthState::Pk => B_PK,
        };
        sigmoid(z).clamp(XG_FLOOR, XG_CEIL)
    }
}

fn shot_type_adjustment(shot_type: Option<ShotType>) -> f64 {
    match shot_type {
        Some(ShotType::Wrist) | None => 0.0,
        Some(ShotType::Snap) => 0.05,
        Some(ShotType::Slap) => -0.10,
        Some(ShotType::Backhand) => -0.15,
        Some(ShotType::Tip) => 0.20,
        Some(ShotType::Deflection) => 0.20,
    }
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

/// Distance in feet from rink coordinates to the nearer goal-mouth center.
/// `|x|` folds both attacking directions onto one end.
pub fn shot_distance(x: f64, y: f64) -> f64 {
    let dx = GOAL_LINE_X - x.abs();
    (dx * dx + y * y).sqrt()
}

/// Angle off the center line in degrees, 0..=90. Shots from behind the goal
/// line report the full 90.
pub fn shot_angle(x: f64, y: f64) -> f64 {
    let dx = GOAL_LINE_X - x.abs();
    if dx <= 0.0 {
        return 90.0;
    }
    y.abs().atan2(dx).to_degrees().clamp(0.0, 90.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(distance: f64, angle: f64) -> ShotContext {
        ShotContext {
            distance,
            angle,
            shot_type: Some(ShotType::Wrist),
            rebound: false,
            rush: false,
            strength: StrengthState::Ev,
        }
    }

    #[test]
    fn distance_strictly_decreases_xg() {
        let model = DefaultXgModel;
        let mut prev = model.estimate(&ctx(5.0, 10.0));
        for d in [10.0, 15.0, 20.0, 30.0, 45.0] {
            let xg = model.estimate(&ctx(d, 10.0));
            assert!(xg < prev, "xg should fall from {prev} at distance {d}");
            assert!(xg >= XG_FLOOR);
            prev = xg;
        }
    }

    #[test]
    fn rebound_and_rush_never_lower_xg() {
        let model = DefaultXgModel;
        let base = model.estimate(&ctx(20.0, 25.0));
        let mut rebound = ctx(20.0, 25.0);
        rebound.rebound = true;
        let mut rush = ctx(20.0, 25.0);
        rush.rush = true;
        assert!(model.estimate(&rebound) >= base);
        assert!(model.estimate(&rush) >= base);
    }

    #[test]
    fn power_play_beats_penalty_kill() {
        let model = DefaultXgModel;
        let mut pp = ctx(18.0, 15.0);
        pp.strength = StrengthState::Pp;
        let mut pk = ctx(18.0, 15.0);
        pk.strength = StrengthState::Pk;
        assert!(model.estimate(&pp) > model.estimate(&pk));
    }

    #[test]
    fn output_stays_in_unit_interval() {
        let model = DefaultXgModel;
        for d in [0.0, 1.0, 60.0, 150.0] {
            for a in [0.0, 45.0, 90.0] {
                let xg = model.estimate(&ctx(d, a));
                assert!((0.0..=1.0).contains(&xg));
            }
        }
    }

    #[test]
    fn geometry_from_both_rink_ends() {
        assert!((shot_distance(79.0, 0.0) - 10.0).abs() < 1e-9);
        assert!((shot_distance(-79.0, 0.0) - 10.0).abs() < 1e-9);
        assert!((shot_angle(79.0, 10.0) - 45.0).abs() < 1e-9);
        assert_eq!(shot_angle(91.0, 3.0), 90.0);
    }
}
