//! True Wind Solver
//!
//! Derives true wind from apparent wind and boat speed through the water.
//!
//! Angles are in degrees relative to the bow, clockwise, 0 = dead ahead.
//! Speeds may be in any unit as long as apparent wind and boat speed agree.
//!
//! Two strategies are available and selected by [`TrueWindStrategy`]:
//!
//! - **Law of cosines**: closed-form triangle solution on the apparent angle,
//!   with the port side mirrored onto the starboard side.
//! - **Vector**: resolves apparent wind and boat motion into north/east
//!   components in the heading-true frame, subtracts, and recovers the result
//!   with `atan2`.
//!
//! Both agree to floating point precision on all finite inputs.

use nalgebra::SVector;
use serde::{Deserialize, Serialize};

use crate::angle::normalize_degrees;

type Vector2 = SVector<f64, 2>;

/// Algorithm used to derive true wind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TrueWindStrategy {
    #[default]
    LawOfCosines,
    Vector,
}

impl std::fmt::Display for TrueWindStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrueWindStrategy::LawOfCosines => write!(f, "law of cosines"),
            TrueWindStrategy::Vector => write!(f, "vector"),
        }
    }
}

/// Apparent wind as measured by the masthead unit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ApparentWind {
    /// Degrees off the bow, clockwise
    pub angle: f64,
    pub speed: f64,
}

/// Solver output. Values are NaN when any input was unavailable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrueWind {
    /// Degrees off the bow, [0, 360)
    pub angle: f64,
    pub speed: f64,
    /// Compass direction the wind blows from, [0, 360)
    pub direction: f64,
}

impl TrueWind {
    pub fn unavailable() -> Self {
        TrueWind {
            angle: f64::NAN,
            speed: f64::NAN,
            direction: f64::NAN,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.angle.is_finite() && self.speed.is_finite()
    }
}

impl TrueWindStrategy {
    /// Solve for true wind.
    ///
    /// `heading_true` only affects [`TrueWind::direction`]; when it is
    /// unavailable the direction is NaN while angle and speed are still solved.
    pub fn solve(&self, apparent: ApparentWind, boat_speed: f64, heading_true: f64) -> TrueWind {
        if !apparent.angle.is_finite() || !apparent.speed.is_finite() || !boat_speed.is_finite()
        {
            return TrueWind::unavailable();
        }

        let (angle, speed) = match self {
            TrueWindStrategy::LawOfCosines => law_of_cosines(apparent, boat_speed),
            TrueWindStrategy::Vector => vector(apparent, boat_speed, heading_true),
        };

        TrueWind {
            angle,
            speed,
            direction: true_direction(angle, heading_true),
        }
    }
}

/// Compass direction of the true wind: `(angle + heading) mod 360`
pub fn true_direction(true_angle: f64, heading_true: f64) -> f64 {
    let sum = true_angle + heading_true;
    if sum.is_finite() {
        normalize_degrees(sum)
    } else {
        f64::NAN
    }
}

// Starboard-side solution for an apparent angle in (0, 180)
fn starboard_angle(theta_deg: f64, apparent_speed: f64, boat_speed: f64) -> f64 {
    let theta = theta_deg.to_radians();
    let along = apparent_speed * theta.cos() - boat_speed;
    let across = apparent_speed * theta.sin();
    90.0 - (along / across).atan().to_degrees()
}

fn law_of_cosines(apparent: ApparentWind, boat_speed: f64) -> (f64, f64) {
    let theta_deg = normalize_degrees(apparent.angle);
    let v = apparent.speed;
    let theta = theta_deg.to_radians();

    let along = v * theta.cos() - boat_speed;
    let across = v * theta.sin();
    let speed = (along * along + across * across).sqrt();

    let angle = if theta_deg == 0.0 {
        // Dead ahead: no lateral component, the result is on the centreline
        if v >= boat_speed {
            0.0
        } else {
            180.0
        }
    } else if theta_deg == 180.0 {
        180.0
    } else if theta_deg < 180.0 {
        starboard_angle(theta_deg, v, boat_speed)
    } else {
        360.0 - starboard_angle(180.0 - (theta_deg - 180.0), v, boat_speed)
    };

    (normalize_degrees(angle), speed)
}

fn vector(apparent: ApparentWind, boat_speed: f64, heading_true: f64) -> (f64, f64) {
    let heading = if heading_true.is_finite() {
        heading_true
    } else {
        0.0
    };

    // (north, east) components of the direction the wind comes from
    let apparent_bearing = (apparent.angle + heading).to_radians();
    let apparent_from =
        Vector2::new(apparent_bearing.cos(), apparent_bearing.sin()) * apparent.speed;

    // Motion through still air shows up as wind from dead ahead
    let heading_rad = heading.to_radians();
    let induced = Vector2::new(heading_rad.cos(), heading_rad.sin()) * boat_speed;

    let true_from = apparent_from - induced;
    let speed = true_from.norm();
    if speed == 0.0 {
        return (0.0, 0.0);
    }

    let direction = true_from[1].atan2(true_from[0]).to_degrees();
    (normalize_degrees(direction - heading), speed)
}
