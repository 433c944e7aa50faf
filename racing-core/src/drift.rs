//! Drift Estimator
//!
//! Compares where the vessel would be in one hour by dead reckoning
//! (heading true and speed through water) with where it would be following
//! its observed course and speed over ground. The vector between the two is
//! the set and drift of the current.
//!
//! Leeway and heel are ignored, so on a beat the estimate includes leeway.

use serde::{Deserialize, Serialize};

use crate::geodesy::{bearing_between, haversine_distance, project, GeoPoint};

/// Set and drift of the current
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriftEstimate {
    /// Direction the current sets towards, degrees true
    pub angle: f64,
    /// Current speed, knots
    pub speed: f64,
}

impl DriftEstimate {
    pub fn unavailable() -> Self {
        DriftEstimate {
            angle: f64::NAN,
            speed: f64::NAN,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.angle.is_finite() && self.speed.is_finite()
    }
}

/// Estimate drift from one instantaneous sample.
///
/// Both projections cover one hour, so the distance in nautical miles between
/// them equals the current's speed in knots.
pub fn estimate_drift(
    position: &GeoPoint,
    heading_true: f64,
    boat_speed: f64,
    course_over_ground: f64,
    speed_over_ground: f64,
) -> DriftEstimate {
    let inputs = [
        heading_true,
        boat_speed,
        course_over_ground,
        speed_over_ground,
    ];
    if !position.is_finite() || inputs.iter().any(|v| !v.is_finite()) {
        return DriftEstimate::unavailable();
    }

    let dead_reckoning = project(position, heading_true, boat_speed);
    let over_ground = project(position, course_over_ground, speed_over_ground);

    let speed = haversine_distance(&dead_reckoning, &over_ground);
    // Direction is meaningless without any current
    let angle = if speed > 0.0 {
        bearing_between(&dead_reckoning, &over_ground)
    } else {
        0.0
    };

    DriftEstimate { angle, speed }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn here() -> GeoPoint {
        GeoPoint::new(50.8, -1.3)
    }

    #[test]
    fn test_no_current() {
        let drift = estimate_drift(&here(), 45.0, 6.0, 45.0, 6.0);
        assert!(drift.speed < 1e-9);
        assert_eq!(drift.angle, 0.0);
    }

    #[test]
    fn test_following_current() {
        // Over ground faster than through water on the same heading
        let drift = estimate_drift(&here(), 90.0, 5.0, 90.0, 6.5);
        assert!((drift.speed - 1.5).abs() < 1e-3, "{}", drift.speed);
        assert!((drift.angle - 90.0).abs() < 1.0, "{}", drift.angle);
    }

    #[test]
    fn test_cross_current() {
        // Heading north at 5, pushed east: COG swings to starboard
        let cog = (1.0_f64).atan2(5.0).to_degrees();
        let sog = 26.0_f64.sqrt();
        let drift = estimate_drift(&here(), 0.0, 5.0, cog, sog);
        assert!((drift.speed - 1.0).abs() < 0.01, "{}", drift.speed);
        assert!((drift.angle - 90.0).abs() < 1.0, "{}", drift.angle);
    }

    #[test]
    fn test_unavailable() {
        assert!(!estimate_drift(&here(), f64::NAN, 5.0, 0.0, 5.0).is_finite());
        assert!(!estimate_drift(&GeoPoint::unavailable(), 0.0, 5.0, 0.0, 5.0).is_finite());
        assert!(estimate_drift(&here(), 0.0, 5.0, 0.0, f64::NAN).speed.is_nan());
    }
}
