//! Vessel and wind state
//!
//! Latest instrument samples as consumed from the host. Values that have not
//! been received yet, or that the host reports as unavailable, are NaN.
//! Angles are normalized into [0, 360) when written.

use serde::{Deserialize, Serialize};

use crate::angle::{normalize_degrees, normalize_reading};
use crate::geodesy::GeoPoint;
use crate::true_wind::{true_direction, ApparentWind, TrueWind};

fn unavailable() -> f64 {
    f64::NAN
}

// =============================================================================
// Vessel state
// =============================================================================

/// Own ship navigation state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VesselState {
    pub position: GeoPoint,
    /// Course over ground, degrees true
    pub course_over_ground: f64,
    /// Speed over ground, knots
    pub speed_over_ground: f64,
    /// Degrees
    pub heading_true: f64,
    /// Degrees
    pub heading_magnetic: f64,
    /// Speed through water, knots
    pub boat_speed: f64,
    /// Metres
    pub water_depth: f64,
    /// Bearing to the active waypoint, degrees true. NaN without an active leg.
    pub waypoint_bearing: f64,
}

impl Default for VesselState {
    fn default() -> Self {
        VesselState {
            position: GeoPoint::unavailable(),
            course_over_ground: f64::NAN,
            speed_over_ground: f64::NAN,
            heading_true: f64::NAN,
            heading_magnetic: f64::NAN,
            boat_speed: f64::NAN,
            water_depth: f64::NAN,
            waypoint_bearing: f64::NAN,
        }
    }
}

// =============================================================================
// Wind sample
// =============================================================================

/// Apparent and derived true wind
///
/// Wind angles pass through [`normalize_degrees`] on write, so an unavailable
/// angle reads as 0. Check the matching speed for availability. The true
/// direction also needs a true heading and stays NaN without one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindSample {
    pub apparent_angle: f64,
    pub apparent_speed: f64,
    pub true_angle: f64,
    pub true_speed: f64,
    pub true_direction: f64,
}

impl Default for WindSample {
    fn default() -> Self {
        WindSample {
            apparent_angle: 0.0,
            apparent_speed: f64::NAN,
            true_angle: 0.0,
            true_speed: f64::NAN,
            true_direction: f64::NAN,
        }
    }
}

impl WindSample {
    pub fn set_apparent(&mut self, angle: f64, speed: f64) {
        self.apparent_angle = normalize_degrees(angle);
        self.apparent_speed = speed;
    }

    /// Store a solver result. Direction is recomputed from `heading_true`.
    pub fn set_true(&mut self, wind: &TrueWind, heading_true: f64) {
        self.true_angle = normalize_degrees(wind.angle);
        self.true_speed = wind.speed;
        self.true_direction = if self.has_true_wind() {
            true_direction(self.true_angle, heading_true)
        } else {
            f64::NAN
        };
    }

    pub fn apparent(&self) -> ApparentWind {
        ApparentWind {
            angle: self.apparent_angle,
            speed: self.apparent_speed,
        }
    }

    pub fn has_true_wind(&self) -> bool {
        self.true_speed.is_finite()
    }
}

// =============================================================================
// Instrument updates
// =============================================================================

/// One parsed instrument sample from the host
///
/// Headings and courses are degrees, speeds knots, depth metres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum InstrumentUpdate {
    Position {
        latitude: f64,
        longitude: f64,
    },
    Course {
        cog: f64,
        sog: f64,
    },
    Heading {
        hdt: f64,
        #[serde(default = "unavailable")]
        hdm: f64,
    },
    BoatSpeed {
        speed: f64,
    },
    WaterDepth {
        depth: f64,
    },
    ApparentWind {
        angle: f64,
        speed: f64,
    },
    /// Combined GNSS fix, as sent by a single position source
    PositionFix {
        latitude: f64,
        longitude: f64,
        cog: f64,
        sog: f64,
        #[serde(default = "unavailable")]
        hdt: f64,
        #[serde(default = "unavailable")]
        hdm: f64,
    },
    /// Route or waypoint navigation in progress
    ActiveLeg {
        bearing: f64,
    },
    ActiveLegCleared,
}

/// Latest-value store for instrument samples
#[derive(Debug, Clone, Default)]
pub struct InstrumentAggregator {
    vessel: VesselState,
    wind: WindSample,
}

impl InstrumentAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vessel(&self) -> &VesselState {
        &self.vessel
    }

    pub fn wind(&self) -> &WindSample {
        &self.wind
    }

    pub fn wind_mut(&mut self) -> &mut WindSample {
        &mut self.wind
    }

    /// Apply one update, overwriting the fields it carries
    pub fn apply(&mut self, update: &InstrumentUpdate) {
        let vessel = &mut self.vessel;
        match *update {
            InstrumentUpdate::Position {
                latitude,
                longitude,
            } => {
                vessel.position = GeoPoint::new(latitude, longitude);
            }
            InstrumentUpdate::Course { cog, sog } => {
                vessel.course_over_ground = normalize_reading(cog);
                vessel.speed_over_ground = sog;
            }
            InstrumentUpdate::Heading { hdt, hdm } => {
                vessel.heading_true = normalize_reading(hdt);
                vessel.heading_magnetic = normalize_reading(hdm);
            }
            InstrumentUpdate::BoatSpeed { speed } => {
                vessel.boat_speed = speed;
            }
            InstrumentUpdate::WaterDepth { depth } => {
                vessel.water_depth = depth;
            }
            InstrumentUpdate::ApparentWind { angle, speed } => {
                self.wind.set_apparent(angle, speed);
            }
            InstrumentUpdate::PositionFix {
                latitude,
                longitude,
                cog,
                sog,
                hdt,
                hdm,
            } => {
                vessel.position = GeoPoint::new(latitude, longitude);
                vessel.course_over_ground = normalize_reading(cog);
                vessel.speed_over_ground = sog;
                // A fix without heading leaves the compass values untouched
                if !hdt.is_nan() {
                    vessel.heading_true = normalize_reading(hdt);
                }
                if !hdm.is_nan() {
                    vessel.heading_magnetic = normalize_reading(hdm);
                }
            }
            InstrumentUpdate::ActiveLeg { bearing } => {
                vessel.waypoint_bearing = normalize_reading(bearing);
            }
            InstrumentUpdate::ActiveLegCleared => {
                vessel.waypoint_bearing = f64::NAN;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_unavailable() {
        let agg = InstrumentAggregator::new();
        assert!(!agg.vessel().position.is_finite());
        assert!(agg.vessel().heading_true.is_nan());
        assert!(!agg.wind().has_true_wind());
        assert_eq!(agg.wind().true_angle, 0.0);
    }

    #[test]
    fn test_apply_normalizes_angles() {
        let mut agg = InstrumentAggregator::new();
        agg.apply(&InstrumentUpdate::Heading { hdt: -10.0, hdm: 365.0 });
        agg.apply(&InstrumentUpdate::Course { cog: 720.0, sog: 4.2 });
        agg.apply(&InstrumentUpdate::ApparentWind { angle: -45.0, speed: 12.0 });

        assert_eq!(agg.vessel().heading_true, 350.0);
        assert_eq!(agg.vessel().heading_magnetic, 5.0);
        assert_eq!(agg.vessel().course_over_ground, 0.0);
        assert_eq!(agg.vessel().speed_over_ground, 4.2);
        assert_eq!(agg.wind().apparent_angle, 315.0);
        assert_eq!(agg.wind().apparent_speed, 12.0);
    }

    #[test]
    fn test_position_fix_keeps_heading_when_absent() {
        let mut agg = InstrumentAggregator::new();
        agg.apply(&InstrumentUpdate::Heading { hdt: 80.0, hdm: 78.0 });
        agg.apply(&InstrumentUpdate::PositionFix {
            latitude: 43.7,
            longitude: 7.4,
            cog: 90.0,
            sog: 5.0,
            hdt: f64::NAN,
            hdm: f64::NAN,
        });
        assert_eq!(agg.vessel().position, GeoPoint::new(43.7, 7.4));
        assert_eq!(agg.vessel().heading_true, 80.0);
        assert_eq!(agg.vessel().heading_magnetic, 78.0);
    }

    #[test]
    fn test_active_leg() {
        let mut agg = InstrumentAggregator::new();
        assert!(agg.vessel().waypoint_bearing.is_nan());

        agg.apply(&InstrumentUpdate::ActiveLeg { bearing: -20.0 });
        assert_eq!(agg.vessel().waypoint_bearing, 340.0);

        let update: InstrumentUpdate =
            serde_json::from_str(r#"{"type":"activeLegCleared"}"#).unwrap();
        assert_eq!(update, InstrumentUpdate::ActiveLegCleared);
        agg.apply(&update);
        assert!(agg.vessel().waypoint_bearing.is_nan());
    }

    #[test]
    fn test_wind_sample_true_direction() {
        let mut wind = WindSample::default();
        let tw = TrueWind {
            angle: 300.0,
            speed: 14.0,
            direction: f64::NAN,
        };
        wind.set_true(&tw, 90.0);
        assert_eq!(wind.true_angle, 300.0);
        assert_eq!(wind.true_direction, 30.0);

        // No true heading, no direction
        wind.set_true(&tw, f64::NAN);
        assert_eq!(wind.true_angle, 300.0);
        assert!(wind.true_direction.is_nan());

        // Unavailable angle normalizes to 0
        wind.set_true(&TrueWind::unavailable(), 90.0);
        assert_eq!(wind.true_angle, 0.0);
        assert!(!wind.has_true_wind());
        assert!(wind.true_direction.is_nan());
    }

    #[test]
    fn test_update_deserialize() {
        let update: InstrumentUpdate =
            serde_json::from_str(r#"{"type":"apparentWind","angle":30.0,"speed":11.5}"#).unwrap();
        assert_eq!(
            update,
            InstrumentUpdate::ApparentWind {
                angle: 30.0,
                speed: 11.5
            }
        );

        let update: InstrumentUpdate = serde_json::from_str(r#"{"type":"heading","hdt":12.0}"#).unwrap();
        match update {
            InstrumentUpdate::Heading { hdt, hdm } => {
                assert_eq!(hdt, 12.0);
                assert!(hdm.is_nan());
            }
            other => panic!("unexpected {:?}", other),
        }

        let update: InstrumentUpdate = serde_json::from_str(
            r#"{"type":"positionFix","latitude":1.0,"longitude":2.0,"cog":3.0,"sog":4.0}"#,
        )
        .unwrap();
        assert!(matches!(update, InstrumentUpdate::PositionFix { .. }));
    }
}
