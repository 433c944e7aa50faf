//! Start line
//!
//! The line is defined by two marks, each captured by "pinging" the vessel's
//! position as it passes the committee boat (starboard end) or the pin
//! (port end). Once both marks are known the line bearing is fixed and every
//! tick predicts where, and whether, the vessel's current course crosses it.
//!
//! ```text
//!   NoMarksPinged ──ping──▶ OneMarkPinged ──ping other──▶ BothMarksPinged
//!         ▲                      │  ▲                        │
//!         │                      └──┘ re-ping same mark      └─┐ re-ping
//!         └────────────────────── reset ◀──────────────────────┘ (moves mark)
//! ```

use serde::{Deserialize, Serialize};

use crate::geodesy::{intersection, within_segment_band, GeoPoint};
use crate::vessel::VesselState;

/// Which end of the line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Mark {
    Port,
    Starboard,
}

impl std::fmt::Display for Mark {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mark::Port => write!(f, "port"),
            Mark::Starboard => write!(f, "starboard"),
        }
    }
}

/// How much of the line is known
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LineState {
    #[default]
    NoMarksPinged,
    OneMarkPinged,
    BothMarksPinged,
}

/// Per-tick crossing prediction
///
/// Distances are nautical miles, time to go is hours.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum CrossingPrediction {
    /// Line not fully defined yet
    AwaitingMarks {
        distance_to_starboard: Option<f64>,
    },
    /// Current course never meets the line ahead
    DoesNotCross { distance_to_starboard: f64 },
    /// Course meets the extension of the line, beyond one of the marks
    CrossesOutsideLine { distance_to_starboard: f64 },
    /// Course crosses the line but the vessel is not making way
    NotClosing {
        intersection: GeoPoint,
        distance: f64,
    },
    Crossing {
        intersection: GeoPoint,
        distance: f64,
        time_to_go_hours: f64,
    },
}

impl CrossingPrediction {
    /// Distance shown to the crew: to the crossing point when there is one,
    /// otherwise to the starboard mark.
    pub fn distance(&self) -> Option<f64> {
        match *self {
            CrossingPrediction::AwaitingMarks {
                distance_to_starboard,
            } => distance_to_starboard,
            CrossingPrediction::DoesNotCross {
                distance_to_starboard,
            }
            | CrossingPrediction::CrossesOutsideLine {
                distance_to_starboard,
            } => Some(distance_to_starboard),
            CrossingPrediction::NotClosing { distance, .. }
            | CrossingPrediction::Crossing { distance, .. } => Some(distance),
        }
    }

    pub fn time_to_go_hours(&self) -> Option<f64> {
        match *self {
            CrossingPrediction::Crossing {
                time_to_go_hours, ..
            } => Some(time_to_go_hours),
            _ => None,
        }
    }
}

/// The start line and its two marks
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartLine {
    port_mark: Option<GeoPoint>,
    starboard_mark: Option<GeoPoint>,
    /// Starboard to port, degrees true
    bearing: Option<f64>,
}

impl StartLine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> LineState {
        match (self.port_mark, self.starboard_mark) {
            (None, None) => LineState::NoMarksPinged,
            (Some(_), Some(_)) => LineState::BothMarksPinged,
            _ => LineState::OneMarkPinged,
        }
    }

    pub fn port_mark(&self) -> Option<GeoPoint> {
        self.port_mark
    }

    pub fn starboard_mark(&self) -> Option<GeoPoint> {
        self.starboard_mark
    }

    pub fn is_pinged(&self, mark: Mark) -> bool {
        match mark {
            Mark::Port => self.port_mark.is_some(),
            Mark::Starboard => self.starboard_mark.is_some(),
        }
    }

    /// Line bearing from the starboard mark to the port mark. Only valid
    /// once both marks are pinged.
    pub fn bearing(&self) -> Option<f64> {
        self.bearing
    }

    /// Line length in nautical miles
    pub fn length(&self) -> Option<f64> {
        match (self.starboard_mark, self.port_mark) {
            (Some(stbd), Some(port)) => Some(stbd.distance_to(&port)),
            _ => None,
        }
    }

    /// Record `position` as the given mark, replacing any earlier ping.
    pub fn ping(&mut self, mark: Mark, position: GeoPoint) -> LineState {
        match mark {
            Mark::Port => self.port_mark = Some(position),
            Mark::Starboard => self.starboard_mark = Some(position),
        }
        self.bearing = match (self.starboard_mark, self.port_mark) {
            (Some(stbd), Some(port)) => Some(stbd.bearing_to(&port)),
            _ => None,
        };
        self.state()
    }

    pub fn reset(&mut self) {
        *self = StartLine::default();
    }

    /// Predict the crossing for the vessel's current position and course.
    pub fn predict(&self, vessel: &VesselState) -> CrossingPrediction {
        let position = vessel.position;

        let (stbd, port, line_bearing) = match (self.starboard_mark, self.port_mark, self.bearing) {
            (Some(stbd), Some(port), Some(bearing)) => (stbd, port, bearing),
            _ => {
                return CrossingPrediction::AwaitingMarks {
                    distance_to_starboard: self
                        .starboard_mark
                        .map(|stbd| position.distance_to(&stbd)),
                }
            }
        };

        let distance_to_starboard = position.distance_to(&stbd);

        let Some(crossing) = intersection(&stbd, line_bearing, &position, vessel.course_over_ground)
        else {
            return CrossingPrediction::DoesNotCross {
                distance_to_starboard,
            };
        };

        if !within_segment_band(&crossing, &port, &stbd) {
            return CrossingPrediction::CrossesOutsideLine {
                distance_to_starboard,
            };
        }

        let distance = position.distance_to(&crossing);
        let sog = vessel.speed_over_ground;
        if sog.is_finite() && sog > 0.0 && distance.is_finite() {
            CrossingPrediction::Crossing {
                intersection: crossing,
                distance,
                time_to_go_hours: distance / sog,
            }
        } else {
            CrossingPrediction::NotClosing {
                intersection: crossing,
                distance,
            }
        }
    }
}
