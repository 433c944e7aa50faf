//! Racing engine
//!
//! Single owner of all racing state. The host feeds it instrument updates and
//! user actions as they arrive and calls [`RacingEngine::tick`] once per
//! second; each tick returns a self-contained [`TickReport`] snapshot.
//!
//! The engine does no I/O and never blocks.

use serde::{Deserialize, Serialize};

use crate::countdown::CountdownTimer;
use crate::display::{self, crossing_labels};
use crate::drift::{estimate_drift, DriftEstimate};
use crate::error::RacingError;
use crate::geodesy::GeoPoint;
use crate::nmea::{outbound_messages, OutboundMessage};
use crate::settings::RacingSettings;
use crate::start_line::{CrossingPrediction, LineState, Mark, StartLine};
use crate::vessel::{InstrumentAggregator, InstrumentUpdate, VesselState, WindSample};

/// Button presses from the crew
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UserAction {
    PingPort,
    PingStarboard,
    StartTimer,
    ResetTimer,
}

/// Start line geometry for the host to draw
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartLineGeometry {
    pub state: LineState,
    pub port_mark: Option<GeoPoint>,
    pub starboard_mark: Option<GeoPoint>,
    /// Starboard to port, degrees true
    pub bearing: Option<f64>,
    /// Nautical miles
    pub length: Option<f64>,
}

impl From<&StartLine> for StartLineGeometry {
    fn from(line: &StartLine) -> Self {
        StartLineGeometry {
            state: line.state(),
            port_mark: line.port_mark(),
            starboard_mark: line.starboard_mark(),
            bearing: line.bearing(),
            length: line.length(),
        }
    }
}

/// Formatted labels, ready to show
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayLabels {
    pub timer: String,
    pub speed_over_ground: String,
    pub distance: String,
    pub time_to_go: String,
    pub true_wind_angle: String,
    pub true_wind_speed: String,
    pub true_wind_direction: String,
    pub drift_angle: String,
    pub drift_speed: String,
    pub vmg: String,
    pub water_depth: String,
    pub waypoint_bearing: String,
}

/// Everything the host needs after one tick
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TickReport {
    /// Ticks since the engine was created
    pub sequence: u64,
    pub timer_seconds: i64,
    pub timer_running: bool,
    pub vessel: VesselState,
    pub wind: WindSample,
    pub drift: DriftEstimate,
    /// Velocity made good to windward, knots
    pub vmg: f64,
    /// Bearing to the active waypoint, `None` without an active leg
    pub waypoint_bearing: Option<f64>,
    pub crossing: CrossingPrediction,
    pub start_line: StartLineGeometry,
    pub display: DisplayLabels,
    pub outbound: Vec<OutboundMessage>,
}

impl TickReport {
    /// Compact single-line JSON, non-finite numbers become `null`
    pub fn to_json_line(&self) -> Result<String, RacingError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Velocity made good towards the true wind
pub fn velocity_made_good(boat_speed: f64, true_wind_angle: f64) -> f64 {
    boat_speed * true_wind_angle.to_radians().cos()
}

pub struct RacingEngine {
    settings: RacingSettings,
    instruments: InstrumentAggregator,
    start_line: StartLine,
    timer: CountdownTimer,
    /// NMEA 2000 sequence identifier, wraps at 255
    sid: u8,
    sequence: u64,
}

impl Default for RacingEngine {
    fn default() -> Self {
        RacingEngine::new(RacingSettings::default())
    }
}

impl RacingEngine {
    pub fn new(settings: RacingSettings) -> Self {
        RacingEngine {
            timer: CountdownTimer::new(settings.start_timer_seconds),
            settings,
            instruments: InstrumentAggregator::new(),
            start_line: StartLine::new(),
            sid: 0,
            sequence: 0,
        }
    }

    pub fn settings(&self) -> &RacingSettings {
        &self.settings
    }

    /// Replace the settings. The new timer length applies from the next
    /// start or reset.
    pub fn set_settings(&mut self, settings: RacingSettings) -> Result<(), RacingError> {
        settings.validate()?;
        self.timer.set_default(settings.start_timer_seconds);
        self.settings = settings;
        Ok(())
    }

    pub fn vessel(&self) -> &VesselState {
        self.instruments.vessel()
    }

    pub fn wind(&self) -> &WindSample {
        self.instruments.wind()
    }

    pub fn start_line(&self) -> &StartLine {
        &self.start_line
    }

    pub fn timer(&self) -> &CountdownTimer {
        &self.timer
    }

    pub fn apply(&mut self, update: &InstrumentUpdate) {
        self.instruments.apply(update);
    }

    /// Handle a crew action. Pings capture the current position as is,
    /// even when no fix has been received.
    pub fn command(&mut self, action: UserAction) {
        let position = self.instruments.vessel().position;
        match action {
            UserAction::PingPort => {
                self.start_line.ping(Mark::Port, position);
            }
            UserAction::PingStarboard => {
                self.start_line.ping(Mark::Starboard, position);
            }
            UserAction::StartTimer => self.timer.start(),
            UserAction::ResetTimer => self.timer.reset(),
        }
    }

    /// Reset the start line to no marks
    pub fn clear_start_line(&mut self) {
        self.start_line.reset();
    }

    /// Advance one second and produce the report for this tick
    pub fn tick(&mut self) -> Result<TickReport, RacingError> {
        self.sequence += 1;
        self.timer.tick();

        let vessel = *self.instruments.vessel();

        let true_wind = self.settings.true_wind_strategy.solve(
            self.instruments.wind().apparent(),
            vessel.boat_speed,
            vessel.heading_true,
        );
        self.instruments
            .wind_mut()
            .set_true(&true_wind, vessel.heading_true);
        let wind = *self.instruments.wind();

        let drift = estimate_drift(
            &vessel.position,
            vessel.heading_true,
            vessel.boat_speed,
            vessel.course_over_ground,
            vessel.speed_over_ground,
        );

        let vmg = if wind.has_true_wind() {
            velocity_made_good(vessel.boat_speed, wind.true_angle)
        } else {
            f64::NAN
        };

        let waypoint_bearing = Some(vessel.waypoint_bearing).filter(|b| b.is_finite());

        let crossing = self.start_line.predict(&vessel);

        let outbound = outbound_messages(&self.settings, &wind, self.sid)?;
        if !outbound.is_empty() {
            self.sid = self.sid.wrapping_add(1);
        }

        let display = self.labels(&vessel, &wind, &drift, vmg, &crossing);

        Ok(TickReport {
            sequence: self.sequence,
            timer_seconds: self.timer.total_seconds(),
            timer_running: self.timer.is_running(),
            vessel,
            wind,
            drift,
            vmg,
            waypoint_bearing,
            crossing,
            start_line: StartLineGeometry::from(&self.start_line),
            display,
            outbound,
        })
    }

    fn labels(
        &self,
        vessel: &VesselState,
        wind: &WindSample,
        drift: &DriftEstimate,
        vmg: f64,
        crossing: &CrossingPrediction,
    ) -> DisplayLabels {
        let (distance, time_to_go) = crossing_labels(crossing);

        // Wind angles read 0 when unavailable, so gate them on the speed
        let (twa, tws, twd) = if wind.has_true_wind() {
            (wind.true_angle, wind.true_speed, wind.true_direction)
        } else {
            (f64::NAN, f64::NAN, f64::NAN)
        };

        DisplayLabels {
            timer: self.timer.format(),
            speed_over_ground: display::format_speed(vessel.speed_over_ground),
            distance,
            time_to_go,
            true_wind_angle: display::format_angle(twa),
            true_wind_speed: display::format_value(tws, "Kts"),
            true_wind_direction: display::format_angle(twd),
            drift_angle: display::format_angle(drift.angle),
            drift_speed: display::format_value(drift.speed, "Kts"),
            vmg: display::format_value(vmg, "Kts"),
            water_depth: display::format_value(vessel.water_depth, "m"),
            waypoint_bearing: display::format_angle(vessel.waypoint_bearing),
        }
    }
}
