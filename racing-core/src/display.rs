//! Display strings
//!
//! Turns numbers into the short labels shown on the racing window and gauges.
//! Anything unavailable becomes a placeholder instead of `NaN`.

use crate::geodesy::NAUTICAL_MILE;
use crate::start_line::CrossingPrediction;

/// Marks not pinged yet
pub const AWAITING_MARKS: &str = "<->";
/// Course crosses the line but the vessel is not making way
pub const NOT_CLOSING: &str = "...";
/// Course meets the line extension beyond a mark
pub const OUTSIDE_LINE: &str = "---";
/// Course never meets the line
pub const DOES_NOT_CROSS: &str = "xxx";
/// Prefix for an unavailable value, followed by its units
pub const UNAVAILABLE: &str = "--";

/// Gauge value with one decimal, `-- <units>` when unavailable
pub fn format_value(value: f64, units: &str) -> String {
    if value.is_finite() {
        format!("{:.1} {}", value, units)
    } else {
        format!("{} {}", UNAVAILABLE, units)
    }
}

/// Nautical miles shown as metres
pub fn format_distance(nautical_miles: f64) -> String {
    if nautical_miles.is_finite() {
        format!("{:.2} m", nautical_miles * NAUTICAL_MILE)
    } else {
        format!("{} m", UNAVAILABLE)
    }
}

/// Hours shown as seconds
pub fn format_time_to_go(hours: f64) -> String {
    if hours.is_finite() {
        format!("{:.2} s", hours * 3600.0)
    } else {
        format!("{} s", UNAVAILABLE)
    }
}

pub fn format_speed(knots: f64) -> String {
    if knots.is_finite() {
        format!("{:.2} Kts", knots)
    } else {
        format!("{} Kts", UNAVAILABLE)
    }
}

/// Whole degrees, `-- °` when unavailable
pub fn format_angle(degrees: f64) -> String {
    if degrees.is_finite() {
        format!("{:.0}°", degrees)
    } else {
        format!("{} °", UNAVAILABLE)
    }
}

/// Distance and time-to-go labels for a crossing prediction
///
/// The distance label is blank when there is nothing to measure against.
pub fn crossing_labels(prediction: &CrossingPrediction) -> (String, String) {
    let distance = prediction
        .distance()
        .map(format_distance)
        .unwrap_or_default();

    let time_to_go = match prediction {
        CrossingPrediction::AwaitingMarks { .. } => AWAITING_MARKS.to_string(),
        CrossingPrediction::DoesNotCross { .. } => DOES_NOT_CROSS.to_string(),
        CrossingPrediction::CrossesOutsideLine { .. } => OUTSIDE_LINE.to_string(),
        CrossingPrediction::NotClosing { .. } => NOT_CLOSING.to_string(),
        CrossingPrediction::Crossing {
            time_to_go_hours, ..
        } => format_time_to_go(*time_to_go_hours),
    };

    (distance, time_to_go)
}
