//! Angle normalization
//!
//! Every bearing, heading and wind angle in the crate goes through
//! [`normalize_degrees`] so that wraparound is handled identically everywhere.

/// Normalize an angle in degrees into `[0, 360)`.
///
/// Negative angles are rotated into range, values of 360 or more wrap around.
/// NaN (and infinities) normalize to 0.
#[inline]
pub fn normalize_degrees(angle: f64) -> f64 {
    if !angle.is_finite() {
        return 0.0;
    }
    let normalized = angle.rem_euclid(360.0);
    // rem_euclid can round tiny negative angles up to exactly 360
    if normalized >= 360.0 {
        0.0
    } else {
        normalized
    }
}

/// Normalize a sensor reading, keeping NaN as the "not available" marker.
///
/// Finite readings are normalized with [`normalize_degrees`].
#[inline]
pub fn normalize_reading(angle: f64) -> f64 {
    if angle.is_nan() {
        angle
    } else {
        normalize_degrees(angle)
    }
}
