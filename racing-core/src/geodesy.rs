//! Great-circle geometry
//!
//! Pure functions on a spherical Earth with a fixed radius of 3440 nautical
//! miles. No ellipsoidal correction is applied. Positions are in decimal
//! degrees at the API boundary and radians internally.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;

use crate::angle::normalize_degrees;

/// Earth radius in nautical miles
pub const EARTH_RADIUS_NM: f64 = 3440.0;
/// Metres in one nautical mile
pub const NAUTICAL_MILE: f64 = 1852.0;
/// Knots to metres per second
pub const KN_TO_MS: f64 = NAUTICAL_MILE / 3600.0;

// Below this both paths are treated as lying on one great circle
const COLLINEAR_EPSILON: f64 = 1e-12;

/// A position in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        GeoPoint {
            latitude,
            longitude,
        }
    }

    /// Position with both coordinates unavailable
    pub fn unavailable() -> Self {
        GeoPoint::new(f64::NAN, f64::NAN)
    }

    pub fn is_finite(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }

    /// Initial great-circle bearing to `other`, see [`bearing_between`]
    pub fn bearing_to(&self, other: &GeoPoint) -> f64 {
        bearing_between(self, other)
    }

    /// Haversine distance to `other` in nautical miles
    pub fn distance_to(&self, other: &GeoPoint) -> f64 {
        haversine_distance(self, other)
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}°, {:.6}°)", self.latitude, self.longitude)
    }
}

#[inline]
fn clamp_unit(value: f64) -> f64 {
    value.clamp(-1.0, 1.0)
}

/// Wrap a longitude in degrees into [-180, 180)
#[inline]
fn wrap_longitude(longitude: f64) -> f64 {
    (longitude + 180.0).rem_euclid(360.0) - 180.0
}

/// Initial bearing from `from` to `to` in degrees, normalized to [0, 360).
///
/// Coincident points are degenerate: `atan2(0, 0)` gives 0, so the result is
/// north rather than an error.
pub fn bearing_between(from: &GeoPoint, to: &GeoPoint) -> f64 {
    let lat1 = from.latitude.to_radians();
    let lat2 = to.latitude.to_radians();
    let delta_lon = (to.longitude - from.longitude).to_radians();

    let y = delta_lon.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * delta_lon.cos();

    let z = y.atan2(x).to_degrees();
    // NaN must survive so that unavailable positions stay unavailable
    if z.is_nan() {
        return z;
    }
    normalize_degrees(z + 360.0)
}

/// Distance between two points in nautical miles using the Haversine formula.
/// See <https://www.movable-type.co.uk/scripts/latlong.html>
pub fn haversine_distance(p1: &GeoPoint, p2: &GeoPoint) -> f64 {
    let delta_lat = (p1.latitude - p2.latitude).to_radians();
    let delta_lon = (p1.longitude - p2.longitude).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + p1.latitude.to_radians().cos()
            * p2.latitude.to_radians().cos()
            * (delta_lon / 2.0).sin().powi(2);
    let a = a.clamp(0.0, 1.0);

    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_NM * c
}

/// Project a position forward along a great circle.
///
/// * `bearing` - initial bearing in degrees
/// * `distance` - distance in nautical miles
pub fn project(start: &GeoPoint, bearing: f64, distance: f64) -> GeoPoint {
    let lat1 = start.latitude.to_radians();
    let lon1 = start.longitude.to_radians();
    let brng = bearing.to_radians();
    let angular_distance = distance / EARTH_RADIUS_NM;

    let lat2 = clamp_unit(
        lat1.sin() * angular_distance.cos()
            + lat1.cos() * angular_distance.sin() * brng.cos(),
    )
    .asin();

    let lon2 = lon1
        + (brng.sin() * angular_distance.sin() * lat1.cos())
            .atan2(angular_distance.cos() - lat1.sin() * lat2.sin());

    GeoPoint::new(lat2.to_degrees(), wrap_longitude(lon2.to_degrees()))
}

/// Point where the great-circle path from `p1` on `bearing1` crosses the path
/// from `p2` on `bearing2`.
///
/// Returns `None` when there is no usable intersection:
/// - `p1` and `p2` coincide
/// - both paths run along the same great circle (infinite intersections)
/// - the paths only meet behind one of the starting points (ambiguous)
///
/// See <https://www.edwilliams.org/avform.htm#Intersection>
pub fn intersection(
    p1: &GeoPoint,
    bearing1: f64,
    p2: &GeoPoint,
    bearing2: f64,
) -> Option<GeoPoint> {
    if !p1.is_finite() || !p2.is_finite() || !bearing1.is_finite() || !bearing2.is_finite() {
        return None;
    }

    let lat1 = p1.latitude.to_radians();
    let lon1 = p1.longitude.to_radians();
    let lat2 = p2.latitude.to_radians();
    let lon2 = p2.longitude.to_radians();
    let brng13 = bearing1.to_radians();
    let brng23 = bearing2.to_radians();
    let delta_lat = lat2 - lat1;
    let delta_lon = lon2 - lon1;

    // Angular distance p1 - p2
    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lon / 2.0).sin().powi(2);
    let delta12 = 2.0 * clamp_unit(a.sqrt()).asin();

    if delta12.abs() < f64::EPSILON {
        return None;
    }

    // Initial and final bearings between the two starting points
    let cos_theta_a = (lat2.sin() - lat1.sin() * delta12.cos()) / (delta12.sin() * lat1.cos());
    let cos_theta_b = (lat1.sin() - lat2.sin() * delta12.cos()) / (delta12.sin() * lat2.cos());
    let theta_a = clamp_unit(cos_theta_a).acos();
    let theta_b = clamp_unit(cos_theta_b).acos();

    let (brng12, brng21) = if delta_lon.sin() > 0.0 {
        (theta_a, 2.0 * PI - theta_b)
    } else {
        (2.0 * PI - theta_a, theta_b)
    };

    let alpha1 = brng13 - brng12; // angle 2-1-3
    let alpha2 = brng21 - brng23; // angle 1-2-3

    if alpha1.sin().abs() < COLLINEAR_EPSILON && alpha2.sin().abs() < COLLINEAR_EPSILON {
        return None;
    }
    if alpha1.sin() * alpha2.sin() < 0.0 {
        return None;
    }

    let cos_alpha3 =
        -alpha1.cos() * alpha2.cos() + alpha1.sin() * alpha2.sin() * delta12.cos();

    let delta13 = (delta12.sin() * alpha1.sin() * alpha2.sin())
        .atan2(alpha2.cos() + alpha1.cos() * cos_alpha3);

    let lat3 = clamp_unit(lat1.sin() * delta13.cos() + lat1.cos() * delta13.sin() * brng13.cos())
        .asin();
    let delta_lon13 = (brng13.sin() * delta13.sin() * lat1.cos())
        .atan2(delta13.cos() - lat1.sin() * lat3.sin());
    let lon3 = lon1 + delta_lon13;

    let point = GeoPoint::new(lat3.to_degrees(), wrap_longitude(lon3.to_degrees()));
    if point.is_finite() {
        Some(point)
    } else {
        None
    }
}

/// Whether `candidate` lies in the band between `endpoint_a` and `endpoint_b`.
///
/// The test is that the candidate is no further from either endpoint than the
/// endpoints are from each other. This is looser than a cross-track check and
/// admits some points just off the segment; display of "within the line"
/// depends on exactly this definition.
pub fn within_segment_band(
    candidate: &GeoPoint,
    endpoint_a: &GeoPoint,
    endpoint_b: &GeoPoint,
) -> bool {
    let segment_length = haversine_distance(endpoint_a, endpoint_b);
    haversine_distance(endpoint_a, candidate) <= segment_length
        && haversine_distance(endpoint_b, candidate) <= segment_length
}
