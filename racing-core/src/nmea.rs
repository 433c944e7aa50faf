//! True wind transmission
//!
//! Formats the derived true wind for other instruments on the network:
//!
//! - NMEA 0183 `MWV` sentence, talker `II`, reference `T`, speed in knots
//! - NMEA 2000 PGN 130306 (Wind Data), reference "true, boat referenced"
//!
//! Only formatting lives here. Getting the bytes onto a bus is up to the host.

use serde::{Deserialize, Serialize};

use crate::angle::normalize_degrees;
use crate::error::RacingError;
use crate::geodesy::KN_TO_MS;
use crate::settings::RacingSettings;
use crate::vessel::WindSample;

/// PGN 130306 Wind Data
pub const PGN_WIND_DATA: u32 = 130306;
/// Default priority for wind data
pub const WIND_PRIORITY: u8 = 5;
/// Broadcast address
pub const BROADCAST_DESTINATION: u8 = 255;

/// Wind reference codes (lower 3 bits of the reference byte)
pub const WIND_REFERENCE_TRUE_NORTH: u8 = 0;
pub const WIND_REFERENCE_MAGNETIC: u8 = 1;
pub const WIND_REFERENCE_APPARENT: u8 = 2;
pub const WIND_REFERENCE_TRUE_BOAT: u8 = 3;
pub const WIND_REFERENCE_TRUE_WATER: u8 = 4;

/// "Data not available" for unsigned 16 bit fields
pub const N2K_U16_NOT_AVAILABLE: u16 = 0xFFFF;
// Highest value that is still data, 0xFFFE is reserved for errors
const N2K_U16_MAX_VALUE: f64 = 0xFFFD as f64;

// =============================================================================
// NMEA 0183
// =============================================================================

/// XOR of every byte between `$` and `*` (or end of input)
pub fn checksum(body: &str) -> u8 {
    body.trim_start_matches('$')
        .bytes()
        .take_while(|&b| b != b'*')
        .fold(0u8, |acc, b| acc ^ b)
}

/// `$IIMWV,<angle>,T,<speed>,N,A*hh\r\n`
pub fn mwv_sentence(true_angle: f64, true_speed: f64) -> String {
    let body = format!("IIMWV,{:.2},T,{:.2},N,A", true_angle, true_speed);
    format!("${}*{:02X}\r\n", body, checksum(&body))
}

// =============================================================================
// NMEA 2000 PGN 130306
// =============================================================================

/// PGN 130306 payload as sent on the wire
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq)]
#[repr(C)]
pub struct Pgn130306 {
    /// Sequence identifier
    pub sid: u8,
    /// 0.01 m/s
    pub wind_speed: [u8; 2],
    /// 0.0001 rad
    pub wind_angle: [u8; 2],
    /// Reference in the lower 3 bits, upper bits reserved (set)
    pub reference: u8,
    _reserved: [u8; 2],
}

/// Payload size in bytes
pub const PGN_130306_SIZE: usize = std::mem::size_of::<Pgn130306>();

fn scaled_u16(value: f64, resolution: f64) -> u16 {
    if !value.is_finite() {
        return N2K_U16_NOT_AVAILABLE;
    }
    let scaled = (value / resolution).round();
    if !(0.0..=N2K_U16_MAX_VALUE).contains(&scaled) {
        return N2K_U16_NOT_AVAILABLE;
    }
    scaled as u16
}

fn unscaled(raw: [u8; 2], resolution: f64) -> Option<f64> {
    match u16::from_le_bytes(raw) {
        N2K_U16_NOT_AVAILABLE => None,
        value => Some(value as f64 * resolution),
    }
}

impl Pgn130306 {
    /// Build the payload from speed in knots and angle in degrees
    pub fn new(sid: u8, speed_knots: f64, angle_degrees: f64, reference: u8) -> Self {
        let angle = if angle_degrees.is_finite() {
            normalize_degrees(angle_degrees).to_radians()
        } else {
            f64::NAN
        };
        Pgn130306 {
            sid,
            wind_speed: scaled_u16(speed_knots * KN_TO_MS, 0.01).to_le_bytes(),
            wind_angle: scaled_u16(angle, 0.0001).to_le_bytes(),
            reference: 0xF8 | (reference & 0x07),
            _reserved: [0xFF; 2],
        }
    }

    pub fn true_boat(sid: u8, speed_knots: f64, angle_degrees: f64) -> Self {
        Pgn130306::new(sid, speed_knots, angle_degrees, WIND_REFERENCE_TRUE_BOAT)
    }

    /// Wind speed in m/s
    pub fn wind_speed_ms(&self) -> Option<f64> {
        unscaled(self.wind_speed, 0.01)
    }

    /// Wind angle in radians
    pub fn wind_angle_rad(&self) -> Option<f64> {
        unscaled(self.wind_angle, 0.0001)
    }

    pub fn reference_code(&self) -> u8 {
        self.reference & 0x07
    }

    pub fn encode(&self) -> Result<Vec<u8>, RacingError> {
        Ok(bincode::serialize(self)?)
    }

    pub fn decode(data: &[u8]) -> Result<Self, RacingError> {
        if data.len() < PGN_130306_SIZE {
            return Err(RacingError::EncodingFailed(format!(
                "PGN 130306 needs {} bytes, got {}",
                PGN_130306_SIZE,
                data.len()
            )));
        }
        Ok(bincode::deserialize(&data[..PGN_130306_SIZE])?)
    }
}

// =============================================================================
// Outbound messages
// =============================================================================

/// A message ready for the host to transmit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum OutboundMessage {
    Nmea0183 {
        sentence: String,
    },
    Nmea2000 {
        pgn: u32,
        priority: u8,
        destination: u8,
        data: Vec<u8>,
    },
}

/// True wind messages enabled in `settings`.
///
/// Nothing is emitted while the true wind is unavailable.
pub fn outbound_messages(
    settings: &RacingSettings,
    wind: &WindSample,
    sid: u8,
) -> Result<Vec<OutboundMessage>, RacingError> {
    let mut messages = Vec::new();
    if !wind.has_true_wind() {
        return Ok(messages);
    }

    if settings.send_nmea0183_wind {
        messages.push(OutboundMessage::Nmea0183 {
            sentence: mwv_sentence(wind.true_angle, wind.true_speed),
        });
    }

    if settings.send_nmea2000_wind {
        let payload = Pgn130306::true_boat(sid, wind.true_speed, wind.true_angle);
        messages.push(OutboundMessage::Nmea2000 {
            pgn: PGN_WIND_DATA,
            priority: WIND_PRIORITY,
            destination: BROADCAST_DESTINATION,
            data: payload.encode()?,
        });
    }

    Ok(messages)
}
