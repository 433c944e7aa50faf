//! User settings
//!
//! Persisted by the host as JSON. Unknown keys are ignored and missing keys
//! take their defaults, so older settings files keep loading.

use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

use crate::countdown::DEFAULT_START_SECONDS;
use crate::error::RacingError;
use crate::true_wind::TrueWindStrategy;

/// Default angle between port and starboard tack headings, degrees
pub const DEFAULT_TACKING_ANGLE: i64 = 90;
/// Accepted tacking angles, degrees
pub const TACKING_ANGLE_RANGE: RangeInclusive<i64> = 60..=180;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RacingSettings {
    /// Countdown length loaded by start and reset
    pub start_timer_seconds: i64,
    pub true_wind_strategy: TrueWindStrategy,
    /// Emit an MWV sentence with the true wind every tick
    pub send_nmea0183_wind: bool,
    /// Emit PGN 130306 with the true wind every tick
    pub send_nmea2000_wind: bool,
    pub show_start_line: bool,
    pub show_laylines: bool,
    pub show_wind_angles: bool,
    pub dual_canvas: bool,
    pub wind_wizard_visible: bool,
    /// Degrees between the close-hauled headings on either tack
    pub tacking_angle: i64,
}

impl Default for RacingSettings {
    fn default() -> Self {
        RacingSettings {
            start_timer_seconds: DEFAULT_START_SECONDS,
            true_wind_strategy: TrueWindStrategy::default(),
            send_nmea0183_wind: false,
            send_nmea2000_wind: false,
            show_start_line: false,
            show_laylines: false,
            show_wind_angles: false,
            dual_canvas: false,
            wind_wizard_visible: false,
            tacking_angle: DEFAULT_TACKING_ANGLE,
        }
    }
}

impl RacingSettings {
    pub fn validate(&self) -> Result<(), RacingError> {
        if self.start_timer_seconds <= 0 {
            return Err(RacingError::InvalidSetting {
                name: "startTimerSeconds",
                reason: format!("must be positive, got {}", self.start_timer_seconds),
            });
        }
        if !TACKING_ANGLE_RANGE.contains(&self.tacking_angle) {
            return Err(RacingError::InvalidSetting {
                name: "tackingAngle",
                reason: format!(
                    "must be within {}..={} degrees, got {}",
                    TACKING_ANGLE_RANGE.start(),
                    TACKING_ANGLE_RANGE.end(),
                    self.tacking_angle
                ),
            });
        }
        Ok(())
    }

    pub fn from_json(json: &str) -> Result<Self, RacingError> {
        let settings: RacingSettings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, RacingError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = RacingSettings::default();
        assert_eq!(settings.start_timer_seconds, 300);
        assert_eq!(settings.true_wind_strategy, TrueWindStrategy::LawOfCosines);
        assert!(!settings.send_nmea0183_wind);
        assert_eq!(settings.tacking_angle, 90);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings =
            RacingSettings::from_json(r#"{"trueWindStrategy":"vector","sendNmea0183Wind":true}"#)
                .unwrap();
        assert_eq!(settings.true_wind_strategy, TrueWindStrategy::Vector);
        assert!(settings.send_nmea0183_wind);
        assert_eq!(settings.start_timer_seconds, 300);
    }

    #[test]
    fn test_roundtrip_keys() {
        let json = RacingSettings::default().to_json().unwrap();
        assert!(json.contains("\"startTimerSeconds\": 300"));
        assert!(json.contains("\"sendNmea2000Wind\": false"));
        assert!(json.contains("\"windWizardVisible\": false"));
    }

    #[test]
    fn test_rejects_non_positive_timer() {
        let err = RacingSettings::from_json(r#"{"startTimerSeconds":0}"#).unwrap_err();
        assert!(matches!(
            err,
            RacingError::InvalidSetting {
                name: "startTimerSeconds",
                ..
            }
        ));
    }

    #[test]
    fn test_tacking_angle_range() {
        for angle in [60, 120, 180] {
            let json = format!(r#"{{"tackingAngle":{}}}"#, angle);
            assert_eq!(RacingSettings::from_json(&json).unwrap().tacking_angle, angle);
        }
        for angle in [59, 181, 0] {
            let settings = RacingSettings {
                tacking_angle: angle,
                ..Default::default()
            };
            assert!(matches!(
                settings.validate(),
                Err(RacingError::InvalidSetting {
                    name: "tackingAngle",
                    ..
                })
            ));
        }
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            RacingSettings::from_json("{not json"),
            Err(RacingError::Serialization(_))
        ));
    }
}
