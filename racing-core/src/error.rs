//! Error types for settings and wire encodings

use thiserror::Error;

/// Errors raised by the racing engine
///
/// Geometry never fails with an error; degenerate cases are `None`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RacingError {
    /// A setting is outside its allowed range
    #[error("Invalid setting {name}: {reason}")]
    InvalidSetting { name: &'static str, reason: String },

    /// Failed to encode an outbound message
    #[error("Encoding failed: {0}")]
    EncodingFailed(String),

    /// Failed to serialize or parse JSON
    #[error("Serialization failed: {0}")]
    Serialization(String),
}

impl From<bincode::Error> for RacingError {
    fn from(e: bincode::Error) -> Self {
        RacingError::EncodingFailed(e.to_string())
    }
}

impl From<serde_json::Error> for RacingError {
    fn from(e: serde_json::Error) -> Self {
        RacingError::Serialization(e.to_string())
    }
}
