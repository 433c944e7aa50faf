//! # Racing Core
//!
//! Race start timing and tactical sailing calculations.
//!
//! This crate contains pure calculation logic with **zero I/O dependencies**:
//! no sockets, no files, no async runtime, no logging. The host feeds in
//! already-parsed instrument values and user actions, and reads back
//! snapshots.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  racing-core (platform-independent, no tokio/async deps)    │
//! │  ├── geodesy/     (great-circle bearing, distance, ...)     │
//! │  ├── true_wind/   (apparent → true wind, two strategies)    │
//! │  ├── drift/       (set and drift from DR vs GPS)            │
//! │  ├── start_line/  (marks, line bearing, crossing)           │
//! │  ├── countdown/   (start sequence timer)                    │
//! │  ├── nmea/        (MWV sentence, PGN 130306 payload)        │
//! │  └── engine/      (RacingEngine facade, TickReport)         │
//! └─────────────────────────────────────────────────────────────┘
//!                               ▲
//!                  ┌────────────┴────────────┐
//!                  │  racing-server          │
//!                  │  (tokio tick loop)      │
//!                  └─────────────────────────┘
//! ```
//!
//! ## Key Modules
//!
//! - [`geodesy`] - Spherical Earth geometry, radius 3440 nm
//! - [`true_wind`] - True wind solver ([`TrueWindStrategy`])
//! - [`drift`] - Current estimation
//! - [`start_line`] - Start line state machine and crossing prediction
//! - [`countdown`] - Countdown timer
//! - [`nmea`] - True wind transmission encodings
//! - [`display`] - Labels and placeholders
//! - [`engine`] - Everything wired together
//!
//! ## Example
//!
//! ```rust
//! use racing_core::{InstrumentUpdate, RacingEngine, UserAction};
//!
//! let mut engine = RacingEngine::default();
//! engine.apply(&InstrumentUpdate::Position { latitude: 43.75847, longitude: 7.49575 });
//! engine.command(UserAction::PingStarboard);
//! engine.command(UserAction::StartTimer);
//!
//! let report = engine.tick().unwrap();
//! assert_eq!(report.display.timer, "4:59");
//! ```

pub mod angle;
pub mod countdown;
pub mod display;
pub mod drift;
pub mod engine;
pub mod error;
pub mod geodesy;
pub mod nmea;
pub mod settings;
pub mod start_line;
pub mod true_wind;
pub mod vessel;

// Re-export commonly used types
pub use angle::normalize_degrees;
pub use countdown::CountdownTimer;
pub use drift::DriftEstimate;
pub use engine::{RacingEngine, TickReport, UserAction};
pub use error::RacingError;
pub use geodesy::GeoPoint;
pub use nmea::OutboundMessage;
pub use settings::RacingSettings;
pub use start_line::{CrossingPrediction, LineState, Mark, StartLine};
pub use true_wind::{TrueWind, TrueWindStrategy};
pub use vessel::{InstrumentUpdate, VesselState, WindSample};
