//! # Racing Server
//!
//! Host-side runtime for [`racing_core`]: reads instrument samples and crew
//! actions, ticks the engine once per second and writes a report per tick.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                     racing-server                        │
//! │  ┌─────────────┐   mpsc    ┌─────────────┐   watch       │
//! │  │ Input       │ ────────▶ │ Engine      │ ─────────┐    │
//! │  │ (stdin JSON)│ HostEvent │ (1 Hz tick) │ TickReport    │
//! │  └─────────────┘           └──────┬──────┘          ▼    │
//! │                                   │          ┌──────────┐│
//! │                                   ▼          │ Output   ││
//! │                          ┌────────────────┐  │ (stdout) ││
//! │                          │ RacingEngine   │  └──────────┘│
//! │                          │ (racing-core)  │              │
//! │                          └────────────────┘              │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! The engine task is the only writer. Instrument updates and crew actions
//! are queued to it; readers only ever see the immutable report published
//! after each tick.
//!
//! ## Host events
//!
//! One JSON document per line on stdin:
//!
//! ```text
//! {"instrument":{"type":"positionFix","latitude":43.758,"longitude":7.496,"cog":128.0,"sog":5.2}}
//! {"instrument":{"type":"apparentWind","angle":42.0,"speed":14.1}}
//! {"action":"pingStarboard"}
//! {"action":"startTimer"}
//! {"settings":{"sendNmea0183Wind":true}}
//! "clearStartLine"
//! ```
//!
//! ## Command-Line Interface
//!
//! See [`Cli`] for all available options. Key options:
//!
//! - `-v` - Increase verbosity (use multiple times)
//! - `--timer` - Countdown length in seconds
//! - `--strategy` - True wind algorithm
//! - `--mwv`, `--pgn130306` - Emit the true wind on every tick

extern crate tokio;

use clap::Parser;
use racing_core::{InstrumentUpdate, RacingError, RacingSettings, TrueWindStrategy, UserAction};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_graceful_shutdown::{SubsystemBuilder, SubsystemHandle};

pub mod config;
pub mod engine_task;
pub mod input;
pub mod output;
pub mod storage;

use engine_task::{EngineRunner, ReportReceiver};
use storage::SettingsStore;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Pending host events before the input reader waits for the engine
const EVENT_QUEUE_SIZE: usize = 64;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Engine channel closed")]
    ChannelClosed,

    #[error(transparent)]
    Racing(#[from] RacingError),

    #[error("Cannot determine the user data directory")]
    NoDataDirectory,
}

/// Command-line spelling of [`TrueWindStrategy`]
#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum StrategyArg {
    LawOfCosines,
    Vector,
}

impl From<StrategyArg> for TrueWindStrategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::LawOfCosines => TrueWindStrategy::LawOfCosines,
            StrategyArg::Vector => TrueWindStrategy::Vector,
        }
    }
}

#[derive(Parser, Clone, Debug)]
#[command(version, about = "Race start timer and tactical sailing engine")]
pub struct Cli {
    #[clap(flatten)]
    pub verbose: clap_verbosity_flag::Verbosity<clap_verbosity_flag::InfoLevel>,

    /// Settings file, defaults to settings.json in the user data directory
    #[arg(short, long)]
    pub settings: Option<PathBuf>,

    /// Countdown length in seconds
    #[arg(short, long)]
    pub timer: Option<i64>,

    /// True wind algorithm
    #[arg(long, value_enum)]
    pub strategy: Option<StrategyArg>,

    /// Tick period in milliseconds
    #[arg(long, default_value_t = 1000)]
    pub tick_ms: u64,

    /// Emit the true wind as an NMEA 0183 MWV sentence every tick
    #[arg(long, default_value_t = false)]
    pub mwv: bool,

    /// Emit the true wind as NMEA 2000 PGN 130306 every tick
    #[arg(long, default_value_t = false)]
    pub pgn130306: bool,

    /// Write the effective settings back to the settings file
    #[arg(long, default_value_t = false)]
    pub save_settings: bool,
}

impl Cli {
    /// Overlay command-line options onto stored settings
    pub fn apply_overrides(&self, settings: &mut RacingSettings) {
        if let Some(seconds) = self.timer {
            settings.start_timer_seconds = seconds;
        }
        if let Some(strategy) = self.strategy {
            settings.true_wind_strategy = strategy.into();
        }
        if self.mwv {
            settings.send_nmea0183_wind = true;
        }
        if self.pgn130306 {
            settings.send_nmea2000_wind = true;
        }
    }

    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_ms.max(1))
    }
}

/// One line of host input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HostEvent {
    Instrument(InstrumentUpdate),
    Action(UserAction),
    /// Replace the settings; they are persisted when a store is attached
    Settings(RacingSettings),
    /// Forget both marks
    ClearStartLine,
}

/// Engine task for `settings`, persisting settings events to `store`
pub fn engine_runner(
    args: &Cli,
    settings: RacingSettings,
    store: SettingsStore,
    rx_events: mpsc::Receiver<HostEvent>,
) -> (EngineRunner, ReportReceiver) {
    let engine = racing_core::RacingEngine::new(settings);
    let (runner, rx_reports) = EngineRunner::new(engine, args.tick_period(), rx_events);
    (runner.with_store(store), rx_reports)
}

/// Start the input, engine and output subsystems
pub fn start_subsystems(
    subsystem: &SubsystemHandle,
    args: &Cli,
    settings: RacingSettings,
    store: SettingsStore,
) {
    let (tx_events, rx_events) = mpsc::channel(EVENT_QUEUE_SIZE);
    let (runner, rx_reports) = engine_runner(args, settings, store, rx_events);

    subsystem.start(SubsystemBuilder::new("Input", |subsys| {
        input::run_stdin(subsys, tx_events)
    }));
    subsystem.start(SubsystemBuilder::new("Engine", |subsys| runner.run(subsys)));
    subsystem.start(SubsystemBuilder::new("Output", |subsys| {
        output::run_stdout(subsys, rx_reports)
    }));
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_cli_defaults() {
        let args = Cli::parse_from(["racing-server"]);
        assert_eq!(args.tick_ms, 1000);
        assert_eq!(args.tick_period(), Duration::from_secs(1));
        assert!(args.settings.is_none());

        let mut settings = RacingSettings::default();
        args.apply_overrides(&mut settings);
        assert_eq!(settings, RacingSettings::default());
    }

    #[test]
    fn test_cli_overrides() {
        let args = Cli::parse_from([
            "racing-server",
            "--timer",
            "180",
            "--strategy",
            "vector",
            "--mwv",
            "--pgn130306",
        ]);
        let mut settings = RacingSettings::default();
        args.apply_overrides(&mut settings);
        assert_eq!(settings.start_timer_seconds, 180);
        assert_eq!(settings.true_wind_strategy, TrueWindStrategy::Vector);
        assert!(settings.send_nmea0183_wind);
        assert!(settings.send_nmea2000_wind);
    }

    #[test]
    fn test_strategy_arg_names() {
        let args = Cli::parse_from(["racing-server", "--strategy", "law-of-cosines"]);
        assert_eq!(args.strategy, Some(StrategyArg::LawOfCosines));
    }

    #[test]
    fn test_tick_period_never_zero() {
        let args = Cli::parse_from(["racing-server", "--tick-ms", "0"]);
        assert_eq!(args.tick_period(), Duration::from_millis(1));
    }

    #[test]
    fn test_host_event_json() {
        let event: HostEvent = serde_json::from_str(r#"{"action":"pingPort"}"#).unwrap();
        assert_eq!(event, HostEvent::Action(UserAction::PingPort));

        let event: HostEvent = serde_json::from_str(
            r#"{"instrument":{"type":"boatSpeed","speed":6.1}}"#,
        )
        .unwrap();
        assert_eq!(
            event,
            HostEvent::Instrument(InstrumentUpdate::BoatSpeed { speed: 6.1 })
        );

        let event: HostEvent = serde_json::from_str(r#""clearStartLine""#).unwrap();
        assert_eq!(event, HostEvent::ClearStartLine);

        let event: HostEvent =
            serde_json::from_str(r#"{"settings":{"startTimerSeconds":240}}"#).unwrap();
        match event {
            HostEvent::Settings(settings) => assert_eq!(settings.start_timer_seconds, 240),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_engine_runner_uses_cli_and_store() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let args = Cli::parse_from(["racing-server", "--tick-ms", "250"]);
        let (_tx, rx) = mpsc::channel(1);

        let (mut runner, reports) = engine_runner(
            &args,
            RacingSettings::default(),
            SettingsStore::with_path(path.clone()),
            rx,
        );
        assert!(reports.borrow().is_none());

        runner.handle_event(HostEvent::Settings(RacingSettings {
            start_timer_seconds: 90,
            ..Default::default()
        }));
        assert_eq!(runner.engine().settings().start_timer_seconds, 90);
        // The store is attached, so the change reached the file
        assert_eq!(
            SettingsStore::with_path(path).load().start_timer_seconds,
            90
        );

        runner.on_tick().unwrap();
        assert_eq!(reports.borrow().as_ref().map(|r| r.sequence), Some(1));
    }
}
