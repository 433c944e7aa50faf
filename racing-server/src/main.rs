use clap::Parser;
use log::{info, LevelFilter};
use miette::{IntoDiagnostic, Result};
use racing_server::{start_subsystems, storage::SettingsStore, Cli, VERSION};
use std::time::Duration;
use tokio_graceful_shutdown::Toplevel;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    // stdout carries the reports, so logs go to stderr
    env_logger::Builder::new()
        .filter_level(args.verbose.log_level_filter())
        .filter_module("mio", LevelFilter::Warn)
        .target(env_logger::Target::Stderr)
        .init();

    let store = match &args.settings {
        Some(path) => SettingsStore::with_path(path.clone()),
        None => SettingsStore::new().into_diagnostic()?,
    };

    let mut settings = store.load();
    args.apply_overrides(&mut settings);
    settings.validate().into_diagnostic()?;

    if args.save_settings {
        store.save(&settings).into_diagnostic()?;
    }

    info!(
        "racing-server {} starting: timer {}s, {} true wind, MWV {}, PGN 130306 {}",
        VERSION,
        settings.start_timer_seconds,
        settings.true_wind_strategy,
        settings.send_nmea0183_wind,
        settings.send_nmea2000_wind
    );

    Toplevel::new(move |s| async move {
        start_subsystems(&s, &args, settings, store);
    })
    .catch_signals()
    .handle_shutdown_requests(Duration::from_millis(5000))
    .await
    .into_diagnostic()
}
