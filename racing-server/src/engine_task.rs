//! Engine task
//!
//! Owns the [`RacingEngine`] and is the only place it is mutated. Host events
//! arrive on an mpsc channel and are applied in order; on every tick the
//! engine advances and the resulting [`TickReport`] replaces the previous one
//! on a watch channel.

use log::{debug, info, trace, warn};
use racing_core::{RacingEngine, TickReport, UserAction};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time::{interval, MissedTickBehavior};
use tokio_graceful_shutdown::SubsystemHandle;

use crate::storage::SettingsStore;
use crate::{HostEvent, ServerError};

/// Latest report, `None` until the first tick
pub type ReportReceiver = watch::Receiver<Option<Arc<TickReport>>>;

pub struct EngineRunner {
    engine: RacingEngine,
    tick_period: Duration,
    rx_events: mpsc::Receiver<HostEvent>,
    tx_reports: watch::Sender<Option<Arc<TickReport>>>,
    store: Option<SettingsStore>,
}

impl EngineRunner {
    pub fn new(
        engine: RacingEngine,
        tick_period: Duration,
        rx_events: mpsc::Receiver<HostEvent>,
    ) -> (Self, ReportReceiver) {
        let (tx_reports, rx_reports) = watch::channel(None);
        let runner = EngineRunner {
            engine,
            tick_period,
            rx_events,
            tx_reports,
            store: None,
        };
        (runner, rx_reports)
    }

    /// Persist settings changes received as host events
    pub fn with_store(mut self, store: SettingsStore) -> Self {
        self.store = Some(store);
        self
    }

    pub fn engine(&self) -> &RacingEngine {
        &self.engine
    }

    pub fn handle_event(&mut self, event: HostEvent) {
        match event {
            HostEvent::Instrument(update) => {
                trace!("Instrument update {:?}", update);
                self.engine.apply(&update);
            }
            HostEvent::Action(action) => {
                if matches!(action, UserAction::PingPort | UserAction::PingStarboard)
                    && !self.engine.vessel().position.is_finite()
                {
                    warn!("{:?} without a position fix", action);
                }
                self.engine.command(action);
                info!(
                    "{:?}: start line {:?}, timer {}",
                    action,
                    self.engine.start_line().state(),
                    self.engine.timer()
                );
            }
            HostEvent::Settings(settings) => {
                if let Err(e) = self.engine.set_settings(settings) {
                    warn!("Rejected settings: {}", e);
                    return;
                }
                info!(
                    "Settings updated: timer {}s, {} true wind",
                    self.engine.timer().default_seconds(),
                    self.engine.settings().true_wind_strategy
                );
                if let Some(store) = &self.store {
                    if let Err(e) = store.save(self.engine.settings()) {
                        warn!("Failed to save settings: {}", e);
                    }
                }
            }
            HostEvent::ClearStartLine => {
                self.engine.clear_start_line();
                info!("Start line cleared");
            }
        }
    }

    /// Advance the engine and publish the report
    pub fn on_tick(&mut self) -> Result<Arc<TickReport>, ServerError> {
        let report = Arc::new(self.engine.tick()?);
        trace!(
            "Tick {}: timer {} crossing {:?}",
            report.sequence,
            report.display.timer,
            report.crossing
        );
        self.tx_reports.send_replace(Some(report.clone()));
        Ok(report)
    }

    pub async fn run(self, subsys: SubsystemHandle) -> Result<(), ServerError> {
        self.run_until(subsys.on_shutdown_requested()).await
    }

    /// Run until `shutdown` completes
    pub async fn run_until<F>(mut self, shutdown: F) -> Result<(), ServerError>
    where
        F: Future<Output = ()>,
    {
        info!(
            "Engine: ticking every {:?}, {} true wind",
            self.tick_period,
            self.engine.settings().true_wind_strategy
        );

        let mut ticker = interval(self.tick_period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut input_closed = false;

        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Engine: Shutdown requested");
                    break;
                }
                _ = ticker.tick() => {
                    self.on_tick()?;
                }
                event = self.rx_events.recv(), if !input_closed => {
                    match event {
                        Some(event) => self.handle_event(event),
                        None => {
                            debug!("Engine: Input closed, ticking on");
                            input_closed = true;
                        }
                    }
                }
            }
        }

        info!("Engine: finished");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use racing_core::{InstrumentUpdate, LineState, RacingSettings};
    use tempfile::tempdir;
    use tokio::sync::oneshot;
    use tokio::time::timeout;

    fn runner() -> (EngineRunner, ReportReceiver, mpsc::Sender<HostEvent>) {
        let (tx, rx) = mpsc::channel(16);
        let (runner, reports) =
            EngineRunner::new(RacingEngine::default(), Duration::from_millis(10), rx);
        (runner, reports, tx)
    }

    fn position(latitude: f64, longitude: f64) -> HostEvent {
        HostEvent::Instrument(InstrumentUpdate::Position {
            latitude,
            longitude,
        })
    }

    #[test]
    fn test_events_then_tick() {
        let (mut runner, reports, _tx) = runner();
        assert!(reports.borrow().is_none());

        runner.handle_event(position(43.75847, 7.49575));
        runner.handle_event(HostEvent::Action(UserAction::PingStarboard));
        runner.handle_event(position(43.757188, 7.497963));
        runner.handle_event(HostEvent::Action(UserAction::PingPort));
        runner.handle_event(HostEvent::Action(UserAction::StartTimer));

        let report = runner.on_tick().unwrap();
        assert_eq!(report.start_line.state, LineState::BothMarksPinged);
        assert_eq!(report.timer_seconds, 299);

        let published = reports.borrow().clone().unwrap();
        assert_eq!(published.sequence, report.sequence);

        runner.handle_event(HostEvent::ClearStartLine);
        let report = runner.on_tick().unwrap();
        assert_eq!(report.start_line.state, LineState::NoMarksPinged);
    }

    #[test]
    fn test_rejected_settings_keep_previous() {
        let (mut runner, _reports, _tx) = runner();
        runner.handle_event(HostEvent::Settings(RacingSettings {
            start_timer_seconds: 0,
            ..Default::default()
        }));
        assert_eq!(runner.engine().settings().start_timer_seconds, 300);
    }

    #[test]
    fn test_settings_event_is_persisted() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let (runner, _reports, _tx) = runner();
        let mut runner = runner.with_store(SettingsStore::with_path(path.clone()));

        runner.handle_event(HostEvent::Settings(RacingSettings {
            start_timer_seconds: 120,
            ..Default::default()
        }));
        assert_eq!(runner.engine().settings().start_timer_seconds, 120);
        assert_eq!(
            SettingsStore::with_path(path).load().start_timer_seconds,
            120
        );
    }

    #[tokio::test]
    async fn test_run_loop_publishes_reports() {
        let (runner, mut reports, tx) = runner();
        let (tx_shutdown, rx_shutdown) = oneshot::channel::<()>();

        let task = tokio::spawn(runner.run_until(async move {
            let _ = rx_shutdown.await;
        }));

        tx.send(position(43.75847, 7.49575)).await.unwrap();
        tx.send(HostEvent::Action(UserAction::PingStarboard)).await.unwrap();

        let pinged = timeout(Duration::from_secs(5), async {
            loop {
                reports.changed().await.unwrap();
                let state = reports
                    .borrow_and_update()
                    .as_ref()
                    .map(|report| report.start_line.state);
                if state == Some(LineState::OneMarkPinged) {
                    break;
                }
            }
        })
        .await;
        assert!(pinged.is_ok());

        // Closing the input must not stop the ticks
        drop(tx);
        let before = reports.borrow().as_ref().map(|r| r.sequence).unwrap();
        timeout(Duration::from_secs(5), async {
            loop {
                reports.changed().await.unwrap();
                if reports.borrow_and_update().as_ref().map(|r| r.sequence) > Some(before) {
                    break;
                }
            }
        })
        .await
        .unwrap();

        tx_shutdown.send(()).unwrap();
        let result = timeout(Duration::from_secs(5), task).await.unwrap().unwrap();
        assert!(result.is_ok());
    }
}
