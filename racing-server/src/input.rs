//! Host event reader
//!
//! Reads newline-delimited JSON [`HostEvent`]s and forwards them to the
//! engine task. Malformed lines are logged and skipped.
//!
//! Reading runs on its own OS thread. A blocking read on stdin cannot be
//! cancelled, so the reader is detached on shutdown instead of awaited; the
//! process exits without waiting for the host to close the pipe.

use log::{debug, info, warn};
use std::future::Future;
use std::io::BufRead;
use std::thread::{self, JoinHandle};
use tokio::sync::mpsc;
use tokio_graceful_shutdown::SubsystemHandle;

use crate::{HostEvent, ServerError};

/// Parse one input line. Blank lines yield `None`.
pub fn parse_event(line: &str) -> Result<Option<HostEvent>, ServerError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    Ok(Some(serde_json::from_str(line)?))
}

/// Forward events from `reader` until end of input. Blocks the calling thread.
pub fn forward_events<R: BufRead>(
    reader: R,
    tx_events: &mpsc::Sender<HostEvent>,
) -> Result<u64, ServerError> {
    let mut line_number: u64 = 0;

    for line in reader.lines() {
        let line = line?;
        line_number += 1;

        match parse_event(&line) {
            Ok(Some(event)) => {
                if tx_events.blocking_send(event).is_err() {
                    return Err(ServerError::ChannelClosed);
                }
            }
            Ok(None) => {}
            Err(e) => warn!("Input: ignoring line {}: {}", line_number, e),
        }
    }

    Ok(line_number)
}

/// Start the reader thread. The sender is dropped when input ends.
pub fn spawn_reader<R>(
    reader: R,
    tx_events: mpsc::Sender<HostEvent>,
) -> Result<JoinHandle<()>, ServerError>
where
    R: BufRead + Send + 'static,
{
    let handle = thread::Builder::new()
        .name("input".to_string())
        .spawn(move || match forward_events(reader, &tx_events) {
            Ok(lines) => info!("Input: end of input after {} lines", lines),
            Err(ServerError::ChannelClosed) => debug!("Input: engine stopped"),
            Err(e) => warn!("Input: {}", e),
        })?;
    Ok(handle)
}

/// Read `reader` in the background until `shutdown` completes
pub async fn read_until<R, F>(
    reader: R,
    tx_events: mpsc::Sender<HostEvent>,
    shutdown: F,
) -> Result<(), ServerError>
where
    R: BufRead + Send + 'static,
    F: Future<Output = ()>,
{
    let _reader = spawn_reader(reader, tx_events)?;
    shutdown.await;
    debug!("Input: Shutdown requested");
    Ok(())
}

pub async fn run_stdin(
    subsys: SubsystemHandle,
    tx_events: mpsc::Sender<HostEvent>,
) -> Result<(), ServerError> {
    let reader = std::io::BufReader::new(std::io::stdin());
    read_until(reader, tx_events, subsys.on_shutdown_requested()).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use racing_core::{InstrumentUpdate, UserAction};

    #[test]
    fn test_parse_event() {
        assert_eq!(parse_event("   ").unwrap(), None);
        assert_eq!(
            parse_event(r#" {"action":"resetTimer"} "#).unwrap(),
            Some(HostEvent::Action(UserAction::ResetTimer))
        );
        assert!(matches!(parse_event("{oops"), Err(ServerError::Json(_))));
    }

    #[test]
    fn test_forward_events_skips_bad_lines() {
        let input: &[u8] = b"{\"action\":\"pingPort\"}\n\nnot json\n{\"instrument\":{\"type\":\"waterDepth\",\"depth\":12.5}}\n";
        let (tx, mut rx) = mpsc::channel(8);

        assert_eq!(forward_events(input, &tx).unwrap(), 4);
        drop(tx);

        assert_eq!(
            rx.blocking_recv(),
            Some(HostEvent::Action(UserAction::PingPort))
        );
        assert_eq!(
            rx.blocking_recv(),
            Some(HostEvent::Instrument(InstrumentUpdate::WaterDepth { depth: 12.5 }))
        );
        assert_eq!(rx.blocking_recv(), None);
    }

    #[test]
    fn test_forward_events_closed_channel() {
        let input: &[u8] = b"{\"action\":\"startTimer\"}\n";
        let (tx, rx) = mpsc::channel(1);
        drop(rx);

        let result = forward_events(input, &tx);
        assert!(matches!(result, Err(ServerError::ChannelClosed)));
    }

    #[tokio::test]
    async fn test_reader_thread_closes_channel_at_end() {
        let input: &[u8] = b"{\"action\":\"startTimer\"}\n";
        let (tx, mut rx) = mpsc::channel(8);

        spawn_reader(input, tx).unwrap();

        assert_eq!(
            rx.recv().await,
            Some(HostEvent::Action(UserAction::StartTimer))
        );
        assert_eq!(rx.recv().await, None);
    }

    #[cfg(unix)]
    #[test]
    fn test_shutdown_with_input_still_open() {
        use std::os::unix::net::UnixStream;
        use std::time::Duration;

        // The peer stays open, so the reader thread never sees end of input
        let (stream, _peer) = UnixStream::pair().unwrap();
        let (tx, mut rx) = mpsc::channel(8);

        let runtime = tokio::runtime::Runtime::new().unwrap();
        let result = runtime.block_on(async {
            tokio::time::timeout(
                Duration::from_secs(5),
                read_until(std::io::BufReader::new(stream), tx, async {}),
            )
            .await
        });
        assert!(matches!(result, Ok(Ok(()))));

        // Dropping the runtime must not wait for the blocked read
        drop(runtime);
        assert!(matches!(
            rx.try_recv(),
            Err(mpsc::error::TryRecvError::Empty)
        ));
    }
}
