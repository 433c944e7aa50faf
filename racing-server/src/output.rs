//! Report writer
//!
//! Writes every published [`TickReport`](racing_core::TickReport) as one JSON
//! line. Reports superseded before they were written are skipped; only the
//! latest snapshot matters.

use log::{debug, trace};
use std::future::Future;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio_graceful_shutdown::SubsystemHandle;

use crate::engine_task::ReportReceiver;
use crate::ServerError;

/// Write reports to `writer` until the engine stops or `shutdown` completes
pub async fn write_reports<W, F>(
    mut writer: W,
    mut rx_reports: ReportReceiver,
    shutdown: F,
) -> Result<(), ServerError>
where
    W: AsyncWrite + Unpin,
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                debug!("Output: Shutdown requested");
                break;
            }
            changed = rx_reports.changed() => {
                if changed.is_err() {
                    debug!("Output: engine stopped");
                    break;
                }
                let report = rx_reports.borrow_and_update().clone();
                let Some(report) = report else {
                    continue;
                };
                let mut line = report.to_json_line()?;
                line.push('\n');
                writer.write_all(line.as_bytes()).await?;
                writer.flush().await?;
                trace!("Output: wrote report {}", report.sequence);
            }
        }
    }

    Ok(())
}

pub async fn run_stdout(
    subsys: SubsystemHandle,
    rx_reports: ReportReceiver,
) -> Result<(), ServerError> {
    write_reports(tokio::io::stdout(), rx_reports, subsys.on_shutdown_requested()).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use racing_core::RacingEngine;
    use std::future::pending;
    use std::sync::Arc;
    use tokio::sync::watch;

    #[tokio::test]
    async fn test_writes_json_lines() {
        let (tx, rx) = watch::channel(None);
        let mut engine = RacingEngine::default();
        tx.send_replace(Some(Arc::new(engine.tick().unwrap())));

        let writer = tokio::spawn(async move {
            let mut buffer: Vec<u8> = Vec::new();
            write_reports(&mut buffer, rx, pending()).await?;
            Ok::<_, ServerError>(buffer)
        });

        // An unseen report is still delivered after the engine goes away
        drop(tx);

        let buffer = writer.await.unwrap().unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 1);
        let value: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(value["sequence"], 1);
        assert_eq!(value["display"]["timer"], "5:00");
    }
}
