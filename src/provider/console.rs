//! Live console session handle
//!
//! Owns the long-lived reader task for one serial-console stream. The
//! mounting view polls lines out of the channel; tearing the view down
//! closes the session, which the reader observes and exits promptly
//! rather than lingering until process exit.

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

/// A mounted serial-console stream
pub struct ConsoleSession {
    lines: mpsc::UnboundedReceiver<String>,
    shutdown: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl ConsoleSession {
    pub fn new(
        lines: mpsc::UnboundedReceiver<String>,
        shutdown: oneshot::Sender<()>,
        task: JoinHandle<()>,
    ) -> Self {
        Self {
            lines,
            shutdown: Some(shutdown),
            task,
        }
    }

    /// Drain one buffered line, if any.
    pub fn try_recv(&mut self) -> Option<String> {
        self.lines.try_recv().ok()
    }

    /// Signal the reader to close its connection, aborting as a backstop
    /// in case the reader is stuck outside an await point.
    pub fn close(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        self.task.abort();
    }

    /// Whether the reader task has exited (stream ended or closed).
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for ConsoleSession {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_close_stops_reader() {
        let (line_tx, line_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();

        let task = tokio::spawn(async move {
            line_tx.send("booting...".to_string()).ok();
            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => break,
                    _ = tokio::time::sleep(std::time::Duration::from_millis(5)) => {}
                }
            }
        });

        let mut session = ConsoleSession::new(line_rx, shutdown_tx, task);

        // Reader delivered a line before shutdown.
        tokio::task::yield_now().await;
        assert_eq!(session.try_recv().as_deref(), Some("booting..."));

        session.close();
        for _ in 0..100 {
            if session.is_finished() {
                return;
            }
            tokio::time::sleep(std::time::Duration::from_millis(1)).await;
        }
        panic!("reader did not stop after close()");
    }
}
