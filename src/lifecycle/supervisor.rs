//! Fatal error reporting.
//!
//! Request handlers never abort the process themselves. When one hits an
//! unrecoverable condition it reports it here, and the server's run loop,
//! which owns the receiving end, stops and hands the error to `main`.

use tokio::sync::mpsc;

use crate::http::ServeError;

/// Sending half: cloned into every handler.
#[derive(Debug, Clone)]
pub struct FatalReporter {
    tx: mpsc::UnboundedSender<ServeError>,
}

impl FatalReporter {
    /// Report an unrecoverable error. The first report stops the server.
    pub fn report(&self, error: ServeError) {
        if self.tx.send(error).is_err() {
            tracing::warn!("Fatal error reported after the server stopped");
        }
    }
}

/// Receiving half, owned by the server's run loop.
#[derive(Debug)]
pub struct FatalReceiver {
    rx: mpsc::UnboundedReceiver<ServeError>,
}

impl FatalReceiver {
    /// Wait for the next fatal report.
    pub async fn recv(&mut self) -> Option<ServeError> {
        self.rx.recv().await
    }
}

/// Create a connected reporter/receiver pair.
pub fn fatal_channel() -> (FatalReporter, FatalReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (FatalReporter { tx }, FatalReceiver { rx })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reports_reach_the_receiver() {
        let (reporter, mut receiver) = fatal_channel();
        reporter.clone().report(ServeError::Unrecoverable(std::io::Error::other("forced error")));

        let error = receiver.recv().await.unwrap();
        assert!(error.is_unrecoverable());
        assert!(error.to_string().contains("forced error"));
    }

    #[test]
    fn report_after_receiver_dropped_does_not_panic() {
        let (reporter, receiver) = fatal_channel();
        drop(receiver);
        reporter.report(ServeError::Unrecoverable(std::io::Error::other("late")));
    }
}
