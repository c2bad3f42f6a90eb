//! Progress reporting for long-running pipeline stages.
//!
//! A stage owns a [`ProgressSender`] and reports the number of items it has
//! made durable so far. Values never decrease, sends never block, and
//! dropping the sender closes the channel so consumers see the end of the
//! stream. Late subscribers get no replay.

use tokio::sync::mpsc;

/// Create a connected sender/receiver pair.
pub fn progress_channel() -> (ProgressSender, ProgressReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (
        ProgressSender { tx, last: 0 },
        ProgressReceiver { rx },
    )
}

/// Emitting half of a progress channel.
#[derive(Debug)]
pub struct ProgressSender {
    tx: mpsc::UnboundedSender<u64>,
    last: u64,
}

impl ProgressSender {
    /// Report the current count.
    ///
    /// A value below the last one emitted is raised to it. A dropped receiver
    /// is not an error: the stage keeps running without an observer.
    pub fn emit(&mut self, count: u64) {
        if count < self.last {
            tracing::trace!(count, last = self.last, "Clamped regressing progress value");
        }
        self.last = self.last.max(count);
        let _ = self.tx.send(self.last);
    }

    /// The last value emitted.
    pub const fn last(&self) -> u64 {
        self.last
    }

    /// Whether anyone is still listening.
    pub fn is_observed(&self) -> bool {
        !self.tx.is_closed()
    }

    /// Close the channel explicitly.
    pub fn close(self) {
        drop(self);
    }
}

/// Receiving half of a progress channel.
#[derive(Debug)]
pub struct ProgressReceiver {
    rx: mpsc::UnboundedReceiver<u64>,
}

impl ProgressReceiver {
    /// Next reported value, or `None` once the sender is closed and drained.
    pub async fn recv(&mut self) -> Option<u64> {
        self.rx.recv().await
    }

    /// Drain every value until the channel closes.
    pub async fn collect(mut self) -> Vec<u64> {
        let mut values = Vec::new();
        while let Some(value) = self.rx.recv().await {
            values.push(value);
        }
        values
    }
}

/// A sender whose values nobody reads.
///
/// Useful for callers that only care about the stage's result.
pub fn detached() -> ProgressSender {
    progress_channel().0
}
