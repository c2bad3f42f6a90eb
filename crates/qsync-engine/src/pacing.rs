//! Inter-item pacing with cooperative cancellation.

use std::time::Duration;

use qsync_core::SyncError;
use tokio_util::sync::CancellationToken;

pub(crate) fn ensure_running(cancel: &CancellationToken) -> Result<(), SyncError> {
    if cancel.is_cancelled() {
        Err(SyncError::Cancelled)
    } else {
        Ok(())
    }
}

/// Sleep for `delay` unless cancelled first.
pub(crate) async fn pause(delay: Duration, cancel: &CancellationToken) -> Result<(), SyncError> {
    if delay.is_zero() {
        return ensure_running(cancel);
    }
    tokio::select! {
        () = cancel.cancelled() => Err(SyncError::Cancelled),
        () = tokio::time::sleep(delay) => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_pause_sleeps_full_delay() {
        let cancel = CancellationToken::new();
        let start = tokio::time::Instant::now();
        pause(Duration::from_secs(2), &cancel).await.unwrap();
        assert!(start.elapsed() >= Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_pause_returns_cancelled() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        assert!(matches!(
            pause(Duration::from_secs(60), &cancel).await,
            Err(SyncError::Cancelled)
        ));
        assert!(matches!(
            pause(Duration::ZERO, &cancel).await,
            Err(SyncError::Cancelled)
        ));
    }
}
