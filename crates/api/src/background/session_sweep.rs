//! Periodic discard of idle claim paths.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::sessions::ClaimSessionManager;

/// Every `interval`, drop paths idle for at least `timeout`. Runs until
/// `cancel` is triggered.
pub async fn run(
    sessions: Arc<ClaimSessionManager>,
    interval: Duration,
    timeout: Duration,
    cancel: CancellationToken,
) {
    tracing::info!(
        interval_secs = interval.as_secs(),
        timeout_secs = timeout.as_secs(),
        "Claim session sweep started"
    );

    let mut ticker = tokio::time::interval(interval);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Claim session sweep stopping");
                break;
            }
            _ = ticker.tick() => {
                let dropped = sessions.sweep_inactive(timeout).await;
                if dropped > 0 {
                    tracing::info!(dropped, "Discarded idle claim paths");
                }
            }
        }
    }
}
