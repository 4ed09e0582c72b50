//! Periodic territory lifecycle sweep.
//!
//! Moves territories without recent activity from `active` to `inactive`
//! (30 days) and on to `abandoned` (90 days), after which they no longer
//! block new claims.

use std::time::Duration;

use sqlx::PgPool;
use tokio_util::sync::CancellationToken;
use terraclaim_db::repositories::TerritoryRepo;

/// Run the lifecycle sweep loop every `interval` until `cancel` is triggered.
pub async fn run(pool: PgPool, interval: Duration, cancel: CancellationToken) {
    tracing::info!(
        interval_secs = interval.as_secs(),
        "Territory lifecycle sweep started"
    );

    let mut ticker = tokio::time::interval(interval);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Territory lifecycle sweep stopping");
                break;
            }
            _ = ticker.tick() => {
                match TerritoryRepo::sweep_lifecycle(&pool).await {
                    Ok(report) if report.deactivated + report.abandoned > 0 => {
                        tracing::info!(
                            deactivated = report.deactivated,
                            abandoned = report.abandoned,
                            "Territory lifecycle sweep applied"
                        );
                    }
                    Ok(_) => tracing::debug!("Territory lifecycle sweep: nothing to do"),
                    Err(e) => {
                        tracing::error!(error = %e, "Territory lifecycle sweep failed");
                    }
                }
            }
        }
    }
}
