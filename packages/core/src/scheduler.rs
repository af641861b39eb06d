//! Pending-signup pruning.
//!
//! Unverified signups expire after [`PENDING_SIGNUP_TTL_MINUTES`]. Lookups
//! already ignore expired records; this loop deletes them so the table does
//! not grow with abandoned signups.

use std::sync::Arc;
use std::time::Duration;

use tokio::signal;
use tokio::time;

use crate::accounts::{AccountService, PENDING_SIGNUP_TTL_MINUTES};
use crate::metrics::AppMetrics;

pub const DEFAULT_PRUNE_INTERVAL_SECONDS: u64 = 60;

/// Run the pruning loop until `Ctrl+C` (SIGINT) is received.
///
/// A failed prune is logged and retried on the next tick.
pub async fn run_pending_signup_pruning(
    accounts: AccountService,
    metrics: Arc<AppMetrics>,
    interval_seconds: u64,
) {
    let mut interval = time::interval(Duration::from_secs(interval_seconds));

    tracing::info!(
        "Pending signup pruning started (interval: {}s, ttl: {}m)",
        interval_seconds,
        PENDING_SIGNUP_TTL_MINUTES
    );

    loop {
        tokio::select! {
            _ = interval.tick() => {
                prune_once(&accounts, &metrics).await;
            }

            _ = signal::ctrl_c() => {
                tracing::info!("Shutdown signal received. Stopping pruning.");
                break;
            }
        }
    }

    tracing::info!("Pending signup pruning stopped cleanly");
}

/// Execute a single prune. Returns the number of signups removed.
pub async fn prune_once(accounts: &AccountService, metrics: &AppMetrics) -> u64 {
    match accounts.prune_expired_signups().await {
        Ok(0) => 0,
        Ok(removed) => {
            metrics.pending_signups_pruned_total.inc_by(removed as f64);
            tracing::info!("Pruned {} expired pending signups", removed);
            removed
        }
        Err(err) => {
            tracing::error!("Pending signup pruning failed: {}", err);
            0
        }
    }
}
