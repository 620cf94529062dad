//! Background cleanup job for expired in-process state.
//!
//! Reset tokens that were never consumed outlive their expiry only until
//! this job sweeps them, and the rate limiter drops windows that have
//! lapsed so it does not hold one entry per client address forever.

use std::sync::Arc;
use std::time::Duration;

use crate::auth::middleware::RateLimiter;
use crate::clock::now_unix;
use crate::storage::Store;

/// Run the cleanup loop.
///
/// Sweeps expired reset tokens and lapsed rate-limit windows every
/// `interval`.
pub async fn run_cleanup_loop(
    store: Arc<dyn Store>,
    rate_limiter: Arc<RateLimiter>,
    interval: Duration,
) {
    loop {
        tokio::time::sleep(interval).await;

        let evicted = rate_limiter.evict_lapsed();

        match store.purge_expired_reset_tokens(now_unix()).await {
            Ok(purged) => {
                if purged > 0 || evicted > 0 {
                    tracing::info!(
                        purged_reset_tokens = purged,
                        evicted_rate_windows = evicted,
                        "Cleanup job completed"
                    );
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "Cleanup job failed");
            }
        }
    }
}
