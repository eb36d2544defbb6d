use std::time::Duration;

use dfood_core::TokenService;
use tokio::{task::JoinHandle, time::MissedTickBehavior};

const MIN_SWEEP_INTERVAL: Duration = Duration::from_secs(1);

/// Periodically drop revocation entries whose token has expired anyway.
///
/// The first sweep happens one full interval after the call. Failures are
/// logged and the loop keeps going; abort the handle to stop it.
pub fn spawn_revocation_sweeper<T>(token_service: T, every: Duration) -> JoinHandle<()>
where
    T: TokenService + 'static,
{
    let every = every.max(MIN_SWEEP_INTERVAL);

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // interval yields immediately on the first tick
        ticker.tick().await;

        loop {
            ticker.tick().await;
            match token_service.purge_expired().await {
                Ok(0) => tracing::trace!("revocation sweep found nothing to purge"),
                Ok(purged) => tracing::info!(purged, "purged expired revocation entries"),
                Err(e) => tracing::error!(error = %e, "revocation sweep failed"),
            }
        }
    })
}
