use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info};

use atria_core::expiry;
use atria_domain::BookingStore;

/// Periodic expiry sweep, independent of request traffic. Request handlers
/// also sweep opportunistically; the sweep is idempotent, so the two never
/// conflict.
pub async fn start_expiry_worker(
    bookings: Arc<dyn BookingStore>,
    grace: chrono::Duration,
    every: Duration,
) {
    info!("Expiry worker started, sweeping every {:?}", every);
    let mut ticker = tokio::time::interval(every);

    loop {
        ticker.tick().await;
        if let Err(e) = expiry::sweep_expired(bookings.as_ref(), grace).await {
            error!("Expiry sweep failed: {}", e);
        }
    }
}
