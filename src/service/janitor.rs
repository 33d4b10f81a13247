use crate::service::paste_store::PasteStorage;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// Periodically drop expired pastes from stores that do not expire keys on
/// their own. Returns `None` when the backend needs no sweeping.
pub fn spawn_purge_task(storage: PasteStorage, every: Duration) -> Option<JoinHandle<()>> {
    let PasteStorage::Sqlite(_) = storage else {
        return None;
    };

    Some(tokio::spawn(async move {
        info!("Purge task started: interval={:?}", every);
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            match storage.purge_expired().await {
                Ok(0) => debug!("purge pass: nothing expired"),
                Ok(n) => info!(removed = n, "purged expired pastes"),
                Err(e) => warn!(error = %e, "purge pass failed"),
            }
        }
    }))
}
