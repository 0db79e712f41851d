//! Daily purge of expired appointments.

use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDateTime, NaiveTime};
use database::{retention, Clock, Database};
use tokio::task::JoinHandle;
use tracing::{error, info};

/// Time to wait from `now` until the next occurrence of `at`.
///
/// If `at` is exactly now, the next run is tomorrow.
pub fn delay_until(now: NaiveDateTime, at: NaiveTime) -> Duration {
    let mut next = now.date().and_time(at);
    if next <= now {
        next += chrono::Duration::days(1);
    }
    (next - now).to_std().unwrap_or(Duration::ZERO)
}

/// Spawn a task that purges appointments past the retention window once a
/// day at `at` local time.
pub fn start_purge_task(db: Database, clock: Arc<dyn Clock>, at: NaiveTime) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let delay = delay_until(clock.now(), at);
            info!(next_in_secs = delay.as_secs(), "Scheduled appointment purge");
            tokio::time::sleep(delay).await;

            match retention::purge_expired(&db, clock.as_ref()).await {
                Ok(deleted) => info!(deleted, "Appointment purge finished"),
                Err(e) => error!("Appointment purge failed: {}", e),
            }
        }
    })
}
