//! Age-based purge of past appointments.

use chrono::{Duration, NaiveDateTime};
use tracing::info;

use crate::appointment;
use crate::clock::Clock;
use crate::{Database, Result};

/// Appointments are kept for this many days after their date.
pub const RETENTION_DAYS: i64 = 10;

/// Oldest instant that survives a purge run at `now`.
pub fn retention_cutoff(now: NaiveDateTime) -> NaiveDateTime {
    now - Duration::days(RETENTION_DAYS)
}

/// Delete every appointment scheduled strictly before `cutoff`.
///
/// Returns the number of deleted rows; running it again with the same or
/// an earlier cutoff deletes nothing.
pub async fn purge_older_than(db: &Database, cutoff: NaiveDateTime) -> Result<u64> {
    let deleted = appointment::purge_older_than(db.pool(), cutoff).await?;
    info!(%cutoff, deleted, "Purged old appointments");
    Ok(deleted)
}

/// Purge appointments older than the retention window, measured from the
/// clock's current time.
pub async fn purge_expired(db: &Database, clock: &dyn Clock) -> Result<u64> {
    purge_older_than(db, retention_cutoff(clock.now())).await
}
