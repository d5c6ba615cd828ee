//! Startup maintenance.
//!
//! Removes rows dated after local today so no view ever has to hide them.

use crate::calendar::day::LocalClock;
use crate::repo::maintenance_repo::{purge_rows_after, PurgeCounts};
use crate::repo::RepoResult;
use chrono::NaiveDate;
use log::{error, info, warn};
use rusqlite::Connection;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CleanupReport {
    pub today: NaiveDate,
    pub removed: PurgeCounts,
}

/// Deletes future-dated entries, reflections and diary pages in one transaction.
pub fn cleanup_future_rows(conn: &Connection, clock: &LocalClock) -> RepoResult<CleanupReport> {
    let today = clock.today();
    let removed = purge_rows_after(conn, today).map_err(|err| {
        error!("event=maintenance_cleanup module=service status=error error={err}");
        err
    })?;

    if removed.total() > 0 {
        warn!(
            "event=maintenance_cleanup module=service status=ok entries={} reflections={} diary={}",
            removed.entries, removed.reflections, removed.diary
        );
    } else {
        info!("event=maintenance_cleanup module=service status=ok removed=0");
    }

    Ok(CleanupReport { today, removed })
}
