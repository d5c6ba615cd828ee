//! Bulk maintenance statements.

use crate::calendar::day::format_day_key;
use crate::repo::{ensure_connection_ready, RepoResult};
use chrono::NaiveDate;
use rusqlite::{Connection, Transaction, TransactionBehavior};

/// Rows removed per table by a purge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PurgeCounts {
    pub entries: usize,
    pub reflections: usize,
    pub diary: usize,
}

impl PurgeCounts {
    pub fn total(&self) -> usize {
        self.entries + self.reflections + self.diary
    }
}

/// Deletes every dated row strictly after `cutoff`, in one transaction.
pub fn purge_rows_after(conn: &Connection, cutoff: NaiveDate) -> RepoResult<PurgeCounts> {
    ensure_connection_ready(conn)?;
    let cutoff = format_day_key(cutoff);
    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;

    let counts = PurgeCounts {
        entries: tx.execute("DELETE FROM notas WHERE data > ?1;", [cutoff.as_str()])?,
        reflections: tx.execute("DELETE FROM reflexoes WHERE data > ?1;", [cutoff.as_str()])?,
        diary: tx.execute("DELETE FROM diario WHERE data > ?1;", [cutoff.as_str()])?,
    };

    tx.commit()?;
    Ok(counts)
}
