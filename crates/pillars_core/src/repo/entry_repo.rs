//! Daily score repository over the `notas` table.
//!
//! # Responsibility
//! - Read score history per pillar and per day.
//! - Apply a score write (entry insert/update plus optional mirrored
//!   reflection) atomically.
//!
//! # Invariants
//! - `(card_id, data)` is unique; an update never changes the entry id.
//! - A score write commits entirely or not at all.
//! - An identical reflection (pillar, date, text) is never appended twice.

use crate::calendar::day::format_day_key;
use crate::model::entry::{DailyEntry, Score};
use crate::model::pillar::PillarId;
use crate::model::reflection::Reflection;
use crate::repo::reflection_repo::{insert_reflection_row, reflection_text_exists};
use crate::repo::{ensure_connection_ready, parse_stored_date, parse_uuid, RepoError, RepoResult};
use chrono::NaiveDate;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row, Transaction, TransactionBehavior};

const ENTRY_SELECT_SQL: &str = "SELECT
    id,
    card_id,
    data,
    nota,
    anotacao,
    created_at,
    updated_at
FROM notas";

/// Entry half of a score write, as decided by the upsert policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryWrite {
    Insert(DailyEntry),
    /// Full replacement of score/notes/updated_at for an existing id.
    Update(DailyEntry),
}

impl EntryWrite {
    pub fn entry(&self) -> &DailyEntry {
        match self {
            Self::Insert(entry) | Self::Update(entry) => entry,
        }
    }
}

/// Everything one score submission persists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreWriteSet {
    pub entry: EntryWrite,
    pub reflection: Option<Reflection>,
}

/// What a committed score write actually stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreWriteReceipt {
    /// `false` when no reflection was requested or an identical one existed.
    pub reflection_inserted: bool,
}

/// Filter for history reads.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryListQuery {
    pub pillar_id: Option<PillarId>,
    /// Inclusive upper bound, usually local today.
    pub up_to: Option<NaiveDate>,
    /// Exact day match.
    pub date: Option<NaiveDate>,
}

pub trait EntryRepository {
    fn get_entry(&self, pillar_id: PillarId, date: NaiveDate) -> RepoResult<Option<DailyEntry>>;
    /// Entries ordered by date ascending.
    fn list_entries(&self, query: &EntryListQuery) -> RepoResult<Vec<DailyEntry>>;
    fn apply_score_write(&self, write: &ScoreWriteSet) -> RepoResult<ScoreWriteReceipt>;
}

/// SQLite-backed entry repository.
pub struct SqliteEntryRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteEntryRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl EntryRepository for SqliteEntryRepository<'_> {
    fn get_entry(&self, pillar_id: PillarId, date: NaiveDate) -> RepoResult<Option<DailyEntry>> {
        let mut stmt = self.conn.prepare(&format!(
            "{ENTRY_SELECT_SQL} WHERE card_id = ?1 AND data = ?2;"
        ))?;
        let mut rows = stmt.query(params![pillar_id.to_string(), format_day_key(date)])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_entry_row(row)?));
        }
        Ok(None)
    }

    fn list_entries(&self, query: &EntryListQuery) -> RepoResult<Vec<DailyEntry>> {
        let mut sql = format!("{ENTRY_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(pillar_id) = query.pillar_id {
            sql.push_str(" AND card_id = ?");
            bind_values.push(Value::Text(pillar_id.to_string()));
        }
        if let Some(up_to) = query.up_to {
            sql.push_str(" AND data <= ?");
            bind_values.push(Value::Text(format_day_key(up_to)));
        }
        if let Some(date) = query.date {
            sql.push_str(" AND data = ?");
            bind_values.push(Value::Text(format_day_key(date)));
        }
        sql.push_str(" ORDER BY data ASC, card_id ASC");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut entries = Vec::new();
        while let Some(row) = rows.next()? {
            entries.push(parse_entry_row(row)?);
        }
        Ok(entries)
    }

    fn apply_score_write(&self, write: &ScoreWriteSet) -> RepoResult<ScoreWriteReceipt> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;

        match &write.entry {
            EntryWrite::Insert(entry) => insert_entry(&tx, entry)?,
            EntryWrite::Update(entry) => update_entry(&tx, entry)?,
        }

        let reflection_inserted = match &write.reflection {
            Some(reflection) => insert_reflection_once(&tx, reflection)?,
            None => false,
        };

        tx.commit()?;
        Ok(ScoreWriteReceipt {
            reflection_inserted,
        })
    }
}

fn insert_entry(tx: &Transaction<'_>, entry: &DailyEntry) -> RepoResult<()> {
    tx.execute(
        "INSERT INTO notas (id, card_id, data, nota, anotacao, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
        params![
            entry.id.to_string(),
            entry.pillar_id.to_string(),
            format_day_key(entry.date),
            entry.score.value(),
            entry.notes.as_str(),
            entry.created_at,
            entry.updated_at,
        ],
    )?;
    Ok(())
}

fn update_entry(tx: &Transaction<'_>, entry: &DailyEntry) -> RepoResult<()> {
    let changed = tx.execute(
        "UPDATE notas
         SET
            nota = ?2,
            anotacao = ?3,
            updated_at = ?4
         WHERE id = ?1;",
        params![
            entry.id.to_string(),
            entry.score.value(),
            entry.notes.as_str(),
            entry.updated_at,
        ],
    )?;
    if changed == 0 {
        return Err(RepoError::NotFound {
            kind: "entry",
            id: entry.id,
        });
    }
    Ok(())
}

fn insert_reflection_once(tx: &Transaction<'_>, reflection: &Reflection) -> RepoResult<bool> {
    if reflection_text_exists(tx, reflection)? {
        return Ok(false);
    }
    insert_reflection_row(tx, reflection)?;
    Ok(true)
}

fn parse_entry_row(row: &Row<'_>) -> RepoResult<DailyEntry> {
    let id: String = row.get("id")?;
    let pillar_id: String = row.get("card_id")?;
    let date: String = row.get("data")?;
    let raw_score: i64 = row.get("nota")?;
    let score = Score::new(raw_score).map_err(|_| {
        RepoError::InvalidData(format!("invalid score value `{raw_score}` in notas.nota"))
    })?;

    Ok(DailyEntry {
        id: parse_uuid(&id, "notas.id")?,
        pillar_id: parse_uuid(&pillar_id, "notas.card_id")?,
        date: parse_stored_date(&date, "notas.data")?,
        score,
        notes: row.get("anotacao")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
