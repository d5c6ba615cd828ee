//! Diary repository over the `diario` table.
//!
//! # Invariants
//! - `(card_id, data)` is unique; saving the same day again updates in
//!   place and keeps the original id and `created_at`.

use crate::calendar::day::format_day_key;
use crate::model::diary::{DiaryEntry, DiaryId};
use crate::model::pillar::PillarId;
use crate::repo::{
    bool_to_int, ensure_connection_ready, parse_flag, parse_stored_date, parse_uuid, RepoError,
    RepoResult,
};
use chrono::NaiveDate;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

const DIARY_SELECT_SQL: &str = "SELECT
    id,
    card_id,
    data,
    reflexao_geral,
    plano_acao,
    is_favorite,
    created_at,
    updated_at
FROM diario";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiaryListQuery {
    pub pillar_id: Option<PillarId>,
    /// Inclusive upper bound, usually local today.
    pub up_to: Option<NaiveDate>,
}

pub trait DiaryRepository {
    /// Inserts or updates the page for `(pillar_id, date)`; returns the stored row.
    fn upsert_diary(&self, entry: &DiaryEntry) -> RepoResult<DiaryEntry>;
    fn get_diary(&self, pillar_id: PillarId, date: NaiveDate) -> RepoResult<Option<DiaryEntry>>;
    /// Newest day first.
    fn list_diary(&self, query: &DiaryListQuery) -> RepoResult<Vec<DiaryEntry>>;
    fn set_diary_favorite(&self, id: DiaryId, is_favorite: bool) -> RepoResult<()>;
}

/// SQLite-backed diary repository.
pub struct SqliteDiaryRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteDiaryRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl DiaryRepository for SqliteDiaryRepository<'_> {
    fn upsert_diary(&self, entry: &DiaryEntry) -> RepoResult<DiaryEntry> {
        self.conn.execute(
            "INSERT INTO diario (
                id,
                card_id,
                data,
                reflexao_geral,
                plano_acao,
                is_favorite,
                created_at,
                updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ON CONFLICT (card_id, data) DO UPDATE SET
                reflexao_geral = excluded.reflexao_geral,
                plano_acao = excluded.plano_acao,
                updated_at = excluded.updated_at;",
            params![
                entry.id.to_string(),
                entry.pillar_id.to_string(),
                format_day_key(entry.date),
                entry.reflection.as_str(),
                entry.action_plan.as_str(),
                bool_to_int(entry.is_favorite),
                entry.created_at,
                entry.updated_at,
            ],
        )?;

        self.get_diary(entry.pillar_id, entry.date)?.ok_or_else(|| {
            RepoError::InvalidData("diary page missing after upsert".to_string())
        })
    }

    fn get_diary(&self, pillar_id: PillarId, date: NaiveDate) -> RepoResult<Option<DiaryEntry>> {
        let mut stmt = self.conn.prepare(&format!(
            "{DIARY_SELECT_SQL} WHERE card_id = ?1 AND data = ?2;"
        ))?;
        let mut rows = stmt.query(params![pillar_id.to_string(), format_day_key(date)])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_diary_row(row)?));
        }
        Ok(None)
    }

    fn list_diary(&self, query: &DiaryListQuery) -> RepoResult<Vec<DiaryEntry>> {
        let mut sql = format!("{DIARY_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(pillar_id) = query.pillar_id {
            sql.push_str(" AND card_id = ?");
            bind_values.push(Value::Text(pillar_id.to_string()));
        }
        if let Some(up_to) = query.up_to {
            sql.push_str(" AND data <= ?");
            bind_values.push(Value::Text(format_day_key(up_to)));
        }
        sql.push_str(" ORDER BY data DESC, updated_at DESC");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut entries = Vec::new();
        while let Some(row) = rows.next()? {
            entries.push(parse_diary_row(row)?);
        }
        Ok(entries)
    }

    fn set_diary_favorite(&self, id: DiaryId, is_favorite: bool) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE diario SET is_favorite = ?2 WHERE id = ?1;",
            params![id.to_string(), bool_to_int(is_favorite)],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound { kind: "diary", id });
        }
        Ok(())
    }
}

fn parse_diary_row(row: &Row<'_>) -> RepoResult<DiaryEntry> {
    let id: String = row.get("id")?;
    let pillar_id: String = row.get("card_id")?;
    let date: String = row.get("data")?;

    Ok(DiaryEntry {
        id: parse_uuid(&id, "diario.id")?,
        pillar_id: parse_uuid(&pillar_id, "diario.card_id")?,
        date: parse_stored_date(&date, "diario.data")?,
        reflection: row.get("reflexao_geral")?,
        action_plan: row.get("plano_acao")?,
        is_favorite: parse_flag(row.get("is_favorite")?, "diario.is_favorite")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
