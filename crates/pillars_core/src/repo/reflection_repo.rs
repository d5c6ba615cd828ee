//! Reflection repository over the `reflexoes` table.
//!
//! # Invariants
//! - Rows are append-only; only `is_favorite` is ever updated.
//! - Lists are ordered newest day first, then newest insert first.

use crate::calendar::day::format_day_key;
use crate::model::pillar::PillarId;
use crate::model::reflection::{Reflection, ReflectionId};
use crate::repo::{
    bool_to_int, ensure_connection_ready, parse_flag, parse_stored_date, parse_uuid, RepoError,
    RepoResult,
};
use chrono::NaiveDate;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

const REFLECTION_SELECT_SQL: &str = "SELECT
    id,
    card_id,
    data,
    texto,
    is_favorite,
    created_at
FROM reflexoes";

/// Filter for reflection reads. Free-text search is applied by the service.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReflectionListQuery {
    pub pillar_id: Option<PillarId>,
    pub date: Option<NaiveDate>,
    /// Inclusive upper bound, usually local today.
    pub up_to: Option<NaiveDate>,
    pub favorites_only: bool,
}

pub trait ReflectionRepository {
    fn insert_reflection(&self, reflection: &Reflection) -> RepoResult<ReflectionId>;
    fn get_reflection(&self, id: ReflectionId) -> RepoResult<Option<Reflection>>;
    fn list_reflections(&self, query: &ReflectionListQuery) -> RepoResult<Vec<Reflection>>;
    fn set_reflection_favorite(&self, id: ReflectionId, is_favorite: bool) -> RepoResult<()>;
}

/// SQLite-backed reflection repository.
pub struct SqliteReflectionRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteReflectionRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl ReflectionRepository for SqliteReflectionRepository<'_> {
    fn insert_reflection(&self, reflection: &Reflection) -> RepoResult<ReflectionId> {
        insert_reflection_row(self.conn, reflection)?;
        Ok(reflection.id)
    }

    fn get_reflection(&self, id: ReflectionId) -> RepoResult<Option<Reflection>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{REFLECTION_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_reflection_row(row)?));
        }
        Ok(None)
    }

    fn list_reflections(&self, query: &ReflectionListQuery) -> RepoResult<Vec<Reflection>> {
        let mut sql = format!("{REFLECTION_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(pillar_id) = query.pillar_id {
            sql.push_str(" AND card_id = ?");
            bind_values.push(Value::Text(pillar_id.to_string()));
        }
        if let Some(date) = query.date {
            sql.push_str(" AND data = ?");
            bind_values.push(Value::Text(format_day_key(date)));
        }
        if let Some(up_to) = query.up_to {
            sql.push_str(" AND data <= ?");
            bind_values.push(Value::Text(format_day_key(up_to)));
        }
        if query.favorites_only {
            sql.push_str(" AND is_favorite = 1");
        }
        sql.push_str(" ORDER BY data DESC, created_at DESC, rowid DESC");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut reflections = Vec::new();
        while let Some(row) = rows.next()? {
            reflections.push(parse_reflection_row(row)?);
        }
        Ok(reflections)
    }

    fn set_reflection_favorite(&self, id: ReflectionId, is_favorite: bool) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE reflexoes SET is_favorite = ?2 WHERE id = ?1;",
            params![id.to_string(), bool_to_int(is_favorite)],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                kind: "reflection",
                id,
            });
        }
        Ok(())
    }
}

/// Inserts one row; usable inside an open transaction.
pub(crate) fn insert_reflection_row(conn: &Connection, reflection: &Reflection) -> RepoResult<()> {
    conn.execute(
        "INSERT INTO reflexoes (id, card_id, data, texto, is_favorite, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
        params![
            reflection.id.to_string(),
            reflection.pillar_id.to_string(),
            format_day_key(reflection.date),
            reflection.text.as_str(),
            bool_to_int(reflection.is_favorite),
            reflection.created_at,
        ],
    )?;
    Ok(())
}

/// Whether a reflection with the same pillar, date and text is stored.
pub(crate) fn reflection_text_exists(
    conn: &Connection,
    reflection: &Reflection,
) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM reflexoes
            WHERE card_id = ?1 AND data = ?2 AND texto = ?3
        );",
        params![
            reflection.pillar_id.to_string(),
            format_day_key(reflection.date),
            reflection.text.as_str(),
        ],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn parse_reflection_row(row: &Row<'_>) -> RepoResult<Reflection> {
    let id: String = row.get("id")?;
    let pillar_id: String = row.get("card_id")?;
    let date: String = row.get("data")?;

    Ok(Reflection {
        id: parse_uuid(&id, "reflexoes.id")?,
        pillar_id: parse_uuid(&pillar_id, "reflexoes.card_id")?,
        date: parse_stored_date(&date, "reflexoes.data")?,
        text: row.get("texto")?,
        is_favorite: parse_flag(row.get("is_favorite")?, "reflexoes.is_favorite")?,
        created_at: row.get("created_at")?,
    })
}
