//! Pillar repository over the `cards` table.
//!
//! # Invariants
//! - Pillars are listed in creation order.
//! - Write paths call `Pillar::validate()` before SQL mutations.

use crate::model::pillar::{Pillar, PillarId};
use crate::repo::{ensure_connection_ready, parse_uuid, RepoResult};
use rusqlite::{params, Connection, OptionalExtension, Row};

const PILLAR_SELECT_SQL: &str = "SELECT id, nome, icone, categoria FROM cards";

pub trait PillarRepository {
    fn create_pillar(&self, pillar: &Pillar) -> RepoResult<PillarId>;
    fn get_pillar(&self, id: PillarId) -> RepoResult<Option<Pillar>>;
    fn list_pillars(&self) -> RepoResult<Vec<Pillar>>;
}

/// SQLite-backed pillar repository.
pub struct SqlitePillarRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqlitePillarRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl PillarRepository for SqlitePillarRepository<'_> {
    fn create_pillar(&self, pillar: &Pillar) -> RepoResult<PillarId> {
        pillar.validate()?;
        self.conn.execute(
            "INSERT INTO cards (id, nome, icone, categoria) VALUES (?1, ?2, ?3, ?4);",
            params![
                pillar.id.to_string(),
                pillar.name.trim(),
                pillar.icon.as_str(),
                pillar.category.as_str(),
            ],
        )?;
        Ok(pillar.id)
    }

    fn get_pillar(&self, id: PillarId) -> RepoResult<Option<Pillar>> {
        let row = self
            .conn
            .query_row(
                &format!("{PILLAR_SELECT_SQL} WHERE id = ?1;"),
                [id.to_string()],
                read_pillar_columns,
            )
            .optional()?;
        row.map(into_pillar).transpose()
    }

    fn list_pillars(&self) -> RepoResult<Vec<Pillar>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PILLAR_SELECT_SQL} ORDER BY created_at ASC, rowid ASC;"))?;
        let rows = stmt.query_map([], read_pillar_columns)?;
        let mut pillars = Vec::new();
        for row in rows {
            pillars.push(into_pillar(row?)?);
        }
        Ok(pillars)
    }
}

type PillarColumns = (String, String, String, String);

fn read_pillar_columns(row: &Row<'_>) -> rusqlite::Result<PillarColumns> {
    Ok((
        row.get("id")?,
        row.get("nome")?,
        row.get("icone")?,
        row.get("categoria")?,
    ))
}

fn into_pillar((id, name, icon, category): PillarColumns) -> RepoResult<Pillar> {
    Ok(Pillar {
        id: parse_uuid(&id, "cards.id")?,
        name,
        icon,
        category,
    })
}
