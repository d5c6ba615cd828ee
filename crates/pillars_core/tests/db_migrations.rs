use pillars_core::db::migrations::latest_version;
use pillars_core::db::{open_db, open_db_in_memory, DbError};
use pillars_core::repo::pillar_repo::SqlitePillarRepository;
use pillars_core::RepoError;
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "cards");
    assert_table_exists(&conn, "notas");
    assert_table_exists(&conn, "reflexoes");
    assert_table_exists(&conn, "diario");
    assert_column_exists(&conn, "reflexoes", "is_favorite");
    assert_column_exists(&conn, "diario", "is_favorite");
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("pillars.db");

    let conn_first = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_first), latest_version());
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    assert_table_exists(&conn_second, "notas");
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    match err {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn repositories_reject_unmigrated_connections() {
    let conn = Connection::open_in_memory().unwrap();

    match SqlitePillarRepository::try_new(&conn) {
        Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        }) => {
            assert_eq!(expected_version, latest_version());
            assert_eq!(actual_version, 0);
        }
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("unmigrated connection was accepted"),
    }
}

#[test]
fn score_and_uniqueness_constraints_are_enforced_by_schema() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO cards (id, nome) VALUES ('c1', 'Saude');",
        [],
    )
    .unwrap();

    let out_of_range = conn.execute(
        "INSERT INTO notas (id, card_id, data, nota, created_at, updated_at)
         VALUES ('n1', 'c1', '2024-01-01', 11, 0, 0);",
        [],
    );
    assert!(out_of_range.is_err());

    conn.execute(
        "INSERT INTO notas (id, card_id, data, nota, created_at, updated_at)
         VALUES ('n2', 'c1', '2024-01-01', 5, 0, 0);",
        [],
    )
    .unwrap();
    let duplicate_day = conn.execute(
        "INSERT INTO notas (id, card_id, data, nota, created_at, updated_at)
         VALUES ('n3', 'c1', '2024-01-01', 6, 0, 0);",
        [],
    );
    assert!(duplicate_day.is_err());
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}

fn assert_column_exists(conn: &Connection, table_name: &str, column: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM pragma_table_info(?1)
                WHERE name = ?2
            );",
            [table_name, column],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "column {table_name}.{column} does not exist");
}
