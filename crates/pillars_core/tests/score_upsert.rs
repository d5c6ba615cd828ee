use chrono::{FixedOffset, NaiveDate, TimeZone, Utc};
use pillars_core::db::open_db_in_memory;
use pillars_core::repo::entry_repo::{EntryListQuery, EntryRepository, SqliteEntryRepository};
use pillars_core::repo::pillar_repo::{PillarRepository, SqlitePillarRepository};
use pillars_core::repo::reflection_repo::{
    ReflectionListQuery, ReflectionRepository, SqliteReflectionRepository,
};
use pillars_core::{
    LocalClock, Pillar, PillarId, Score, ScoreService, ScoreServiceError, ScoreUpsertPolicy,
    ScoreWriteRequest, WriteAction,
};
use rusqlite::Connection;

fn clock() -> LocalClock {
    // 2024-01-15 22:30 at UTC-3 is already 2024-01-16 in UTC.
    LocalClock::pinned(
        FixedOffset::west_opt(3 * 3600).unwrap(),
        Utc.with_ymd_and_hms(2024, 1, 16, 1, 30, 0).unwrap(),
    )
}

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
}

fn seed_pillar(conn: &Connection) -> PillarId {
    let repo = SqlitePillarRepository::try_new(conn).unwrap();
    repo.create_pillar(&Pillar::new("Saude", "🏃", "saude")).unwrap()
}

fn service(conn: &Connection, mirror: bool) -> ScoreService<SqliteEntryRepository<'_>> {
    ScoreService::new(
        SqliteEntryRepository::try_new(conn).unwrap(),
        clock(),
        ScoreUpsertPolicy {
            mirror_notes_to_reflections: mirror,
        },
    )
}

fn request(
    pillar_id: PillarId,
    date: Option<NaiveDate>,
    score: i64,
    notes: &str,
) -> ScoreWriteRequest {
    ScoreWriteRequest {
        pillar_id,
        date,
        score: Score::new(score).unwrap(),
        notes: Some(notes.to_string()),
    }
}

fn count_rows(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {table};"), [], |row| row.get(0))
        .unwrap()
}

#[test]
fn default_date_is_local_today_not_utc_today() {
    let conn = open_db_in_memory().unwrap();
    let pillar_id = seed_pillar(&conn);

    let outcome = service(&conn, true)
        .record_score(&ScoreWriteRequest {
            pillar_id,
            date: None,
            score: Score::new(7).unwrap(),
            notes: None,
        })
        .unwrap();

    assert_eq!(outcome.entry.date, day(15));
    assert_eq!(outcome.action, WriteAction::Inserted);
    assert!(!outcome.reflection_mirrored);
}

#[test]
fn second_write_same_day_updates_in_place() {
    let conn = open_db_in_memory().unwrap();
    let pillar_id = seed_pillar(&conn);
    let service = service(&conn, false);

    let first = service
        .record_score(&request(pillar_id, Some(day(10)), 3, "tired"))
        .unwrap();
    let second = service
        .record_score(&request(pillar_id, Some(day(10)), 8, "better"))
        .unwrap();

    assert_eq!(first.action, WriteAction::Inserted);
    assert_eq!(second.action, WriteAction::Updated);
    assert_eq!(second.entry.id, first.entry.id);
    assert_eq!(second.entry.created_at, first.entry.created_at);
    assert_eq!(second.entry.score.value(), 8);
    assert_eq!(second.entry.notes, "better");
    assert_eq!(count_rows(&conn, "notas"), 1);
}

#[test]
fn identical_writes_are_idempotent() {
    let conn = open_db_in_memory().unwrap();
    let pillar_id = seed_pillar(&conn);
    let service = service(&conn, true);

    let first = service
        .record_score(&request(pillar_id, Some(day(12)), 6, "same note"))
        .unwrap();
    let second = service
        .record_score(&request(pillar_id, Some(day(12)), 6, "same note"))
        .unwrap();

    assert_eq!(first.entry.id, second.entry.id);
    assert_eq!(second.entry.score, first.entry.score);
    assert!(first.reflection_mirrored);
    assert!(!second.reflection_mirrored);
    assert_eq!(count_rows(&conn, "notas"), 1);
    assert_eq!(count_rows(&conn, "reflexoes"), 1);
}

#[test]
fn future_date_is_rejected_without_writing() {
    let conn = open_db_in_memory().unwrap();
    let pillar_id = seed_pillar(&conn);

    let err = service(&conn, true)
        .record_score(&request(pillar_id, Some(day(16)), 5, "from tomorrow"))
        .unwrap_err();

    match err {
        ScoreServiceError::FutureDate(rejection) => {
            assert_eq!(rejection.date, day(16));
            assert_eq!(rejection.today, day(15));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(count_rows(&conn, "notas"), 0);
    assert_eq!(count_rows(&conn, "reflexoes"), 0);
}

#[test]
fn note_is_mirrored_into_reflections_when_enabled() {
    let conn = open_db_in_memory().unwrap();
    let pillar_id = seed_pillar(&conn);

    let outcome = service(&conn, true)
        .record_score(&request(pillar_id, Some(day(14)), 9, "  ran 10k  "))
        .unwrap();
    assert!(outcome.reflection_mirrored);

    let reflections = SqliteReflectionRepository::try_new(&conn)
        .unwrap()
        .list_reflections(&ReflectionListQuery::default())
        .unwrap();
    assert_eq!(reflections.len(), 1);
    assert_eq!(reflections[0].text, "ran 10k");
    assert_eq!(reflections[0].date, day(14));
    assert_eq!(reflections[0].pillar_id, pillar_id);
}

#[test]
fn blank_note_or_disabled_mirroring_writes_no_reflection() {
    let conn = open_db_in_memory().unwrap();
    let pillar_id = seed_pillar(&conn);

    service(&conn, true)
        .record_score(&request(pillar_id, Some(day(1)), 4, "   "))
        .unwrap();
    service(&conn, false)
        .record_score(&request(pillar_id, Some(day(2)), 4, "kept private"))
        .unwrap();

    assert_eq!(count_rows(&conn, "reflexoes"), 0);
    assert_eq!(count_rows(&conn, "notas"), 2);
}

#[test]
fn failed_write_leaves_no_partial_state() {
    let conn = open_db_in_memory().unwrap();
    let unknown_pillar = PillarId::new_v4();

    let err = service(&conn, true)
        .record_score(&request(unknown_pillar, Some(day(3)), 5, "orphan"))
        .unwrap_err();

    assert!(matches!(err, ScoreServiceError::Repo(_)));
    assert_eq!(count_rows(&conn, "notas"), 0);
    assert_eq!(count_rows(&conn, "reflexoes"), 0);
}

fn block_reflection_inserts(conn: &Connection) {
    conn.execute_batch(
        "CREATE TRIGGER fail_reflexoes BEFORE INSERT ON reflexoes
         BEGIN SELECT RAISE(ABORT, 'reflection insert blocked'); END;",
    )
    .unwrap();
}

#[test]
fn failed_reflection_mirror_rolls_back_new_entry() {
    let conn = open_db_in_memory().unwrap();
    let pillar_id = seed_pillar(&conn);
    block_reflection_inserts(&conn);

    let err = service(&conn, true)
        .record_score(&request(pillar_id, Some(day(5)), 6, "walked home"))
        .unwrap_err();

    assert!(matches!(err, ScoreServiceError::Repo(_)));
    assert_eq!(count_rows(&conn, "notas"), 0);
    assert_eq!(count_rows(&conn, "reflexoes"), 0);
}

#[test]
fn failed_reflection_mirror_keeps_previous_entry() {
    let conn = open_db_in_memory().unwrap();
    let pillar_id = seed_pillar(&conn);
    let before = service(&conn, false)
        .record_score(&request(pillar_id, Some(day(5)), 4, "slow start"))
        .unwrap();
    block_reflection_inserts(&conn);

    let err = service(&conn, true)
        .record_score(&request(pillar_id, Some(day(5)), 9, "strong finish"))
        .unwrap_err();
    assert!(matches!(err, ScoreServiceError::Repo(_)));

    let stored = SqliteEntryRepository::try_new(&conn)
        .unwrap()
        .get_entry(pillar_id, day(5))
        .unwrap()
        .unwrap();
    assert_eq!(stored.id, before.entry.id);
    assert_eq!(stored.score.value(), 4);
    assert_eq!(stored.notes, "slow start");
    assert_eq!(stored.updated_at, before.entry.updated_at);
    assert_eq!(count_rows(&conn, "notas"), 1);
    assert_eq!(count_rows(&conn, "reflexoes"), 0);
}

#[test]
fn history_is_ordered_by_date_and_bounded() {
    let conn = open_db_in_memory().unwrap();
    let pillar_id = seed_pillar(&conn);
    let service = service(&conn, false);
    for (d, score) in [(9, 5), (3, 2), (6, 7)] {
        service
            .record_score(&request(pillar_id, Some(day(d)), score, ""))
            .unwrap();
    }

    let repo = SqliteEntryRepository::try_new(&conn).unwrap();
    let entries = repo
        .list_entries(&EntryListQuery {
            pillar_id: Some(pillar_id),
            up_to: Some(day(8)),
            date: None,
        })
        .unwrap();

    let dates: Vec<NaiveDate> = entries.iter().map(|entry| entry.date).collect();
    assert_eq!(dates, vec![day(3), day(6)]);
    assert!(repo.get_entry(pillar_id, day(4)).unwrap().is_none());
}
