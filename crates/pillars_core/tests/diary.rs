use chrono::{FixedOffset, NaiveDate, TimeZone, Utc};
use pillars_core::db::open_db_in_memory;
use pillars_core::repo::diary_repo::SqliteDiaryRepository;
use pillars_core::repo::pillar_repo::{PillarRepository, SqlitePillarRepository};
use pillars_core::{
    DiaryService, DiaryServiceError, LocalClock, Pillar, PillarId, SaveDiaryRequest,
};
use rusqlite::Connection;

fn clock_at(day: u32) -> LocalClock {
    LocalClock::pinned(
        FixedOffset::east_opt(0).unwrap(),
        Utc.with_ymd_and_hms(2024, 8, day, 18, 0, 0).unwrap(),
    )
}

fn diary_service(conn: &Connection, day: u32) -> DiaryService<SqliteDiaryRepository<'_>> {
    DiaryService::new(SqliteDiaryRepository::try_new(conn).unwrap(), clock_at(day))
}

fn seed(conn: &Connection, name: &str) -> PillarId {
    SqlitePillarRepository::try_new(conn)
        .unwrap()
        .create_pillar(&Pillar::new(name, "📘", "educacao"))
        .unwrap()
}

fn save(pillar_id: PillarId, reflection: &str, action_plan: &str) -> SaveDiaryRequest {
    SaveDiaryRequest {
        pillar_id,
        reflection: reflection.to_string(),
        action_plan: action_plan.to_string(),
    }
}

#[test]
fn saving_twice_on_the_same_day_keeps_one_page() {
    let conn = open_db_in_memory().unwrap();
    let pillar_id = seed(&conn, "Estudos");
    let service = diary_service(&conn, 5);

    let first = service.save_today(&save(pillar_id, "read chapter 1", "")).unwrap();
    let second = service
        .save_today(&save(pillar_id, "read chapters 1-2", "chapter 3 tomorrow"))
        .unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(second.created_at, first.created_at);
    assert_eq!(second.reflection, "read chapters 1-2");
    assert_eq!(second.action_plan, "chapter 3 tomorrow");
    assert_eq!(second.date, NaiveDate::from_ymd_opt(2024, 8, 5).unwrap());
    assert_eq!(service.list(Some(pillar_id)).unwrap().len(), 1);
}

#[test]
fn blank_page_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let pillar_id = seed(&conn, "Estudos");

    let err = diary_service(&conn, 5)
        .save_today(&save(pillar_id, "  ", "\n"))
        .unwrap_err();
    assert!(matches!(err, DiaryServiceError::EmptyEntry));
    assert!(diary_service(&conn, 5).list(None).unwrap().is_empty());
}

#[test]
fn list_is_newest_first_filtered_and_bounded_by_today() {
    let conn = open_db_in_memory().unwrap();
    let study = seed(&conn, "Estudos");
    let money = seed(&conn, "Dinheiro");

    diary_service(&conn, 3)
        .save_today(&save(study, "day three", ""))
        .unwrap();
    diary_service(&conn, 7)
        .save_today(&save(study, "day seven", ""))
        .unwrap();
    diary_service(&conn, 7)
        .save_today(&save(money, "", "budget"))
        .unwrap();

    let viewed_on_day_5 = diary_service(&conn, 5);
    let visible: Vec<String> = viewed_on_day_5
        .list(None)
        .unwrap()
        .into_iter()
        .map(|entry| entry.reflection)
        .collect();
    assert_eq!(visible, vec!["day three"]);

    let viewed_on_day_9 = diary_service(&conn, 9);
    let study_pages = viewed_on_day_9.list(Some(study)).unwrap();
    let days: Vec<u32> = study_pages
        .iter()
        .map(|entry| chrono::Datelike::day(&entry.date))
        .collect();
    assert_eq!(days, vec![7, 3]);
    assert_eq!(viewed_on_day_9.list(None).unwrap().len(), 3);
}

#[test]
fn favorite_flag_round_trips_and_unknown_id_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let pillar_id = seed(&conn, "Estudos");
    let service = diary_service(&conn, 5);
    let page = service.save_today(&save(pillar_id, "notes", "")).unwrap();

    service.set_favorite(page.id, true).unwrap();
    assert!(service.list(None).unwrap()[0].is_favorite);

    // Re-saving the page keeps the flag.
    service.save_today(&save(pillar_id, "more notes", "")).unwrap();
    assert!(service.list(None).unwrap()[0].is_favorite);

    let missing = PillarId::new_v4();
    match service.set_favorite(missing, true) {
        Err(DiaryServiceError::DiaryNotFound(id)) => assert_eq!(id, missing),
        other => panic!("unexpected result: {other:?}"),
    }
}
