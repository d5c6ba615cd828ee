use chrono::{FixedOffset, NaiveDate, TimeZone, Utc};
use pillars_core::db::open_db_in_memory;
use pillars_core::repo::pillar_repo::{PillarRepository, SqlitePillarRepository};
use pillars_core::repo::reflection_repo::{ReflectionRepository, SqliteReflectionRepository};
use pillars_core::{
    group_feed_by_day, LocalClock, Pillar, PillarId, Reflection, ReflectionFeedQuery,
    ReflectionService, ReflectionServiceError,
};
use rusqlite::Connection;

type Service<'conn> =
    ReflectionService<SqliteReflectionRepository<'conn>, SqlitePillarRepository<'conn>>;

fn clock() -> LocalClock {
    LocalClock::pinned(
        FixedOffset::east_opt(0).unwrap(),
        Utc.with_ymd_and_hms(2024, 6, 10, 9, 0, 0).unwrap(),
    )
}

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
}

fn reflection_service(conn: &Connection) -> Service<'_> {
    ReflectionService::new(
        SqliteReflectionRepository::try_new(conn).unwrap(),
        SqlitePillarRepository::try_new(conn).unwrap(),
        clock(),
    )
}

fn seed(conn: &Connection, name: &str) -> PillarId {
    SqlitePillarRepository::try_new(conn)
        .unwrap()
        .create_pillar(&Pillar::new(name, "•", "social"))
        .unwrap()
}

fn insert(conn: &Connection, pillar_id: PillarId, date: NaiveDate, text: &str, created_at: i64) {
    SqliteReflectionRepository::try_new(conn)
        .unwrap()
        .insert_reflection(&Reflection::new(pillar_id, date, text, created_at))
        .unwrap();
}

fn texts(query: &ReflectionFeedQuery, conn: &Connection) -> Vec<String> {
    reflection_service(conn)
        .feed(query)
        .unwrap()
        .into_iter()
        .map(|item| item.reflection.text)
        .collect()
}

#[test]
fn add_reflection_dates_today_and_trims_text() {
    let conn = open_db_in_memory().unwrap();
    let pillar_id = seed(&conn, "Amigos");

    let reflection = reflection_service(&conn)
        .add_reflection(pillar_id, "  called an old friend \n")
        .unwrap();

    assert_eq!(reflection.date, day(10));
    assert_eq!(reflection.text, "called an old friend");
    assert!(!reflection.is_favorite);
}

#[test]
fn add_reflection_rejects_blank_text_and_unknown_pillar() {
    let conn = open_db_in_memory().unwrap();
    let pillar_id = seed(&conn, "Amigos");
    let service = reflection_service(&conn);

    assert!(matches!(
        service.add_reflection(pillar_id, " \t "),
        Err(ReflectionServiceError::EmptyText)
    ));
    let missing = PillarId::new_v4();
    match service.add_reflection(missing, "hello") {
        Err(ReflectionServiceError::PillarNotFound(id)) => assert_eq!(id, missing),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn feed_orders_newest_first_and_hides_future_rows() {
    let conn = open_db_in_memory().unwrap();
    let pillar_id = seed(&conn, "Amigos");
    insert(&conn, pillar_id, day(8), "older", 1);
    insert(&conn, pillar_id, day(9), "first of day", 2);
    insert(&conn, pillar_id, day(9), "second of day", 3);
    insert(&conn, pillar_id, day(11), "tomorrow", 4);

    assert_eq!(
        texts(&ReflectionFeedQuery::default(), &conn),
        vec!["second of day", "first of day", "older"]
    );
}

#[test]
fn feed_filters_compose() {
    let conn = open_db_in_memory().unwrap();
    let friends = seed(&conn, "Amigos");
    let work = seed(&conn, "Carreira");
    insert(&conn, friends, day(5), "Dinner with Ana", 1);
    insert(&conn, friends, day(6), "quiet evening", 2);
    insert(&conn, work, day(6), "Shipped the release", 3);

    let by_pillar = ReflectionFeedQuery {
        pillar_id: Some(friends),
        ..ReflectionFeedQuery::default()
    };
    assert_eq!(texts(&by_pillar, &conn).len(), 2);

    let by_date = ReflectionFeedQuery {
        date: Some(day(6)),
        ..ReflectionFeedQuery::default()
    };
    assert_eq!(texts(&by_date, &conn).len(), 2);

    let by_text = ReflectionFeedQuery {
        search: Some("  ANA ".to_string()),
        ..ReflectionFeedQuery::default()
    };
    assert_eq!(texts(&by_text, &conn), vec!["Dinner with Ana"]);

    let by_pillar_name = ReflectionFeedQuery {
        search: Some("carreira".to_string()),
        ..ReflectionFeedQuery::default()
    };
    assert_eq!(texts(&by_pillar_name, &conn), vec!["Shipped the release"]);

    let combined = ReflectionFeedQuery {
        pillar_id: Some(friends),
        date: Some(day(6)),
        search: Some("evening".to_string()),
        favorites_only: false,
    };
    assert_eq!(texts(&combined, &conn), vec!["quiet evening"]);
}

#[test]
fn search_is_case_insensitive_beyond_ascii() {
    let conn = open_db_in_memory().unwrap();
    let pillar_id = seed(&conn, "Saúde");
    insert(&conn, pillar_id, day(3), "ÓTIMA caminhada", 1);

    let query = ReflectionFeedQuery {
        search: Some("ótima".to_string()),
        ..ReflectionFeedQuery::default()
    };
    assert_eq!(texts(&query, &conn), vec!["ÓTIMA caminhada"]);
}

#[test]
fn toggle_favorite_flips_and_filters() {
    let conn = open_db_in_memory().unwrap();
    let pillar_id = seed(&conn, "Amigos");
    let service = reflection_service(&conn);
    let kept = service.add_reflection(pillar_id, "keep this").unwrap();
    service.add_reflection(pillar_id, "not this").unwrap();

    let toggled = service.toggle_favorite(kept.id).unwrap();
    assert!(toggled.is_favorite);

    let favorites = ReflectionFeedQuery {
        favorites_only: true,
        ..ReflectionFeedQuery::default()
    };
    assert_eq!(texts(&favorites, &conn), vec!["keep this"]);

    assert!(!service.toggle_favorite(kept.id).unwrap().is_favorite);
    assert!(texts(&favorites, &conn).is_empty());

    assert!(matches!(
        service.toggle_favorite(PillarId::new_v4()),
        Err(ReflectionServiceError::ReflectionNotFound(_))
    ));
}

#[test]
fn latest_by_pillar_has_one_slot_per_pillar() {
    let conn = open_db_in_memory().unwrap();
    let friends = seed(&conn, "Amigos");
    let work = seed(&conn, "Carreira");
    insert(&conn, friends, day(1), "old", 1);
    insert(&conn, friends, day(7), "new", 2);

    let slots = reflection_service(&conn).latest_by_pillar().unwrap();
    assert_eq!(slots.len(), 2);
    assert_eq!(slots[0].pillar.id, friends);
    assert_eq!(
        slots[0].latest.as_ref().map(|reflection| reflection.text.as_str()),
        Some("new")
    );
    assert_eq!(slots[1].pillar.id, work);
    assert!(slots[1].latest.is_none());
}

#[test]
fn feed_items_group_by_day_newest_first() {
    let conn = open_db_in_memory().unwrap();
    let pillar_id = seed(&conn, "Amigos");
    insert(&conn, pillar_id, day(2), "a", 1);
    insert(&conn, pillar_id, day(4), "b", 2);
    insert(&conn, pillar_id, day(4), "c", 3);

    let items = reflection_service(&conn)
        .feed(&ReflectionFeedQuery::default())
        .unwrap();
    let groups = group_feed_by_day(&items);

    let days: Vec<NaiveDate> = groups.iter().map(|(date, _)| *date).collect();
    assert_eq!(days, vec![day(4), day(2)]);
    assert_eq!(groups[0].1.len(), 2);
    assert_eq!(groups[0].1[0].pillar_name, "Amigos");
}
