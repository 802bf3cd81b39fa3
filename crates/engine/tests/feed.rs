use chrono::{DateTime, TimeZone, Utc};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};
use uuid::Uuid;

use engine::{Engine, EngineError, NewUser};
use migration::MigratorTrait;

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    (engine, db)
}

async fn activated_user(engine: &Engine, name: &str, email: &str) -> engine::User {
    let (_, token) = engine
        .register(NewUser {
            name: name.to_string(),
            email: email.to_string(),
            password: "hunter22".to_string(),
        })
        .await
        .unwrap();
    engine.activate(&token).await.unwrap()
}

/// Insert a status at a chosen instant, so ordering assertions don't depend
/// on the wall clock.
async fn insert_status(
    db: &DatabaseConnection,
    author: &engine::User,
    id: Uuid,
    content: &str,
    created_at: DateTime<Utc>,
) {
    let backend = db.get_database_backend();
    db.execute(Statement::from_sql_and_values(
        backend,
        "INSERT INTO statuses (id, user_id, content, created_at) VALUES (?, ?, ?, ?)",
        vec![
            id.to_string().into(),
            author.id.to_string().into(),
            content.into(),
            created_at.into(),
        ],
    ))
    .await
    .unwrap();
}

fn at(minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 1, 10, minute, 0).unwrap()
}

fn status_id(n: u128) -> Uuid {
    Uuid::from_u128(n)
}

#[tokio::test]
async fn feed_includes_own_statuses_with_zero_followings() {
    let (engine, _db) = engine_with_db().await;
    let alice = activated_user(&engine, "alice", "alice@example.com").await;

    engine.post_status(alice.id, "hello").await.unwrap();

    let (statuses, next) = engine.feed(alice.id, 10, None).await.unwrap();
    assert_eq!(statuses.len(), 1);
    assert_eq!(statuses[0].content, "hello");
    assert!(next.is_none());
}

#[tokio::test]
async fn feed_merges_followed_authors_newest_first() {
    let (engine, db) = engine_with_db().await;
    let alice = activated_user(&engine, "alice", "alice@example.com").await;
    let bob = activated_user(&engine, "bob", "bob@example.com").await;
    let carol = activated_user(&engine, "carol", "carol@example.com").await;

    insert_status(&db, &alice, status_id(1), "me", at(1)).await;
    insert_status(&db, &bob, status_id(2), "world", at(2)).await;
    insert_status(&db, &carol, status_id(3), "hello", at(3)).await;

    engine.follow(alice.id, &[bob.id]).await.unwrap();

    let (statuses, next) = engine.feed(alice.id, 10, None).await.unwrap();
    let contents: Vec<&str> = statuses.iter().map(|s| s.content.as_str()).collect();
    // carol is not followed, so "hello" stays out.
    assert_eq!(contents, vec!["world", "me"]);
    assert!(next.is_none());
}

#[tokio::test]
async fn feed_unions_several_followed_authors_with_own_statuses() {
    let (engine, db) = engine_with_db().await;
    let alice = activated_user(&engine, "alice", "alice@example.com").await;
    let bob = activated_user(&engine, "bob", "bob@example.com").await;
    let carol = activated_user(&engine, "carol", "carol@example.com").await;

    insert_status(&db, &bob, status_id(1), "hello", at(1)).await;
    insert_status(&db, &carol, status_id(2), "world", at(2)).await;
    insert_status(&db, &alice, status_id(3), "me", at(3)).await;

    engine.follow(alice.id, &[bob.id, carol.id]).await.unwrap();

    let (statuses, next) = engine.feed(alice.id, 10, None).await.unwrap();
    let contents: Vec<&str> = statuses.iter().map(|s| s.content.as_str()).collect();
    assert_eq!(contents, vec!["me", "world", "hello"]);
    assert!(next.is_none());
}

#[tokio::test]
async fn equal_timestamps_break_ties_by_id() {
    let (engine, db) = engine_with_db().await;
    let alice = activated_user(&engine, "alice", "alice@example.com").await;

    insert_status(&db, &alice, status_id(1), "first", at(5)).await;
    insert_status(&db, &alice, status_id(2), "second", at(5)).await;

    let (statuses, _) = engine.feed(alice.id, 10, None).await.unwrap();
    let ids: Vec<Uuid> = statuses.iter().map(|s| s.id).collect();
    assert_eq!(ids, vec![status_id(2), status_id(1)]);
}

#[tokio::test]
async fn cursor_walks_the_whole_feed_without_gaps() {
    let (engine, db) = engine_with_db().await;
    let alice = activated_user(&engine, "alice", "alice@example.com").await;

    for n in 1..=5u128 {
        insert_status(&db, &alice, status_id(n), &format!("status {n}"), at(n as u32)).await;
    }

    let (page1, cursor1) = engine.feed(alice.id, 2, None).await.unwrap();
    assert_eq!(page1.len(), 2);
    let cursor1 = cursor1.unwrap();

    let (page2, cursor2) = engine.feed(alice.id, 2, Some(&cursor1)).await.unwrap();
    assert_eq!(page2.len(), 2);
    let cursor2 = cursor2.unwrap();

    let (page3, cursor3) = engine.feed(alice.id, 2, Some(&cursor2)).await.unwrap();
    assert_eq!(page3.len(), 1);
    assert!(cursor3.is_none());

    let ids: Vec<Uuid> = page1
        .iter()
        .chain(page2.iter())
        .chain(page3.iter())
        .map(|s| s.id)
        .collect();
    assert_eq!(
        ids,
        vec![
            status_id(5),
            status_id(4),
            status_id(3),
            status_id(2),
            status_id(1)
        ]
    );
}

#[tokio::test]
async fn full_last_page_has_no_cursor() {
    let (engine, db) = engine_with_db().await;
    let alice = activated_user(&engine, "alice", "alice@example.com").await;

    insert_status(&db, &alice, status_id(1), "one", at(1)).await;
    insert_status(&db, &alice, status_id(2), "two", at(2)).await;

    let (statuses, next) = engine.feed(alice.id, 2, None).await.unwrap();
    assert_eq!(statuses.len(), 2);
    assert!(next.is_none());
}

#[tokio::test]
async fn malformed_cursor_is_invalid_input() {
    let (engine, _db) = engine_with_db().await;
    let alice = activated_user(&engine, "alice", "alice@example.com").await;

    let err = engine
        .feed(alice.id, 10, Some("not-a-cursor"))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidInput(_)));
}

#[tokio::test]
async fn user_statuses_lists_a_single_author() {
    let (engine, db) = engine_with_db().await;
    let alice = activated_user(&engine, "alice", "alice@example.com").await;
    let bob = activated_user(&engine, "bob", "bob@example.com").await;

    insert_status(&db, &alice, status_id(1), "mine", at(1)).await;
    insert_status(&db, &bob, status_id(2), "theirs", at(2)).await;

    let (statuses, next) = engine.user_statuses(alice.id, 10, None).await.unwrap();
    assert_eq!(statuses.len(), 1);
    assert_eq!(statuses[0].content, "mine");
    assert!(next.is_none());
}

#[tokio::test]
async fn feed_requires_known_viewer() {
    let (engine, _db) = engine_with_db().await;

    let err = engine.feed(Uuid::new_v4(), 10, None).await.unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
}
