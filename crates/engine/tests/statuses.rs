use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};

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

#[tokio::test]
async fn post_status_trims_and_stores_content() {
    let (engine, _db) = engine_with_db().await;
    let alice = activated_user(&engine, "alice", "alice@example.com").await;

    let status = engine.post_status(alice.id, "  hello world  ").await.unwrap();
    assert_eq!(status.content, "hello world");
    assert_eq!(status.user_id, alice.id);
}

#[tokio::test]
async fn post_status_validates_content() {
    let (engine, _db) = engine_with_db().await;
    let alice = activated_user(&engine, "alice", "alice@example.com").await;

    let err = engine.post_status(alice.id, "   ").await.unwrap_err();
    assert!(matches!(err, EngineError::InvalidInput(_)));

    let long = "x".repeat(141);
    let err = engine.post_status(alice.id, &long).await.unwrap_err();
    assert!(matches!(err, EngineError::InvalidInput(_)));

    // 140 characters exactly is fine.
    let max = "x".repeat(140);
    engine.post_status(alice.id, &max).await.unwrap();
}

#[tokio::test]
async fn delete_status_is_author_or_admin_only() {
    let (engine, db) = engine_with_db().await;
    let alice = activated_user(&engine, "alice", "alice@example.com").await;
    let bob = activated_user(&engine, "bob", "bob@example.com").await;

    let status = engine.post_status(alice.id, "hello").await.unwrap();

    let err = engine.delete_status(bob.id, status.id).await.unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));

    let backend = db.get_database_backend();
    db.execute(Statement::from_sql_and_values(
        backend,
        "UPDATE users SET admin = 1 WHERE id = ?",
        vec![bob.id.to_string().into()],
    ))
    .await
    .unwrap();

    engine.delete_status(bob.id, status.id).await.unwrap();

    let (statuses, _) = engine.feed(alice.id, 10, None).await.unwrap();
    assert!(statuses.is_empty());
}

#[tokio::test]
async fn delete_unknown_status_is_key_not_found() {
    let (engine, _db) = engine_with_db().await;
    let alice = activated_user(&engine, "alice", "alice@example.com").await;

    let err = engine
        .delete_status(alice.id, uuid::Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
}
