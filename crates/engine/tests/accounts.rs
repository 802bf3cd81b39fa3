use chrono::{Duration, Utc};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};

use engine::{Engine, EngineError, NewUser, UserUpdate};
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

fn new_user(name: &str, email: &str) -> NewUser {
    NewUser {
        name: name.to_string(),
        email: email.to_string(),
        password: "hunter22".to_string(),
    }
}

async fn activated_user(engine: &Engine, name: &str, email: &str) -> engine::User {
    let (_, token) = engine.register(new_user(name, email)).await.unwrap();
    engine.activate(&token).await.unwrap()
}

async fn make_admin(db: &DatabaseConnection, user: &engine::User) {
    let backend = db.get_database_backend();
    db.execute(Statement::from_sql_and_values(
        backend,
        "UPDATE users SET admin = 1 WHERE id = ?",
        vec![user.id.to_string().into()],
    ))
    .await
    .unwrap();
}

#[tokio::test]
async fn register_creates_unactivated_user() {
    let (engine, _db) = engine_with_db().await;

    let (user, token) = engine
        .register(new_user("alice", "Alice@Example.com"))
        .await
        .unwrap();

    assert!(!user.activated);
    assert!(!user.admin);
    assert_eq!(user.email, "alice@example.com");
    assert!(!token.is_empty());
}

#[tokio::test]
async fn activation_token_is_single_use() {
    let (engine, _db) = engine_with_db().await;
    let (_, token) = engine
        .register(new_user("alice", "alice@example.com"))
        .await
        .unwrap();

    let user = engine.activate(&token).await.unwrap();
    assert!(user.activated);

    let err = engine.activate(&token).await.unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
}

#[tokio::test]
async fn duplicate_email_and_name_are_rejected() {
    let (engine, _db) = engine_with_db().await;
    activated_user(&engine, "alice", "alice@example.com").await;

    let err = engine
        .register(new_user("somebody", "alice@example.com"))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::ExistingKey(_)));

    let err = engine
        .register(new_user("alice", "other@example.com"))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::ExistingKey(_)));
}

#[tokio::test]
async fn authenticate_does_not_reveal_which_part_failed() {
    let (engine, _db) = engine_with_db().await;
    activated_user(&engine, "alice", "alice@example.com").await;

    let unknown = engine
        .authenticate("nobody@example.com", "hunter22")
        .await
        .unwrap_err();
    let bad_password = engine
        .authenticate("alice@example.com", "wrong-password")
        .await
        .unwrap_err();

    assert_eq!(unknown, bad_password);
    assert!(matches!(unknown, EngineError::KeyNotFound(_)));
}

#[tokio::test]
async fn authenticate_rejects_unactivated_account() {
    let (engine, _db) = engine_with_db().await;
    engine
        .register(new_user("alice", "alice@example.com"))
        .await
        .unwrap();

    let err = engine
        .authenticate("alice@example.com", "hunter22")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));
}

#[tokio::test]
async fn update_profile_is_self_or_admin_only() {
    let (engine, db) = engine_with_db().await;
    let alice = activated_user(&engine, "alice", "alice@example.com").await;
    let bob = activated_user(&engine, "bob", "bob@example.com").await;

    let update = UserUpdate {
        name: Some("alice2".to_string()),
        password: None,
    };
    let err = engine
        .update_profile(bob.id, alice.id, update.clone())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));

    make_admin(&db, &bob).await;
    let renamed = engine
        .update_profile(bob.id, alice.id, update)
        .await
        .unwrap();
    assert_eq!(renamed.name, "alice2");
}

#[tokio::test]
async fn update_profile_rejects_taken_name() {
    let (engine, _db) = engine_with_db().await;
    let alice = activated_user(&engine, "alice", "alice@example.com").await;
    activated_user(&engine, "bob", "bob@example.com").await;

    let err = engine
        .update_profile(
            alice.id,
            alice.id,
            UserUpdate {
                name: Some("bob".to_string()),
                password: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::ExistingKey(_)));
}

#[tokio::test]
async fn update_password_changes_credentials() {
    let (engine, _db) = engine_with_db().await;
    let alice = activated_user(&engine, "alice", "alice@example.com").await;

    engine
        .update_profile(
            alice.id,
            alice.id,
            UserUpdate {
                name: None,
                password: Some("new-password".to_string()),
            },
        )
        .await
        .unwrap();

    assert!(
        engine
            .authenticate("alice@example.com", "hunter22")
            .await
            .is_err()
    );
    engine
        .authenticate("alice@example.com", "new-password")
        .await
        .unwrap();
}

#[tokio::test]
async fn delete_user_removes_statuses_and_edges() {
    let (engine, _db) = engine_with_db().await;
    let alice = activated_user(&engine, "alice", "alice@example.com").await;
    let bob = activated_user(&engine, "bob", "bob@example.com").await;

    engine.post_status(alice.id, "soon gone").await.unwrap();
    engine.follow(alice.id, &[bob.id]).await.unwrap();
    engine.follow(bob.id, &[alice.id]).await.unwrap();

    engine.delete_user(alice.id, alice.id).await.unwrap();

    let err = engine.user(alice.id).await.unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
    assert!(engine.followers(bob.id).await.unwrap().is_empty());
    assert!(engine.followings(bob.id).await.unwrap().is_empty());

    let (statuses, _) = engine.feed(bob.id, 10, None).await.unwrap();
    assert!(statuses.is_empty());
}

#[tokio::test]
async fn delete_user_requires_self_or_admin() {
    let (engine, _db) = engine_with_db().await;
    let alice = activated_user(&engine, "alice", "alice@example.com").await;
    let bob = activated_user(&engine, "bob", "bob@example.com").await;

    let err = engine.delete_user(bob.id, alice.id).await.unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));
}

#[tokio::test]
async fn password_reset_round_trip() {
    let (engine, _db) = engine_with_db().await;
    activated_user(&engine, "alice", "alice@example.com").await;

    let (_, token) = engine
        .request_password_reset("alice@example.com")
        .await
        .unwrap();
    engine.reset_password(&token, "fresh-password").await.unwrap();

    assert!(
        engine
            .authenticate("alice@example.com", "hunter22")
            .await
            .is_err()
    );
    engine
        .authenticate("alice@example.com", "fresh-password")
        .await
        .unwrap();

    // The token was consumed.
    let err = engine
        .reset_password(&token, "another-password")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
}

#[tokio::test]
async fn expired_reset_token_is_rejected() {
    let (engine, db) = engine_with_db().await;
    let alice = activated_user(&engine, "alice", "alice@example.com").await;

    let (_, token) = engine
        .request_password_reset("alice@example.com")
        .await
        .unwrap();

    let backend = db.get_database_backend();
    db.execute(Statement::from_sql_and_values(
        backend,
        "UPDATE users SET reset_sent_at = ? WHERE id = ?",
        vec![
            (Utc::now() - Duration::minutes(61)).into(),
            alice.id.to_string().into(),
        ],
    ))
    .await
    .unwrap();

    let err = engine
        .reset_password(&token, "fresh-password")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidInput(_)));
}

#[tokio::test]
async fn register_validates_input() {
    let (engine, _db) = engine_with_db().await;

    let err = engine
        .register(new_user("   ", "alice@example.com"))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidInput(_)));

    let err = engine
        .register(new_user("alice", "not-an-email"))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidInput(_)));

    let err = engine
        .register(NewUser {
            name: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password: "short".to_string(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidInput(_)));
}
