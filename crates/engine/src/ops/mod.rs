use sea_orm::DatabaseConnection;
use unicode_normalization::UnicodeNormalization;

use crate::{EngineError, ResultEngine};

mod access;
mod accounts;
mod feed;
mod follows;
mod statuses;

pub use accounts::{NewUser, UserUpdate};

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

/// What `follow(actor, {actor})` does.
///
/// `Allow` lets a user follow themself (their own statuses are in their
/// feed either way); `Reject` turns it into a validation error.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SelfFollowPolicy {
    #[default]
    Allow,
    Reject,
}

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
    self_follow: SelfFollowPolicy,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }
}

/// Display names are NFC-normalized so lookups don't depend on how the
/// client composed accented characters.
fn normalize_display_name(value: &str) -> ResultEngine<String> {
    let normalized: String = value.trim().nfc().collect();
    if normalized.is_empty() {
        return Err(EngineError::InvalidInput(
            "name must not be empty".to_string(),
        ));
    }
    if normalized.chars().count() > 50 {
        return Err(EngineError::InvalidInput(
            "name must be at most 50 characters".to_string(),
        ));
    }
    Ok(normalized)
}

fn normalize_email(value: &str) -> ResultEngine<String> {
    let email = value.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') {
        return Err(EngineError::InvalidInput(
            "invalid email address".to_string(),
        ));
    }
    Ok(email)
}

fn normalize_status_content(value: &str) -> ResultEngine<String> {
    let content = value.trim().to_string();
    if content.is_empty() {
        return Err(EngineError::InvalidInput(
            "status content must not be empty".to_string(),
        ));
    }
    if content.chars().count() > 140 {
        return Err(EngineError::InvalidInput(
            "status content must be at most 140 characters".to_string(),
        ));
    }
    Ok(content)
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
    self_follow: SelfFollowPolicy,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Override the self-follow policy (defaults to [`SelfFollowPolicy::Allow`]).
    pub fn self_follow_policy(mut self, policy: SelfFollowPolicy) -> EngineBuilder {
        self.self_follow = policy;
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
            self_follow: self.self_follow,
        })
    }
}
