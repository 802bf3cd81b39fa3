//! Account lifecycle: signup, activation, authentication, profile edits,
//! deletion and the password-reset token flow.
//!
//! Both tokens are single-use secrets: the activation token proves ownership
//! of the registered address, the reset token additionally expires.

use chrono::{Duration, Utc};
use sea_orm::{ActiveValue, Condition, QueryFilter, QueryOrder, QuerySelect, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, User, follows, password, statuses, users};

use super::{Engine, normalize_display_name, normalize_email, with_tx};

/// Reset links sent by mail stop working after this long.
const RESET_TOKEN_TTL_MINUTES: i64 = 60;

/// Validated signup input. Construct it from an already-validated request;
/// the engine re-checks its own invariants but not request shape.
#[derive(Clone, Debug)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Profile changes; `None` fields are left untouched.
#[derive(Clone, Debug, Default)]
pub struct UserUpdate {
    pub name: Option<String>,
    pub password: Option<String>,
}

fn check_password(password: &str) -> ResultEngine<()> {
    if password.chars().count() < 6 {
        return Err(EngineError::InvalidInput(
            "password must be at least 6 characters".to_string(),
        ));
    }
    Ok(())
}

fn new_token() -> String {
    Uuid::new_v4().simple().to_string()
}

impl Engine {
    /// Registers a new, unactivated user.
    ///
    /// Returns the user together with the activation token the caller is
    /// expected to hand to the mailer.
    pub async fn register(&self, new_user: NewUser) -> ResultEngine<(User, String)> {
        let name = normalize_display_name(&new_user.name)?;
        let email = normalize_email(&new_user.email)?;
        check_password(&new_user.password)?;
        let password_hash = password::hash(&new_user.password)?;

        with_tx!(self, |db_tx| {
            if self.find_user_by_email(&db_tx, &email).await?.is_some() {
                return Err(EngineError::ExistingKey(email));
            }
            let name_taken = users::Entity::find()
                .filter(users::Column::Name.eq(name.clone()))
                .one(&db_tx)
                .await?
                .is_some();
            if name_taken {
                return Err(EngineError::ExistingKey(name));
            }

            let token = new_token();
            let model = users::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4().to_string()),
                name: ActiveValue::Set(name),
                email: ActiveValue::Set(email),
                password_hash: ActiveValue::Set(password_hash),
                activated: ActiveValue::Set(false),
                activation_token: ActiveValue::Set(Some(token.clone())),
                reset_token: ActiveValue::Set(None),
                reset_sent_at: ActiveValue::Set(None),
                admin: ActiveValue::Set(false),
                created_at: ActiveValue::Set(Utc::now()),
            };
            let model = model.insert(&db_tx).await?;

            Ok((User::try_from(model)?, token))
        })
    }

    /// Consumes an activation token: flips `activated` and clears the token
    /// in the same update, so presenting the token a second time fails with
    /// `KeyNotFound`.
    pub async fn activate(&self, token: &str) -> ResultEngine<User> {
        with_tx!(self, |db_tx| {
            let model = users::Entity::find()
                .filter(users::Column::ActivationToken.eq(token.to_string()))
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("activation token not exists".to_string()))?;

            let mut active: users::ActiveModel = model.into();
            active.activated = ActiveValue::Set(true);
            active.activation_token = ActiveValue::Set(None);
            let model = active.update(&db_tx).await?;

            Ok(User::try_from(model)?)
        })
    }

    /// Resolves credentials to a user.
    ///
    /// Unknown email and wrong password both come back as `KeyNotFound` so
    /// the caller cannot probe which addresses are registered. Valid
    /// credentials on an unactivated account are `Forbidden`.
    pub async fn authenticate(&self, email: &str, password_input: &str) -> ResultEngine<User> {
        let email = normalize_email(email)?;
        with_tx!(self, |db_tx| {
            let model = self
                .find_user_by_email(&db_tx, &email)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("user not exists".to_string()))?;

            if !password::verify(password_input, &model.password_hash) {
                return Err(EngineError::KeyNotFound("user not exists".to_string()));
            }
            if !model.activated {
                return Err(EngineError::Forbidden("account not activated".to_string()));
            }

            Ok(User::try_from(model)?)
        })
    }

    /// Returns a user from the directory.
    pub async fn user(&self, user_id: Uuid) -> ResultEngine<User> {
        with_tx!(self, |db_tx| {
            let model = self.require_user_by_id(&db_tx, user_id).await?;
            Ok(User::try_from(model)?)
        })
    }

    /// Lists users, newest first.
    pub async fn list_users(&self, limit: u64) -> ResultEngine<Vec<User>> {
        with_tx!(self, |db_tx| {
            let models = users::Entity::find()
                .order_by_desc(users::Column::CreatedAt)
                .order_by_desc(users::Column::Id)
                .limit(limit)
                .all(&db_tx)
                .await?;
            models.into_iter().map(User::try_from).collect()
        })
    }

    /// Applies profile changes. Self or admin only.
    pub async fn update_profile(
        &self,
        actor_id: Uuid,
        user_id: Uuid,
        update: UserUpdate,
    ) -> ResultEngine<User> {
        with_tx!(self, |db_tx| {
            self.require_self_or_admin(&db_tx, actor_id, user_id).await?;
            let model = self.require_user_by_id(&db_tx, user_id).await?;
            let mut active: users::ActiveModel = model.clone().into();

            if let Some(name) = update.name.as_deref() {
                let name = normalize_display_name(name)?;
                if name != model.name {
                    let taken = users::Entity::find()
                        .filter(users::Column::Name.eq(name.clone()))
                        .filter(users::Column::Id.ne(model.id.clone()))
                        .one(&db_tx)
                        .await?
                        .is_some();
                    if taken {
                        return Err(EngineError::ExistingKey(name));
                    }
                    active.name = ActiveValue::Set(name);
                }
            }
            if let Some(new_password) = update.password.as_deref() {
                check_password(new_password)?;
                active.password_hash = ActiveValue::Set(password::hash(new_password)?);
            }

            let model = active.update(&db_tx).await?;
            Ok(User::try_from(model)?)
        })
    }

    /// Deletes a user account. Self or admin only.
    ///
    /// Statuses and follow edges in both directions go with the account, all
    /// inside one DB transaction.
    pub async fn delete_user(&self, actor_id: Uuid, user_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_self_or_admin(&db_tx, actor_id, user_id).await?;
            let model = self.require_user_by_id(&db_tx, user_id).await?;

            statuses::Entity::delete_many()
                .filter(statuses::Column::UserId.eq(model.id.clone()))
                .exec(&db_tx)
                .await?;
            follows::Entity::delete_many()
                .filter(
                    Condition::any()
                        .add(follows::Column::FollowerId.eq(model.id.clone()))
                        .add(follows::Column::FollowedId.eq(model.id.clone())),
                )
                .exec(&db_tx)
                .await?;
            users::Entity::delete_by_id(model.id).exec(&db_tx).await?;

            Ok(())
        })
    }

    /// Stores a fresh reset token for the account behind `email`.
    ///
    /// Returns the user and the token for the mailer.
    pub async fn request_password_reset(&self, email: &str) -> ResultEngine<(User, String)> {
        let email = normalize_email(email)?;
        with_tx!(self, |db_tx| {
            let model = self
                .find_user_by_email(&db_tx, &email)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("user not exists".to_string()))?;

            let token = new_token();
            let mut active: users::ActiveModel = model.into();
            active.reset_token = ActiveValue::Set(Some(token.clone()));
            active.reset_sent_at = ActiveValue::Set(Some(Utc::now()));
            let model = active.update(&db_tx).await?;

            Ok((User::try_from(model)?, token))
        })
    }

    /// Consumes a reset token and re-hashes the password.
    pub async fn reset_password(&self, token: &str, new_password: &str) -> ResultEngine<()> {
        check_password(new_password)?;
        let password_hash = password::hash(new_password)?;

        with_tx!(self, |db_tx| {
            let model = users::Entity::find()
                .filter(users::Column::ResetToken.eq(token.to_string()))
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("reset token not exists".to_string()))?;

            let expired = match model.reset_sent_at {
                Some(sent_at) => Utc::now() - sent_at > Duration::minutes(RESET_TOKEN_TTL_MINUTES),
                None => true,
            };
            if expired {
                return Err(EngineError::InvalidInput("reset token expired".to_string()));
            }

            let mut active: users::ActiveModel = model.into();
            active.password_hash = ActiveValue::Set(password_hash);
            active.reset_token = ActiveValue::Set(None);
            active.reset_sent_at = ActiveValue::Set(None);
            active.update(&db_tx).await?;

            Ok(())
        })
    }
}
