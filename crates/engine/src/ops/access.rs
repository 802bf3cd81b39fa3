use std::collections::HashSet;

use sea_orm::{DatabaseTransaction, QueryFilter, prelude::*};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, users};

use super::Engine;

impl Engine {
    pub(super) async fn find_user_by_id(
        &self,
        db: &DatabaseTransaction,
        user_id: Uuid,
    ) -> ResultEngine<Option<users::Model>> {
        users::Entity::find_by_id(user_id.to_string())
            .one(db)
            .await
            .map_err(Into::into)
    }

    pub(super) async fn require_user_by_id(
        &self,
        db: &DatabaseTransaction,
        user_id: Uuid,
    ) -> ResultEngine<users::Model> {
        self.find_user_by_id(db, user_id)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("user not exists".to_string()))
    }

    /// Batch existence check; fails with `KeyNotFound` if any id is unknown.
    pub(super) async fn require_users_exist(
        &self,
        db: &DatabaseTransaction,
        user_ids: &[Uuid],
    ) -> ResultEngine<()> {
        if user_ids.is_empty() {
            return Ok(());
        }
        let wanted: HashSet<String> = user_ids.iter().map(Uuid::to_string).collect();
        let found = users::Entity::find()
            .filter(users::Column::Id.is_in(wanted.iter().cloned()))
            .all(db)
            .await?;
        if found.len() != wanted.len() {
            return Err(EngineError::KeyNotFound("user not exists".to_string()));
        }
        Ok(())
    }

    pub(super) async fn find_user_by_email(
        &self,
        db: &DatabaseTransaction,
        email: &str,
    ) -> ResultEngine<Option<users::Model>> {
        users::Entity::find()
            .filter(users::Column::Email.eq(email.to_string()))
            .one(db)
            .await
            .map_err(Into::into)
    }

    /// Mutations on a user record are allowed for the user themself and for
    /// admins; everyone else gets `Forbidden`.
    pub(super) async fn require_self_or_admin(
        &self,
        db: &DatabaseTransaction,
        actor_id: Uuid,
        target_id: Uuid,
    ) -> ResultEngine<users::Model> {
        let actor = self.require_user_by_id(db, actor_id).await?;
        if actor_id != target_id && !actor.admin {
            return Err(EngineError::Forbidden(
                "not allowed to modify another user".to_string(),
            ));
        }
        Ok(actor)
    }
}
