use chrono::Utc;
use sea_orm::{TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, Status, statuses};

use super::{Engine, normalize_status_content, with_tx};

impl Engine {
    /// Persists a new status for `actor_id`.
    pub async fn post_status(&self, actor_id: Uuid, content: &str) -> ResultEngine<Status> {
        let content = normalize_status_content(content)?;

        with_tx!(self, |db_tx| {
            self.require_user_by_id(&db_tx, actor_id).await?;

            let status = Status::new(actor_id, content, Utc::now());
            let model: statuses::ActiveModel = (&status).into();
            model.insert(&db_tx).await?;

            Ok(status)
        })
    }

    /// Deletes a status. Author or admin only.
    pub async fn delete_status(&self, actor_id: Uuid, status_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let model = statuses::Entity::find_by_id(status_id.to_string())
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("status not exists".to_string()))?;

            let actor = self.require_user_by_id(&db_tx, actor_id).await?;
            if model.user_id != actor.id && !actor.admin {
                return Err(EngineError::Forbidden(
                    "not allowed to delete another user's status".to_string(),
                ));
            }

            statuses::Entity::delete_by_id(model.id).exec(&db_tx).await?;
            Ok(())
        })
    }
}
