//! Status primitives.
//!
//! A `Status` is a short post owned by exactly one author. Statuses are
//! created and deleted, never edited.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::EngineError;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    pub id: Uuid,
    pub user_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl Status {
    pub fn new(user_id: Uuid, content: String, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            content,
            created_at,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "statuses")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub content: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Users,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Status> for ActiveModel {
    fn from(status: &Status) -> Self {
        ActiveModel {
            id: ActiveValue::Set(status.id.to_string()),
            user_id: ActiveValue::Set(status.user_id.to_string()),
            content: ActiveValue::Set(status.content.clone()),
            created_at: ActiveValue::Set(status.created_at),
        }
    }
}

impl TryFrom<Model> for Status {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let id = Uuid::parse_str(&model.id)
            .map_err(|_| EngineError::InvalidInput("invalid status id".to_string()))?;
        let user_id = Uuid::parse_str(&model.user_id)
            .map_err(|_| EngineError::InvalidInput("invalid user id".to_string()))?;
        Ok(Status {
            id,
            user_id,
            content: model.content,
            created_at: model.created_at,
        })
    }
}
