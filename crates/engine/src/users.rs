//! User directory records.
//!
//! The password hash and the one-shot tokens live only on the database
//! model; the domain [`User`] never carries credential material, so it can
//! be handed to the HTTP layer and serialized as-is.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::EngineError;

/// A user as the rest of the system sees it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub activated: bool,
    pub admin: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub activated: bool,
    pub activation_token: Option<String>,
    pub reset_token: Option<String>,
    pub reset_sent_at: Option<DateTimeUtc>,
    pub admin: bool,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::statuses::Entity")]
    Statuses,
}

impl Related<super::statuses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Statuses.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for User {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let id = Uuid::parse_str(&model.id)
            .map_err(|_| EngineError::InvalidInput("invalid user id".to_string()))?;
        Ok(User {
            id,
            name: model.name,
            email: model.email,
            activated: model.activated,
            admin: model.admin,
            created_at: model.created_at,
        })
    }
}
