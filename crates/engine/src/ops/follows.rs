//! The follow-graph service: edge mutations and relationship queries.

use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, User, follows, users};

use super::{Engine, SelfFollowPolicy, with_tx};

impl Engine {
    /// Adds edges `actor -> target` for every target not already followed.
    ///
    /// Idempotent: existing edges are left untouched and an empty target set
    /// is a no-op. Unknown targets fail the whole call with `KeyNotFound`
    /// before any edge is written.
    pub async fn follow(&self, actor_id: Uuid, targets: &[Uuid]) -> ResultEngine<()> {
        if targets.is_empty() {
            return Ok(());
        }
        if self.self_follow == SelfFollowPolicy::Reject && targets.contains(&actor_id) {
            return Err(EngineError::InvalidInput(
                "cannot follow yourself".to_string(),
            ));
        }

        with_tx!(self, |db_tx| {
            self.require_user_by_id(&db_tx, actor_id).await?;
            self.require_users_exist(&db_tx, targets).await?;

            for target in targets {
                let existing = follows::Entity::find_by_id((
                    actor_id.to_string(),
                    target.to_string(),
                ))
                .one(&db_tx)
                .await?;
                if existing.is_some() {
                    continue;
                }

                let edge = follows::ActiveModel {
                    follower_id: ActiveValue::Set(actor_id.to_string()),
                    followed_id: ActiveValue::Set(target.to_string()),
                };
                edge.insert(&db_tx).await?;
            }

            Ok(())
        })
    }

    /// Removes any existing edges `actor -> target`; absent edges are
    /// ignored and never an error.
    pub async fn unfollow(&self, actor_id: Uuid, targets: &[Uuid]) -> ResultEngine<()> {
        if targets.is_empty() {
            return Ok(());
        }

        with_tx!(self, |db_tx| {
            self.require_user_by_id(&db_tx, actor_id).await?;

            let target_ids: Vec<String> = targets.iter().map(Uuid::to_string).collect();
            follows::Entity::delete_many()
                .filter(follows::Column::FollowerId.eq(actor_id.to_string()))
                .filter(follows::Column::FollowedId.is_in(target_ids))
                .exec(&db_tx)
                .await?;

            Ok(())
        })
    }

    /// Membership test against the persisted follow set of `actor`.
    pub async fn is_following(&self, actor_id: Uuid, target_id: Uuid) -> ResultEngine<bool> {
        with_tx!(self, |db_tx| {
            let edge =
                follows::Entity::find_by_id((actor_id.to_string(), target_id.to_string()))
                    .one(&db_tx)
                    .await?;
            Ok(edge.is_some())
        })
    }

    /// All users following `user_id`, ordered by name.
    pub async fn followers(&self, user_id: Uuid) -> ResultEngine<Vec<User>> {
        self.related_users(user_id, follows::Column::FollowedId, follows::Column::FollowerId)
            .await
    }

    /// All users `user_id` follows, ordered by name.
    pub async fn followings(&self, user_id: Uuid) -> ResultEngine<Vec<User>> {
        self.related_users(user_id, follows::Column::FollowerId, follows::Column::FollowedId)
            .await
    }

    /// Ids of `{user_id} ∪ followings(user_id)`, the feed operand set.
    pub(super) async fn feed_author_ids(
        &self,
        db: &sea_orm::DatabaseTransaction,
        user_id: Uuid,
    ) -> ResultEngine<Vec<String>> {
        let edges = follows::Entity::find()
            .filter(follows::Column::FollowerId.eq(user_id.to_string()))
            .all(db)
            .await?;

        let mut ids: Vec<String> = edges.into_iter().map(|edge| edge.followed_id).collect();
        let own = user_id.to_string();
        if !ids.contains(&own) {
            ids.push(own);
        }
        Ok(ids)
    }

    async fn related_users(
        &self,
        user_id: Uuid,
        match_column: follows::Column,
        select_column: follows::Column,
    ) -> ResultEngine<Vec<User>> {
        with_tx!(self, |db_tx| {
            self.require_user_by_id(&db_tx, user_id).await?;

            let edges = follows::Entity::find()
                .filter(match_column.eq(user_id.to_string()))
                .all(&db_tx)
                .await?;
            let ids: Vec<String> = edges
                .into_iter()
                .map(|edge| match select_column {
                    follows::Column::FollowerId => edge.follower_id,
                    _ => edge.followed_id,
                })
                .collect();

            let models = users::Entity::find()
                .filter(users::Column::Id.is_in(ids))
                .order_by_asc(users::Column::Name)
                .all(&db_tx)
                .await?;
            models.into_iter().map(User::try_from).collect()
        })
    }

    /// Edge counts for a profile view: `(followers, followings)`.
    pub async fn follow_counts(&self, user_id: Uuid) -> ResultEngine<(u64, u64)> {
        with_tx!(self, |db_tx| {
            self.require_user_by_id(&db_tx, user_id).await?;

            let followers = follows::Entity::find()
                .filter(follows::Column::FollowedId.eq(user_id.to_string()))
                .count(&db_tx)
                .await?;
            let followings = follows::Entity::find()
                .filter(follows::Column::FollowerId.eq(user_id.to_string()))
                .count(&db_tx)
                .await?;

            Ok((followers, followings))
        })
    }
}
