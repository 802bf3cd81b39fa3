//! The feed composer.
//!
//! A feed is the union of statuses authored by the viewer and everyone the
//! viewer follows, newest first. Pagination is keyset-based over
//! `(created_at DESC, id DESC)`; the id tiebreak makes the order
//! deterministic for statuses created in the same instant.

use base64::Engine as _;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use sea_orm::{
    Condition, QueryFilter, QueryOrder, QuerySelect, Select, TransactionTrait, prelude::*,
};

use crate::{EngineError, ResultEngine, Status, statuses};

use super::{Engine, with_tx};

#[derive(Clone, Debug, Serialize, Deserialize)]
struct FeedCursor {
    created_at: DateTime<Utc>,
    status_id: String,
}

impl FeedCursor {
    fn encode(&self) -> ResultEngine<String> {
        let bytes = serde_json::to_vec(self)
            .map_err(|_| EngineError::InvalidInput("invalid feed cursor".to_string()))?;
        Ok(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes))
    }

    fn decode(input: &str) -> ResultEngine<Self> {
        let bytes = base64::engine::general_purpose::URL_SAFE_NO_PAD
            .decode(input.as_bytes())
            .map_err(|_| EngineError::InvalidInput("invalid feed cursor".to_string()))?;
        serde_json::from_slice::<Self>(&bytes)
            .map_err(|_| EngineError::InvalidInput("invalid feed cursor".to_string()))
    }
}

fn apply_cursor(
    query: Select<statuses::Entity>,
    cursor: Option<&str>,
) -> ResultEngine<Select<statuses::Entity>> {
    let Some(cursor) = cursor else {
        return Ok(query);
    };
    let cursor = FeedCursor::decode(cursor)?;
    Ok(query.filter(
        Condition::any()
            .add(statuses::Column::CreatedAt.lt(cursor.created_at))
            .add(
                Condition::all()
                    .add(statuses::Column::CreatedAt.eq(cursor.created_at))
                    .add(statuses::Column::Id.lt(cursor.status_id)),
            ),
    ))
}

fn page_out(
    rows: Vec<statuses::Model>,
    limit: u64,
) -> ResultEngine<(Vec<Status>, Option<String>)> {
    let has_more = rows.len() > limit as usize;

    let mut out: Vec<Status> = Vec::with_capacity(rows.len().min(limit as usize));
    for model in rows.into_iter().take(limit as usize) {
        out.push(Status::try_from(model)?);
    }

    let next_cursor = out.last().map(|status| FeedCursor {
        created_at: status.created_at,
        status_id: status.id.to_string(),
    });
    let next_cursor = if has_more {
        next_cursor.map(|c| c.encode()).transpose()?
    } else {
        None
    };

    Ok((out, next_cursor))
}

impl Engine {
    /// Returns one page of the viewer's timeline, newest → older, plus an
    /// opaque cursor for the next page when more rows exist.
    ///
    /// Re-querying with the same cursor reproduces the same logical set,
    /// subject to concurrent writes.
    pub async fn feed(
        &self,
        viewer_id: Uuid,
        limit: u64,
        cursor: Option<&str>,
    ) -> ResultEngine<(Vec<Status>, Option<String>)> {
        with_tx!(self, |db_tx| {
            self.require_user_by_id(&db_tx, viewer_id).await?;
            let author_ids = self.feed_author_ids(&db_tx, viewer_id).await?;

            let limit_plus_one = limit.saturating_add(1);
            let mut query = statuses::Entity::find()
                .filter(statuses::Column::UserId.is_in(author_ids))
                .order_by_desc(statuses::Column::CreatedAt)
                .order_by_desc(statuses::Column::Id)
                .limit(limit_plus_one);
            query = apply_cursor(query, cursor)?;

            let rows = query.all(&db_tx).await?;
            page_out(rows, limit)
        })
    }

    /// Returns one page of a single author's statuses, same ordering and
    /// cursor contract as [`Engine::feed`].
    pub async fn user_statuses(
        &self,
        author_id: Uuid,
        limit: u64,
        cursor: Option<&str>,
    ) -> ResultEngine<(Vec<Status>, Option<String>)> {
        with_tx!(self, |db_tx| {
            self.require_user_by_id(&db_tx, author_id).await?;

            let limit_plus_one = limit.saturating_add(1);
            let mut query = statuses::Entity::find()
                .filter(statuses::Column::UserId.eq(author_id.to_string()))
                .order_by_desc(statuses::Column::CreatedAt)
                .order_by_desc(statuses::Column::Id)
                .limit(limit_plus_one);
            query = apply_cursor(query, cursor)?;

            let rows = query.all(&db_tx).await?;
            page_out(rows, limit)
        })
    }
}
