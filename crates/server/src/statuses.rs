//! Status and timeline endpoints.

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use uuid::Uuid;

use api_types::status::{FeedResponse, StatusNew, StatusView};
use engine::{Status, User};

use crate::{ServerError, server::ServerState, validate};

const DEFAULT_PAGE_LIMIT: u64 = 30;
const MAX_PAGE_LIMIT: u64 = 100;

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub limit: Option<u64>,
    pub cursor: Option<String>,
}

impl PageQuery {
    // limit=0 would produce an empty page with no cursor and dead-end the
    // walk, so it is floored to 1.
    fn limit(&self) -> u64 {
        self.limit
            .unwrap_or(DEFAULT_PAGE_LIMIT)
            .clamp(1, MAX_PAGE_LIMIT)
    }
}

fn view(status: Status) -> StatusView {
    StatusView {
        id: status.id,
        user_id: status.user_id,
        content: status.content,
        created_at: status.created_at,
    }
}

fn feed_response(page: (Vec<Status>, Option<String>)) -> FeedResponse {
    let (statuses, next_cursor) = page;
    FeedResponse {
        statuses: statuses.into_iter().map(view).collect(),
        next_cursor,
    }
}

pub async fn create(
    Extension(actor): Extension<User>,
    State(state): State<ServerState>,
    Json(payload): Json<StatusNew>,
) -> Result<(StatusCode, Json<StatusView>), ServerError> {
    validate::status_content(&payload.content)?;

    let status = state.engine.post_status(actor.id, &payload.content).await?;
    Ok((StatusCode::CREATED, Json(view(status))))
}

pub async fn remove(
    Extension(actor): Extension<User>,
    State(state): State<ServerState>,
    Path(status_id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_status(actor.id, status_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// The viewer's timeline: own statuses plus followed users', newest first.
pub async fn feed(
    Extension(actor): Extension<User>,
    State(state): State<ServerState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<FeedResponse>, ServerError> {
    let page = state
        .engine
        .feed(actor.id, query.limit(), query.cursor.as_deref())
        .await?;
    Ok(Json(feed_response(page)))
}

/// A single user's statuses (their profile page).
pub async fn user_statuses(
    Extension(_actor): Extension<User>,
    State(state): State<ServerState>,
    Path(user_id): Path<Uuid>,
    Query(query): Query<PageQuery>,
) -> Result<Json<FeedResponse>, ServerError> {
    let page = state
        .engine
        .user_statuses(user_id, query.limit(), query.cursor.as_deref())
        .await?;
    Ok(Json(feed_response(page)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(limit: Option<u64>) -> PageQuery {
        PageQuery {
            limit,
            cursor: None,
        }
    }

    #[test]
    fn absent_limit_uses_the_default() {
        assert_eq!(query(None).limit(), DEFAULT_PAGE_LIMIT);
    }

    #[test]
    fn zero_limit_is_floored_to_one() {
        assert_eq!(query(Some(0)).limit(), 1);
    }

    #[test]
    fn oversized_limit_is_capped() {
        assert_eq!(query(Some(1000)).limit(), MAX_PAGE_LIMIT);
    }
}
