//! Follow-graph endpoints.
//!
//! The acting user always comes from the auth extension; the path id is the
//! other side of the edge.

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use api_types::follow::{FollowCounts, FollowState};
use api_types::user::UsersResponse;
use engine::User;

use crate::{ServerError, server::ServerState, user};

pub async fn follow(
    Extension(actor): Extension<User>,
    State(state): State<ServerState>,
    Path(target_id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.follow(actor.id, &[target_id]).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn unfollow(
    Extension(actor): Extension<User>,
    State(state): State<ServerState>,
    Path(target_id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.unfollow(actor.id, &[target_id]).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Is the acting user following the user in the path?
pub async fn state(
    Extension(actor): Extension<User>,
    State(state): State<ServerState>,
    Path(target_id): Path<Uuid>,
) -> Result<Json<FollowState>, ServerError> {
    let following = state.engine.is_following(actor.id, target_id).await?;
    Ok(Json(FollowState { following }))
}

pub async fn followers(
    Extension(_actor): Extension<User>,
    State(state): State<ServerState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<UsersResponse>, ServerError> {
    let users = state
        .engine
        .followers(user_id)
        .await?
        .into_iter()
        .map(user::view)
        .collect();
    Ok(Json(UsersResponse { users }))
}

pub async fn followings(
    Extension(_actor): Extension<User>,
    State(state): State<ServerState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<UsersResponse>, ServerError> {
    let users = state
        .engine
        .followings(user_id)
        .await?
        .into_iter()
        .map(user::view)
        .collect();
    Ok(Json(UsersResponse { users }))
}

pub async fn counts(
    Extension(_actor): Extension<User>,
    State(state): State<ServerState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<FollowCounts>, ServerError> {
    let (followers, followings) = state.engine.follow_counts(user_id).await?;
    Ok(Json(FollowCounts {
        followers,
        followings,
    }))
}
