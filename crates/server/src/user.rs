//! User directory endpoints: signup, activation and profile management.

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use api_types::user::{UserNew, UserUpdate, UserView, UsersResponse};
use engine::User;

use crate::{ServerError, server::ServerState, validate};

pub(crate) fn view(user: User) -> UserView {
    UserView {
        id: user.id,
        name: user.name,
        email: user.email,
        activated: user.activated,
        created_at: user.created_at,
    }
}

/// Registers a new account and mails the activation token.
pub async fn signup(
    State(state): State<ServerState>,
    Json(payload): Json<UserNew>,
) -> Result<(StatusCode, Json<UserView>), ServerError> {
    validate::name(&payload.name)?;
    validate::email(&payload.email)?;
    validate::password(&payload.password)?;

    let (user, token) = state
        .engine
        .register(engine::NewUser {
            name: payload.name,
            email: payload.email,
            password: payload.password,
        })
        .await?;

    state.mailer.send_activation(&user.email, &token);

    Ok((StatusCode::CREATED, Json(view(user))))
}

/// Consumes an activation token from the signup mail.
pub async fn confirm_email(
    State(state): State<ServerState>,
    Path(token): Path<String>,
) -> Result<Json<UserView>, ServerError> {
    let user = state.engine.activate(&token).await?;
    Ok(Json(view(user)))
}

pub async fn list(
    Extension(_actor): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<UsersResponse>, ServerError> {
    let users = state
        .engine
        .list_users(100)
        .await?
        .into_iter()
        .map(view)
        .collect();
    Ok(Json(UsersResponse { users }))
}

pub async fn show(
    Extension(_actor): Extension<User>,
    State(state): State<ServerState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<UserView>, ServerError> {
    let user = state.engine.user(user_id).await?;
    Ok(Json(view(user)))
}

pub async fn update(
    Extension(actor): Extension<User>,
    State(state): State<ServerState>,
    Path(user_id): Path<Uuid>,
    Json(payload): Json<UserUpdate>,
) -> Result<Json<UserView>, ServerError> {
    if let Some(name) = payload.name.as_deref() {
        validate::name(name)?;
    }
    if let Some(password) = payload.password.as_deref() {
        validate::password(password)?;
    }

    let user = state
        .engine
        .update_profile(
            actor.id,
            user_id,
            engine::UserUpdate {
                name: payload.name,
                password: payload.password,
            },
        )
        .await?;
    Ok(Json(view(user)))
}

pub async fn remove(
    Extension(actor): Extension<User>,
    State(state): State<ServerState>,
    Path(user_id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_user(actor.id, user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
