//! Password-reset endpoints (public: the caller has lost their password).

use axum::{Json, extract::State, http::StatusCode};

use api_types::password::{ResetPerform, ResetRequest};

use crate::{ServerError, server::ServerState, validate};

/// Stores a reset token and mails it to the account's address.
pub async fn request_reset(
    State(state): State<ServerState>,
    Json(payload): Json<ResetRequest>,
) -> Result<StatusCode, ServerError> {
    validate::email(&payload.email)?;

    let (user, token) = state.engine.request_password_reset(&payload.email).await?;
    state.mailer.send_password_reset(&user.email, &token);

    Ok(StatusCode::ACCEPTED)
}

/// Consumes the mailed token and sets the new password.
pub async fn perform_reset(
    State(state): State<ServerState>,
    Json(payload): Json<ResetPerform>,
) -> Result<StatusCode, ServerError> {
    validate::password(&payload.password)?;

    state
        .engine
        .reset_password(&payload.token, &payload.password)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
