use axum::{
    Router,
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::{delete, get, post},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Basic},
};

use std::sync::Arc;

use crate::{follows, password, statuses, user};
use engine::{Engine, mailer::Mailer};

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    pub mailer: Arc<dyn Mailer>,
}

/// Resolves Basic credentials to a user and stores it as a request
/// extension. Every protected handler trusts that identity unconditionally.
async fn auth(
    auth_header: Option<TypedHeader<Authorization<Basic>>>,
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let auth_header = auth_header.ok_or(StatusCode::UNAUTHORIZED)?;
    if auth_header.username().is_empty() || auth_header.password().is_empty() {
        return Err(StatusCode::UNAUTHORIZED);
    }

    let user = state
        .engine
        .authenticate(auth_header.username(), auth_header.password())
        .await
        .map_err(|_| StatusCode::UNAUTHORIZED)?;

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

pub fn router(state: ServerState) -> Router {
    // Signup, activation and password reset must work before the caller has
    // a usable account, so they bypass the auth layer.
    let public = Router::new()
        .route("/users", post(user::signup))
        .route("/signup/confirm/{token}", post(user::confirm_email))
        .route("/password/email", post(password::request_reset))
        .route("/password/reset", post(password::perform_reset));

    let protected = Router::new()
        .route("/users", get(user::list))
        .route(
            "/users/{id}",
            get(user::show).patch(user::update).delete(user::remove),
        )
        .route(
            "/users/{id}/follow",
            post(follows::follow).delete(follows::unfollow),
        )
        .route("/users/{id}/following", get(follows::state))
        .route("/users/{id}/followers", get(follows::followers))
        .route("/users/{id}/followings", get(follows::followings))
        .route("/users/{id}/counts", get(follows::counts))
        .route("/users/{id}/statuses", get(statuses::user_statuses))
        .route("/statuses", post(statuses::create))
        .route("/statuses/{id}", delete(statuses::remove))
        .route("/feed", get(statuses::feed))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth));

    public.merge(protected).with_state(state)
}

pub async fn run(engine: Engine, mailer: Arc<dyn Mailer>) {
    let listener = match tokio::net::TcpListener::bind("127.0.0.1:3000").await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(engine, mailer, listener).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    engine: Engine,
    mailer: Arc<dyn Mailer>,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    let state = ServerState {
        engine: Arc::new(engine),
        mailer,
    };

    axum::serve(listener, router(state)).await
}
