//! Account routes
//!
//! - POST /register - create an account
//! - POST /login - check credentials and start a session
//! - GET /logout - expire the session cookie
//!
//! None of these sit behind the session gate.

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Form, Json, Router,
};
use tracing::info;

use crate::middleware::{cleared_session_cookie, session_cookie};
use crate::models::{AppState, CredentialsForm, SessionResponse};
use crate::types::AppResult;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", get(logout))
}

async fn register(
    State(state): State<AppState>,
    Form(form): Form<CredentialsForm>,
) -> AppResult<impl IntoResponse> {
    state.accounts.register(&form.username, &form.password).await?;

    Ok((
        StatusCode::CREATED,
        Json(SessionResponse {
            username: form.username,
            token: None,
        }),
    ))
}

async fn login(
    State(state): State<AppState>,
    Form(form): Form<CredentialsForm>,
) -> AppResult<impl IntoResponse> {
    let username = state.accounts.authenticate(&form.username, &form.password).await?;

    let token = state.sessions.issue(&username)?;
    let cookie = session_cookie(&token, state.sessions.ttl())?;
    info!(username = %username, "Started session");

    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(SessionResponse {
            username,
            token: Some(token),
        }),
    ))
}

// Tokens are stateless; logging out only drops the cookie.
async fn logout() -> impl IntoResponse {
    (
        StatusCode::NO_CONTENT,
        [(header::SET_COOKIE, cleared_session_cookie())],
    )
}
