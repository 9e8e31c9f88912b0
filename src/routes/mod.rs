//! HTTP Routes
//!
//! Public:
//! - `/register`, `/login`, `/logout` - accounts and sessions
//! - `/api/health` - health check
//!
//! Behind the session gate:
//! - `/`, `/search` - catalog reads
//! - `/add`, `/edit/{id}`, `/delete/{id}` - mutations through the asset coordinator
//! - `/uploads/{name}` - artifact bytes or a signed redirect

pub mod auth;
pub mod books;
pub mod health;
pub mod uploads;

use axum::extract::DefaultBodyLimit;
use axum::middleware::from_fn_with_state;
use axum::Router;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::middleware::require_session;
use crate::models::AppState;

/// Create the main application router
///
/// The session check is a route layer on the gated routes only, so it runs
/// before their handlers and unknown paths still fall through to 404.
pub fn create_router(state: AppState) -> Router {
    info!("Creating application router");

    let gated = Router::new()
        .merge(books::router())
        .merge(uploads::router())
        .route_layer(from_fn_with_state(state.sessions.clone(), require_session));

    Router::new()
        .merge(auth::router())
        .merge(health::router())
        .merge(gated)
        .layer(DefaultBodyLimit::max(state.config.server.max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
