use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use tracing::warn;

use crate::models::{AppState, HealthResponse};

pub fn router() -> Router<AppState> {
    Router::new().route("/api/health", get(health_check))
}

async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let database =
        match tokio::time::timeout(state.config.timeouts.catalog(), state.catalog.ping()).await {
            Ok(Ok(())) => "connected",
            Ok(Err(e)) => {
                warn!(error = %e, "Catalog health check failed");
                "unavailable"
            }
            Err(_) => {
                warn!("Catalog health check timed out");
                "timeout"
            }
        };

    let (status, code) = if database == "connected" {
        ("ok", StatusCode::OK)
    } else {
        ("degraded", StatusCode::SERVICE_UNAVAILABLE)
    };

    let response = HealthResponse {
        status: status.to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        database: database.to_string(),
        storage: state.assets.store_kind().to_string(),
    };

    (code, Json(response))
}
