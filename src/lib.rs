// Folio - book catalog with attached artifacts on local disk or Azure Blob Storage

pub mod accounts;
pub mod config;
pub mod coordinator;
pub mod crypto;
pub mod db;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod storage;
pub mod types;
pub mod utils;

// Re-exports for convenience
pub use config::Config;
pub use models::AppState;

pub fn create_router(state: AppState) -> axum::Router {
    routes::create_router(state)
}
