use std::sync::Arc;

use crate::accounts::Accounts;
use crate::config::Config;
use crate::coordinator::AssetCoordinator;
use crate::db::Catalog;
use crate::middleware::SessionKeys;
use crate::storage::ContentStore;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub catalog: Arc<dyn Catalog>,
    pub assets: Arc<AssetCoordinator>,
    pub accounts: Arc<Accounts>,
    pub sessions: SessionKeys,
}

impl AppState {
    pub fn new(config: Config, catalog: Arc<dyn Catalog>, store: Arc<dyn ContentStore>) -> Self {
        let assets = AssetCoordinator::new(
            catalog.clone(),
            store,
            &config.timeouts,
            config.storage.access_url_ttl(),
        );
        let accounts = Accounts::new(
            catalog.clone(),
            config.auth.password_iterations,
            config.timeouts.catalog(),
        );
        let sessions = SessionKeys::new(
            &config.auth.session_secret,
            std::time::Duration::from_secs(config.auth.session_ttl_secs),
        );
        Self {
            config: Arc::new(config),
            catalog,
            assets: Arc::new(assets),
            accounts: Arc::new(accounts),
            sessions,
        }
    }
}

// Catalog rows
// Note: FromRow is needed for runtime query_as (without DATABASE_URL at compile time)

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize, sqlx::FromRow)]
pub struct BookRecord {
    pub id: i64,
    pub title: String,
    pub author: String,
    /// Name of the attached blob in the content store, if any.
    pub content_ref: Option<String>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRecord {
    pub username: String,
    pub password_hash: String,
}

/// An uploaded artifact as received from the client, before sanitizing.
#[derive(Debug, Clone)]
pub struct Artifact {
    pub filename: String,
    pub bytes: bytes::Bytes,
}

// API Request/Response types

#[derive(Debug, serde::Deserialize)]
pub struct CredentialsForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, serde::Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct SessionResponse {
    pub username: String,
    /// Session token for clients that send `Authorization: Bearer`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct BookListResponse {
    pub books: Vec<BookRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct DeleteResponse {
    pub id: i64,
    /// `false` when the id was already absent.
    pub deleted: bool,
}

#[derive(Debug, serde::Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub database: String,
    pub storage: String,
}
