// Account registration and credential checks on top of the catalog's user table

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::coordinator::bounded;
use crate::crypto::{dummy_hash, hash_password, verify_password};
use crate::db::Catalog;
use crate::types::{AppError, AppResult};

const MAX_USERNAME_LEN: usize = 64;

fn validate(username: &str, password: &str) -> AppResult<()> {
    if username.trim().is_empty() || password.is_empty() {
        return Err(AppError::InvalidRequest(
            "username and password are required".into(),
        ));
    }
    if username.len() > MAX_USERNAME_LEN {
        return Err(AppError::InvalidRequest(format!(
            "username longer than {} bytes",
            MAX_USERNAME_LEN
        )));
    }
    Ok(())
}

// Hashing is CPU bound; keep it off the async workers.
async fn hash_blocking(password: String, iterations: u32) -> AppResult<String> {
    tokio::task::spawn_blocking(move || hash_password(&password, iterations))
        .await
        .map_err(|e| AppError::Internal(format!("hash task failed: {}", e)))
}

async fn verify_blocking(password: String, stored: String) -> AppResult<bool> {
    tokio::task::spawn_blocking(move || verify_password(&password, &stored))
        .await
        .map_err(|e| AppError::Internal(format!("verify task failed: {}", e)))
}

pub struct Accounts {
    catalog: Arc<dyn Catalog>,
    iterations: u32,
    catalog_timeout: Duration,
    /// Verified against when the username is unknown.
    dummy_hash: String,
}

impl Accounts {
    pub fn new(catalog: Arc<dyn Catalog>, iterations: u32, catalog_timeout: Duration) -> Self {
        Self {
            catalog,
            iterations,
            catalog_timeout,
            dummy_hash: dummy_hash(iterations),
        }
    }

    /// Create an account. An existing username is rejected, never overwritten.
    pub async fn register(&self, username: &str, password: &str) -> AppResult<()> {
        validate(username, password)?;

        let password_hash = hash_blocking(password.to_string(), self.iterations).await?;
        bounded(
            self.catalog_timeout,
            "catalog.create_user",
            self.catalog.create_user(username, &password_hash),
        )
        .await?;

        info!(username, "Registered user");
        Ok(())
    }

    /// Check credentials, returning the username on success.
    ///
    /// Unknown users and wrong passwords both yield `InvalidCredentials`, and
    /// both pay for one full hash verification.
    pub async fn authenticate(&self, username: &str, password: &str) -> AppResult<String> {
        if username.is_empty() || password.is_empty() {
            return Err(AppError::InvalidCredentials);
        }

        let user = bounded(
            self.catalog_timeout,
            "catalog.find_user",
            self.catalog.find_user(username),
        )
        .await?;
        let stored = user
            .as_ref()
            .map(|u| u.password_hash.clone())
            .unwrap_or_else(|| self.dummy_hash.clone());

        let matched = verify_blocking(password.to_string(), stored).await?;
        match user {
            Some(user) if matched => Ok(user.username),
            _ => {
                warn!(username, "Failed login");
                Err(AppError::InvalidCredentials)
            }
        }
    }
}
