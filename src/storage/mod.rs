//! Content store
//!
//! Named binary blobs behind the [`ContentStore`] capability. Two variants
//! exist: [`LocalStore`] on the filesystem and [`AzureBlobStore`] on Azure
//! Blob Storage. Callers never branch on which one is active; the variant is
//! picked once from configuration by [`build_store`].

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;
use tracing::info;

use crate::config::{StorageConfig, StorageProvider};

pub mod access_url;
pub mod azure;
pub mod local;

pub use access_url::{AccountCredentials, BlobPermissions};
pub use azure::AzureBlobStore;
pub use local::LocalStore;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("blob not found: {0}")]
    NotFound(String),

    #[error("invalid blob name: {0:?}")]
    InvalidName(String),

    #[error("storage I/O failure: {0}")]
    Io(String),

    #[error("storage configuration error: {0}")]
    Config(String),

    #[error("operation not supported by this store: {0}")]
    Unsupported(&'static str),

    #[error("storage request timed out: {0}")]
    Timeout(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Streamed blob contents.
pub type BlobStream = BoxStream<'static, std::io::Result<Bytes>>;

/// Handle to a blob that has been fully written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobRef {
    pub name: String,
    pub size: u64,
}

/// Backend-agnostic blob storage.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Short backend label for logs and health output.
    fn kind(&self) -> &'static str;

    /// Write `bytes` under `name`, replacing any existing blob.
    ///
    /// A concurrent reader sees either the previous blob or the new one in
    /// full, never a partial write.
    async fn put(&self, name: &str, bytes: Bytes) -> StorageResult<BlobRef>;

    /// Remove the blob. A missing blob yields [`StorageError::NotFound`],
    /// which callers treat the same as success.
    async fn delete(&self, name: &str) -> StorageResult<()>;

    async fn read(&self, name: &str) -> StorageResult<BlobStream>;

    /// Signed, read-only URL valid for `ttl`. Stores that serve bytes
    /// themselves return [`StorageError::Unsupported`].
    async fn issue_access_url(&self, name: &str, ttl: Duration) -> StorageResult<String>;
}

/// Construct the configured content store.
pub fn build_store(config: &StorageConfig, timeout: Duration) -> anyhow::Result<Arc<dyn ContentStore>> {
    let store: Arc<dyn ContentStore> = match config.provider {
        StorageProvider::Local => Arc::new(LocalStore::new(&config.upload_dir)?),
        StorageProvider::Azure => {
            let connection_string = config.azure_connection_string.as_deref().ok_or_else(|| {
                anyhow::anyhow!("AZURE_STORAGE_CONNECTION_STRING is required for the azure store")
            })?;
            let credentials = AccountCredentials::from_connection_string(connection_string)?;
            Arc::new(AzureBlobStore::new(
                credentials,
                config.azure_container.clone(),
                timeout,
            )?)
        }
    };

    info!(kind = store.kind(), "Content store ready");
    Ok(store)
}

/// Reduce an uploaded filename to a flat, safe blob name.
///
/// Path separators and whitespace become `_`, anything outside
/// `[A-Za-z0-9._-]` is dropped, and leading or trailing `.`/`_` are trimmed.
/// The result may be empty.
pub fn sanitize_filename(filename: &str) -> String {
    let flattened = filename.replace(['/', '\\'], " ");
    let joined = flattened.split_whitespace().collect::<Vec<_>>().join("_");
    let kept: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(*c, '.' | '_' | '-'))
        .collect();
    kept.trim_matches(|c: char| c == '.' || c == '_').to_string()
}

/// Whether `name` is something [`sanitize_filename`] could have produced.
pub fn is_valid_blob_name(name: &str) -> bool {
    !name.is_empty() && sanitize_filename(name) == name
}
