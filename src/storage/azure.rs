//! Azure Blob Storage content store.
//!
//! Talks to the Blob REST API with `reqwest`. Each request carries its own
//! short-lived SAS minted with exactly the permission it needs, so the
//! account key never leaves the process.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use futures::{StreamExt, TryStreamExt};
use reqwest::{Client, Response, StatusCode, Url};

use super::access_url::{issue_access_url, AccountCredentials, BlobPermissions, SAS_VERSION};
use super::{is_valid_blob_name, BlobRef, BlobStream, ContentStore, StorageError, StorageResult};

/// Lifetime of the SAS tokens the store mints for its own requests.
const OPERATION_SAS_TTL_SECS: i64 = 300;

pub struct AzureBlobStore {
    client: Client,
    credentials: AccountCredentials,
    container: String,
}

impl AzureBlobStore {
    pub fn new(
        credentials: AccountCredentials,
        container: String,
        timeout: Duration,
    ) -> StorageResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StorageError::Config(format!("http client: {}", e)))?;

        tracing::info!(
            account = credentials.account(),
            container = %container,
            "Created Azure blob storage"
        );
        Ok(Self {
            client,
            credentials,
            container,
        })
    }

    fn signed_url(
        &self,
        name: &str,
        permissions: BlobPermissions,
        ttl: chrono::Duration,
    ) -> StorageResult<Url> {
        if !is_valid_blob_name(name) {
            return Err(StorageError::InvalidName(name.to_string()));
        }
        issue_access_url(
            &self.credentials,
            &self.container,
            name,
            permissions,
            Utc::now() + ttl,
        )
    }

    fn operation_url(&self, name: &str, permissions: BlobPermissions) -> StorageResult<Url> {
        self.signed_url(name, permissions, chrono::Duration::seconds(OPERATION_SAS_TTL_SECS))
    }
}

fn transport_error(action: &str, name: &str, err: reqwest::Error) -> StorageError {
    if err.is_timeout() {
        StorageError::Timeout(format!("{} {}", action, name))
    } else {
        StorageError::Io(format!("{} {}: {}", action, name, err))
    }
}

fn status_error(action: &str, name: &str, response: &Response) -> StorageError {
    match response.status() {
        StatusCode::NOT_FOUND => StorageError::NotFound(name.to_string()),
        status => StorageError::Io(format!("{} {} returned {}", action, name, status)),
    }
}

#[async_trait]
impl ContentStore for AzureBlobStore {
    fn kind(&self) -> &'static str {
        "azure"
    }

    #[tracing::instrument(skip(self, bytes), fields(size = bytes.len()))]
    async fn put(&self, name: &str, bytes: Bytes) -> StorageResult<BlobRef> {
        let url = self.operation_url(name, BlobPermissions::UPLOAD)?;
        let size = bytes.len() as u64;
        let content_type = mime_guess::from_path(name).first_or_octet_stream();

        // Put Blob replaces the whole block blob in one commit.
        let response = self
            .client
            .put(url)
            .header("x-ms-blob-type", "BlockBlob")
            .header("x-ms-version", SAS_VERSION)
            .header("x-ms-blob-content-type", content_type.as_ref())
            .body(bytes)
            .send()
            .await
            .map_err(|e| transport_error("put", name, e))?;

        if !response.status().is_success() {
            return Err(status_error("put", name, &response));
        }

        tracing::info!(container = %self.container, size, "Uploaded blob");
        Ok(BlobRef {
            name: name.to_string(),
            size,
        })
    }

    #[tracing::instrument(skip(self))]
    async fn delete(&self, name: &str) -> StorageResult<()> {
        let url = self.operation_url(name, BlobPermissions::DELETE)?;

        let response = self
            .client
            .delete(url)
            .header("x-ms-version", SAS_VERSION)
            .send()
            .await
            .map_err(|e| transport_error("delete", name, e))?;

        if !response.status().is_success() {
            return Err(status_error("delete", name, &response));
        }

        tracing::info!(container = %self.container, "Deleted blob");
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn read(&self, name: &str) -> StorageResult<BlobStream> {
        let url = self.operation_url(name, BlobPermissions::READ)?;

        let response = self
            .client
            .get(url)
            .header("x-ms-version", SAS_VERSION)
            .send()
            .await
            .map_err(|e| transport_error("read", name, e))?;

        if !response.status().is_success() {
            return Err(status_error("read", name, &response));
        }

        Ok(response
            .bytes_stream()
            .map_err(std::io::Error::other)
            .boxed())
    }

    #[tracing::instrument(skip(self))]
    async fn issue_access_url(&self, name: &str, ttl: Duration) -> StorageResult<String> {
        let ttl = chrono::Duration::from_std(ttl)
            .map_err(|e| StorageError::Config(format!("access URL ttl: {}", e)))?;

        // Probe first so a missing blob is reported here rather than as a
        // dangling redirect.
        let probe = self.operation_url(name, BlobPermissions::READ)?;
        let response = self
            .client
            .head(probe)
            .header("x-ms-version", SAS_VERSION)
            .send()
            .await
            .map_err(|e| transport_error("probe", name, e))?;
        if !response.status().is_success() {
            return Err(status_error("probe", name, &response));
        }

        let url = self.signed_url(name, BlobPermissions::READ, ttl)?;
        tracing::debug!(expires_in = ?ttl, "Issued access URL");
        Ok(url.into())
    }
}
