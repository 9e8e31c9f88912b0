//! Metadata catalog
//!
//! Book and user records live behind the [`Catalog`] capability. `PgCatalog`
//! is the production backend; `MemoryCatalog` keeps everything in process
//! and is used when no `DATABASE_URL` is configured.

use async_trait::async_trait;

use crate::models::{BookRecord, UserRecord};

pub use memory::MemoryCatalog;
pub use operations::PgCatalog;
pub use pool::*;

pub mod memory;
pub mod operations;
pub mod pool;

#[cfg(test)]
pub(crate) mod stalled;

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("username already exists")]
    DuplicateUsername,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type CatalogResult<T> = Result<T, CatalogError>;

/// Relational store of book metadata and user accounts.
///
/// Every method is a single statement against the backing store; callers
/// needing cross-system ordering go through the asset coordinator.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Insert a book and return it with its assigned id.
    async fn insert(
        &self,
        title: &str,
        author: &str,
        content_ref: Option<&str>,
    ) -> CatalogResult<BookRecord>;

    async fn get(&self, id: i64) -> CatalogResult<Option<BookRecord>>;

    /// Update title and author, and replace `content_ref` only when one is given.
    ///
    /// Returns `None` when no row has this id, otherwise the reference the
    /// row held before the update.
    async fn update(
        &self,
        id: i64,
        title: &str,
        author: &str,
        content_ref: Option<&str>,
    ) -> CatalogResult<Option<Option<String>>>;

    /// Remove the row. Returns `None` when it did not exist, otherwise the
    /// reference it held.
    async fn delete(&self, id: i64) -> CatalogResult<Option<Option<String>>>;

    /// All books in id order.
    async fn list(&self) -> CatalogResult<Vec<BookRecord>>;

    /// Books whose title or author contains `term`, case-sensitively.
    async fn search(&self, term: &str) -> CatalogResult<Vec<BookRecord>>;

    /// Number of rows whose `content_ref` equals `name`.
    async fn count_references(&self, name: &str) -> CatalogResult<i64>;

    async fn find_user(&self, username: &str) -> CatalogResult<Option<UserRecord>>;

    /// Fails with [`CatalogError::DuplicateUsername`] rather than overwriting.
    async fn create_user(&self, username: &str, password_hash: &str) -> CatalogResult<()>;

    async fn ping(&self) -> CatalogResult<()>;
}
