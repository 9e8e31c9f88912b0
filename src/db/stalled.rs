// Catalog whose calls never complete, for exercising timeouts

use async_trait::async_trait;

use super::{Catalog, CatalogResult};
use crate::models::{BookRecord, UserRecord};

pub(crate) struct StalledCatalog;

#[async_trait]
impl Catalog for StalledCatalog {
    async fn insert(&self, _: &str, _: &str, _: Option<&str>) -> CatalogResult<BookRecord> {
        std::future::pending().await
    }

    async fn get(&self, _: i64) -> CatalogResult<Option<BookRecord>> {
        std::future::pending().await
    }

    async fn update(
        &self,
        _: i64,
        _: &str,
        _: &str,
        _: Option<&str>,
    ) -> CatalogResult<Option<Option<String>>> {
        std::future::pending().await
    }

    async fn delete(&self, _: i64) -> CatalogResult<Option<Option<String>>> {
        std::future::pending().await
    }

    async fn list(&self) -> CatalogResult<Vec<BookRecord>> {
        std::future::pending().await
    }

    async fn search(&self, _: &str) -> CatalogResult<Vec<BookRecord>> {
        std::future::pending().await
    }

    async fn count_references(&self, _: &str) -> CatalogResult<i64> {
        std::future::pending().await
    }

    async fn find_user(&self, _: &str) -> CatalogResult<Option<UserRecord>> {
        std::future::pending().await
    }

    async fn create_user(&self, _: &str, _: &str) -> CatalogResult<()> {
        std::future::pending().await
    }

    async fn ping(&self) -> CatalogResult<()> {
        std::future::pending().await
    }
}
