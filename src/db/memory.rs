use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{Catalog, CatalogError, CatalogResult};
use crate::models::{BookRecord, UserRecord};

#[derive(Default)]
struct Tables {
    next_id: i64,
    books: BTreeMap<i64, BookRecord>,
    users: HashMap<String, String>,
}

/// In-process catalog. State does not survive a restart.
#[derive(Clone, Default)]
pub struct MemoryCatalog {
    inner: Arc<RwLock<Tables>>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Catalog for MemoryCatalog {
    async fn insert(
        &self,
        title: &str,
        author: &str,
        content_ref: Option<&str>,
    ) -> CatalogResult<BookRecord> {
        let mut guard = self.inner.write().await;
        guard.next_id += 1;
        let book = BookRecord {
            id: guard.next_id,
            title: title.to_string(),
            author: author.to_string(),
            content_ref: content_ref.map(str::to_string),
        };
        guard.books.insert(book.id, book.clone());
        Ok(book)
    }

    async fn get(&self, id: i64) -> CatalogResult<Option<BookRecord>> {
        let guard = self.inner.read().await;
        Ok(guard.books.get(&id).cloned())
    }

    async fn update(
        &self,
        id: i64,
        title: &str,
        author: &str,
        content_ref: Option<&str>,
    ) -> CatalogResult<Option<Option<String>>> {
        let mut guard = self.inner.write().await;
        let Some(book) = guard.books.get_mut(&id) else {
            return Ok(None);
        };

        let previous = book.content_ref.clone();
        book.title = title.to_string();
        book.author = author.to_string();
        if let Some(name) = content_ref {
            book.content_ref = Some(name.to_string());
        }
        Ok(Some(previous))
    }

    async fn delete(&self, id: i64) -> CatalogResult<Option<Option<String>>> {
        let mut guard = self.inner.write().await;
        Ok(guard.books.remove(&id).map(|book| book.content_ref))
    }

    async fn list(&self) -> CatalogResult<Vec<BookRecord>> {
        let guard = self.inner.read().await;
        Ok(guard.books.values().cloned().collect())
    }

    async fn search(&self, term: &str) -> CatalogResult<Vec<BookRecord>> {
        let guard = self.inner.read().await;
        Ok(guard
            .books
            .values()
            .filter(|book| book.title.contains(term) || book.author.contains(term))
            .cloned()
            .collect())
    }

    async fn count_references(&self, name: &str) -> CatalogResult<i64> {
        let guard = self.inner.read().await;
        let count = guard
            .books
            .values()
            .filter(|book| book.content_ref.as_deref() == Some(name))
            .count();
        Ok(count as i64)
    }

    async fn find_user(&self, username: &str) -> CatalogResult<Option<UserRecord>> {
        let guard = self.inner.read().await;
        Ok(guard.users.get(username).map(|hash| UserRecord {
            username: username.to_string(),
            password_hash: hash.clone(),
        }))
    }

    async fn create_user(&self, username: &str, password_hash: &str) -> CatalogResult<()> {
        let mut guard = self.inner.write().await;
        if guard.users.contains_key(username) {
            return Err(CatalogError::DuplicateUsername);
        }
        guard
            .users
            .insert(username.to_string(), password_hash.to_string());
        Ok(())
    }

    async fn ping(&self) -> CatalogResult<()> {
        Ok(())
    }
}
