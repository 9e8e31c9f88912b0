use async_trait::async_trait;
use sqlx::PgPool;

use super::{Catalog, CatalogError, CatalogResult};
use crate::models::{BookRecord, UserRecord};

const BOOK_COLUMNS: &str = "id, title, author, filename AS content_ref";

/// Postgres-backed catalog. The pool is injected and connections are checked
/// out per statement.
#[derive(Clone)]
pub struct PgCatalog {
    pool: PgPool,
}

impl PgCatalog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Catalog for PgCatalog {
    async fn insert(
        &self,
        title: &str,
        author: &str,
        content_ref: Option<&str>,
    ) -> CatalogResult<BookRecord> {
        let book = sqlx::query_as::<_, BookRecord>(&format!(
            "INSERT INTO books (title, author, filename) VALUES ($1, $2, $3) RETURNING {}",
            BOOK_COLUMNS
        ))
        .bind(title)
        .bind(author)
        .bind(content_ref)
        .fetch_one(&self.pool)
        .await?;

        Ok(book)
    }

    async fn get(&self, id: i64) -> CatalogResult<Option<BookRecord>> {
        let book = sqlx::query_as::<_, BookRecord>(&format!(
            "SELECT {} FROM books WHERE id = $1",
            BOOK_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(book)
    }

    async fn update(
        &self,
        id: i64,
        title: &str,
        author: &str,
        content_ref: Option<&str>,
    ) -> CatalogResult<Option<Option<String>>> {
        // The locked sub-select captures the reference being replaced in the
        // same statement as the write.
        let previous = sqlx::query_scalar::<_, Option<String>>(
            r#"
            UPDATE books AS b
            SET title = $2, author = $3, filename = COALESCE($4, b.filename)
            FROM (SELECT id, filename FROM books WHERE id = $1 FOR UPDATE) AS prev
            WHERE b.id = prev.id
            RETURNING prev.filename
            "#,
        )
        .bind(id)
        .bind(title)
        .bind(author)
        .bind(content_ref)
        .fetch_optional(&self.pool)
        .await?;

        Ok(previous)
    }

    async fn delete(&self, id: i64) -> CatalogResult<Option<Option<String>>> {
        let previous = sqlx::query_scalar::<_, Option<String>>(
            "DELETE FROM books WHERE id = $1 RETURNING filename",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(previous)
    }

    async fn list(&self) -> CatalogResult<Vec<BookRecord>> {
        let books = sqlx::query_as::<_, BookRecord>(&format!(
            "SELECT {} FROM books ORDER BY id ASC",
            BOOK_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(books)
    }

    async fn search(&self, term: &str) -> CatalogResult<Vec<BookRecord>> {
        // strpos is a literal, case-sensitive match; LIKE would treat % and _
        // in the term as wildcards.
        let books = sqlx::query_as::<_, BookRecord>(&format!(
            r#"
            SELECT {} FROM books
            WHERE $1 = '' OR strpos(title, $1) > 0 OR strpos(author, $1) > 0
            ORDER BY id ASC
            "#,
            BOOK_COLUMNS
        ))
        .bind(term)
        .fetch_all(&self.pool)
        .await?;

        Ok(books)
    }

    async fn count_references(&self, name: &str) -> CatalogResult<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM books WHERE filename = $1")
            .bind(name)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn find_user(&self, username: &str) -> CatalogResult<Option<UserRecord>> {
        let user = sqlx::query_as::<_, UserRecord>(
            "SELECT username, password_hash FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn create_user(&self, username: &str, password_hash: &str) -> CatalogResult<()> {
        let result = sqlx::query("INSERT INTO users (username, password_hash) VALUES ($1, $2)")
            .bind(username)
            .bind(password_hash)
            .execute(&self.pool)
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Err(CatalogError::DuplicateUsername)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn ping(&self) -> CatalogResult<()> {
        sqlx::query("SELECT 1").fetch_one(&self.pool).await?;
        Ok(())
    }
}
