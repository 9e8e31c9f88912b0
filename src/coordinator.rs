//! Asset lifecycle coordinator
//!
//! Sequences every mutation that spans the catalog and the content store.
//! The ordering is fixed:
//!
//! - create / update: blob write happens before the catalog write, and a
//!   failed blob write aborts with the catalog untouched;
//! - delete: the catalog delete is the operation of record, the blob delete
//!   after it is best-effort and only logged on failure.
//!
//! So a committed `content_ref` never names a blob that was never written,
//! though it may outlive a blob delete that failed. No locks are held here;
//! concurrent writers to one id race at the catalog.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::config::TimeoutConfig;
use crate::db::Catalog;
use crate::models::{Artifact, BookRecord};
use crate::storage::{sanitize_filename, BlobStream, ContentStore, StorageError};
use crate::types::{AppError, AppResult};

/// How a client gets at a blob's bytes.
pub enum ContentAccess {
    /// Time-limited signed URL to redirect to.
    Redirect(String),
    /// Bytes served by this process.
    Stream(BlobStream),
}

pub struct AssetCoordinator {
    catalog: Arc<dyn Catalog>,
    store: Arc<dyn ContentStore>,
    catalog_timeout: Duration,
    storage_timeout: Duration,
    access_url_ttl: Duration,
}

/// Run one backing-store call under `limit`, surfacing `Timeout(op)` when it elapses.
pub(crate) async fn bounded<T, E, F>(limit: Duration, op: &'static str, fut: F) -> AppResult<T>
where
    F: Future<Output = Result<T, E>>,
    AppError: From<E>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result.map_err(AppError::from),
        Err(_) => {
            warn!(op, ?limit, "Backing store call timed out");
            Err(AppError::Timeout(op))
        }
    }
}

fn validate_fields(title: &str, author: &str) -> AppResult<()> {
    if title.trim().is_empty() {
        return Err(AppError::InvalidRequest("title must not be empty".into()));
    }
    if author.trim().is_empty() {
        return Err(AppError::InvalidRequest("author must not be empty".into()));
    }
    Ok(())
}

impl AssetCoordinator {
    pub fn new(
        catalog: Arc<dyn Catalog>,
        store: Arc<dyn ContentStore>,
        timeouts: &TimeoutConfig,
        access_url_ttl: Duration,
    ) -> Self {
        Self {
            catalog,
            store,
            catalog_timeout: timeouts.catalog(),
            storage_timeout: timeouts.storage(),
            access_url_ttl,
        }
    }

    pub fn store_kind(&self) -> &'static str {
        self.store.kind()
    }

    pub async fn list(&self) -> AppResult<Vec<BookRecord>> {
        bounded(self.catalog_timeout, "catalog.list", self.catalog.list()).await
    }

    pub async fn search(&self, term: &str) -> AppResult<Vec<BookRecord>> {
        bounded(self.catalog_timeout, "catalog.search", self.catalog.search(term)).await
    }

    pub async fn get(&self, id: i64) -> AppResult<BookRecord> {
        bounded(self.catalog_timeout, "catalog.get", self.catalog.get(id))
            .await?
            .ok_or_else(|| AppError::NotFound(format!("book {}", id)))
    }

    /// Store the artifact (if any), then insert the row that references it.
    #[tracing::instrument(skip(self, artifact), fields(artifact = artifact.is_some()))]
    pub async fn create(
        &self,
        title: &str,
        author: &str,
        artifact: Option<Artifact>,
    ) -> AppResult<BookRecord> {
        validate_fields(title, author)?;

        let content_ref = match artifact {
            Some(artifact) => Some(self.store_artifact(artifact).await?),
            None => None,
        };

        let inserted = bounded(
            self.catalog_timeout,
            "catalog.insert",
            self.catalog.insert(title, author, content_ref.as_deref()),
        )
        .await;

        match inserted {
            Ok(book) => {
                info!(id = book.id, content_ref = ?book.content_ref, "Created book");
                Ok(book)
            }
            Err(e) => {
                if let Some(name) = &content_ref {
                    // Left in place: the name may be shared with other rows.
                    warn!(blob = %name, "Catalog insert failed after upload; blob left unreferenced");
                }
                Err(e)
            }
        }
    }

    /// Replace title and author, and the artifact when a new one is supplied.
    ///
    /// A superseded blob is released once the row no longer points at it.
    #[tracing::instrument(skip(self, artifact), fields(artifact = artifact.is_some()))]
    pub async fn update(
        &self,
        id: i64,
        title: &str,
        author: &str,
        artifact: Option<Artifact>,
    ) -> AppResult<BookRecord> {
        validate_fields(title, author)?;

        // Fail before uploading anything for an id that isn't there.
        self.get(id).await?;

        let new_ref = match artifact {
            Some(artifact) => Some(self.store_artifact(artifact).await?),
            None => None,
        };

        let previous = bounded(
            self.catalog_timeout,
            "catalog.update",
            self.catalog.update(id, title, author, new_ref.as_deref()),
        )
        .await?;

        let Some(previous_ref) = previous else {
            // Deleted between the existence check and the update.
            if let Some(name) = &new_ref {
                warn!(id, blob = %name, "Book vanished during update; blob left unreferenced");
            }
            return Err(AppError::NotFound(format!("book {}", id)));
        };

        if let (Some(old), Some(new)) = (&previous_ref, &new_ref) {
            if old != new {
                self.release_blob(old).await;
            }
        }

        let book = BookRecord {
            id,
            title: title.to_string(),
            author: author.to_string(),
            content_ref: new_ref.or(previous_ref),
        };
        info!(id, content_ref = ?book.content_ref, "Updated book");
        Ok(book)
    }

    /// Delete the row, then best-effort delete its blob.
    ///
    /// Returns `false` when the id was already absent.
    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, id: i64) -> AppResult<bool> {
        let removed = bounded(self.catalog_timeout, "catalog.delete", self.catalog.delete(id)).await?;

        match removed {
            None => {
                debug!(id, "Delete of absent book is a no-op");
                Ok(false)
            }
            Some(content_ref) => {
                info!(id, content_ref = ?content_ref, "Deleted book");
                if let Some(name) = content_ref {
                    self.release_blob(&name).await;
                }
                Ok(true)
            }
        }
    }

    /// Signed redirect when the store issues access URLs, otherwise a byte
    /// stream from the store itself.
    pub async fn open_content(&self, name: &str) -> AppResult<ContentAccess> {
        let issued = tokio::time::timeout(
            self.storage_timeout,
            self.store.issue_access_url(name, self.access_url_ttl),
        )
        .await;

        match issued {
            Ok(Ok(url)) => Ok(ContentAccess::Redirect(url)),
            Ok(Err(StorageError::Unsupported(_))) => {
                let stream =
                    bounded(self.storage_timeout, "content.read", self.store.read(name)).await?;
                Ok(ContentAccess::Stream(stream))
            }
            Ok(Err(e)) => Err(e.into()),
            Err(_) => {
                warn!(blob = %name, "Issuing access URL timed out");
                Err(AppError::Timeout("content.issue_access_url"))
            }
        }
    }

    async fn store_artifact(&self, artifact: Artifact) -> AppResult<String> {
        let name = sanitize_filename(&artifact.filename);
        if name.is_empty() {
            return Err(AppError::InvalidRequest(format!(
                "unusable artifact filename {:?}",
                artifact.filename
            )));
        }

        let put = async {
            self.store.put(&name, artifact.bytes).await.map_err(|e| match e {
                StorageError::Timeout(_) => AppError::Timeout("content.put"),
                other => AppError::Upload(other),
            })
        };
        let blob = bounded(self.storage_timeout, "content.put", put).await?;
        Ok(blob.name)
    }

    /// Best-effort removal of a blob no row needs any more. Never fails the
    /// caller; a blob that is still referenced elsewhere is kept.
    async fn release_blob(&self, name: &str) {
        let references = bounded(
            self.catalog_timeout,
            "catalog.count_references",
            self.catalog.count_references(name),
        )
        .await;

        match references {
            Ok(0) => {}
            Ok(count) => {
                debug!(blob = %name, count, "Blob still referenced; keeping it");
                return;
            }
            Err(e) => {
                warn!(blob = %name, error = %e, "Could not count blob references; keeping it");
                return;
            }
        }

        // Not atomic with the count: a put and insert of the same name landing
        // here leaves that row pointing at a deleted blob.
        match bounded(self.storage_timeout, "content.delete", self.store.delete(name)).await {
            Ok(()) => info!(blob = %name, "Released blob"),
            Err(AppError::NotFound(_)) => debug!(blob = %name, "Blob already absent"),
            Err(e) => warn!(blob = %name, error = %e, "Failed to delete blob; leaving orphan"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::stalled::StalledCatalog;
    use crate::db::MemoryCatalog;
    use crate::storage::{BlobRef, LocalStore, StorageResult};
    use async_trait::async_trait;
    use bytes::Bytes;
    use futures::TryStreamExt;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use tempfile::TempDir;
    use tokio::sync::Notify;

    /// Local store with switchable failures.
    struct TestStore {
        inner: LocalStore,
        fail_puts: AtomicBool,
        fail_deletes: AtomicBool,
        put_delay: Option<Duration>,
        deletes: AtomicUsize,
        /// Signals the first `Notify` on delete, then waits on the second.
        delete_gate: Option<(Arc<Notify>, Arc<Notify>)>,
    }

    impl TestStore {
        fn new(dir: &TempDir) -> Self {
            Self {
                inner: LocalStore::new(dir.path()).unwrap(),
                fail_puts: AtomicBool::new(false),
                fail_deletes: AtomicBool::new(false),
                put_delay: None,
                deletes: AtomicUsize::new(0),
                delete_gate: None,
            }
        }
    }

    #[async_trait]
    impl ContentStore for TestStore {
        fn kind(&self) -> &'static str {
            "test"
        }

        async fn put(&self, name: &str, bytes: Bytes) -> StorageResult<BlobRef> {
            if let Some(delay) = self.put_delay {
                tokio::time::sleep(delay).await;
            }
            if self.fail_puts.load(Ordering::SeqCst) {
                return Err(StorageError::Io("injected put failure".into()));
            }
            self.inner.put(name, bytes).await
        }

        async fn delete(&self, name: &str) -> StorageResult<()> {
            self.deletes.fetch_add(1, Ordering::SeqCst);
            if let Some((reached, resume)) = &self.delete_gate {
                reached.notify_one();
                resume.notified().await;
            }
            if self.fail_deletes.load(Ordering::SeqCst) {
                return Err(StorageError::Io("injected delete failure".into()));
            }
            self.inner.delete(name).await
        }

        async fn read(&self, name: &str) -> StorageResult<BlobStream> {
            self.inner.read(name).await
        }

        async fn issue_access_url(&self, name: &str, ttl: Duration) -> StorageResult<String> {
            self.inner.issue_access_url(name, ttl).await
        }
    }

    struct Harness {
        _dir: TempDir,
        catalog: Arc<MemoryCatalog>,
        store: Arc<TestStore>,
        assets: AssetCoordinator,
    }

    fn harness() -> Harness {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(TestStore::new(&dir));
        let catalog = Arc::new(MemoryCatalog::new());
        let timeouts = TimeoutConfig { catalog_secs: 5, storage_secs: 5 };
        let assets = AssetCoordinator::new(
            catalog.clone(),
            store.clone(),
            &timeouts,
            Duration::from_secs(3600),
        );
        Harness { _dir: dir, catalog, store, assets }
    }

    fn artifact(filename: &str, bytes: &'static [u8]) -> Option<Artifact> {
        Some(Artifact {
            filename: filename.to_string(),
            bytes: Bytes::from_static(bytes),
        })
    }

    async fn blob_bytes(h: &Harness, name: &str) -> Option<Vec<u8>> {
        match h.store.read(name).await {
            Ok(stream) => {
                let chunks: Vec<Bytes> = stream.try_collect().await.unwrap();
                Some(chunks.concat())
            }
            Err(StorageError::NotFound(_)) => None,
            Err(e) => panic!("unexpected read error: {e}"),
        }
    }

    #[tokio::test]
    async fn test_create_with_artifact_round_trips_bytes() {
        let h = harness();

        let book = h
            .assets
            .create("The Hobbit", "Tolkien", artifact("hobbit scan.pdf", b"%PDF scan"))
            .await
            .unwrap();

        assert_eq!(book.content_ref.as_deref(), Some("hobbit_scan.pdf"));
        assert_eq!(blob_bytes(&h, "hobbit_scan.pdf").await.unwrap(), b"%PDF scan");
        assert_eq!(h.catalog.get(book.id).await.unwrap(), Some(book));
    }

    #[tokio::test]
    async fn test_create_without_artifact() {
        let h = harness();
        let book = h.assets.create("Dune", "Herbert", None).await.unwrap();
        assert_eq!(book.content_ref, None);
    }

    #[tokio::test]
    async fn test_failed_upload_leaves_catalog_unchanged() {
        let h = harness();
        h.store.fail_puts.store(true, Ordering::SeqCst);

        let err = h
            .assets
            .create("The Hobbit", "Tolkien", artifact("hobbit.pdf", b"bytes"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Upload(_)));
        assert!(h.catalog.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_upload_timeout_leaves_catalog_unchanged() {
        let dir = TempDir::new().unwrap();
        let mut store = TestStore::new(&dir);
        store.put_delay = Some(Duration::from_secs(30));
        let catalog = Arc::new(MemoryCatalog::new());
        let assets = AssetCoordinator {
            catalog: catalog.clone(),
            store: Arc::new(store),
            catalog_timeout: Duration::from_secs(5),
            storage_timeout: Duration::from_millis(50),
            access_url_ttl: Duration::from_secs(3600),
        };

        let err = assets
            .create("The Hobbit", "Tolkien", artifact("hobbit.pdf", b"bytes"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Timeout("content.put")));
        assert!(catalog.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_catalog_timeout_surfaces_without_touching_store() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(TestStore::new(&dir));
        let assets = AssetCoordinator {
            catalog: Arc::new(StalledCatalog),
            store: store.clone(),
            catalog_timeout: Duration::from_millis(50),
            storage_timeout: Duration::from_secs(5),
            access_url_ttl: Duration::from_secs(3600),
        };

        let err = assets.create("Dune", "Herbert", None).await.unwrap_err();
        assert!(matches!(err, AppError::Timeout("catalog.insert")));

        // The existence check times out before any upload is attempted.
        let err = assets
            .update(1, "Dune", "Herbert", artifact("dune.pdf", b"spice"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Timeout("catalog.get")));
        assert!(matches!(store.read("dune.pdf").await, Err(StorageError::NotFound(_))));

        let err = assets.delete(1).await.unwrap_err();
        assert!(matches!(err, AppError::Timeout("catalog.delete")));
        assert_eq!(store.deletes.load(Ordering::SeqCst), 0);

        assert!(matches!(assets.list().await, Err(AppError::Timeout("catalog.list"))));
    }

    #[tokio::test]
    async fn test_blank_fields_rejected_before_upload() {
        let h = harness();

        let err = h
            .assets
            .create("  ", "Tolkien", artifact("hobbit.pdf", b"bytes"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::InvalidRequest(_)));
        assert_eq!(blob_bytes(&h, "hobbit.pdf").await, None);
    }

    #[tokio::test]
    async fn test_unusable_filename_rejected() {
        let h = harness();
        let err = h
            .assets
            .create("The Hobbit", "Tolkien", artifact("../", b"bytes"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidRequest(_)));
        assert!(h.catalog.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_update_upload_keeps_row_and_blob() {
        let h = harness();
        let book = h
            .assets
            .create("The Hobbit", "Tolkien", artifact("hobbit.pdf", b"original"))
            .await
            .unwrap();

        h.store.fail_puts.store(true, Ordering::SeqCst);
        let err = h
            .assets
            .update(book.id, "Renamed", "Someone", artifact("new.pdf", b"replacement"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Upload(_)));
        assert_eq!(h.catalog.get(book.id).await.unwrap(), Some(book));
        assert_eq!(blob_bytes(&h, "hobbit.pdf").await.unwrap(), b"original");
    }

    #[tokio::test]
    async fn test_update_without_artifact_keeps_reference() {
        let h = harness();
        let book = h
            .assets
            .create("The Hobbit", "Tolkien", artifact("hobbit.pdf", b"original"))
            .await
            .unwrap();

        let updated = h.assets.update(book.id, "The Hobbit", "J.R.R. Tolkien", None).await.unwrap();

        assert_eq!(updated.author, "J.R.R. Tolkien");
        assert_eq!(updated.content_ref.as_deref(), Some("hobbit.pdf"));
        assert_eq!(h.store.deletes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_update_with_new_artifact_releases_superseded_blob() {
        let h = harness();
        let book = h
            .assets
            .create("The Hobbit", "Tolkien", artifact("hobbit-v1.pdf", b"v1"))
            .await
            .unwrap();

        let updated = h
            .assets
            .update(book.id, "The Hobbit", "Tolkien", artifact("hobbit-v2.pdf", b"v2"))
            .await
            .unwrap();

        assert_eq!(updated.content_ref.as_deref(), Some("hobbit-v2.pdf"));
        assert_eq!(blob_bytes(&h, "hobbit-v2.pdf").await.unwrap(), b"v2");
        assert_eq!(blob_bytes(&h, "hobbit-v1.pdf").await, None);
    }

    #[tokio::test]
    async fn test_update_with_same_name_overwrites_in_place() {
        let h = harness();
        let book = h
            .assets
            .create("The Hobbit", "Tolkien", artifact("hobbit.pdf", b"v1"))
            .await
            .unwrap();

        h.assets
            .update(book.id, "The Hobbit", "Tolkien", artifact("hobbit.pdf", b"v2"))
            .await
            .unwrap();

        assert_eq!(blob_bytes(&h, "hobbit.pdf").await.unwrap(), b"v2");
        assert_eq!(h.store.deletes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_update_missing_book_uploads_nothing() {
        let h = harness();

        let err = h
            .assets
            .update(42, "Ghost", "Nobody", artifact("ghost.pdf", b"boo"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));
        assert_eq!(blob_bytes(&h, "ghost.pdf").await, None);
    }

    #[tokio::test]
    async fn test_delete_removes_row_and_blob() {
        let h = harness();
        let book = h
            .assets
            .create("The Hobbit", "Tolkien", artifact("hobbit.pdf", b"bytes"))
            .await
            .unwrap();

        assert!(h.assets.delete(book.id).await.unwrap());
        assert_eq!(h.catalog.get(book.id).await.unwrap(), None);
        assert_eq!(blob_bytes(&h, "hobbit.pdf").await, None);
    }

    #[tokio::test]
    async fn test_delete_tolerates_blob_delete_failure() {
        let h = harness();
        let book = h
            .assets
            .create("The Hobbit", "Tolkien", artifact("hobbit.pdf", b"bytes"))
            .await
            .unwrap();
        h.store.fail_deletes.store(true, Ordering::SeqCst);

        assert!(h.assets.delete(book.id).await.unwrap());
        assert_eq!(h.catalog.get(book.id).await.unwrap(), None);
        // Orphaned, not referenced.
        assert!(blob_bytes(&h, "hobbit.pdf").await.is_some());
    }

    #[tokio::test]
    async fn test_delete_twice_is_a_noop_and_spares_newer_blob() {
        let h = harness();
        let first = h
            .assets
            .create("First", "Author", artifact("scan.pdf", b"first"))
            .await
            .unwrap();
        assert!(h.assets.delete(first.id).await.unwrap());

        let second = h
            .assets
            .create("Second", "Author", artifact("scan.pdf", b"second"))
            .await
            .unwrap();

        assert!(!h.assets.delete(first.id).await.unwrap());
        assert_eq!(h.store.deletes.load(Ordering::SeqCst), 1);
        assert_eq!(blob_bytes(&h, "scan.pdf").await.unwrap(), b"second");
        assert!(h.catalog.get(second.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_shared_blob_kept_until_last_reference_goes() {
        let h = harness();
        let a = h.assets.create("A", "X", artifact("shared.pdf", b"one")).await.unwrap();
        let b = h.assets.create("B", "Y", artifact("shared.pdf", b"two")).await.unwrap();

        assert!(h.assets.delete(a.id).await.unwrap());
        assert_eq!(blob_bytes(&h, "shared.pdf").await.unwrap(), b"two");

        assert!(h.assets.delete(b.id).await.unwrap());
        assert_eq!(blob_bytes(&h, "shared.pdf").await, None);
    }

    #[tokio::test]
    async fn test_concurrent_creates_with_same_filename() {
        let h = harness();

        let (a, b) = tokio::join!(
            h.assets.create("A", "X", artifact("same.pdf", b"payload-a")),
            h.assets.create("B", "Y", artifact("same.pdf", b"payload-b")),
        );
        let (a, b) = (a.unwrap(), b.unwrap());

        assert_eq!(a.content_ref.as_deref(), Some("same.pdf"));
        assert_eq!(b.content_ref.as_deref(), Some("same.pdf"));
        let stored = blob_bytes(&h, "same.pdf").await.unwrap();
        assert!(stored == b"payload-a" || stored == b"payload-b");
        assert_eq!(h.catalog.list().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_reupload_between_count_and_delete_loses_blob() {
        let dir = TempDir::new().unwrap();
        let reached = Arc::new(Notify::new());
        let resume = Arc::new(Notify::new());
        let mut store = TestStore::new(&dir);
        store.delete_gate = Some((reached.clone(), resume.clone()));
        let catalog = Arc::new(MemoryCatalog::new());
        let timeouts = TimeoutConfig { catalog_secs: 5, storage_secs: 5 };
        let assets = Arc::new(AssetCoordinator::new(
            catalog.clone(),
            Arc::new(store),
            &timeouts,
            Duration::from_secs(3600),
        ));

        let old = assets.create("Old", "A", artifact("scan.pdf", b"old")).await.unwrap();
        let deleting = tokio::spawn({
            let assets = assets.clone();
            async move { assets.delete(old.id).await }
        });

        // The old row is gone and its blob counted as unreferenced.
        reached.notified().await;
        let new = assets.create("New", "B", artifact("scan.pdf", b"new")).await.unwrap();
        resume.notify_one();
        assert!(deleting.await.unwrap().unwrap());

        // The new row survives but its blob does not.
        assert_eq!(
            catalog.get(new.id).await.unwrap().unwrap().content_ref.as_deref(),
            Some("scan.pdf")
        );
        assert!(matches!(
            assets.open_content("scan.pdf").await,
            Err(AppError::NotFound(_))
        ));

        // Uploading again under the same name restores it.
        assets
            .update(new.id, "New", "B", artifact("scan.pdf", b"new"))
            .await
            .unwrap();
        assert!(assets.open_content("scan.pdf").await.is_ok());
    }

    #[tokio::test]
    async fn test_open_content_streams_from_local_store() {
        let h = harness();
        h.assets
            .create("The Hobbit", "Tolkien", artifact("hobbit.pdf", b"scan bytes"))
            .await
            .unwrap();

        match h.assets.open_content("hobbit.pdf").await.unwrap() {
            ContentAccess::Stream(stream) => {
                let chunks: Vec<Bytes> = stream.try_collect().await.unwrap();
                assert_eq!(chunks.concat(), b"scan bytes");
            }
            ContentAccess::Redirect(url) => panic!("unexpected redirect to {url}"),
        }

        assert!(matches!(
            h.assets.open_content("missing.pdf").await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_search_and_get_pass_through() {
        let h = harness();
        h.assets.create("The Hobbit", "J.R.R. Tolkien", None).await.unwrap();
        h.assets.create("Dune", "Frank Herbert", None).await.unwrap();

        assert_eq!(h.assets.search("").await.unwrap().len(), 2);
        assert_eq!(h.assets.search("Tolkien").await.unwrap().len(), 1);
        assert!(h.assets.search("tolkien").await.unwrap().is_empty());
        assert!(matches!(h.assets.get(99).await, Err(AppError::NotFound(_))));
    }
}
