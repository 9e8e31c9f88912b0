//! Filesystem content store.
//!
//! Blobs live flat under one directory, keyed by their sanitized name. Writes
//! go to a uniquely named temp file in the same directory, are synced, then
//! renamed over the target so readers never observe a partial blob.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use tokio::io::AsyncWriteExt;
use tokio_util::io::ReaderStream;
use uuid::Uuid;

use super::{is_valid_blob_name, BlobRef, BlobStream, ContentStore, StorageError, StorageResult};

pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    /// Create the store, creating `root` if it doesn't exist.
    #[tracing::instrument(skip(root))]
    pub fn new(root: impl AsRef<Path>) -> StorageResult<Self> {
        let root = root.as_ref().to_path_buf();

        std::fs::create_dir_all(&root)
            .map_err(|e| StorageError::Io(format!("{}: {}", root.display(), e)))?;

        tracing::info!(path = %root.display(), "Created filesystem storage");
        Ok(Self { root })
    }

    fn path_for(&self, name: &str) -> StorageResult<PathBuf> {
        if !is_valid_blob_name(name) {
            return Err(StorageError::InvalidName(name.to_string()));
        }
        Ok(self.root.join(name))
    }

    // Leading dot keeps temp files outside the valid blob namespace.
    fn temp_path_for(&self, name: &str) -> PathBuf {
        self.root.join(format!(".{}.{}.tmp", name, Uuid::new_v4()))
    }

    async fn write_temp(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
        let mut file = tokio::fs::File::create(path).await?;
        file.write_all(bytes).await?;
        file.sync_all().await?;
        Ok(())
    }
}

fn io_error(action: &str, path: &Path, err: std::io::Error) -> StorageError {
    StorageError::Io(format!("{} {}: {}", action, path.display(), err))
}

#[async_trait]
impl ContentStore for LocalStore {
    fn kind(&self) -> &'static str {
        "local"
    }

    #[tracing::instrument(skip(self, bytes), fields(size = bytes.len()))]
    async fn put(&self, name: &str, bytes: Bytes) -> StorageResult<BlobRef> {
        let path = self.path_for(name)?;
        let temp_path = self.temp_path_for(name);

        if let Err(e) = Self::write_temp(&temp_path, &bytes).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(io_error("write", &temp_path, e));
        }

        if let Err(e) = tokio::fs::rename(&temp_path, &path).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(io_error("rename into", &path, e));
        }

        tracing::info!(path = %path.display(), size = bytes.len(), "Stored blob");
        Ok(BlobRef {
            name: name.to_string(),
            size: bytes.len() as u64,
        })
    }

    #[tracing::instrument(skip(self))]
    async fn delete(&self, name: &str) -> StorageResult<()> {
        let path = self.path_for(name)?;

        tokio::fs::remove_file(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StorageError::NotFound(name.to_string())
            } else {
                io_error("delete", &path, e)
            }
        })?;

        tracing::info!(path = %path.display(), "Deleted blob");
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn read(&self, name: &str) -> StorageResult<BlobStream> {
        let path = self.path_for(name)?;

        let file = tokio::fs::File::open(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StorageError::NotFound(name.to_string())
            } else {
                io_error("open", &path, e)
            }
        })?;

        Ok(ReaderStream::new(file).boxed())
    }

    async fn issue_access_url(&self, _name: &str, _ttl: Duration) -> StorageResult<String> {
        // Served directly by the application instead.
        Err(StorageError::Unsupported("access URLs"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::TryStreamExt;
    use std::sync::Arc;
    use tempfile::TempDir;

    async fn read_all(store: &LocalStore, name: &str) -> Vec<u8> {
        let chunks: Vec<Bytes> = store.read(name).await.unwrap().try_collect().await.unwrap();
        chunks.concat()
    }

    #[tokio::test]
    async fn test_put_read_roundtrip() {
        let dir = TempDir::new().unwrap();
        let store = LocalStore::new(dir.path()).unwrap();

        let blob = store.put("scan.pdf", Bytes::from_static(b"%PDF-1.7 pages")).await.unwrap();
        assert_eq!(blob, BlobRef { name: "scan.pdf".into(), size: 14 });
        assert_eq!(read_all(&store, "scan.pdf").await, b"%PDF-1.7 pages");
    }

    #[tokio::test]
    async fn test_put_overwrites_and_leaves_no_temp_files() {
        let dir = TempDir::new().unwrap();
        let store = LocalStore::new(dir.path()).unwrap();

        store.put("scan.pdf", Bytes::from_static(b"first")).await.unwrap();
        store.put("scan.pdf", Bytes::from_static(b"second")).await.unwrap();

        assert_eq!(read_all(&store, "scan.pdf").await, b"second");
        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_puts_never_mix() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(LocalStore::new(dir.path()).unwrap());
        let a = Bytes::from(vec![b'a'; 256 * 1024]);
        let b = Bytes::from(vec![b'b'; 256 * 1024]);

        let (ra, rb) = tokio::join!(store.put("same.bin", a.clone()), store.put("same.bin", b.clone()));
        ra.unwrap();
        rb.unwrap();

        let stored = read_all(&store, "same.bin").await;
        assert!(stored == a.as_ref() || stored == b.as_ref());
    }

    #[tokio::test]
    async fn test_delete_missing_is_not_found() {
        let dir = TempDir::new().unwrap();
        let store = LocalStore::new(dir.path()).unwrap();

        store.put("scan.pdf", Bytes::from_static(b"x")).await.unwrap();
        store.delete("scan.pdf").await.unwrap();

        let err = store.delete("scan.pdf").await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound(_)));
        assert!(matches!(store.read("scan.pdf").await, Err(StorageError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_rejects_traversal_names() {
        let dir = TempDir::new().unwrap();
        let store = LocalStore::new(dir.path().join("blobs")).unwrap();

        let err = store.put("../escape.txt", Bytes::from_static(b"x")).await.unwrap_err();
        assert!(matches!(err, StorageError::InvalidName(_)));
        assert!(!dir.path().join("escape.txt").exists());
    }

    #[tokio::test]
    async fn test_access_urls_unsupported() {
        let dir = TempDir::new().unwrap();
        let store = LocalStore::new(dir.path()).unwrap();

        let err = store.issue_access_url("scan.pdf", Duration::from_secs(60)).await.unwrap_err();
        assert!(matches!(err, StorageError::Unsupported(_)));
    }
}
