use crate::keys::{validate_entry, validate_name};
use crate::traits::{KeyedStore, OpenMode, StoreError, StoreResult};
use crate::StoreBackend;
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

/// Filesystem keyed store.
///
/// The database is a directory, each bucket a sub-directory and each entry a
/// file named after its key. Single-entry writes are atomic (temp file plus
/// link/rename); `create_batch` is not, see `KeyedStore::create_batch`.
#[derive(Clone, Debug)]
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    /// Open the store rooted at `root`.
    ///
    /// With `OpenMode::CreateIfMissing` the root directory itself is created,
    /// but not its parents.
    pub async fn open(root: impl Into<PathBuf>, mode: OpenMode) -> StoreResult<Self> {
        let root = root.into();

        match mode {
            OpenMode::MustExist => {
                if !fs::try_exists(&root).await? {
                    return Err(StoreError::DatabaseNotFound(root.display().to_string()));
                }
            }
            OpenMode::CreateIfMissing => match fs::create_dir(&root).await {
                Ok(()) => {
                    tracing::debug!(path = %root.display(), "Created fs store directory");
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {}
                Err(e) => {
                    return Err(StoreError::ConfigError(format!(
                        "Failed to create store directory {}: {}",
                        root.display(),
                        e
                    )))
                }
            },
        }

        if !fs::metadata(&root).await?.is_dir() {
            return Err(StoreError::ConfigError(format!(
                "Store path {} is not a directory",
                root.display()
            )));
        }

        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn entry_path(&self, bucket: &str, key: &str) -> StoreResult<PathBuf> {
        validate_entry(bucket, key)?;
        Ok(self.root.join(bucket).join(key))
    }

    async fn ensure_bucket_dir(&self, bucket: &str) -> StoreResult<PathBuf> {
        validate_name("bucket", bucket)?;
        let dir = self.root.join(bucket);
        fs::create_dir_all(&dir).await?;
        Ok(dir)
    }

    /// Write `value` to a hidden temp file inside `dir` and flush it to disk.
    async fn write_temp(dir: &Path, value: &[u8]) -> StoreResult<PathBuf> {
        let temp_path = dir.join(format!(".tmp-{}", Uuid::new_v4()));
        let mut file = fs::File::create(&temp_path).await?;
        file.write_all(value).await?;
        file.sync_all().await?;
        Ok(temp_path)
    }

    fn describe(bucket: &str, key: &str) -> String {
        format!("{}/{}", bucket, key)
    }
}

#[async_trait]
impl KeyedStore for FsStore {
    async fn create(&self, bucket: &str, key: &str, value: &[u8]) -> StoreResult<()> {
        let path = self.entry_path(bucket, key)?;
        let dir = self.ensure_bucket_dir(bucket).await?;
        let temp_path = Self::write_temp(&dir, value).await?;

        // hard_link refuses to replace an existing file, which gives create its
        // no-overwrite guarantee without a window of partial content.
        let linked = fs::hard_link(&temp_path, &path).await;
        let _ = fs::remove_file(&temp_path).await;

        match linked {
            Ok(()) => {
                tracing::debug!(
                    path = %path.display(),
                    size_bytes = value.len(),
                    "Entry created"
                );
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                Err(StoreError::AlreadyExists(Self::describe(bucket, key)))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn get(&self, bucket: &str, key: &str) -> StoreResult<Vec<u8>> {
        let path = self.entry_path(bucket, key)?;

        match fs::read(&path).await {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(StoreError::NotFound(Self::describe(bucket, key)))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn update(&self, bucket: &str, key: &str, value: &[u8]) -> StoreResult<()> {
        let path = self.entry_path(bucket, key)?;

        if !fs::try_exists(&path).await? {
            return Err(StoreError::NotFound(Self::describe(bucket, key)));
        }

        let dir = self.root.join(bucket);
        let temp_path = Self::write_temp(&dir, value).await?;
        if let Err(e) = fs::rename(&temp_path, &path).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        tracing::debug!(path = %path.display(), size_bytes = value.len(), "Entry updated");
        Ok(())
    }

    async fn delete(&self, bucket: &str, key: &str) -> StoreResult<()> {
        let path = self.entry_path(bucket, key)?;

        match fs::remove_file(&path).await {
            Ok(()) => {
                tracing::debug!(path = %path.display(), "Entry deleted");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn backend_type(&self) -> StoreBackend {
        StoreBackend::Fs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::BatchEntry;
    use tempfile::TempDir;

    async fn open_temp() -> (TempDir, FsStore) {
        let dir = TempDir::new().unwrap();
        let store = FsStore::open(dir.path().join("store"), OpenMode::CreateIfMissing)
            .await
            .unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn test_create_get_update_delete() {
        let (_dir, store) = open_temp().await;

        store.create("b", "k", b"v1").await.unwrap();
        assert_eq!(store.get("b", "k").await.unwrap(), b"v1");

        store.update("b", "k", b"v2").await.unwrap();
        assert_eq!(store.get("b", "k").await.unwrap(), b"v2");

        store.delete("b", "k").await.unwrap();
        assert!(matches!(
            store.get("b", "k").await.unwrap_err(),
            StoreError::NotFound(_)
        ));
        store.delete("b", "k").await.unwrap();
    }

    #[tokio::test]
    async fn test_create_does_not_overwrite() {
        let (_dir, store) = open_temp().await;
        store.create("b", "k", b"first").await.unwrap();

        let err = store.create("b", "k", b"second").await.unwrap_err();
        assert!(matches!(err, StoreError::AlreadyExists(_)));
        assert_eq!(store.get("b", "k").await.unwrap(), b"first");
    }

    #[tokio::test]
    async fn test_update_missing_entry() {
        let (_dir, store) = open_temp().await;
        let err = store.update("b", "missing", b"v").await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_no_temp_files_left_behind() {
        let (_dir, store) = open_temp().await;
        store.create("b", "k", b"v").await.unwrap();
        let _ = store.create("b", "k", b"again").await;
        store.update("b", "k", b"v2").await.unwrap();

        let mut names = Vec::new();
        let mut entries = fs::read_dir(store.root().join("b")).await.unwrap();
        while let Some(entry) = entries.next_entry().await.unwrap() {
            names.push(entry.file_name().to_string_lossy().to_string());
        }
        assert_eq!(names, vec!["k".to_string()]);
    }

    #[tokio::test]
    async fn test_rejects_traversal_keys() {
        let (_dir, store) = open_temp().await;
        let err = store.create("b", "../escape", b"v").await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidKey(_)));
    }

    #[tokio::test]
    async fn test_batch_is_not_atomic() {
        let (_dir, store) = open_temp().await;
        assert!(!store.supports_transactions());

        // A regular file where the second bucket's directory should go makes
        // the second write fail after the first has landed.
        fs::write(store.root().join("data"), b"blocker").await.unwrap();

        let entries = [
            BatchEntry::new("meta", "id", b"{}"),
            BatchEntry::new("data", "id", b"bytes"),
        ];
        assert!(store.create_batch(&entries).await.is_err());
        assert_eq!(store.get("meta", "id").await.unwrap(), b"{}");
    }

    #[tokio::test]
    async fn test_must_exist() {
        let dir = TempDir::new().unwrap();
        let err = FsStore::open(dir.path().join("absent"), OpenMode::MustExist)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::DatabaseNotFound(_)));
    }

    #[tokio::test]
    async fn test_create_if_missing_requires_parent() {
        let dir = TempDir::new().unwrap();
        let err = FsStore::open(dir.path().join("a/b/c"), OpenMode::CreateIfMissing)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::ConfigError(_)));
    }
}
