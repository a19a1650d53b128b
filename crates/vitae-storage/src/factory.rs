use crate::{FsStore, KeyedStore, OpenMode, SqliteStore, StoreBackend, StoreResult};
use std::path::Path;
use std::sync::Arc;

/// Open a keyed store of the configured backend at `path`.
pub async fn open_store(
    backend: StoreBackend,
    path: &Path,
    mode: OpenMode,
) -> StoreResult<Arc<dyn KeyedStore>> {
    match backend {
        StoreBackend::Sqlite => {
            let store = SqliteStore::open(path, mode).await?;
            Ok(Arc::new(store))
        }
        StoreBackend::Fs => {
            let store = FsStore::open(path, mode).await?;
            Ok(Arc::new(store))
        }
    }
}
