//! Storage setup and initialization

use anyhow::{Context, Result};
use std::sync::Arc;
use vitae_core::Config;
use vitae_storage::{open_store, KeyedStore, OpenMode};

/// Create the directories the stores live in, then open the shared media store.
pub async fn setup_storage(config: &Config) -> Result<Arc<dyn KeyedStore>> {
    ensure_layout(config)?;

    tracing::info!(
        path = %config.media_db_path().display(),
        "Opening media store..."
    );
    let store = open_store(
        config.store_backend(),
        config.media_db_path(),
        OpenMode::CreateIfMissing,
    )
    .await
    .context("Failed to open media store")?;

    tracing::info!(
        backend = %store.backend_type(),
        transactional = store.supports_transactions(),
        "Media store initialized successfully"
    );

    Ok(store)
}

/// Profile databases are opened per request and never create their parent
/// directory, so it has to exist before the first request.
pub fn ensure_layout(config: &Config) -> Result<()> {
    std::fs::create_dir_all(config.profile_db_dir()).with_context(|| {
        format!(
            "Failed to create profile directory {}",
            config.profile_db_dir().display()
        )
    })?;

    if let Some(parent) = config.media_db_path().parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create media directory {}", parent.display())
            })?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use vitae_core::ServiceConfig;

    #[tokio::test]
    async fn test_setup_storage_creates_layout() {
        let dir = TempDir::new().unwrap();
        let config = Config::from(ServiceConfig {
            profile_db_dir: dir.path().join("profiles"),
            media_db_path: dir.path().join("media").join("media.db"),
            ..ServiceConfig::default()
        });

        let store = setup_storage(&config).await.unwrap();

        assert!(dir.path().join("profiles").is_dir());
        assert!(dir.path().join("media").join("media.db").exists());
        assert!(store.get("health", "ping").await.unwrap_err().is_not_found());
    }
}
