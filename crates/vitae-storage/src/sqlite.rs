use crate::keys::validate_entry;
use crate::traits::{BatchEntry, KeyedStore, OpenMode, StoreError, StoreResult};
use crate::StoreBackend;
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::path::{Path, PathBuf};
use std::time::Duration;

const BUSY_TIMEOUT_SECS: u64 = 5;
const MAX_CONNECTIONS: u32 = 4;

/// SQLite-backed keyed store. All buckets share one `entries` table.
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
    path: PathBuf,
}

impl SqliteStore {
    /// Open the database at `path`, creating the file and schema if allowed.
    pub async fn open(path: impl Into<PathBuf>, mode: OpenMode) -> StoreResult<Self> {
        let path = path.into();

        if mode == OpenMode::MustExist && !tokio::fs::try_exists(&path).await? {
            return Err(StoreError::DatabaseNotFound(path.display().to_string()));
        }

        let options = SqliteConnectOptions::new()
            .filename(&path)
            .journal_mode(SqliteJournalMode::Wal)
            .create_if_missing(mode == OpenMode::CreateIfMissing)
            .busy_timeout(Duration::from_secs(BUSY_TIMEOUT_SECS));

        let pool = SqlitePoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .connect_with(options)
            .await?;

        let store = Self { pool, path };
        store.migrate().await?;

        tracing::debug!(path = %store.path.display(), "Opened sqlite store");

        Ok(store)
    }

    async fn migrate(&self) -> StoreResult<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS entries (
                bucket TEXT NOT NULL,
                key TEXT NOT NULL,
                value BLOB NOT NULL,
                PRIMARY KEY (bucket, key)
            ) WITHOUT ROWID
            "#,
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn describe(bucket: &str, key: &str) -> String {
        format!("{}/{}", bucket, key)
    }
}

const INSERT_ENTRY: &str =
    "INSERT INTO entries (bucket, key, value) VALUES (?1, ?2, ?3) ON CONFLICT (bucket, key) DO NOTHING";

#[async_trait]
impl KeyedStore for SqliteStore {
    async fn create(&self, bucket: &str, key: &str, value: &[u8]) -> StoreResult<()> {
        validate_entry(bucket, key)?;

        let result = sqlx::query(INSERT_ENTRY)
            .bind(bucket)
            .bind(key)
            .bind(value)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::AlreadyExists(Self::describe(bucket, key)));
        }

        tracing::debug!(bucket = %bucket, key = %key, size_bytes = value.len(), "Entry created");
        Ok(())
    }

    async fn get(&self, bucket: &str, key: &str) -> StoreResult<Vec<u8>> {
        validate_entry(bucket, key)?;

        sqlx::query_scalar::<_, Vec<u8>>("SELECT value FROM entries WHERE bucket = ?1 AND key = ?2")
            .bind(bucket)
            .bind(key)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::NotFound(Self::describe(bucket, key)))
    }

    async fn update(&self, bucket: &str, key: &str, value: &[u8]) -> StoreResult<()> {
        validate_entry(bucket, key)?;

        let result = sqlx::query("UPDATE entries SET value = ?3 WHERE bucket = ?1 AND key = ?2")
            .bind(bucket)
            .bind(key)
            .bind(value)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(Self::describe(bucket, key)));
        }

        tracing::debug!(bucket = %bucket, key = %key, size_bytes = value.len(), "Entry updated");
        Ok(())
    }

    async fn delete(&self, bucket: &str, key: &str) -> StoreResult<()> {
        validate_entry(bucket, key)?;

        let result = sqlx::query("DELETE FROM entries WHERE bucket = ?1 AND key = ?2")
            .bind(bucket)
            .bind(key)
            .execute(&self.pool)
            .await?;

        tracing::debug!(
            bucket = %bucket,
            key = %key,
            existed = result.rows_affected() > 0,
            "Entry deleted"
        );
        Ok(())
    }

    async fn create_batch(&self, entries: &[BatchEntry<'_>]) -> StoreResult<()> {
        for entry in entries {
            validate_entry(entry.bucket, entry.key)?;
        }

        let mut tx = self.pool.begin().await?;

        for entry in entries {
            let result = sqlx::query(INSERT_ENTRY)
                .bind(entry.bucket)
                .bind(entry.key)
                .bind(entry.value)
                .execute(&mut *tx)
                .await?;

            if result.rows_affected() == 0 {
                // Dropping the transaction rolls back earlier inserts.
                return Err(StoreError::AlreadyExists(Self::describe(
                    entry.bucket,
                    entry.key,
                )));
            }
        }

        tx.commit().await?;

        tracing::debug!(entries = entries.len(), "Batch committed");
        Ok(())
    }

    fn supports_transactions(&self) -> bool {
        true
    }

    async fn close(&self) {
        self.pool.close().await;
    }

    fn backend_type(&self) -> StoreBackend {
        StoreBackend::Sqlite
    }
}
