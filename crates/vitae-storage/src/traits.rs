//! Keyed store abstraction
//!
//! This module defines the `KeyedStore` trait that all store backends implement.

use async_trait::async_trait;
use thiserror::Error;
use vitae_core::{AppError, StoreBackend};

/// Store operation errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Entry not found: {0}")]
    NotFound(String),

    #[error("Entry already exists: {0}")]
    AlreadyExists(String),

    #[error("Database not found: {0}")]
    DatabaseNotFound(String),

    #[error("Invalid bucket or key: {0}")]
    InvalidKey(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl StoreError {
    /// True when the entry or its whole database is absent.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_) | StoreError::DatabaseNotFound(_))
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(msg) | StoreError::DatabaseNotFound(msg) => AppError::NotFound(msg),
            StoreError::AlreadyExists(msg) => AppError::Conflict(msg),
            StoreError::InvalidKey(msg) => AppError::InvalidInput(msg),
            other => AppError::Storage(other.to_string()),
        }
    }
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// How a database is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    /// Create the database file or directory when absent. Its parent
    /// directory must already exist.
    CreateIfMissing,
    /// Fail with `StoreError::DatabaseNotFound` when absent.
    MustExist,
}

/// One entry of a multi-key write.
#[derive(Debug, Clone, Copy)]
pub struct BatchEntry<'a> {
    pub bucket: &'a str,
    pub key: &'a str,
    pub value: &'a [u8],
}

impl<'a> BatchEntry<'a> {
    pub fn new(bucket: &'a str, key: &'a str, value: &'a [u8]) -> Self {
        Self { bucket, key, value }
    }
}

/// Keyed store abstraction trait
///
/// A database holds named buckets mapping string keys to byte values. Writes
/// are explicit about intent: `create` never overwrites and `update` never
/// creates.
#[async_trait]
pub trait KeyedStore: Send + Sync {
    /// Insert a new entry. Fails with `AlreadyExists` when the key is taken.
    async fn create(&self, bucket: &str, key: &str, value: &[u8]) -> StoreResult<()>;

    /// Read an entry. Fails with `NotFound` when absent.
    async fn get(&self, bucket: &str, key: &str) -> StoreResult<Vec<u8>>;

    /// Replace an existing entry. Fails with `NotFound` when absent.
    async fn update(&self, bucket: &str, key: &str, value: &[u8]) -> StoreResult<()>;

    /// Remove an entry. Removing an absent entry succeeds.
    async fn delete(&self, bucket: &str, key: &str) -> StoreResult<()>;

    /// Create several entries.
    ///
    /// When `supports_transactions` is true either every entry is written or
    /// none is. The default writes entries in order and stops at the first
    /// failure, leaving earlier entries in place.
    async fn create_batch(&self, entries: &[BatchEntry<'_>]) -> StoreResult<()> {
        for entry in entries {
            self.create(entry.bucket, entry.key, entry.value).await?;
        }
        Ok(())
    }

    /// Whether `create_batch` is atomic.
    fn supports_transactions(&self) -> bool {
        false
    }

    /// Release held resources. Further calls on the store may fail.
    async fn close(&self) {}

    /// Get the store backend type
    fn backend_type(&self) -> StoreBackend;
}
