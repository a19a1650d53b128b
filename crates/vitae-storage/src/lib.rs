//! Vitae Storage Library
//!
//! Keyed byte stores used for profile records and photos. A database is
//! addressed by a filesystem path and holds named buckets; each bucket maps
//! string keys to byte values.
//!
//! # Backends
//!
//! - `SqliteStore`: one SQLite file per database, multi-key writes are transactional.
//! - `FsStore`: one directory per database, a sub-directory per bucket, a file per key.
//!
//! Bucket and key names must be non-empty and must not contain path separators,
//! `..` or a leading `.`. Validation lives in the `keys` module so both backends
//! reject the same names.

pub mod factory;
pub mod fs;
pub(crate) mod keys;
pub mod sqlite;
pub mod traits;

pub use factory::open_store;
pub use fs::FsStore;
pub use sqlite::SqliteStore;
pub use traits::{BatchEntry, KeyedStore, OpenMode, StoreError, StoreResult};
pub use vitae_core::StoreBackend;
