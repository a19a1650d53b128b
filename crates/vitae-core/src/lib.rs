//! Vitae Core Library
//!
//! Domain models, error types and configuration shared by the storage,
//! database, processing and API crates.

pub mod config;
pub mod error;
pub mod models;
pub mod store_types;

pub use config::{Config, ServiceConfig};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::{ImageKind, Photo, Profile, ProfileUpdate};
pub use store_types::StoreBackend;
