//! Configuration module
//!
//! Service settings are read from the environment (a `.env` file is loaded
//! first when present). Every value has a default so a bare `cargo run`
//! works against local `db/` and `media/` directories.

use std::env;
use std::path::{Path, PathBuf};

use crate::store_types::StoreBackend;

const SERVER_PORT: u16 = 4000;
const MAX_UPLOAD_SIZE_MB: usize = 32;
const MAX_FILE_SIZE_MB: usize = 10;
const JPEG_QUALITY: u8 = 98;
const PROFILE_DB_DIR: &str = "db";
const PROFILE_DB_TEMPLATE: &str = "{id}.db";
const MEDIA_DB_PATH: &str = "media/media.db";
const MEDIA_META_BUCKET: &str = "photo_meta";
const MEDIA_DATA_BUCKET: &str = "photo_data";
const PICTURE_FIELD: &str = "profile";
const PHOTOS_FIELD: &str = "photos";

/// Placeholder substituted with the profile id in `profile_db_template`.
pub const PROFILE_ID_PLACEHOLDER: &str = "{id}";

#[derive(Clone, Debug)]
pub struct ServiceConfig {
    pub server_port: u16,
    pub environment: String,
    pub cors_origins: Vec<String>,
    pub store_backend: StoreBackend,
    /// Directory holding one database per profile.
    pub profile_db_dir: PathBuf,
    /// File name of a profile database; `{id}` is replaced by the profile id.
    pub profile_db_template: String,
    /// Shared database holding photo metadata and data.
    pub media_db_path: PathBuf,
    pub media_meta_bucket: String,
    pub media_data_bucket: String,
    /// Whole request body limit for multipart uploads.
    pub max_upload_size_bytes: usize,
    /// Per-file limit applied during extraction.
    pub max_file_size_bytes: usize,
    pub jpeg_quality: u8,
    pub picture_field: String,
    pub photos_field: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            server_port: SERVER_PORT,
            environment: "development".to_string(),
            cors_origins: vec!["*".to_string()],
            store_backend: StoreBackend::default(),
            profile_db_dir: PathBuf::from(PROFILE_DB_DIR),
            profile_db_template: PROFILE_DB_TEMPLATE.to_string(),
            media_db_path: PathBuf::from(MEDIA_DB_PATH),
            media_meta_bucket: MEDIA_META_BUCKET.to_string(),
            media_data_bucket: MEDIA_DATA_BUCKET.to_string(),
            max_upload_size_bytes: MAX_UPLOAD_SIZE_MB * 1024 * 1024,
            max_file_size_bytes: MAX_FILE_SIZE_MB * 1024 * 1024,
            jpeg_quality: JPEG_QUALITY,
            picture_field: PICTURE_FIELD.to_string(),
            photos_field: PHOTOS_FIELD.to_string(),
        }
    }
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins_str = env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());
        let cors_origins: Vec<String> = cors_origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let store_backend = match env::var("STORE_BACKEND") {
            Ok(s) => s.parse()?,
            Err(_) => StoreBackend::default(),
        };

        let max_upload_size_mb = env::var("MAX_UPLOAD_SIZE_MB")
            .unwrap_or_else(|_| MAX_UPLOAD_SIZE_MB.to_string())
            .parse::<usize>()
            .unwrap_or(MAX_UPLOAD_SIZE_MB);
        let max_upload_size_bytes = mb_to_bytes("MAX_UPLOAD_SIZE_MB", max_upload_size_mb)?;

        let max_file_size_mb = env::var("MAX_FILE_SIZE_MB")
            .unwrap_or_else(|_| MAX_FILE_SIZE_MB.to_string())
            .parse::<usize>()
            .unwrap_or(MAX_FILE_SIZE_MB);
        let max_file_size_bytes = mb_to_bytes("MAX_FILE_SIZE_MB", max_file_size_mb)?;

        let config = Self {
            server_port: env::var("PORT")
                .unwrap_or_else(|_| SERVER_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            environment,
            cors_origins,
            store_backend,
            profile_db_dir: env::var("PROFILE_DB_DIR")
                .unwrap_or_else(|_| PROFILE_DB_DIR.to_string())
                .into(),
            profile_db_template: env::var("PROFILE_DB_TEMPLATE")
                .unwrap_or_else(|_| PROFILE_DB_TEMPLATE.to_string()),
            media_db_path: env::var("MEDIA_DB_PATH")
                .unwrap_or_else(|_| MEDIA_DB_PATH.to_string())
                .into(),
            media_meta_bucket: env::var("MEDIA_META_BUCKET")
                .unwrap_or_else(|_| MEDIA_META_BUCKET.to_string()),
            media_data_bucket: env::var("MEDIA_DATA_BUCKET")
                .unwrap_or_else(|_| MEDIA_DATA_BUCKET.to_string()),
            max_upload_size_bytes,
            max_file_size_bytes,
            jpeg_quality: env::var("JPEG_QUALITY")
                .unwrap_or_else(|_| JPEG_QUALITY.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("JPEG_QUALITY must be a number between 1 and 100"))?,
            picture_field: env::var("PICTURE_FIELD").unwrap_or_else(|_| PICTURE_FIELD.to_string()),
            photos_field: env::var("PHOTOS_FIELD").unwrap_or_else(|_| PHOTOS_FIELD.to_string()),
        };

        Ok(config)
    }

    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.is_production() && self.cors_origins.iter().any(|o| o == "*") {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        if self.profile_db_template.matches(PROFILE_ID_PLACEHOLDER).count() != 1 {
            return Err(anyhow::anyhow!(
                "PROFILE_DB_TEMPLATE must contain the {} placeholder exactly once",
                PROFILE_ID_PLACEHOLDER
            ));
        }

        if self.profile_db_template.contains('/') || self.profile_db_template.contains('\\') {
            return Err(anyhow::anyhow!(
                "PROFILE_DB_TEMPLATE must be a file name, not a path"
            ));
        }

        if self.media_db_shadows_profile() {
            return Err(anyhow::anyhow!(
                "MEDIA_DB_PATH {} could be opened as a profile database; move it out of PROFILE_DB_DIR or rename it",
                self.media_db_path.display()
            ));
        }

        if self.media_meta_bucket.is_empty() || self.media_data_bucket.is_empty() {
            return Err(anyhow::anyhow!(
                "MEDIA_META_BUCKET and MEDIA_DATA_BUCKET must not be empty"
            ));
        }

        if self.media_meta_bucket == self.media_data_bucket {
            return Err(anyhow::anyhow!(
                "MEDIA_META_BUCKET and MEDIA_DATA_BUCKET must differ"
            ));
        }

        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(anyhow::anyhow!("JPEG_QUALITY must be between 1 and 100"));
        }

        if self.max_file_size_bytes == 0 || self.max_upload_size_bytes == 0 {
            return Err(anyhow::anyhow!(
                "MAX_UPLOAD_SIZE_MB and MAX_FILE_SIZE_MB must be greater than zero"
            ));
        }

        if self.max_file_size_bytes > self.max_upload_size_bytes {
            return Err(anyhow::anyhow!(
                "MAX_FILE_SIZE_MB cannot exceed MAX_UPLOAD_SIZE_MB"
            ));
        }

        if self.picture_field.is_empty() || self.photos_field.is_empty() {
            return Err(anyhow::anyhow!(
                "PICTURE_FIELD and PHOTOS_FIELD must not be empty"
            ));
        }

        Ok(())
    }

    /// True when some profile id would resolve to the media database path.
    fn media_db_shadows_profile(&self) -> bool {
        if self.media_db_path.parent() != Some(self.profile_db_dir.as_path()) {
            return false;
        }
        let Some(file_name) = self.media_db_path.file_name().and_then(|n| n.to_str()) else {
            return false;
        };
        let Some((prefix, suffix)) = self.profile_db_template.split_once(PROFILE_ID_PLACEHOLDER)
        else {
            return false;
        };

        file_name.len() > prefix.len() + suffix.len()
            && file_name.starts_with(prefix)
            && file_name.ends_with(suffix)
    }
}

fn mb_to_bytes(name: &str, mb: usize) -> Result<usize, anyhow::Error> {
    mb.checked_mul(1024 * 1024)
        .ok_or_else(|| anyhow::anyhow!("{} is too large: {} MB", name, mb))
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config(pub Box<ServiceConfig>);

impl Config {
    fn inner(&self) -> &ServiceConfig {
        &self.0
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        let config = ServiceConfig::from_env()?;
        Ok(Config(Box::new(config)))
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.inner().validate()
    }

    pub fn is_production(&self) -> bool {
        self.inner().is_production()
    }

    pub fn server_port(&self) -> u16 {
        self.inner().server_port
    }

    pub fn environment(&self) -> &str {
        &self.inner().environment
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.inner().cors_origins
    }

    pub fn store_backend(&self) -> StoreBackend {
        self.inner().store_backend
    }

    pub fn profile_db_dir(&self) -> &Path {
        &self.inner().profile_db_dir
    }

    pub fn profile_db_template(&self) -> &str {
        &self.inner().profile_db_template
    }

    /// Database path for one profile: `{profile_db_dir}/{template}` with the
    /// id substituted. The id must already be validated as path-safe.
    pub fn profile_db_path(&self, id: &str) -> PathBuf {
        let file_name = self
            .inner()
            .profile_db_template
            .replace(PROFILE_ID_PLACEHOLDER, id);
        self.inner().profile_db_dir.join(file_name)
    }

    pub fn media_db_path(&self) -> &Path {
        &self.inner().media_db_path
    }

    pub fn media_meta_bucket(&self) -> &str {
        &self.inner().media_meta_bucket
    }

    pub fn media_data_bucket(&self) -> &str {
        &self.inner().media_data_bucket
    }

    pub fn max_upload_size_bytes(&self) -> usize {
        self.inner().max_upload_size_bytes
    }

    pub fn max_file_size_bytes(&self) -> usize {
        self.inner().max_file_size_bytes
    }

    pub fn jpeg_quality(&self) -> u8 {
        self.inner().jpeg_quality
    }

    pub fn picture_field(&self) -> &str {
        &self.inner().picture_field
    }

    pub fn photos_field(&self) -> &str {
        &self.inner().photos_field
    }
}

impl From<ServiceConfig> for Config {
    fn from(config: ServiceConfig) -> Self {
        Config(Box::new(config))
    }
}
