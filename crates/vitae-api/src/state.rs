//! Application state shared by all handlers.

use std::sync::Arc;
use vitae_core::Config;
use vitae_db::PhotoRepository;
use vitae_processing::MediaPipeline;
use vitae_storage::KeyedStore;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Shared media database holding photo metadata and data.
    pub media_store: Arc<dyn KeyedStore>,
    pub pipeline: MediaPipeline,
    pub photos: PhotoRepository,
}

impl AppState {
    pub fn new(config: Config, media_store: Arc<dyn KeyedStore>) -> Self {
        let pipeline = MediaPipeline::from_config(media_store.clone(), &config);
        let photos = PhotoRepository::new(
            media_store.clone(),
            config.media_meta_bucket(),
            config.media_data_bucket(),
        );
        Self {
            config,
            media_store,
            pipeline,
            photos,
        }
    }
}
