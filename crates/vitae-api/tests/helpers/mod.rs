//! Test helpers: build AppState and router for integration tests.
//!
//! Every app gets its own temporary directory holding the profile databases
//! and the media database, so tests never share state.

#![allow(dead_code)]

pub mod fixtures;

use axum_test::TestServer;
use std::sync::Arc;
use tempfile::TempDir;
use vitae_api::constants;
use vitae_api::setup::{routes, storage};
use vitae_api::AppState;
use vitae_core::{Config, ServiceConfig, StoreBackend};

/// API path prefix for tests (e.g. `/api/v0`).
pub fn api_path(path: &str) -> String {
    format!("{}{}", constants::API_PREFIX, path)
}

/// Test application: server and owned resources.
pub struct TestApp {
    pub server: TestServer,
    pub state: Arc<AppState>,
    pub _temp_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    pub fn config(&self) -> &Config {
        &self.state.config
    }
}

pub fn test_config(dir: &TempDir, backend: StoreBackend) -> Config {
    Config::from(ServiceConfig {
        environment: "test".to_string(),
        store_backend: backend,
        profile_db_dir: dir.path().join("profiles"),
        media_db_path: dir.path().join("media").join("media.db"),
        ..ServiceConfig::default()
    })
}

pub async fn setup_test_app() -> TestApp {
    setup_test_app_with(StoreBackend::Sqlite, |_| {}).await
}

/// Setup a test app, letting the caller adjust the config first.
pub async fn setup_test_app_with(
    backend: StoreBackend,
    configure: impl FnOnce(&mut ServiceConfig),
) -> TestApp {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let mut config = test_config(&temp_dir, backend);
    configure(&mut *config.0);

    let media_store = storage::setup_storage(&config)
        .await
        .expect("Failed to setup media store");
    let state = Arc::new(AppState::new(config.clone(), media_store));
    let app = routes::setup_routes(&config, state.clone()).expect("Failed to setup routes");

    let server = TestServer::new(app.into_make_service()).expect("Failed to create test server");

    TestApp {
        server,
        state,
        _temp_dir: temp_dir,
    }
}

/// Create a profile through the API and return the response body.
pub async fn create_profile(client: &TestServer, id: &str) -> serde_json::Value {
    let response = client
        .post(&api_path("/profiles"))
        .json(&serde_json::json!({ "id": id }))
        .await;
    assert_eq!(response.status_code(), 201);
    response.json()
}
