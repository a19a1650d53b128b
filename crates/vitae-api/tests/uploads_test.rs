//! Upload API integration tests.
//!
//! Run with: `cargo test -p vitae-api --test uploads_test`

mod helpers;

use axum_test::multipart::MultipartForm;
use helpers::fixtures::{image_part, jpeg_bytes, png_bytes, text_part};
use helpers::{api_path, create_profile, setup_test_app, setup_test_app_with};
use image::ImageFormat;
use uuid::Uuid;
use vitae_core::{Photo, Profile, StoreBackend};

#[tokio::test]
async fn test_upload_picture() {
    let app = setup_test_app().await;
    let client = app.client();
    create_profile(client, "gernest").await;

    let form = MultipartForm::new().add_part("profile", image_part(jpeg_bytes(), "me.jpg", "image/jpeg"));
    let response = client
        .post(&api_path("/profiles/gernest/picture"))
        .multipart(form)
        .await;
    assert_eq!(response.status_code(), 200);
    let profile: Profile = response.json();
    let picture = profile.picture.expect("picture should be set");

    let response = client.get(&api_path(&format!("/photos/{}", picture))).await;
    assert_eq!(response.status_code(), 200);
    let photo: Photo = response.json();
    assert_eq!(photo.id, picture);
    assert_eq!(photo.uploaded_by, "gernest");

    let response = client
        .get(&api_path(&format!("/photos/{}/data", picture)))
        .await;
    assert_eq!(response.status_code(), 200);
    assert_eq!(response.header("content-type"), "image/jpeg");
    let data = response.as_bytes();
    assert_eq!(data.len() as u64, photo.size);
    assert!(image::load_from_memory_with_format(data, ImageFormat::Jpeg).is_ok());
}

#[tokio::test]
async fn test_picture_kind_comes_from_content() {
    let app = setup_test_app().await;
    let client = app.client();
    create_profile(client, "gernest").await;

    // PNG bytes under a JPEG name and mime type.
    let form = MultipartForm::new().add_part("profile", image_part(png_bytes(), "me.jpg", "image/jpeg"));
    let profile: Profile = client
        .post(&api_path("/profiles/gernest/picture"))
        .multipart(form)
        .await
        .json();

    let picture = profile.picture.unwrap();
    let photo: serde_json::Value = client
        .get(&api_path(&format!("/photos/{}", picture)))
        .await
        .json();
    assert_eq!(photo["type"], "png");
}

#[tokio::test]
async fn test_upload_photos() {
    let app = setup_test_app().await;
    let client = app.client();
    create_profile(client, "gernest").await;

    let form = MultipartForm::new()
        .add_part("photos", image_part(png_bytes(), "a.png", "image/png"))
        .add_part("photos", image_part(jpeg_bytes(), "b.jpg", "image/jpeg"))
        .add_part("photos", image_part(png_bytes(), "c.png", "image/png"));
    let response = client
        .post(&api_path("/profiles/gernest/photos"))
        .multipart(form)
        .await;
    assert_eq!(response.status_code(), 201);
    let body: serde_json::Value = response.json();
    let ids: Vec<Uuid> = serde_json::from_value(body["photos"].clone()).unwrap();
    assert_eq!(ids.len(), 3);

    let profile: Profile = client.get(&api_path("/profiles/gernest")).await.json();
    assert_eq!(profile.photos, ids);

    for id in &ids {
        let response = client.get(&api_path(&format!("/photos/{}/data", id))).await;
        assert_eq!(response.status_code(), 200);
    }
}

#[tokio::test]
async fn test_photos_are_appended() {
    let app = setup_test_app().await;
    let client = app.client();
    create_profile(client, "gernest").await;

    for _ in 0..2 {
        let form = MultipartForm::new().add_part("photos", image_part(png_bytes(), "a.png", "image/png"));
        let response = client
            .post(&api_path("/profiles/gernest/photos"))
            .multipart(form)
            .await;
        assert_eq!(response.status_code(), 201);
    }

    let profile: Profile = client.get(&api_path("/profiles/gernest")).await.json();
    assert_eq!(profile.photos.len(), 2);
    assert_ne!(profile.photos[0], profile.photos[1]);
}

#[tokio::test]
async fn test_bad_files_are_skipped_in_photo_batches() {
    let app = setup_test_app().await;
    let client = app.client();
    create_profile(client, "gernest").await;

    let form = MultipartForm::new()
        .add_part("photos", text_part("notes.txt"))
        .add_part("photos", image_part(jpeg_bytes(), "b.jpg", "image/jpeg"));
    let response = client
        .post(&api_path("/profiles/gernest/photos"))
        .multipart(form)
        .await;
    assert_eq!(response.status_code(), 201);
    let body: serde_json::Value = response.json();
    assert_eq!(body["photos"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_wrong_field_is_missing_file() {
    let app = setup_test_app().await;
    let client = app.client();
    create_profile(client, "gernest").await;

    let form = MultipartForm::new().add_part("avatar", image_part(png_bytes(), "a.png", "image/png"));
    let response = client
        .post(&api_path("/profiles/gernest/picture"))
        .multipart(form)
        .await;
    assert_eq!(response.status_code(), 400);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "MISSING_FILE");

    let profile: Profile = client.get(&api_path("/profiles/gernest")).await.json();
    assert!(profile.picture.is_none());
}

#[tokio::test]
async fn test_text_file_is_unsupported() {
    let app = setup_test_app().await;
    let client = app.client();
    create_profile(client, "gernest").await;

    let form = MultipartForm::new().add_part("photos", text_part("notes.txt"));
    let response = client
        .post(&api_path("/profiles/gernest/photos"))
        .multipart(form)
        .await;
    assert_eq!(response.status_code(), 415);

    let profile: Profile = client.get(&api_path("/profiles/gernest")).await.json();
    assert!(profile.photos.is_empty());
}

#[tokio::test]
async fn test_upload_for_unknown_profile_is_not_found() {
    let app = setup_test_app().await;

    let form = MultipartForm::new().add_part("profile", image_part(png_bytes(), "a.png", "image/png"));
    let response = app
        .client()
        .post(&api_path("/profiles/nobody/picture"))
        .multipart(form)
        .await;
    assert_eq!(response.status_code(), 404);
    assert!(!app.config().profile_db_path("nobody").exists());
}

#[tokio::test]
async fn test_configured_picture_field() {
    let app = setup_test_app_with(StoreBackend::Sqlite, |config| {
        config.picture_field = "avatar".to_string();
    })
    .await;
    let client = app.client();
    create_profile(client, "gernest").await;

    let form = MultipartForm::new().add_part("avatar", image_part(png_bytes(), "a.png", "image/png"));
    let response = client
        .post(&api_path("/profiles/gernest/picture"))
        .multipart(form)
        .await;
    assert_eq!(response.status_code(), 200);
}

#[tokio::test]
async fn test_file_over_limit_is_rejected() {
    let app = setup_test_app_with(StoreBackend::Sqlite, |config| {
        config.max_file_size_bytes = 16;
    })
    .await;
    let client = app.client();
    create_profile(client, "gernest").await;

    let form = MultipartForm::new().add_part("profile", image_part(png_bytes(), "a.png", "image/png"));
    let response = client
        .post(&api_path("/profiles/gernest/picture"))
        .multipart(form)
        .await;
    assert_eq!(response.status_code(), 413);
}

#[tokio::test]
async fn test_unknown_photo_is_not_found() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .get(&api_path(&format!("/photos/{}", Uuid::new_v4())))
        .await;
    assert_eq!(response.status_code(), 404);

    let response = app.client().get(&api_path("/photos/not-a-uuid")).await;
    assert_eq!(response.status_code(), 400);
}

#[tokio::test]
async fn test_filesystem_backend_upload() {
    let app = setup_test_app_with(StoreBackend::Fs, |_| {}).await;
    let client = app.client();
    create_profile(client, "gernest").await;

    let form = MultipartForm::new().add_part("photos", image_part(jpeg_bytes(), "b.jpg", "image/jpeg"));
    let response = client
        .post(&api_path("/profiles/gernest/photos"))
        .multipart(form)
        .await;
    assert_eq!(response.status_code(), 201);
    let body: serde_json::Value = response.json();
    let id = body["photos"][0].as_str().unwrap().to_string();

    let response = client.get(&api_path(&format!("/photos/{}/data", id))).await;
    assert_eq!(response.status_code(), 200);
    assert_eq!(response.header("content-type"), "image/jpeg");
}
