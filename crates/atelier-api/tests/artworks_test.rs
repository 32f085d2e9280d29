//! Artwork upload and browsing integration tests.
//!
//! Run with: `cargo test -p atelier-api --test artworks_test`

mod helpers;

use axum::http::StatusCode;
use helpers::fixtures::{artwork_form, image_part, jpeg_bytes, png_bytes, valid_png_form};
use helpers::{auth, setup_test_app};
use serde_json::Value;

#[tokio::test]
async fn test_upload_artwork_succeeds() {
    let app = setup_test_app();
    let user = auth::member();

    let response = app
        .client()
        .post("/api/artworks")
        .add_header("Authorization", user.bearer())
        .multipart(valid_png_form("Sunset over the bay"))
        .await;

    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(body["success"], true);
    assert!(body.get("warnings").is_none());

    let artwork = &body["artwork"];
    assert_eq!(artwork["title"], "Sunset over the bay");
    assert_eq!(artwork["category"], "painting");
    assert_eq!(artwork["userId"], user.user_id.to_string());
    assert_eq!(artwork["width"], 64);
    assert_eq!(artwork["height"], 48);
    assert_eq!(artwork["originalFilename"], "sunset.png");
    assert!(artwork.get("storageKey").is_none());

    let artwork_id = artwork["id"].as_str().unwrap();
    let expected_key = format!("artworks/{}/{}.png", user.user_id, artwork_id);
    assert_eq!(app.storage.keys(), vec![expected_key.clone()]);
    assert_eq!(
        artwork["imageUrl"],
        format!("{}/{}", helpers::TEST_MEDIA_BASE_URL, expected_key)
    );
    assert_eq!(app.store.artwork_count(), 1);
}

#[tokio::test]
async fn test_upload_requires_authentication() {
    let app = setup_test_app();

    let response = app
        .client()
        .post("/api/artworks")
        .multipart(valid_png_form("No token"))
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert_eq!(body["code"], "UNAUTHORIZED");
    assert!(app.storage.is_empty());
    assert_eq!(app.store.artwork_count(), 0);
}

#[tokio::test]
async fn test_upload_rejects_forged_token() {
    let app = setup_test_app();

    let response = app
        .client()
        .post("/api/artworks")
        .add_header("Authorization", format!("Bearer {}", auth::forged_token()))
        .multipart(valid_png_form("Forged"))
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    assert!(app.storage.is_empty());
}

#[tokio::test]
async fn test_upload_accepts_session_cookie() {
    let app = setup_test_app();
    let user = auth::member();

    let response = app
        .client()
        .post("/api/artworks")
        .add_header("Cookie", format!("session={}", user.token))
        .multipart(valid_png_form("Cookie auth"))
        .await;

    response.assert_status(StatusCode::CREATED);
}

#[tokio::test]
async fn test_mime_extension_mismatch_stores_nothing() {
    let app = setup_test_app();
    let user = auth::member();

    // PNG bytes declared as JPEG
    let form = artwork_form(
        "Mismatch",
        "",
        "painting",
        image_part(png_bytes(64, 48), "sunset.png", "image/jpeg"),
    );

    let response = app
        .client()
        .post("/api/artworks")
        .add_header("Authorization", user.bearer())
        .multipart(form)
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["code"], "UPLOAD_BLOCKED");
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("does not match file extension"));
    assert!(app.storage.is_empty());
    assert_eq!(app.store.artwork_count(), 0);
}

#[tokio::test]
async fn test_executable_upload_blocked() {
    let app = setup_test_app();
    let user = auth::member();

    let form = artwork_form(
        "Totally a painting",
        "",
        "painting",
        image_part(vec![0x4d; 2048], "payload.exe", "application/octet-stream"),
    );

    let response = app
        .client()
        .post("/api/artworks")
        .add_header("Authorization", user.bearer())
        .multipart(form)
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["code"], "UPLOAD_BLOCKED");
    assert!(app.storage.is_empty());
}

#[tokio::test]
async fn test_undecodable_image_blocked() {
    let app = setup_test_app();
    let user = auth::member();

    let form = artwork_form(
        "Garbage",
        "",
        "photography",
        image_part(vec![0xAB; 4096], "photo.png", "image/png"),
    );

    let response = app
        .client()
        .post("/api/artworks")
        .add_header("Authorization", user.bearer())
        .multipart(form)
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert!(app.storage.is_empty());
    assert_eq!(app.store.artwork_count(), 0);
}

#[tokio::test]
async fn test_jpeg_upload_is_stored_stripped() {
    let app = setup_test_app();
    let user = auth::member();

    let form = artwork_form(
        "Harbour",
        "Taken at dawn",
        "photography",
        image_part(jpeg_bytes(80, 60), "harbour.jpg", "image/jpeg"),
    );

    let response = app
        .client()
        .post("/api/artworks")
        .add_header("Authorization", user.bearer())
        .multipart(form)
        .await;

    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(body["artwork"]["contentType"], "image/jpeg");

    let keys = app.storage.keys();
    assert_eq!(keys.len(), 1);
    assert!(keys[0].ends_with(".jpg"));
    let stored = app.storage.get_file(&keys[0]).unwrap();
    assert_eq!(&stored.data[..2], &[0xFF, 0xD8]);
}

#[tokio::test]
async fn test_multiple_extensions_returns_warning() {
    let app = setup_test_app();
    let user = auth::member();

    let form = artwork_form(
        "Double",
        "",
        "digital-art",
        image_part(png_bytes(32, 32), "render.final.png", "image/png"),
    );

    let response = app
        .client()
        .post("/api/artworks")
        .add_header("Authorization", user.bearer())
        .multipart(form)
        .await;

    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(
        body["warnings"],
        serde_json::json!(["Multiple file extensions detected"])
    );
}

#[tokio::test]
async fn test_database_failure_removes_uploaded_blob() {
    let app = setup_test_app();
    let user = auth::member();
    app.store.set_fail_inserts(true);

    let response = app
        .client()
        .post("/api/artworks")
        .add_header("Authorization", user.bearer())
        .multipart(valid_png_form("Doomed"))
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert_eq!(body["code"], "DATABASE_ERROR");
    assert_eq!(body["error"], "Failed to save artwork");
    assert!(app.storage.is_empty());
    assert_eq!(app.store.artwork_count(), 0);
}

#[tokio::test]
async fn test_database_failure_with_failing_cleanup_still_returns_500() {
    let app = setup_test_app();
    let user = auth::member();
    app.store.set_fail_inserts(true);
    app.storage.set_fail_deletes(true);

    let response = app
        .client()
        .post("/api/artworks")
        .add_header("Authorization", user.bearer())
        .multipart(valid_png_form("Orphan"))
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    // Cleanup failure is logged only; the orphaned object stays behind.
    assert_eq!(app.storage.len(), 1);
}

#[tokio::test]
async fn test_storage_failure_returns_500() {
    let app = setup_test_app();
    let user = auth::member();
    app.storage.set_fail_uploads(true);

    let response = app
        .client()
        .post("/api/artworks")
        .add_header("Authorization", user.bearer())
        .multipart(valid_png_form("No bucket"))
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert_eq!(body["code"], "STORAGE_ERROR");
    assert_eq!(app.store.artwork_count(), 0);
}

#[tokio::test]
async fn test_over_stripped_title_rejected() {
    let app = setup_test_app();
    let user = auth::member();

    let form = artwork_form(
        "<script>alert('x')</script>",
        "",
        "painting",
        image_part(png_bytes(64, 48), "sunset.png", "image/png"),
    );

    let response = app
        .client()
        .post("/api/artworks")
        .add_header("Authorization", user.bearer())
        .multipart(form)
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["code"], "INVALID_INPUT");
    assert!(app.storage.is_empty());
}

#[tokio::test]
async fn test_oversized_text_field_rejected_before_sanitizing() {
    let app = setup_test_app();
    let user = auth::member();

    let depth = 20_000;
    let title = format!("{}<script>{}", "<scr".repeat(depth), "ipt>".repeat(depth));
    let form = artwork_form(
        &title,
        "",
        "painting",
        image_part(png_bytes(64, 48), "sunset.png", "image/png"),
    );

    let response = app
        .client()
        .post("/api/artworks")
        .add_header("Authorization", user.bearer())
        .multipart(form)
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["code"], "INVALID_INPUT");
    assert!(body["error"].as_str().unwrap().contains("title"));
    assert!(app.storage.is_empty());
}

#[tokio::test]
async fn test_spliced_script_title_rejected() {
    let app = setup_test_app();
    let user = auth::member();

    let depth = 1_000;
    let title = format!("{}<script>{}", "<scr".repeat(depth), "ipt>".repeat(depth));
    let form = artwork_form(
        &title,
        "",
        "painting",
        image_part(png_bytes(64, 48), "sunset.png", "image/png"),
    );

    let response = app
        .client()
        .post("/api/artworks")
        .add_header("Authorization", user.bearer())
        .multipart(form)
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["code"], "INVALID_INPUT");
    assert!(app.storage.is_empty());
}

#[tokio::test]
async fn test_title_with_parenthesised_prose_kept() {
    let app = setup_test_app();
    let user = auth::member();

    let response = app
        .client()
        .post("/api/artworks")
        .add_header("Authorization", user.bearer())
        .multipart(valid_png_form("Self-expression (study)"))
        .await;

    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(body["artwork"]["title"], "Self-expression (study)");
}

#[tokio::test]
async fn test_content_type_parameters_not_persisted() {
    let app = setup_test_app();
    let user = auth::member();

    let declared = format!("image/png; name={}", "n".repeat(200));
    let form = artwork_form(
        "Harbour at noon",
        "",
        "photography",
        image_part(png_bytes(64, 48), "harbour.png", &declared),
    );

    let response = app
        .client()
        .post("/api/artworks")
        .add_header("Authorization", user.bearer())
        .multipart(form)
        .await;

    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(body["artwork"]["contentType"], "image/png");

    let key = &app.storage.keys()[0];
    let stored = app.storage.get_file(key).unwrap();
    assert_eq!(stored.content_type, "image/png");
}

#[tokio::test]
async fn test_title_markup_is_neutralized() {
    let app = setup_test_app();
    let user = auth::member();

    let response = app
        .client()
        .post("/api/artworks")
        .add_header("Authorization", user.bearer())
        .multipart(valid_png_form("Blue <b>Period</b> study"))
        .await;

    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    let title = body["artwork"]["title"].as_str().unwrap();
    assert!(!title.contains('<'));
    assert!(title.contains("Period"));
}

#[tokio::test]
async fn test_invalid_category_rejected() {
    let app = setup_test_app();
    let user = auth::member();

    let form = artwork_form(
        "Wrong shelf",
        "",
        "Painting",
        image_part(png_bytes(64, 48), "sunset.png", "image/png"),
    );

    let response = app
        .client()
        .post("/api/artworks")
        .add_header("Authorization", user.bearer())
        .multipart(form)
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["code"], "INVALID_INPUT");
    assert!(body["error"].as_str().unwrap().contains("Invalid category"));
    assert!(app.storage.is_empty());
}

#[tokio::test]
async fn test_missing_image_rejected() {
    let app = setup_test_app();
    let user = auth::member();

    let form = axum_test::multipart::MultipartForm::new()
        .add_text("title", "Only text")
        .add_text("category", "drawing");

    let response = app
        .client()
        .post("/api/artworks")
        .add_header("Authorization", user.bearer())
        .multipart(form)
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "Image file is required");
}

#[tokio::test]
async fn test_list_artworks_with_page_numbers() {
    let app = setup_test_app();
    let user = auth::member();

    for i in 0..3 {
        app.client()
            .post("/api/artworks")
            .add_header("Authorization", user.bearer())
            .multipart(valid_png_form(&format!("Study {}", i)))
            .await
            .assert_status(StatusCode::CREATED);
    }

    let response = app
        .client()
        .get("/api/artworks")
        .add_query_param("page", 2)
        .add_query_param("per_page", 1)
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["total"], 3);
    assert_eq!(body["totalPages"], 3);
    assert_eq!(body["page"], 2);
    assert_eq!(body["perPage"], 1);
    assert_eq!(body["artworks"].as_array().unwrap().len(), 1);
    assert_eq!(body["pageNumbers"], serde_json::json!([1, 2, 3]));
}

#[tokio::test]
async fn test_list_artworks_filters_by_category() {
    let app = setup_test_app();
    let user = auth::member();

    app.client()
        .post("/api/artworks")
        .add_header("Authorization", user.bearer())
        .multipart(valid_png_form("A painting"))
        .await
        .assert_status(StatusCode::CREATED);

    let response = app
        .client()
        .get("/api/artworks")
        .add_query_param("category", "sculpture")
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["total"], 0);
    assert_eq!(body["pageNumbers"], serde_json::json!([]));
}

#[tokio::test]
async fn test_get_unknown_artwork_is_404() {
    let app = setup_test_app();

    let response = app
        .client()
        .get(&format!("/api/artworks/{}", uuid::Uuid::new_v4()))
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_artwork_owner_only() {
    let app = setup_test_app();
    let owner = auth::member();
    let stranger = auth::member();
    let admin = auth::admin();

    let created: Value = app
        .client()
        .post("/api/artworks")
        .add_header("Authorization", owner.bearer())
        .multipart(valid_png_form("Mine"))
        .await
        .json();
    let id = created["artwork"]["id"].as_str().unwrap().to_string();
    let path = format!("/api/artworks/{}", id);

    app.client()
        .delete(&path)
        .add_header("Authorization", stranger.bearer())
        .await
        .assert_status(StatusCode::FORBIDDEN);
    assert_eq!(app.store.artwork_count(), 1);

    app.client()
        .delete(&path)
        .add_header("Authorization", admin.bearer())
        .await
        .assert_status(StatusCode::NO_CONTENT);

    assert_eq!(app.store.artwork_count(), 0);
    assert!(app.storage.is_empty());

    app.client()
        .get(&path)
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_uploaded_image_is_served_from_media_route() {
    let app = setup_test_app();
    let user = auth::member();

    app.client()
        .post("/api/artworks")
        .add_header("Authorization", user.bearer())
        .multipart(valid_png_form("Served"))
        .await
        .assert_status(StatusCode::CREATED);

    let key = app.storage.keys().remove(0);
    let response = app.client().get(&format!("/media/{}", key)).await;

    response.assert_status_ok();
    assert_eq!(response.header("content-type"), "image/png");
    assert_eq!(response.header("x-content-type-options"), "nosniff");
}
