//! API integration tests for browsing, raw files, and thumbnails.
//!
//! Tests verify:
//! - Directory listing HTML (root and subdirectories)
//! - Raw file serving with guessed content types and conditional GET
//! - Thumbnail responses, headers, and error cases
//! - HTTP response codes for every error in the taxonomy

use axum::http::StatusCode;

use super::test_utils::{
    assert_json_error, body_bytes, body_string, build_router, get, is_valid_jpeg, make_image_tree,
    post,
};

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let root = make_image_tree();
    let router = build_router(root.path());

    let response = get(router, "/health").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_bytes(response).await;
    let health: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(health["status"], "healthy");
}

// =============================================================================
// Directory Listings
// =============================================================================

#[tokio::test]
async fn test_root_listing() {
    let root = make_image_tree();
    let router = build_router(root.path());

    let response = get(router, "/").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response
        .headers()
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap()
        .starts_with("text/html"));

    let html = body_string(response).await;
    // Directories first, then images as thumbnail tiles, then plain files.
    assert!(html.contains("photos"));
    assert!(html.contains("nested"));
    assert!(html.contains("pic.png?thumb="));
    assert!(html.contains("notes.txt"));
    // Root listing has no parent link.
    assert!(!html.contains("^ UP"));
}

#[tokio::test]
async fn test_subdirectory_listing_has_parent_link() {
    let root = make_image_tree();
    let router = build_router(root.path());

    let response = get(router, "/nested/deep").await;
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_string(response).await;
    assert!(html.contains("img.png?thumb="));
    assert!(html.contains("/nested\""));
}

#[tokio::test]
async fn test_listing_hides_cache_directory() {
    let root = make_image_tree();
    let router = build_router(root.path());

    // Populate the cache so .thumbgrid exists on disk.
    let response = get(router.clone(), "/pic.png?thumb=64").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(root.path().join(".thumbgrid").is_dir());

    let html = body_string(get(router, "/").await).await;
    assert!(!html.contains(".thumbgrid"));
}

#[tokio::test]
async fn test_listing_escapes_html_in_names() {
    let root = make_image_tree();
    std::fs::create_dir(root.path().join("<b>bold</b>")).unwrap();
    let router = build_router(root.path());

    let html = body_string(get(router, "/").await).await;
    assert!(html.contains("&lt;b&gt;bold&lt;/b&gt;"));
    assert!(!html.contains("<b>bold</b>"));
}

// =============================================================================
// Raw File Serving
// =============================================================================

#[tokio::test]
async fn test_raw_file_content_type() {
    let root = make_image_tree();
    let router = build_router(root.path());

    let response = get(router.clone(), "/notes.txt").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response
        .headers()
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap()
        .starts_with("text/plain"));
    assert!(response.headers().contains_key("last-modified"));
    assert_eq!(body_bytes(response).await.as_ref(), b"plain text content");

    // Without ?thumb, an image is served verbatim as PNG.
    let response = get(router, "/pic.png").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("content-type").unwrap(),
        "image/png"
    );
}

#[tokio::test]
async fn test_conditional_get_returns_not_modified() {
    let root = make_image_tree();
    let router = build_router(root.path());

    let response = get(router.clone(), "/notes.txt").await;
    let last_modified = response
        .headers()
        .get("last-modified")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();

    let request = axum::http::Request::builder()
        .uri("/notes.txt")
        .header("if-modified-since", &last_modified)
        .body(axum::body::Body::empty())
        .unwrap();
    let response = tower::ServiceExt::oneshot(router, request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_MODIFIED);
}

// =============================================================================
// Thumbnails
// =============================================================================

#[tokio::test]
async fn test_thumbnail_retrieval_success() {
    let root = make_image_tree();
    let router = build_router(root.path());

    let response = get(router, "/pic.png?thumb=64").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("content-type").unwrap(),
        "image/jpeg"
    );
    assert!(response.headers().contains_key("cache-control"));
    assert_eq!(response.headers().get("x-thumb-cache-hit").unwrap(), "false");

    let body = body_bytes(response).await;
    assert!(is_valid_jpeg(&body), "Response should be a valid JPEG");
}

#[tokio::test]
async fn test_thumbnail_cache_hit_header() {
    let root = make_image_tree();
    let router = build_router(root.path());

    let response = get(router.clone(), "/pic.png?thumb=64").await;
    assert_eq!(response.headers().get("x-thumb-cache-hit").unwrap(), "false");

    let response = get(router, "/pic.png?thumb=64").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers().get("x-thumb-cache-hit").unwrap(), "true");
}

#[tokio::test]
async fn test_thumbnail_invalid_size_rejected() {
    let root = make_image_tree();
    let router = build_router(root.path());

    let response = get(router.clone(), "/pic.png?thumb=0").await;
    assert_json_error(response, StatusCode::BAD_REQUEST, "invalid_size").await;

    let response = get(router, "/pic.png?thumb=100000").await;
    assert_json_error(response, StatusCode::BAD_REQUEST, "invalid_size").await;
}

#[tokio::test]
async fn test_thumbnail_of_non_image_rejected() {
    let root = make_image_tree();
    let router = build_router(root.path());

    let response = get(router, "/notes.txt?thumb=64").await;
    assert_json_error(response, StatusCode::UNSUPPORTED_MEDIA_TYPE, "not_an_image").await;
}

#[tokio::test]
async fn test_thumbnail_of_corrupt_image_is_server_error() {
    let root = make_image_tree();
    std::fs::write(root.path().join("fake.png"), b"not actually a png").unwrap();
    let router = build_router(root.path());

    let response = get(router, "/fake.png?thumb=64").await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

// =============================================================================
// Missing Paths
// =============================================================================

#[tokio::test]
async fn test_missing_path_returns_not_found() {
    let root = make_image_tree();
    let router = build_router(root.path());

    let response = get(router.clone(), "/no/such/file.png").await;
    assert_json_error(response, StatusCode::NOT_FOUND, "not_found").await;

    let response = get(router, "/missing.png?thumb=64").await;
    assert_json_error(response, StatusCode::NOT_FOUND, "not_found").await;
}

// =============================================================================
// Cache Clearing
// =============================================================================

#[tokio::test]
async fn test_clear_cache_endpoint() {
    let root = make_image_tree();
    let router = build_router(root.path());

    get(router.clone(), "/pic.png?thumb=64").await;
    assert!(root.path().join(".thumbgrid").is_dir());

    let response = post(router.clone(), "/cache/clear").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_bytes(response).await;
    let cleared: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(cleared["status"], "cleared");
    assert!(!root.path().join(".thumbgrid").exists());

    // The next thumbnail request is a miss again.
    let response = get(router, "/pic.png?thumb=64").await;
    assert_eq!(response.headers().get("x-thumb-cache-hit").unwrap(), "false");
}

#[tokio::test]
async fn test_clear_cache_when_empty_succeeds() {
    let root = make_image_tree();
    let router = build_router(root.path());

    let response = post(router, "/cache/clear").await;
    assert_eq!(response.status(), StatusCode::OK);
}
