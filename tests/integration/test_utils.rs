//! Test utilities for integration tests.
//!
//! Helpers for building a served directory tree with real image files and
//! driving the router with in-process requests.

use std::io::Cursor;
use std::path::Path;

use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use image::{GrayImage, Luma};
use tempfile::TempDir;
use tower::ServiceExt;

use thumbgrid::fs::DEFAULT_CACHE_DIR_NAME;
use thumbgrid::{create_router, PathResolver, RouterConfig, ThumbnailCache};

// =============================================================================
// Fixture Tree
// =============================================================================

/// Write a PNG of the given dimensions at `path`.
pub fn write_test_png(path: &Path, width: u32, height: u32) {
    let img = GrayImage::from_fn(width, height, |x, y| Luma([((x + y) % 256) as u8]));
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, image::ImageFormat::Png).unwrap();
    std::fs::write(path, buf.into_inner()).unwrap();
}

/// Build a served root with a small representative tree:
///
/// ```text
/// pic.png
/// notes.txt
/// photos/
///   a b.png      (name that needs percent-encoding)
///   cat.png
/// nested/deep/
///   img.png
/// ```
pub fn make_image_tree() -> TempDir {
    let dir = TempDir::new().unwrap();
    write_test_png(&dir.path().join("pic.png"), 100, 100);
    std::fs::write(dir.path().join("notes.txt"), b"plain text content").unwrap();

    std::fs::create_dir(dir.path().join("photos")).unwrap();
    write_test_png(&dir.path().join("photos/a b.png"), 60, 40);
    write_test_png(&dir.path().join("photos/cat.png"), 80, 80);

    std::fs::create_dir_all(dir.path().join("nested/deep")).unwrap();
    write_test_png(&dir.path().join("nested/deep/img.png"), 50, 50);

    dir
}

// =============================================================================
// Router Construction
// =============================================================================

/// Build a router serving `root` with request tracing disabled.
pub fn build_router(root: &Path) -> Router {
    let resolver = PathResolver::new(root, DEFAULT_CACHE_DIR_NAME).unwrap();
    let thumbs = ThumbnailCache::new(resolver);
    create_router(thumbs, RouterConfig::new().with_tracing(false))
}

// =============================================================================
// Request Helpers
// =============================================================================

/// Send a GET request to the router.
pub async fn get(router: Router, uri: &str) -> Response<Body> {
    router
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

/// Send a POST request to the router.
pub async fn post(router: Router, uri: &str) -> Response<Body> {
    router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap()
}

/// Collect a response body into bytes.
pub async fn body_bytes(response: Response<Body>) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

/// Collect a response body into a UTF-8 string.
pub async fn body_string(response: Response<Body>) -> String {
    String::from_utf8(body_bytes(response).await.to_vec()).unwrap()
}

/// Assert a JSON error body with the given error type.
pub async fn assert_json_error(response: Response<Body>, status: StatusCode, error_type: &str) {
    assert_eq!(response.status(), status);
    let body = body_bytes(response).await;
    let error: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(error["error"], error_type);
}

/// Check for JPEG SOI and EOI markers.
pub fn is_valid_jpeg(data: &[u8]) -> bool {
    data.len() >= 4
        && data[0] == 0xFF
        && data[1] == 0xD8
        && data[data.len() - 2] == 0xFF
        && data[data.len() - 1] == 0xD9
}
