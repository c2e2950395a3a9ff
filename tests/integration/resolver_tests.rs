//! Path resolution tests through the HTTP layer.
//!
//! Escape attempts of every flavor must come back as 404, indistinguishable
//! from a genuinely missing path.

use axum::http::StatusCode;

use super::test_utils::{assert_json_error, build_router, get, make_image_tree};

// =============================================================================
// Escape Attempts
// =============================================================================

#[tokio::test]
async fn test_dotdot_escape_rejected() {
    let root = make_image_tree();
    let router = build_router(root.path());

    let response = get(router.clone(), "/../etc/passwd").await;
    assert_json_error(response, StatusCode::NOT_FOUND, "not_found").await;

    // Traversal buried mid-path is rejected even when the prefix exists.
    let response = get(router, "/photos/../../etc/passwd").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_percent_encoded_dotdot_rejected() {
    let root = make_image_tree();
    let router = build_router(root.path());

    // The path extractor decodes %2e%2e back to ".." before resolution.
    let response = get(router, "/%2e%2e/etc/passwd").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_home_and_hidden_component_rejected() {
    let root = make_image_tree();
    let router = build_router(root.path());

    let response = get(router.clone(), "/~root/secret").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // The cache directory itself is not browsable.
    get(router.clone(), "/pic.png?thumb=64").await;
    let response = get(router, "/.thumbgrid/pic.png.64.jpg").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[cfg(unix)]
#[tokio::test]
async fn test_symlink_escape_rejected() {
    let root = make_image_tree();
    let outside = tempfile::TempDir::new().unwrap();
    std::fs::write(outside.path().join("secret.txt"), b"outside data").unwrap();
    std::os::unix::fs::symlink(outside.path().join("secret.txt"), root.path().join("link.txt"))
        .unwrap();

    let router = build_router(root.path());
    let response = get(router, "/link.txt").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[cfg(unix)]
#[tokio::test]
async fn test_symlink_within_root_allowed() {
    let root = make_image_tree();
    std::os::unix::fs::symlink(root.path().join("notes.txt"), root.path().join("alias.txt"))
        .unwrap();

    let router = build_router(root.path());
    let response = get(router, "/alias.txt").await;
    assert_eq!(response.status(), StatusCode::OK);
}

// =============================================================================
// Encoding and Normalization
// =============================================================================

#[tokio::test]
async fn test_percent_encoded_names_resolve() {
    let root = make_image_tree();
    let router = build_router(root.path());

    let response = get(router.clone(), "/photos/a%20b.png").await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = get(router, "/photos/a%20b.png?thumb=64").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("content-type").unwrap(),
        "image/jpeg"
    );
}

#[tokio::test]
async fn test_empty_path_component_rejected() {
    let root = make_image_tree();
    let router = build_router(root.path());

    // "//" inside the path is not normalized away; it reads as an empty
    // component and is refused like any other escape.
    let response = get(router, "/photos//cat.png").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_trailing_slash_on_directory() {
    let root = make_image_tree();
    let router = build_router(root.path());

    let response = get(router, "/photos/").await;
    assert_eq!(response.status(), StatusCode::OK);
}
