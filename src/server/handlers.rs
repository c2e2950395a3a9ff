//! HTTP request handlers.
//!
//! # Endpoints
//!
//! - `GET /` and `GET /{*path}` - browse: directory listing, raw file, or
//!   thumbnail when the `thumb` query parameter is present
//! - `GET /health` - health check
//! - `POST /cache/clear` - erase the thumbnail cache

use std::sync::Arc;
use std::time::SystemTime;

use axum::{
    extract::{Path as UrlPath, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use crate::error::{ResolveError, ThumbError};
use crate::fs::{self, ResolvedPath};
use crate::server::page;
use crate::thumb::ThumbnailCache;

// =============================================================================
// Application State
// =============================================================================

/// Shared application state, passed to handlers via Axum's State extractor.
#[derive(Clone)]
pub struct AppState {
    /// The thumbnail cache facade.
    pub thumbs: Arc<ThumbnailCache>,

    /// Edge size used for the grid's thumbnail URLs.
    pub thumb_size: u32,

    /// Cache-Control max-age for thumbnails, in seconds.
    pub cache_max_age: u32,
}

impl AppState {
    /// Create application state around a thumbnail cache.
    pub fn new(thumbs: ThumbnailCache, thumb_size: u32, cache_max_age: u32) -> Self {
        Self {
            thumbs: Arc::new(thumbs),
            thumb_size,
            cache_max_age,
        }
    }
}

// =============================================================================
// Request Parameters
// =============================================================================

/// Query parameters for browse requests.
#[derive(Debug, Deserialize)]
pub struct BrowseQueryParams {
    /// Requested thumbnail edge size in pixels. Absent = serve the raw file.
    #[serde(default)]
    pub thumb: Option<u32>,
}

// =============================================================================
// Response Types
// =============================================================================

/// JSON error response returned for all error conditions.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error type identifier (e.g., "not_found", "invalid_size")
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// HTTP status code (included for convenience)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

impl ErrorResponse {
    /// Create a new error response with status code.
    pub fn with_status(
        error: impl Into<String>,
        message: impl Into<String>,
        status: StatusCode,
    ) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            status: Some(status.as_u16()),
        }
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// Service version
    pub version: String,
}

/// Response from the cache clear endpoint.
#[derive(Debug, Serialize)]
pub struct CacheClearResponse {
    /// Always "cleared" on success.
    pub status: String,
}

// =============================================================================
// Error Mapping
// =============================================================================

/// Convert ThumbError to HTTP response.
///
/// Escape attempts map to 404, deliberately indistinguishable from a missing
/// path, so probing reveals nothing about what exists outside the root.
impl IntoResponse for ThumbError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match &self {
            ThumbError::Resolve(ResolveError::PathEscape { path }) => (
                StatusCode::NOT_FOUND,
                "not_found",
                format!("Not found: {}", path),
            ),
            ThumbError::Resolve(ResolveError::NotFound { path }) => (
                StatusCode::NOT_FOUND,
                "not_found",
                format!("Not found: {}", path),
            ),
            ThumbError::InvalidSize { size, min, max } => (
                StatusCode::BAD_REQUEST,
                "invalid_size",
                format!(
                    "Invalid thumbnail size: {} (valid range: {}-{})",
                    size, min, max
                ),
            ),
            ThumbError::NotAnImage { path } => (
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                "not_an_image",
                format!("Not a thumbnailable image: {}", path),
            ),
            ThumbError::Encode(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "encode_error",
                e.to_string(),
            ),
            ThumbError::SourceRead { path, source } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "io_error",
                format!("Failed to read {}: {}", path.display(), source),
            ),
            ThumbError::Cache { source } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "cache_error",
                format!("Cache operation failed: {}", source),
            ),
        };

        // Log based on severity. Escape attempts are logged distinctly even
        // though the response is a plain 404.
        if matches!(self, ThumbError::Resolve(ResolveError::PathEscape { .. })) {
            warn!(
                error_type = "path_escape",
                status = status.as_u16(),
                "Rejected path escape attempt: {}",
                message
            );
        } else if status.is_server_error() {
            error!(
                error_type = error_type,
                status = status.as_u16(),
                "Server error: {}",
                message
            );
        } else if status == StatusCode::NOT_FOUND {
            debug!(
                error_type = error_type,
                status = status.as_u16(),
                "Resource not found: {}",
                message
            );
        } else {
            warn!(
                error_type = error_type,
                status = status.as_u16(),
                "Client error: {}",
                message
            );
        }

        let error_response = ErrorResponse::with_status(error_type, message, status);
        (status, Json(error_response)).into_response()
    }
}

/// Wrapper for handler errors to implement IntoResponse.
pub struct HandlerError(pub ThumbError);

impl IntoResponse for HandlerError {
    fn into_response(self) -> Response {
        self.0.into_response()
    }
}

impl<E: Into<ThumbError>> From<E> for HandlerError {
    fn from(err: E) -> Self {
        HandlerError(err.into())
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Handle browse requests for the served root itself.
///
/// # Endpoint
///
/// `GET /`
pub async fn root_handler(
    State(state): State<AppState>,
    Query(query): Query<BrowseQueryParams>,
    headers: HeaderMap,
) -> Result<Response, HandlerError> {
    browse(state, String::new(), query, headers).await
}

/// Handle browse requests.
///
/// # Endpoint
///
/// `GET /{*path}` with optional `?thumb=SIZE`
///
/// # Response
///
/// - directory: `200 OK` HTML grid listing
/// - file, `thumb` present: `200 OK` JPEG thumbnail with
///   `X-Thumb-Cache-Hit: true|false`
/// - file, no `thumb`: `200 OK` raw bytes with a guessed `Content-Type`,
///   or `304 Not Modified` against `If-Modified-Since`
/// - `400 Bad Request`: thumbnail size out of bounds
/// - `404 Not Found`: missing path, or anything that tried to escape
/// - `415 Unsupported Media Type`: `thumb` requested for a non-image
/// - `500 Internal Server Error`: encode or I/O failure
pub async fn browse_handler(
    State(state): State<AppState>,
    UrlPath(path): UrlPath<String>,
    Query(query): Query<BrowseQueryParams>,
    headers: HeaderMap,
) -> Result<Response, HandlerError> {
    browse(state, path, query, headers).await
}

async fn browse(
    state: AppState,
    raw_path: String,
    query: BrowseQueryParams,
    headers: HeaderMap,
) -> Result<Response, HandlerError> {
    let resolved = state.thumbs.resolver().resolve(&raw_path).await.map_err(ThumbError::from)?;

    if resolved.is_dir() {
        return serve_listing(&state, &resolved).await;
    }

    if let Some(size) = query.thumb {
        return serve_thumbnail(&state, &raw_path, size).await;
    }

    serve_raw_file(&resolved, &headers).await
}

/// Render a directory listing page.
async fn serve_listing(state: &AppState, resolved: &ResolvedPath) -> Result<Response, HandlerError> {
    let cache_dir_name = state.thumbs.resolver().cache_dir_name().to_string();
    let entries = fs::list_dir(resolved, &cache_dir_name)
        .await
        .map_err(|e| ThumbError::SourceRead {
            path: resolved.abs().to_path_buf(),
            source: e,
        })?;

    let html = page::render_listing(resolved.rel(), &entries, state.thumb_size);
    Ok(Html(html).into_response())
}

/// Serve a cached-or-encoded thumbnail.
async fn serve_thumbnail(
    state: &AppState,
    raw_path: &str,
    size: u32,
) -> Result<Response, HandlerError> {
    let response = state.thumbs.get_or_create(raw_path, size).await?;

    let http_response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "image/jpeg")
        .header(
            header::CACHE_CONTROL,
            format!("public, max-age={}", state.cache_max_age),
        )
        .header("X-Thumb-Cache-Hit", response.cache_hit.to_string())
        .body(axum::body::Body::from(response.data))
        .map_err(|e| ThumbError::SourceRead {
            path: raw_path.into(),
            source: std::io::Error::other(e),
        })?;

    Ok(http_response)
}

/// Serve a file's raw bytes, honoring If-Modified-Since.
async fn serve_raw_file(resolved: &ResolvedPath, headers: &HeaderMap) -> Result<Response, HandlerError> {
    let meta = tokio::fs::metadata(resolved.abs()).await.map_err(|e| map_file_io(resolved, e))?;
    let modified = meta.modified().ok();

    // Conditional GET: compare whole seconds, as HTTP dates carry no finer
    // resolution.
    if let (Some(modified), Some(since)) = (modified, if_modified_since(headers)) {
        if !is_newer(modified, since) {
            return Ok(StatusCode::NOT_MODIFIED.into_response());
        }
    }

    let data = tokio::fs::read(resolved.abs())
        .await
        .map_err(|e| map_file_io(resolved, e))?;

    let content_type = mime_guess::from_path(resolved.abs()).first_or_octet_stream();

    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type.as_ref());
    if let Some(modified) = modified {
        builder = builder.header(header::LAST_MODIFIED, httpdate::fmt_http_date(modified));
    }

    builder
        .body(axum::body::Body::from(data))
        .map_err(|e| {
            HandlerError(ThumbError::SourceRead {
                path: resolved.abs().to_path_buf(),
                source: std::io::Error::other(e),
            })
        })
}

fn map_file_io(resolved: &ResolvedPath, e: std::io::Error) -> HandlerError {
    if e.kind() == std::io::ErrorKind::NotFound {
        HandlerError(ThumbError::Resolve(ResolveError::NotFound {
            path: resolved.rel().display().to_string(),
        }))
    } else {
        HandlerError(ThumbError::SourceRead {
            path: resolved.abs().to_path_buf(),
            source: e,
        })
    }
}

fn if_modified_since(headers: &HeaderMap) -> Option<SystemTime> {
    headers
        .get(header::IF_MODIFIED_SINCE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| httpdate::parse_http_date(v).ok())
}

/// True when `modified` is strictly newer than `since`, at second resolution.
fn is_newer(modified: SystemTime, since: SystemTime) -> bool {
    match modified.duration_since(since) {
        Ok(delta) => delta.as_secs() >= 1,
        Err(_) => false,
    }
}

/// Handle health check requests.
///
/// # Endpoint
///
/// `GET /health`
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Handle cache clear requests.
///
/// # Endpoint
///
/// `POST /cache/clear`
///
/// Removes the entire cache directory; subsequent thumbnail requests
/// re-encode from source.
pub async fn clear_cache_handler(
    State(state): State<AppState>,
) -> Result<Json<CacheClearResponse>, HandlerError> {
    state.thumbs.clear_all().await?;
    Ok(Json(CacheClearResponse {
        status: "cleared".to_string(),
    }))
}

// =============================================================================
// Tests
// =============================================================================
