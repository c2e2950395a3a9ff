//! Route definitions and router configuration.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::server::handlers::{
    browse_handler, clear_cache_handler, health_handler, root_handler, AppState,
};
use crate::thumb::ThumbnailCache;

/// Configuration for the HTTP router.
#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// Thumbnail edge size used by the listing grid.
    pub thumb_size: u32,

    /// Cache-Control max-age for thumbnail responses, in seconds.
    pub cache_max_age: u32,

    /// Enable request tracing middleware.
    pub enable_tracing: bool,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            thumb_size: 256,
            cache_max_age: 3600,
            enable_tracing: true,
        }
    }
}

impl RouterConfig {
    /// Create a new router configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the grid thumbnail size.
    pub fn with_thumb_size(mut self, size: u32) -> Self {
        self.thumb_size = size;
        self
    }

    /// Set the thumbnail Cache-Control max-age in seconds.
    pub fn with_cache_max_age(mut self, seconds: u32) -> Self {
        self.cache_max_age = seconds;
        self
    }

    /// Enable or disable request tracing.
    pub fn with_tracing(mut self, enable: bool) -> Self {
        self.enable_tracing = enable;
        self
    }
}

/// Create the application router.
///
/// # Routes
///
/// - `GET /health` - health check
/// - `POST /cache/clear` - erase the thumbnail cache
/// - `GET /` - listing of the served root
/// - `GET /{*path}` - listing, raw file, or `?thumb=SIZE` thumbnail
///
/// The wildcard route is registered last so the fixed routes win.
pub fn create_router(thumbs: ThumbnailCache, config: RouterConfig) -> Router {
    let state = AppState::new(thumbs, config.thumb_size, config.cache_max_age);

    let router = Router::new()
        .route("/health", get(health_handler))
        .route("/cache/clear", post(clear_cache_handler))
        .route("/", get(root_handler))
        .route("/{*path}", get(browse_handler))
        .with_state(state);

    if config.enable_tracing {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}
