//! HTTP server layer.
//!
//! Translates HTTP requests into operations on the thumbnail cache and the
//! filesystem listing, and renders the browsing UI.
//!
//! - [`handlers`]: request handlers and error-to-response mapping
//! - [`page`]: HTML rendering for directory listings
//! - [`routes`]: route table and router configuration

pub mod handlers;
pub mod page;
pub mod routes;

pub use handlers::AppState;
pub use routes::{create_router, RouterConfig};
