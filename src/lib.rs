//! # thumbgrid
//!
//! An HTTP server for browsing a directory tree of images as a grid of
//! fixed-size JPEG thumbnails, backed by a persistent on-disk cache.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                 HTTP (server)                   │
//! │   routes -> handlers -> page rendering          │
//! └───────────────┬─────────────────┬───────────────┘
//!                 │                 │
//!      ┌──────────▼──────┐  ┌───────▼────────┐
//!      │  thumb           │  │  fs            │
//!      │  service (cache) │  │  resolver      │
//!      │  key / store /   │  │  listing       │
//!      │  fingerprint /   │  └────────────────┘
//!      │  encoder         │
//!      └──────────────────┘
//! ```
//!
//! The `fs` layer resolves untrusted URL paths to validated filesystem
//! paths and lists directories. The `thumb` layer turns (path, size) pairs
//! into JPEG bytes, consulting the on-disk cache first and invalidating
//! stale entries by source file fingerprint. The `server` layer exposes it
//! all over HTTP.

pub mod config;
pub mod error;
pub mod fs;
pub mod server;
pub mod thumb;

pub use config::Config;
pub use error::{EncodeError, ResolveError, ThumbError};
pub use fs::PathResolver;
pub use server::{create_router, RouterConfig};
pub use thumb::{JpegThumbnailEncoder, ThumbnailCache, ThumbnailEncoder};
