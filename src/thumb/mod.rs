//! Thumbnail cache layer.
//!
//! This module holds the core of the server: the persistent on-disk thumbnail
//! cache under a hidden directory that mirrors the served tree.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │              HTTP Handlers              │
//! └────────────────────┬────────────────────┘
//!                      │ get_or_create / clear_all
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │            ThumbnailCache               │
//! │  ┌────────────┐ ┌────────┐ ┌─────────┐  │
//! │  │ CacheKeying│ │ Store  │ │ Encoder │  │
//! │  │ (key→path) │ │(atomic │ │ (image  │  │
//! │  │            │ │ files) │ │  crate) │  │
//! │  └────────────┘ └────────┘ └─────────┘  │
//! └────────────────────┬────────────────────┘
//!                      │ resolve
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │             PathResolver                │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Components
//!
//! - [`ThumbnailCache`]: facade; `get_or_create` and `clear_all`
//! - [`CacheKeying`]: deterministic (path, size) → cache location mapping
//! - [`ThumbnailStore`]: atomic entry files under the cache root
//! - [`fingerprint`]: source fingerprints and the validity check
//! - [`ThumbnailEncoder`]: the injected encode capability

pub mod encoder;
pub mod fingerprint;
pub mod key;
pub mod service;
pub mod store;

pub use encoder::{
    can_thumbnail, JpegThumbnailEncoder, ThumbnailEncoder, DEFAULT_JPEG_QUALITY,
    SUPPORTED_EXTENSIONS,
};
pub use fingerprint::{Fingerprint, FORMAT_VERSION};
pub use key::{CacheKeying, ThumbKey, MAX_THUMB_EDGE, MIN_THUMB_EDGE};
pub use service::{ThumbResponse, ThumbnailCache};
pub use store::{CacheEntry, ThumbnailStore};
