//! Thumbnail cache facade.
//!
//! [`ThumbnailCache`] is the single entry point composing the resolver, the
//! keying scheme, the on-disk store, the invalidation check, and the encode
//! capability:
//!
//! ```text
//! get_or_create(raw_path, size)
//!   1. validate size (no I/O)
//!   2. resolve raw_path against the served root
//!   3. reject directories / non-image extensions
//!   4. read cache entry; if valid for the live source, return it
//!   5. otherwise read the source, encode, best-effort persist, return
//! ```
//!
//! Caching is best-effort: a failed cache write is logged and the freshly
//! encoded bytes are still returned. Concurrent regeneration of the same key
//! may do duplicate encoding work; the store's atomic rename makes that a
//! wasted encode, never a torn entry.

use std::sync::Arc;

use bytes::Bytes;
use tracing::{debug, warn};

use crate::error::{ResolveError, ThumbError};
use crate::fs::resolver::PathResolver;

use super::encoder::{can_thumbnail, JpegThumbnailEncoder, ThumbnailEncoder};
use super::fingerprint::{self, Fingerprint, FORMAT_VERSION};
use super::key::CacheKeying;
use super::store::ThumbnailStore;

/// Response from the thumbnail cache.
#[derive(Debug, Clone)]
pub struct ThumbResponse {
    /// The encoded JPEG thumbnail.
    pub data: Bytes,

    /// Whether the thumbnail was served from the on-disk cache.
    pub cache_hit: bool,
}

/// The thumbnail cache and its collaborators.
///
/// All configuration (served root, cache directory, size bounds, encoder) is
/// held by the instance, so independent instances — e.g. in tests — never
/// interfere with each other.
pub struct ThumbnailCache {
    resolver: PathResolver,
    keying: CacheKeying,
    store: ThumbnailStore,
    encoder: Arc<dyn ThumbnailEncoder>,
}

impl ThumbnailCache {
    /// Create a cache with the default JPEG encoder and default size bounds.
    pub fn new(resolver: PathResolver) -> Self {
        Self::with_encoder(resolver, Arc::new(JpegThumbnailEncoder::new()))
    }

    /// Create a cache with a specific encode capability.
    pub fn with_encoder(resolver: PathResolver, encoder: Arc<dyn ThumbnailEncoder>) -> Self {
        let keying = CacheKeying::new(resolver.cache_root());
        let store = ThumbnailStore::new(resolver.cache_root());
        Self {
            resolver,
            keying,
            store,
            encoder,
        }
    }

    /// Override the edge size bounds.
    pub fn with_size_bounds(mut self, min_edge: u32, max_edge: u32) -> Self {
        self.keying = CacheKeying::with_bounds(self.resolver.cache_root(), min_edge, max_edge);
        self
    }

    /// The path resolver guarding the served root.
    pub fn resolver(&self) -> &PathResolver {
        &self.resolver
    }

    /// Inclusive edge size bounds.
    pub fn size_bounds(&self) -> (u32, u32) {
        self.keying.bounds()
    }

    /// Return the thumbnail for `(raw_path, size)`, encoding it on miss.
    ///
    /// # Errors
    ///
    /// - [`ThumbError::InvalidSize`] for sizes outside the bounds (checked
    ///   before any I/O).
    /// - [`ThumbError::Resolve`] when the path escapes the root or is missing.
    /// - [`ThumbError::NotAnImage`] for directories and unsupported files.
    /// - [`ThumbError::Encode`] when the source cannot be decoded or encoded;
    ///   no cache entry is written in that case.
    ///
    /// Cache I/O failures never surface: a failed read is a miss, a failed
    /// write is logged and the response is served uncached.
    pub async fn get_or_create(&self, raw_path: &str, size: u32) -> Result<ThumbResponse, ThumbError> {
        // Size bounds first: a pathological size must fail without touching
        // the filesystem.
        let (min, max) = self.keying.bounds();
        if size < min || size > max {
            return Err(ThumbError::InvalidSize { size, min, max });
        }

        let resolved = self.resolver.resolve(raw_path).await?;

        if resolved.is_dir() || !can_thumbnail(resolved.abs()) {
            return Err(ThumbError::NotAnImage {
                path: raw_path.to_string(),
            });
        }

        let key = self.keying.key_for(resolved.rel(), size)?;
        let location = self.keying.location_for(&key);

        if let Some(entry) = self.store.read(&location).await {
            if fingerprint::is_valid(&entry, resolved.abs()).await {
                return Ok(ThumbResponse {
                    data: entry.data,
                    cache_hit: true,
                });
            }
            debug!(path = %resolved.rel().display(), size, "stale cache entry, re-encoding");
        }

        // Fingerprint before reading: if the source changes between the two,
        // the stored fingerprint no longer matches and the next request
        // regenerates.
        let fp = Fingerprint::of(resolved.abs())
            .await
            .map_err(|e| self.source_error(raw_path, resolved.abs(), e))?;

        let source = tokio::fs::read(resolved.abs())
            .await
            .map_err(|e| self.source_error(raw_path, resolved.abs(), e))?;

        let data = self.encoder.encode(Bytes::from(source), size).await?;

        if let Err(e) = self
            .store
            .write(&location, &data, fp, FORMAT_VERSION)
            .await
        {
            warn!(
                location = %location.display(),
                error = %e,
                "failed to persist thumbnail, serving uncached"
            );
        }

        Ok(ThumbResponse {
            data,
            cache_hit: false,
        })
    }

    /// Remove the entire cache directory. Safe to run concurrently with
    /// in-flight requests; racing writes either vanish or survive intact.
    pub async fn clear_all(&self) -> Result<(), ThumbError> {
        self.store
            .clear_all()
            .await
            .map_err(|e| ThumbError::Cache { source: e })
    }

    fn source_error(&self, raw_path: &str, abs: &std::path::Path, e: std::io::Error) -> ThumbError {
        if e.kind() == std::io::ErrorKind::NotFound {
            ThumbError::Resolve(ResolveError::NotFound {
                path: raw_path.to_string(),
            })
        } else {
            ThumbError::SourceRead {
                path: abs.to_path_buf(),
                source: e,
            }
        }
    }
}
