//! Cache key derivation.
//!
//! A cache key is the pair (normalized relative path, edge size). The on-disk
//! location mirrors the source tree under the cache root, and the entry file
//! name keeps the *complete* original file name plus a size suffix:
//!
//! ```text
//! source: a/pic.png, size 64  ->  <cache_root>/a/pic.png.64.jpg
//! ```
//!
//! Keeping the original extension in the name makes the mapping collision-free
//! (`a.png` and `a.jpg` stay distinct) and lets multiple sizes of the same
//! source coexist. The mapping is pure and stable across restarts.

use std::path::{Path, PathBuf};

use crate::error::ThumbError;

/// Minimum thumbnail edge length in pixels.
pub const MIN_THUMB_EDGE: u32 = 1;

/// Maximum thumbnail edge length in pixels.
pub const MAX_THUMB_EDGE: u32 = 4096;

/// A validated cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ThumbKey {
    /// Normalized path relative to the served root.
    rel: PathBuf,

    /// Requested maximum edge length in pixels.
    size: u32,
}

impl ThumbKey {
    /// The normalized relative path.
    pub fn rel(&self) -> &Path {
        &self.rel
    }

    /// The requested edge size.
    pub fn size(&self) -> u32 {
        self.size
    }
}

/// Derives cache keys and their on-disk locations.
#[derive(Debug, Clone)]
pub struct CacheKeying {
    /// Absolute path of the cache root.
    cache_root: PathBuf,

    /// Inclusive edge size bounds.
    min_edge: u32,
    max_edge: u32,
}

impl CacheKeying {
    /// Create a keying scheme over the given cache root with default bounds.
    pub fn new(cache_root: impl Into<PathBuf>) -> Self {
        Self::with_bounds(cache_root, MIN_THUMB_EDGE, MAX_THUMB_EDGE)
    }

    /// Create a keying scheme with custom edge bounds.
    pub fn with_bounds(cache_root: impl Into<PathBuf>, min_edge: u32, max_edge: u32) -> Self {
        Self {
            cache_root: cache_root.into(),
            min_edge,
            max_edge,
        }
    }

    /// Inclusive edge size bounds.
    pub fn bounds(&self) -> (u32, u32) {
        (self.min_edge, self.max_edge)
    }

    /// Derive the key for a resolved relative path and a requested size.
    ///
    /// `rel` must be the normalized relative path produced by the resolver.
    ///
    /// # Errors
    ///
    /// [`ThumbError::InvalidSize`] when `size` is outside the configured
    /// bounds. No I/O is performed.
    pub fn key_for(&self, rel: &Path, size: u32) -> Result<ThumbKey, ThumbError> {
        if size < self.min_edge || size > self.max_edge {
            return Err(ThumbError::InvalidSize {
                size,
                min: self.min_edge,
                max: self.max_edge,
            });
        }
        Ok(ThumbKey {
            rel: rel.to_path_buf(),
            size,
        })
    }

    /// Map a key to its entry location under the cache root.
    pub fn location_for(&self, key: &ThumbKey) -> PathBuf {
        let mut name = key
            .rel
            .file_name()
            .unwrap_or_default()
            .to_os_string();
        name.push(format!(".{}.jpg", key.size));

        match key.rel.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => {
                self.cache_root.join(parent).join(name)
            }
            _ => self.cache_root.join(name),
        }
    }
}
