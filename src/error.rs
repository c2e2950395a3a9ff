use std::path::PathBuf;

use thiserror::Error;

/// Errors from resolving a client-supplied path against the served root.
#[derive(Debug, Clone, Error)]
pub enum ResolveError {
    /// The path would escape the served root (via `..`, symlinks, or by
    /// pointing into the cache directory).
    #[error("path escapes the served root: {path}")]
    PathEscape { path: String },

    /// The path does not exist under the served root.
    #[error("path not found: {path}")]
    NotFound { path: String },
}

/// Errors from the thumbnail encode capability.
#[derive(Debug, Clone, Error)]
pub enum EncodeError {
    /// The source bytes are not in a supported raster format.
    #[error("unsupported image format: {reason}")]
    UnsupportedFormat { reason: String },

    /// The source bytes could not be decoded.
    #[error("failed to decode image: {message}")]
    Decode { message: String },

    /// The thumbnail could not be encoded to JPEG.
    #[error("failed to encode thumbnail: {message}")]
    Encode { message: String },
}

/// Errors surfaced by the thumbnail cache facade.
#[derive(Debug, Error)]
pub enum ThumbError {
    /// Path validation failed (escape attempt or missing file).
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// Requested edge size is outside the configured bounds.
    #[error("invalid thumbnail size: {size} (valid range: {min}-{max})")]
    InvalidSize { size: u32, min: u32, max: u32 },

    /// The resolved path is a directory or not a supported image file.
    #[error("not a thumbnailable image: {path}")]
    NotAnImage { path: String },

    /// Decoding or encoding the source image failed.
    #[error(transparent)]
    Encode(#[from] EncodeError),

    /// Reading the source file failed for a reason other than absence.
    #[error("failed to read source file {path:?}: {source}")]
    SourceRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A cache maintenance operation (clear) failed.
    ///
    /// Cache read/write failures during `get_or_create` never surface here;
    /// they degrade to a miss or to serving without caching.
    #[error("cache operation failed: {source}")]
    Cache {
        #[source]
        source: std::io::Error,
    },
}
