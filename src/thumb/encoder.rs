//! Thumbnail encode capability.
//!
//! The cache treats encoding as an injected capability behind the
//! [`ThumbnailEncoder`] trait: give it source bytes and a maximum edge length,
//! get back JPEG bytes. Tests substitute counting or failing implementations.
//!
//! # Design Decisions
//!
//! - **Single output format**: thumbnails are always JPEG, regardless of the
//!   source format.
//! - **Never upscale**: if the source already fits within the requested edge,
//!   it is re-encoded at its native size. The requested size still
//!   participates in the cache key.
//! - **Blocking work off the reactor**: decode/resize/encode runs inside
//!   `spawn_blocking`.

use std::io::Cursor;
use std::path::Path;

use async_trait::async_trait;
use bytes::Bytes;
use image::codecs::jpeg::JpegEncoder;
use image::ImageReader;

use crate::error::EncodeError;

/// Default JPEG quality for encoded thumbnails (1-100).
pub const DEFAULT_JPEG_QUALITY: u8 = 95;

/// File extensions the server will thumbnail.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp", "tif", "tiff"];

/// Check whether a file name has a thumbnailable extension.
pub fn can_thumbnail(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| {
            let lower = e.to_ascii_lowercase();
            SUPPORTED_EXTENSIONS.contains(&lower.as_str())
        })
        .unwrap_or(false)
}

/// The external encode capability consumed by the thumbnail cache.
#[async_trait]
pub trait ThumbnailEncoder: Send + Sync {
    /// Decode `source`, scale it to fit within `max_edge` pixels on its longer
    /// side, and encode the result as JPEG.
    async fn encode(&self, source: Bytes, max_edge: u32) -> Result<Bytes, EncodeError>;
}

/// Production encoder backed by the `image` crate.
#[derive(Debug, Clone)]
pub struct JpegThumbnailEncoder {
    /// JPEG quality (1-100).
    quality: u8,
}

impl JpegThumbnailEncoder {
    /// Create an encoder with the default quality.
    pub fn new() -> Self {
        Self {
            quality: DEFAULT_JPEG_QUALITY,
        }
    }

    /// Create an encoder with a specific JPEG quality (clamped to 1-100).
    pub fn with_quality(quality: u8) -> Self {
        Self {
            quality: quality.clamp(1, 100),
        }
    }

    /// The configured JPEG quality.
    pub fn quality(&self) -> u8 {
        self.quality
    }
}

impl Default for JpegThumbnailEncoder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ThumbnailEncoder for JpegThumbnailEncoder {
    async fn encode(&self, source: Bytes, max_edge: u32) -> Result<Bytes, EncodeError> {
        let quality = self.quality;
        tokio::task::spawn_blocking(move || encode_thumbnail(&source, max_edge, quality))
            .await
            .map_err(|e| EncodeError::Encode {
                message: format!("encoder task failed: {e}"),
            })?
    }
}

/// Synchronous decode/scale/encode pipeline.
fn encode_thumbnail(source: &[u8], max_edge: u32, quality: u8) -> Result<Bytes, EncodeError> {
    let reader = ImageReader::new(Cursor::new(source))
        .with_guessed_format()
        .map_err(|e| EncodeError::Decode {
            message: e.to_string(),
        })?;

    if reader.format().is_none() {
        return Err(EncodeError::UnsupportedFormat {
            reason: "unrecognized image data".to_string(),
        });
    }

    let img = reader.decode().map_err(|e| EncodeError::Decode {
        message: e.to_string(),
    })?;

    // Shrink-only: keep native dimensions when the image already fits.
    let img = if img.width().max(img.height()) > max_edge {
        img.thumbnail(max_edge, max_edge)
    } else {
        img
    };

    let mut output = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut output, quality);
    encoder
        .encode_image(&img)
        .map_err(|e| EncodeError::Encode {
            message: e.to_string(),
        })?;

    Ok(Bytes::from(output))
}
