//! Source fingerprints and cache entry invalidation.
//!
//! A fingerprint captures the source file's state at encode time: byte length
//! plus modification time (seconds and nanoseconds). A stored entry is valid
//! only while the live source still produces the same fingerprint and the
//! entry was written by the current format version. There is no size-based
//! eviction; this check plus the explicit `clear_all` are the only
//! invalidation mechanisms.
//!
//! Length+mtime was chosen over content hashing: it costs one `stat` per
//! request instead of a full read, at the price of missing same-length
//! mtime-preserving rewrites (acceptable for a local browsing tool, and
//! `clear_all` remains the escape hatch).

use std::io;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use super::store::CacheEntry;

/// Version of the on-disk entry format and encoder pipeline.
///
/// Bump this whenever the entry layout or the encoded output changes; all
/// existing entries then read as stale and regenerate on next access.
pub const FORMAT_VERSION: u16 = 1;

/// State of a source file at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fingerprint {
    /// Source length in bytes.
    pub len: u64,

    /// Modification time, seconds since the Unix epoch (negative = before).
    pub mtime_secs: i64,

    /// Sub-second part of the modification time.
    pub mtime_nanos: u32,
}

impl Fingerprint {
    /// Build a fingerprint from filesystem metadata.
    pub fn from_metadata(meta: &std::fs::Metadata) -> io::Result<Self> {
        let mtime = meta.modified()?;
        let (mtime_secs, mtime_nanos) = match mtime.duration_since(UNIX_EPOCH) {
            Ok(d) => (d.as_secs() as i64, d.subsec_nanos()),
            Err(e) => {
                let d = e.duration();
                (-(d.as_secs() as i64), d.subsec_nanos())
            }
        };
        Ok(Self {
            len: meta.len(),
            mtime_secs,
            mtime_nanos,
        })
    }

    /// Fingerprint the file at `path`.
    pub async fn of(path: &Path) -> io::Result<Self> {
        let meta = tokio::fs::metadata(path).await?;
        Self::from_metadata(&meta)
    }
}

/// Decide whether a stored entry is still valid for the live source file.
///
/// Returns `false` when the source no longer exists, its fingerprint differs
/// from the stored one, or the entry was written by a different format
/// version.
pub async fn is_valid(entry: &CacheEntry, source: &Path) -> bool {
    if entry.version != FORMAT_VERSION {
        return false;
    }
    match Fingerprint::of(source).await {
        Ok(current) => current == entry.fingerprint,
        Err(_) => false,
    }
}
