//! On-disk thumbnail entry storage.
//!
//! The store owns the cache root exclusively: nothing else creates, mutates,
//! or deletes entry files. Entries are single files holding a fixed
//! little-endian header followed by the JPEG payload:
//!
//! ```text
//! offset  size  field
//! 0       4     magic "TGTH"
//! 4       2     format version (u16)
//! 6       8     source length in bytes (u64)
//! 14      8     source mtime, seconds since epoch (i64)
//! 22      4     source mtime, nanoseconds (u32)
//! 26      -     JPEG payload
//! ```
//!
//! Writes go to a uniquely named temp file in the destination directory and
//! are renamed into place, so a concurrent reader observes either the old
//! complete entry or the new complete entry, never a torn one. Any read or
//! parse failure is reported as "not present" rather than an error: a corrupt
//! or missing entry is just a cache miss.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use bytes::Bytes;

use super::fingerprint::Fingerprint;

/// Entry header magic.
const MAGIC: &[u8; 4] = b"TGTH";

/// Total header size in bytes.
const HEADER_SIZE: usize = 26;

/// Monotonic counter for unique temp file names within the process.
static TEMP_SEQ: AtomicU64 = AtomicU64::new(0);

/// A decoded cache entry.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// Format version the entry was written with.
    pub version: u16,

    /// Fingerprint of the source file at encode time.
    pub fingerprint: Fingerprint,

    /// The encoded thumbnail bytes.
    pub data: Bytes,
}

/// Reads and writes cache entry files under the cache root.
#[derive(Debug, Clone)]
pub struct ThumbnailStore {
    cache_root: PathBuf,
}

impl ThumbnailStore {
    /// Create a store over the given cache root.
    ///
    /// The directory is not created here; it appears lazily on first write.
    pub fn new(cache_root: impl Into<PathBuf>) -> Self {
        Self {
            cache_root: cache_root.into(),
        }
    }

    /// The cache root directory.
    pub fn cache_root(&self) -> &Path {
        &self.cache_root
    }

    /// Read the entry at `location`, if present and well-formed.
    ///
    /// Missing files, missing intermediate directories (e.g. after a
    /// concurrent clear), and corrupt data all read as `None`.
    pub async fn read(&self, location: &Path) -> Option<CacheEntry> {
        let raw = tokio::fs::read(location).await.ok()?;
        decode_entry(&raw)
    }

    /// Atomically persist an entry at `location`.
    ///
    /// Creates any missing mirrored directories, writes the encoded entry to
    /// a temp file in the same directory, and renames it into place. On
    /// failure the temp file is removed on a best-effort basis.
    pub async fn write(
        &self,
        location: &Path,
        data: &[u8],
        fingerprint: Fingerprint,
        version: u16,
    ) -> io::Result<()> {
        if !location.starts_with(&self.cache_root) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "entry location outside the cache root",
            ));
        }

        let parent = location.parent().ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidInput, "entry location has no parent")
        })?;
        tokio::fs::create_dir_all(parent).await?;

        let temp = temp_path(location);
        let encoded = encode_entry(data, fingerprint, version);

        if let Err(e) = tokio::fs::write(&temp, &encoded).await {
            let _ = tokio::fs::remove_file(&temp).await;
            return Err(e);
        }
        if let Err(e) = tokio::fs::rename(&temp, location).await {
            let _ = tokio::fs::remove_file(&temp).await;
            return Err(e);
        }
        Ok(())
    }

    /// Remove the entire cache root.
    ///
    /// No-op when the cache root does not exist. Never touches anything
    /// outside it.
    pub async fn clear_all(&self) -> io::Result<()> {
        match tokio::fs::remove_dir_all(&self.cache_root).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }
}

/// Build a unique temp path next to the final location.
fn temp_path(location: &Path) -> PathBuf {
    let seq = TEMP_SEQ.fetch_add(1, Ordering::Relaxed);
    let mut name = location.file_name().unwrap_or_default().to_os_string();
    name.push(format!(".{}.{}.tmp", std::process::id(), seq));
    location.with_file_name(name)
}

/// Serialize header + payload.
fn encode_entry(data: &[u8], fingerprint: Fingerprint, version: u16) -> Vec<u8> {
    let mut out = Vec::with_capacity(HEADER_SIZE + data.len());
    out.extend_from_slice(MAGIC);
    out.extend_from_slice(&version.to_le_bytes());
    out.extend_from_slice(&fingerprint.len.to_le_bytes());
    out.extend_from_slice(&fingerprint.mtime_secs.to_le_bytes());
    out.extend_from_slice(&fingerprint.mtime_nanos.to_le_bytes());
    out.extend_from_slice(data);
    out
}

/// Parse header + payload; `None` for anything malformed.
fn decode_entry(raw: &[u8]) -> Option<CacheEntry> {
    if raw.len() < HEADER_SIZE || &raw[0..4] != MAGIC {
        return None;
    }
    let version = u16::from_le_bytes(raw[4..6].try_into().ok()?);
    let len = u64::from_le_bytes(raw[6..14].try_into().ok()?);
    let mtime_secs = i64::from_le_bytes(raw[14..22].try_into().ok()?);
    let mtime_nanos = u32::from_le_bytes(raw[22..26].try_into().ok()?);

    Some(CacheEntry {
        version,
        fingerprint: Fingerprint {
            len,
            mtime_secs,
            mtime_nanos,
        },
        data: Bytes::copy_from_slice(&raw[HEADER_SIZE..]),
    })
}
