//! Directory enumeration for the browsing view.
//!
//! Produces the entries of a resolved directory as the rendering layer needs
//! them: subdirectories first, then files, each group sorted by name, with
//! the cache directory always excluded.

use std::io;

use crate::fs::resolver::ResolvedPath;
use crate::thumb::encoder::can_thumbnail;

/// What a listed entry is, as far as the browsing view cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// A subdirectory.
    Dir,

    /// A file the server can thumbnail.
    Image,

    /// Any other file.
    Other,
}

/// One entry of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListedEntry {
    /// File or directory name (no path components).
    pub name: String,

    /// Entry kind.
    pub kind: EntryKind,
}

/// List a resolved directory.
///
/// Entries named `cache_dir_name` are skipped at any level, so the cache
/// never shows up in a listing. Entries whose names are not valid UTF-8 are
/// skipped as well; they could never round-trip through a URL path.
pub async fn list_dir(
    resolved: &ResolvedPath,
    cache_dir_name: &str,
) -> io::Result<Vec<ListedEntry>> {
    let mut dirs = Vec::new();
    let mut files = Vec::new();

    let mut reader = tokio::fs::read_dir(resolved.abs()).await?;
    while let Some(entry) = reader.next_entry().await? {
        let Ok(name) = entry.file_name().into_string() else {
            continue;
        };
        if name == cache_dir_name {
            continue;
        }

        let Ok(file_type) = entry.file_type().await else {
            continue;
        };

        // Symlinks are classified by their target; a broken link has nothing
        // to serve and is skipped.
        let is_dir = if file_type.is_symlink() {
            match tokio::fs::metadata(entry.path()).await {
                Ok(meta) => meta.is_dir(),
                Err(_) => continue,
            }
        } else if file_type.is_dir() {
            true
        } else if file_type.is_file() {
            false
        } else {
            continue;
        };

        if is_dir {
            dirs.push(ListedEntry {
                name,
                kind: EntryKind::Dir,
            });
        } else {
            let kind = if can_thumbnail(std::path::Path::new(&name)) {
                EntryKind::Image
            } else {
                EntryKind::Other
            };
            files.push(ListedEntry { name, kind });
        }
    }

    dirs.sort_by(|a, b| a.name.cmp(&b.name));
    files.sort_by(|a, b| a.name.cmp(&b.name));
    dirs.extend(files);
    Ok(dirs)
}
