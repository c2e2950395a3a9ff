//! Filesystem layer: safe path resolution and directory enumeration.
//!
//! Everything the server knows about the local filesystem goes through this
//! module. [`resolver::PathResolver`] is the security boundary — a
//! client-supplied path becomes usable only as a [`resolver::ResolvedPath`] —
//! and [`listing`] enumerates directories for the browsing view.

pub mod listing;
pub mod resolver;

pub use listing::{list_dir, EntryKind, ListedEntry};
pub use resolver::{PathResolver, ResolvedPath, DEFAULT_CACHE_DIR_NAME};
