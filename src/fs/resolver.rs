//! Safe resolution of client-supplied paths against the served root.
//!
//! This is the sole security boundary of the server: every other component
//! trusts the [`ResolvedPath`] it produces. Validation happens in two phases:
//!
//! 1. **Lexical**: `.`, `..`, `~`, empty components, and leading/trailing
//!    whitespace are rejected before touching the filesystem, so traversal
//!    attempts fail identically whether or not their target exists.
//! 2. **Physical**: the joined path is canonicalized (resolving symlinks) and
//!    the result must still be the served root or a descendant of it. This
//!    defeats escapes that are lexically clean but point elsewhere through a
//!    symlink.
//!
//! Paths that land inside the cache directory are rejected the same way: the
//! cache is never browsable or thumbnailable.

use std::io;
use std::path::{Path, PathBuf};

use crate::error::ResolveError;

/// Default name of the cache directory under the served root.
///
/// Dot-prefixed so default directory listings skip it.
pub const DEFAULT_CACHE_DIR_NAME: &str = ".thumbgrid";

/// A client path that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
    /// Canonical absolute path on disk.
    abs: PathBuf,

    /// Path relative to the served root, normalized. Empty for the root itself.
    rel: PathBuf,

    /// Whether the path is a directory.
    is_dir: bool,
}

impl ResolvedPath {
    /// Canonical absolute path on disk.
    pub fn abs(&self) -> &Path {
        &self.abs
    }

    /// Normalized path relative to the served root.
    pub fn rel(&self) -> &Path {
        &self.rel
    }

    /// Whether the path is a directory.
    pub fn is_dir(&self) -> bool {
        self.is_dir
    }

    /// File extension, lowercased, if any.
    pub fn extension(&self) -> Option<String> {
        self.abs
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
    }
}

/// Validates and canonicalizes client-supplied relative paths.
#[derive(Debug, Clone)]
pub struct PathResolver {
    /// Canonicalized served root. Immutable for the resolver's lifetime.
    root: PathBuf,

    /// Name of the cache directory under the root.
    cache_dir_name: String,

    /// Absolute path of the cache directory (may not exist yet).
    cache_root: PathBuf,
}

impl PathResolver {
    /// Create a resolver for the given root directory.
    ///
    /// The root is canonicalized eagerly; it must exist.
    pub fn new(root: impl AsRef<Path>, cache_dir_name: &str) -> io::Result<Self> {
        let root = std::fs::canonicalize(root)?;
        let cache_root = root.join(cache_dir_name);
        Ok(Self {
            root,
            cache_dir_name: cache_dir_name.to_string(),
            cache_root,
        })
    }

    /// The canonicalized served root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The absolute path of the cache directory under the root.
    pub fn cache_root(&self) -> &Path {
        &self.cache_root
    }

    /// The cache directory name.
    pub fn cache_dir_name(&self) -> &str {
        &self.cache_dir_name
    }

    /// Validate a raw client path and resolve it to a filesystem location.
    ///
    /// # Errors
    ///
    /// - [`ResolveError::PathEscape`] if the path is lexically suspicious,
    ///   resolves outside the root, or resolves inside the cache directory.
    /// - [`ResolveError::NotFound`] if the path does not exist.
    pub async fn resolve(&self, raw_path: &str) -> Result<ResolvedPath, ResolveError> {
        let stripped = strip_url_path(raw_path);

        // Lexical screen first: traversal attempts must fail regardless of
        // whether their target exists.
        if !is_lexically_safe(stripped) {
            return Err(ResolveError::PathEscape {
                path: raw_path.to_string(),
            });
        }

        // The cache directory is never a valid target, even before it exists.
        if first_component(stripped) == Some(self.cache_dir_name.as_str()) {
            return Err(ResolveError::PathEscape {
                path: raw_path.to_string(),
            });
        }

        let candidate = self.root.join(stripped);

        let abs = tokio::fs::canonicalize(&candidate)
            .await
            .map_err(|_| ResolveError::NotFound {
                path: raw_path.to_string(),
            })?;

        // Physical containment check, on the fully resolved path.
        if !abs.starts_with(&self.root) || abs.starts_with(&self.cache_root) {
            return Err(ResolveError::PathEscape {
                path: raw_path.to_string(),
            });
        }

        let is_dir = tokio::fs::metadata(&abs)
            .await
            .map_err(|_| ResolveError::NotFound {
                path: raw_path.to_string(),
            })?
            .is_dir();

        let rel = abs
            .strip_prefix(&self.root)
            .unwrap_or_else(|_| Path::new(""))
            .to_path_buf();

        Ok(ResolvedPath { abs, rel, is_dir })
    }
}

/// Strip leading/trailing slashes and whitespace from a URL path.
///
/// `" /a/b/ "` and `"///a/b"` both become `"a/b"`.
fn strip_url_path(raw: &str) -> &str {
    raw.trim_matches(|c| c == '/' || c == ' ')
}

/// Check that every path component is a plain name.
///
/// Rejects `.`, `..`, `~`, empty components (from `//`), and components with
/// leading or trailing spaces.
fn is_lexically_safe(stripped: &str) -> bool {
    if stripped.is_empty() {
        return true; // the root itself
    }
    stripped.split('/').all(|component| {
        !component.is_empty()
            && component != "."
            && component != ".."
            && component != "~"
            && !component.starts_with(' ')
            && !component.ends_with(' ')
    })
}

fn first_component(stripped: &str) -> Option<&str> {
    stripped.split('/').next().filter(|c| !c.is_empty())
}
