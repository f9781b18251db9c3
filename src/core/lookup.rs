//! Cache lookup
//!
//! Maps a request URI onto a path under the cache root and decides whether
//! the request is a hit or a miss. Lookup never fails: anything that keeps us
//! from seeing a regular file (missing entry, permission error, a directory
//! in the way) counts as a miss.

use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

/// Routing decision for a single request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// A cache entry exists and is served from disk
    Hit(PathBuf),
    /// No usable entry; fetch from the origin and populate this path
    Miss(PathBuf),
}

impl Route {
    /// Cache entry path the decision refers to
    pub fn path(&self) -> &Path {
        match self {
            Self::Hit(path) | Self::Miss(path) => path,
        }
    }

    /// Whether this is a hit
    pub fn is_hit(&self) -> bool {
        matches!(self, Self::Hit(_))
    }
}

/// Cache lookup rooted at the cache directory
#[derive(Debug, Clone)]
pub struct CacheLookup {
    root: PathBuf,
}

impl CacheLookup {
    /// Create a lookup for the given cache root
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Path of the cache entry for `uri`
    ///
    /// The query string stays part of the last segment verbatim, so
    /// `/a/b?x=1` maps to `{root}/a/b?x=1`.
    pub fn entry_path(&self, uri: &str) -> PathBuf {
        self.root.join(relative_entry_path(uri))
    }

    /// Whether `path` is the cache root itself rather than an entry below it
    pub fn is_root(&self, path: &Path) -> bool {
        path == self.root
    }

    /// Whether a regular file exists at `path`
    pub async fn contains_path(&self, path: &Path) -> bool {
        match tokio::fs::metadata(path).await {
            Ok(meta) => meta.is_file(),
            Err(e) if e.kind() == io::ErrorKind::NotFound => false,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "cache lookup failed, treating as miss");
                false
            }
        }
    }

    /// Whether a cache entry exists for `uri`
    pub async fn contains(&self, uri: &str) -> bool {
        self.contains_path(&self.entry_path(uri)).await
    }

    /// Decide how to serve `uri`
    pub async fn route(&self, uri: &str) -> Route {
        let path = self.entry_path(uri);
        if self.contains_path(&path).await {
            Route::Hit(path)
        } else {
            Route::Miss(path)
        }
    }
}

/// Lexically resolve a URI into a path relative to the cache root
///
/// Empty and `.` segments are dropped and `..` pops the previous segment,
/// never climbing above the root.
pub fn relative_entry_path(uri: &str) -> PathBuf {
    let mut segments: Vec<&str> = Vec::new();
    for segment in uri.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            segment => segments.push(segment),
        }
    }
    segments.iter().collect()
}
