//! Common test utilities and helpers
//!
//! This module provides shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::PathBuf;
use tempfile::TempDir;
use tokio::net::TcpListener;

use pullmirror::config::MirrorConfig;

/// Cache root in a temporary directory
pub struct TestCache {
    /// Temporary directory used as the cache root
    pub dir: TempDir,
}

impl TestCache {
    /// Create an empty cache root
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Path of the cache root
    pub fn path(&self) -> PathBuf {
        self.dir.path().to_path_buf()
    }

    /// Seed a cache entry
    pub fn create_entry(&self, name: &str, content: &[u8]) {
        let path = self.dir.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        std::fs::write(path, content).expect("Failed to write file");
    }

    /// Check if an entry exists
    pub fn entry_exists(&self, name: &str) -> bool {
        self.dir.path().join(name).exists()
    }

    /// Read an entry
    pub fn read_entry(&self, name: &str) -> Vec<u8> {
        std::fs::read(self.dir.path().join(name)).expect("Failed to read file")
    }

    /// All files below the root, as paths relative to it
    pub fn files(&self) -> Vec<PathBuf> {
        fn walk(root: &std::path::Path, dir: &std::path::Path, out: &mut Vec<PathBuf>) {
            for entry in std::fs::read_dir(dir).expect("Failed to read directory") {
                let path = entry.expect("Failed to read entry").path();
                if path.is_dir() {
                    walk(root, &path, out);
                } else {
                    out.push(path.strip_prefix(root).unwrap().to_path_buf());
                }
            }
        }
        let mut out = Vec::new();
        walk(self.dir.path(), self.dir.path(), &mut out);
        out.sort();
        out
    }
}

impl Default for TestCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Start a mirror for `site` on an ephemeral port and return its base URL
pub async fn start_mirror(site: &str, cache: &TestCache, atomic_writes: bool) -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr: SocketAddr = listener.local_addr().expect("No local address");

    let config = MirrorConfig::new(site, cache.path(), &addr.to_string())
        .expect("Invalid test config")
        .with_atomic_writes(atomic_writes);

    tokio::spawn(pullmirror::server::serve(
        listener,
        config,
        std::future::pending(),
    ));

    format!("http://{addr}")
}

/// An address with nothing listening on it
pub fn closed_address() -> SocketAddr {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("Failed to bind");
    listener.local_addr().expect("No local address")
}
