//! Error types for pullmirror
//!
//! Domain-specific error types using thiserror.

use std::path::PathBuf;
use thiserror::Error;

/// Configuration errors, all fatal at startup
#[derive(Error, Debug)]
pub enum ConfigError {
    /// No origin configured
    #[error("A site must be provided (--site or PULLMIRROR_SITE)")]
    MissingSite,

    /// Origin is not an absolute http(s) URL
    #[error("Invalid site URL '{site}': {error}")]
    InvalidSite { site: String, error: String },

    /// Listen address cannot be parsed
    #[error("Invalid listen address '{listen}': {error}")]
    InvalidListen { listen: String, error: String },

    /// Failed to read config file
    #[error("Failed to read config file '{path}': {error}")]
    ReadFile { path: PathBuf, error: String },

    /// Failed to parse config file
    #[error("Failed to parse config file '{path}': {error}")]
    ParseFile { path: PathBuf, error: String },
}

/// Errors talking to the origin
#[derive(Error, Debug)]
pub enum FetchError {
    /// Outbound request could not be built
    #[error("Failed to build request for '{url}': {error}")]
    InvalidRequest { url: String, error: String },

    /// Origin unreachable or returned a malformed response
    #[error("Network error fetching '{url}': {error}")]
    Transport { url: String, error: String },

    /// Origin answered with something other than 200
    #[error("Origin returned HTTP {status} for '{url}'")]
    NonSuccess { url: String, status: u16 },
}

/// Errors reading or writing cache entries
#[derive(Error, Debug)]
pub enum CacheError {
    /// URI maps onto the cache root itself
    #[error("URI '{uri}' does not name a cache entry")]
    NotAnEntry { uri: String },

    /// Failed to create directory
    #[error("Failed to create directory '{path}': {error}")]
    CreateDir { path: PathBuf, error: String },

    /// Failed to create the entry file
    #[error("Failed to create file '{path}': {error}")]
    CreateFile { path: PathBuf, error: String },

    /// Failed to write to the entry file
    #[error("Failed to write file '{path}': {error}")]
    WriteFile { path: PathBuf, error: String },

    /// Failed to open a cached entry
    #[error("Failed to open file '{path}': {error}")]
    OpenFile { path: PathBuf, error: String },

    /// Failed to move a completed temp file into place
    #[error("Failed to commit '{path}': {error}")]
    Commit { path: PathBuf, error: String },
}

/// Top-level pullmirror error type
#[derive(Error, Debug)]
pub enum MirrorError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Fetch error
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Cache error
    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    /// Listener could not be bound
    #[error("Failed to bind listener on '{addr}': {source}")]
    Bind {
        addr: std::net::SocketAddr,
        source: std::io::Error,
    },

    /// Server stopped with an IO error
    #[error("Server error: {source}")]
    Serve { source: std::io::Error },
}
