//! Configuration and constants
//!
//! [`MirrorConfig`] is built once at startup and shared read-only by every
//! request handler.

pub mod defaults;
pub mod file;

use std::net::{SocketAddr, ToSocketAddrs};
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Immutable mirror configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorConfig {
    /// Origin base URL, scheme and host, without trailing slash
    site: String,
    /// Root directory of the cache tree
    cache_directory: PathBuf,
    /// Address the HTTP listener binds to
    listen: SocketAddr,
    /// Write entries through a temp file and coalesce concurrent misses
    atomic_writes: bool,
}

impl MirrorConfig {
    /// Build a configuration, validating the origin and listen address
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingSite`] for an empty origin and
    /// [`ConfigError::InvalidSite`] / [`ConfigError::InvalidListen`] when
    /// either value cannot be parsed.
    pub fn new(
        site: &str,
        cache_directory: impl Into<PathBuf>,
        listen: &str,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            site: normalize_site(site)?,
            cache_directory: cache_directory.into(),
            listen: parse_listen(listen)?,
            atomic_writes: false,
        })
    }

    /// Enable or disable the hardened write path
    #[must_use]
    pub fn with_atomic_writes(mut self, atomic_writes: bool) -> Self {
        self.atomic_writes = atomic_writes;
        self
    }

    /// Origin base URL
    pub fn site(&self) -> &str {
        &self.site
    }

    /// Cache root directory
    pub fn cache_directory(&self) -> &Path {
        &self.cache_directory
    }

    /// Listen address
    pub fn listen(&self) -> SocketAddr {
        self.listen
    }

    /// Whether atomic writes and single-flight are enabled
    pub fn atomic_writes(&self) -> bool {
        self.atomic_writes
    }

    /// Origin URL for a request URI: plain concatenation, no escaping
    pub fn origin_url(&self, uri: &str) -> String {
        format!("{}{uri}", self.site)
    }
}

/// Validate the origin base URL and drop a single trailing slash
pub fn normalize_site(site: &str) -> Result<String, ConfigError> {
    let site = site.trim();
    if site.is_empty() {
        return Err(ConfigError::MissingSite);
    }

    let parsed = url::Url::parse(site).map_err(|e| ConfigError::InvalidSite {
        site: site.to_string(),
        error: e.to_string(),
    })?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidSite {
            site: site.to_string(),
            error: format!("unsupported scheme '{}'", parsed.scheme()),
        });
    }
    if parsed.host_str().is_none() {
        return Err(ConfigError::InvalidSite {
            site: site.to_string(),
            error: "missing host".to_string(),
        });
    }

    Ok(site.strip_suffix('/').unwrap_or(site).to_string())
}

/// Parse a listen address, accepting Go-style `:PORT`
pub fn parse_listen(listen: &str) -> Result<SocketAddr, ConfigError> {
    let listen = listen.trim();
    let candidate = if listen.starts_with(':') {
        format!("{}{listen}", defaults::WILDCARD_HOST)
    } else {
        listen.to_string()
    };

    if let Ok(addr) = candidate.parse::<SocketAddr>() {
        return Ok(addr);
    }

    candidate
        .to_socket_addrs()
        .map_err(|e| ConfigError::InvalidListen {
            listen: listen.to_string(),
            error: e.to_string(),
        })?
        .next()
        .ok_or_else(|| ConfigError::InvalidListen {
            listen: listen.to_string(),
            error: "address did not resolve".to_string(),
        })
}
