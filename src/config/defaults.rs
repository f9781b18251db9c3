//! Default configuration values

/// Cache root used when none is configured
pub const DEFAULT_CACHE_DIRECTORY: &str = ".";

/// Listen address used when none is configured (all interfaces)
pub const DEFAULT_LISTEN: &str = ":8000";

/// Host used for Go-style `:PORT` listen addresses
pub const WILDCARD_HOST: &str = "0.0.0.0";

/// Log filter applied when `RUST_LOG` is unset
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Prefix of in-progress cache files in atomic write mode
pub const PARTIAL_PREFIX: &str = ".pullmirror.";

/// Suffix of in-progress cache files in atomic write mode
pub const PARTIAL_SUFFIX: &str = ".partial";
