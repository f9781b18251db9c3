//! TOML configuration file
//!
//! Every key is optional; values given on the command line or through the
//! environment take precedence over the file.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Contents of a `pullmirror.toml` file
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    /// Origin base URL
    pub site: Option<String>,

    /// Cache root directory
    pub cache_directory: Option<PathBuf>,

    /// Listen address
    pub listen: Option<String>,

    /// Enable atomic writes and single-flight fetches
    pub atomic_writes: Option<bool>,
}

impl FileConfig {
    /// Load a configuration file
    ///
    /// Unlike the command-line defaults, an explicitly named file must exist.
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;
        Self::parse(path, &content)
    }

    fn parse(path: &Path, content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ParseFile {
            path: path.to_path_buf(),
            error: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_full_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("pullmirror.toml");
        fs::write(
            &path,
            r#"
site = "https://origin.example"
cache_directory = "/var/cache/pullmirror"
listen = "127.0.0.1:8000"
atomic_writes = true
"#,
        )
        .unwrap();

        let config = FileConfig::load_from_path(&path).unwrap();
        assert_eq!(config.site.as_deref(), Some("https://origin.example"));
        assert_eq!(
            config.cache_directory,
            Some(PathBuf::from("/var/cache/pullmirror"))
        );
        assert_eq!(config.listen.as_deref(), Some("127.0.0.1:8000"));
        assert_eq!(config.atomic_writes, Some(true));
    }

    #[test]
    fn test_empty_file_is_all_defaults() {
        let config = FileConfig::parse(Path::new("empty.toml"), "").unwrap();
        assert_eq!(config, FileConfig::default());
    }

    #[test]
    fn test_unknown_key_rejected() {
        let result = FileConfig::parse(Path::new("bad.toml"), "sitee = \"x\"\n");
        assert!(matches!(result, Err(ConfigError::ParseFile { .. })));
    }

    #[test]
    fn test_missing_file_is_error() {
        let temp = TempDir::new().unwrap();
        let result = FileConfig::load_from_path(&temp.path().join("absent.toml"));
        assert!(matches!(result, Err(ConfigError::ReadFile { .. })));
    }
}
