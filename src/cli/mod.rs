//! Command-line interface module
//!
//! This module handles argument parsing and turns flags, environment and the
//! optional config file into a [`MirrorConfig`]. Serving lives in
//! [`crate::server`].

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use crate::config::defaults;
use crate::config::file::FileConfig;
use crate::config::MirrorConfig;
use crate::error::ConfigError;

/// Pullmirror - pull-through caching mirror
///
/// Proxies every request to the origin site and keeps successful responses in
/// a local cache directory, serving later requests for the same URI from disk.
#[derive(Parser, Debug)]
#[command(name = "pullmirror")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// The website to mirror, protocol with hostname only
    #[arg(long, env = "PULLMIRROR_SITE")]
    pub site: Option<String>,

    /// The directory to cache into [default: .]
    #[arg(long, alias = "cache_directory", env = "PULLMIRROR_CACHE_DIRECTORY")]
    pub cache_directory: Option<PathBuf>,

    /// Host and port to listen on [default: :8000]
    #[arg(long, env = "PULLMIRROR_LISTEN")]
    pub listen: Option<String>,

    /// Write entries via temp file and rename, one origin fetch per entry at a time
    #[arg(long, env = "PULLMIRROR_ATOMIC_WRITES")]
    pub atomic_writes: bool,

    /// Read settings from a TOML file (flags and environment take precedence)
    #[arg(short, long, value_name = "FILE", env = "PULLMIRROR_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose output (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl Cli {
    /// Log filter directive for the chosen verbosity
    pub fn log_level(&self) -> &'static str {
        if self.quiet {
            return "warn";
        }
        match self.verbose {
            0 => defaults::DEFAULT_LOG_LEVEL,
            1 => "debug",
            _ => "trace",
        }
    }

    /// Merge flags, environment, config file and defaults
    pub fn resolve(&self) -> Result<MirrorConfig, ConfigError> {
        let file = match &self.config {
            Some(path) => FileConfig::load_from_path(path)?,
            None => FileConfig::default(),
        };

        let site = self.site.clone().or(file.site).unwrap_or_default();
        let cache_directory = self
            .cache_directory
            .clone()
            .or(file.cache_directory)
            .unwrap_or_else(|| PathBuf::from(defaults::DEFAULT_CACHE_DIRECTORY));
        let listen = self
            .listen
            .clone()
            .or(file.listen)
            .unwrap_or_else(|| defaults::DEFAULT_LISTEN.to_string());
        let atomic_writes = self.atomic_writes || file.atomic_writes.unwrap_or(false);

        Ok(MirrorConfig::new(&site, cache_directory, &listen)?.with_atomic_writes(atomic_writes))
    }

    /// Resolve the configuration and run the server
    pub async fn run(self) -> Result<()> {
        let config = self.resolve()?;
        crate::server::run(config).await?;
        Ok(())
    }
}
