//! Pullmirror - pull-through caching mirror
//!
//! An HTTP server that proxies requests to a single origin and keeps every
//! successful response body in a local directory tree, so repeated requests
//! for the same URI are answered from disk.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`cli`] - Command-line parsing and configuration resolution
//! - [`core`] - Cache lookup: URI to path mapping and hit/miss routing
//! - [`infra`] - Infrastructure layer (origin client, cache writes, locks)
//! - [`server`] - axum router, request dispatch and responders
//! - [`config`] - Configuration and constants
//! - [`error`] - Error types and handling

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod infra;
pub mod server;

#[cfg(test)]
pub mod test_utils;
