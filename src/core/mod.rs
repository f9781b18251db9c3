//! Business logic
//!
//! Decides how a request is served. Only reads the filesystem.

pub mod lookup;
