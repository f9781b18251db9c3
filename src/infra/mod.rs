//! Infrastructure layer
//!
//! Handles the side effects: talking to the origin and writing the cache.

pub mod locks;
pub mod origin;
pub mod populate;
