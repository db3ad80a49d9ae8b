//! # Flache Testkit
//!
//! Test utilities for Flache.
//!
//! This crate provides:
//! - Temporary caches that clean up after themselves
//! - Property-based test generators using proptest
//! - A blocking runtime helper for driving async caches from proptest
//!
//! ## Usage
//!
//! ```rust,ignore
//! use flache_testkit::prelude::*;
//!
//! #[tokio::test]
//! async fn test_with_cache() {
//!     let cache = TestCache::json();
//!     cache.set("k", &serde_json::json!(1)).await.unwrap();
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
}

pub use fixtures::*;
pub use generators::*;
