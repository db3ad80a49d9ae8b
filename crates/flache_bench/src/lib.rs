//! Shared helpers for Flache benchmarks.

#![warn(missing_docs)]

use tokio::runtime::Runtime;

/// Creates deterministic data of the given size.
#[must_use]
pub fn sample_data(size: usize) -> Vec<u8> {
    (0..size).map(|i| (i % 256) as u8).collect()
}

/// Creates a multi-threaded runtime for async benchmarks.
///
/// # Panics
///
/// Panics if the runtime cannot be built.
#[must_use]
pub fn runtime() -> Runtime {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("Failed to build tokio runtime")
}
