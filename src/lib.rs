//! # RAW Library
//!
//! Catalogs camera RAW files, finds copies of the same shot and builds a
//! deduplicated, date-partitioned library.
//!
//! ## How it works
//! - Metadata comes from `magick identify -verbose`, one file at a time
//! - Everything is stored in SQLite, so interrupted runs can be resumed
//! - Copies are recognised by file name, reported size and capture time,
//!   never by comparing pixels
//! - Sources are never modified or deleted
//!
//! ## Architecture
//! - `core` - Scanning, extraction, persistence, deduplication and copying
//! - `events` - Event-driven progress reporting
//! - `error` - Error types

pub mod core;
pub mod error;
pub mod events;

// Re-export commonly used types at the crate root
pub use error::{LibraryError, Result};

/// Initialize tracing for the library
///
/// Logs go to stderr. `RUST_LOG` takes precedence; otherwise the level is
/// `info`, or `debug` when `verbose` is set.
pub fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set global default tracing subscriber");
}
