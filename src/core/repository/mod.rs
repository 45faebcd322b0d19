//! # Repository Module
//!
//! Durable catalog of ingested images.
//!
//! ## Tables
//! - `images` - one row per absolute filename
//! - `properties` - at most one row per image, removed with it
//! - `unique_images` - canonical filenames chosen by the deduplicator
//!
//! ## Write semantics
//! Creating a row that already exists is not an error: the operation
//! returns `Ok(None)`. Storage failures are logged and returned, and the
//! caller moves on to the next record.

mod sqlite;
mod traits;

pub use sqlite::SqliteRepository;
pub use traits::LibraryRepository;

/// Default catalog file name, relative to the working directory
pub const DEFAULT_DATABASE: &str = "sqlite.db";
