//! # Core Module
//!
//! The front-end agnostic RAW catalog engine.
//!
//! ## Modules
//! - `scanner` - Discovers RAW files in directories
//! - `extractor` - Runs the external metadata tool
//! - `mapper` - Validates tool output into typed records
//! - `model` - Catalog entities
//! - `repository` - Persists images, properties and unique markers
//! - `dedup` - Classifies duplicates by basename and capture date
//! - `materializer` - Copies unique images into a date tree
//! - `pipeline` - Orchestrates the full workflow

pub mod dedup;
pub mod extractor;
pub mod mapper;
pub mod materializer;
pub mod model;
pub mod pipeline;
pub mod repository;
pub mod scanner;

// Re-export commonly used types
pub use dedup::{DateWindow, DedupReport};
pub use extractor::{MagickExtractor, MetadataExtractor, RawDocument};
pub use materializer::MaterializeReport;
pub use model::{CatalogEntry, Image, MetadataRecord, Properties, UniqueImage};
pub use pipeline::{IngestReport, Pipeline, PipelineResult};
pub use repository::{LibraryRepository, SqliteRepository};
pub use scanner::RawFile;
