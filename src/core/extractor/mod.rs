//! # Extractor Module
//!
//! Runs the external image-inspection tool on one file and returns its
//! output untouched.
//!
//! ## Contract
//! Success means exit status 0 **and** an empty diagnostic stream. Anything
//! written to stderr fails the file even if stdout looks usable; there is
//! no partial success and no retry.

mod magick;

pub use magick::{ExtractorConfig, MagickExtractor};

use crate::error::ExtractionError;
use std::path::{Path, PathBuf};

/// Raw structured text produced by the extraction tool for one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDocument {
    /// File the document describes
    pub path: PathBuf,
    /// Tool output, verbatim
    pub text: String,
}

/// Trait for metadata extractors
///
/// Implementations are shared by every worker of the ingestion pool.
pub trait MetadataExtractor: Send + Sync {
    /// Inspect a file that is known to exist
    fn extract(&self, path: &Path) -> Result<RawDocument, ExtractionError>;
}
