//! # Scanner Module
//!
//! Discovers camera RAW files in a directory tree.
//!
//! ## Matching
//! Files are matched by extension, case-sensitively by default, so the
//! default configuration behaves like the `**/*.ARW` glob.
//!
//! ## Example
//! ```rust,ignore
//! use raw_library::core::scanner::{RawFileScanner, ScanConfig};
//!
//! let scanner = RawFileScanner::new(ScanConfig::default());
//! let result = scanner.scan(Path::new("/Volumes/card"))?;
//! ```

mod filter;
mod walker;

pub use filter::RawFilter;
pub use walker::{RawFileScanner, ScanConfig};

use crate::error::ScanError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Represents a discovered RAW file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawFile {
    /// Absolute path to the file
    pub path: PathBuf,
    /// File size in bytes
    pub size: u64,
}

impl RawFile {
    /// The catalog key for this file
    pub fn filename(&self) -> String {
        self.path.display().to_string()
    }
}

/// Result of a scan operation
#[derive(Debug)]
pub struct ScanResult {
    /// Successfully discovered files, in walk order
    pub files: Vec<RawFile>,
    /// Errors that occurred during scanning (non-fatal)
    pub errors: Vec<ScanError>,
}
