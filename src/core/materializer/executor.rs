//! Copies a single file into a destination directory.

use crate::error::MaterializationError;
use std::fs;
use std::path::{Path, PathBuf};

/// What happened to one source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CopyOutcome {
    /// The file was copied to this path
    Copied(PathBuf),
    /// A different file with the same name is already there
    AlreadyPresent(PathBuf),
    /// The destination is the source file itself
    SameFile(PathBuf),
}

/// Copy `source` into `directory`, keeping its file name.
///
/// An existing file of that name is never overwritten.
pub fn copy_into(source: &Path, directory: &Path) -> Result<CopyOutcome, MaterializationError> {
    let name = source
        .file_name()
        .ok_or_else(|| MaterializationError::InvalidSource {
            filename: source.display().to_string(),
        })?;
    let destination = directory.join(name);

    if destination.exists() {
        if is_same_file(source, &destination) {
            return Ok(CopyOutcome::SameFile(destination));
        }
        return Ok(CopyOutcome::AlreadyPresent(destination));
    }

    fs::copy(source, &destination).map_err(|e| MaterializationError::Copy {
        from: source.to_path_buf(),
        to: destination.clone(),
        source: e,
    })?;

    Ok(CopyOutcome::Copied(destination))
}

fn is_same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
