//! # Error Module
//!
//! Error types for the RAW library pipeline.
//!
//! ## Design Principles
//! - **Per-file errors never abort a batch** - they are logged and counted
//! - **Include context** - paths, file names, what went wrong
//! - **One enum per component** - the top-level error only wraps them

use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum LibraryError {
    #[error("Scanning error: {0}")]
    Scan(#[from] ScanError),

    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    #[error("Materialization error: {0}")]
    Materialization(#[from] MaterializationError),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Errors that occur while discovering RAW files
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    #[error("Permission denied accessing: {path}")]
    PermissionDenied { path: PathBuf },

    #[error("Failed to read directory {path}: {source}")]
    ReadDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that occur while running the external metadata tool
#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("Failed to start {program} for {path}: {source}")]
    Spawn {
        program: PathBuf,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Metadata tool exited with {} for {path}: {stderr}", exit_label(.code))]
    ToolFailed {
        path: PathBuf,
        code: Option<i32>,
        stderr: String,
    },

    #[error("Metadata tool reported diagnostics for {path}: {stderr}")]
    Diagnostics { path: PathBuf, stderr: String },

    #[error("Metadata tool produced unreadable output for {path}: {reason}")]
    InvalidOutput { path: PathBuf, reason: String },
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {}", code),
        None => "a signal".to_string(),
    }
}

/// Errors that occur while validating a metadata document
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Malformed metadata document for {path}: {reason}")]
    Malformed { path: PathBuf, reason: String },

    #[error("Metadata document for {path} has no '{section}' section")]
    MissingSection { path: PathBuf, section: String },

    #[error("Metadata document for {path} is missing '{label}'")]
    MissingField { path: PathBuf, label: String },

    #[error("Metadata field '{label}' for {path} is not a valid {expected}: {value}")]
    InvalidField {
        path: PathBuf,
        label: String,
        expected: &'static str,
        value: String,
    },
}

/// Errors that occur in the catalog database
#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("Failed to open catalog database at {path}: {reason}")]
    OpenFailed { path: PathBuf, reason: String },

    #[error("Catalog query failed: {0}")]
    QueryFailed(String),

    #[error("Failed to write {entity} for {filename}: {reason}")]
    WriteFailed {
        entity: &'static str,
        filename: String,
        reason: String,
    },

    #[error("Catalog connection is unusable after a panic while it was held")]
    Poisoned,
}

/// Errors that occur while copying unique images into the destination tree
#[derive(Error, Debug)]
pub enum MaterializationError {
    #[error("Failed to create directory {path}: {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to copy {from} to {to}: {source}")]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No capture date recorded for {filename}")]
    MissingCaptureDate { filename: String },

    #[error("Not a file path: {filename}")]
    InvalidSource { filename: String },
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, LibraryError>;
