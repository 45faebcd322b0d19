//! Event type definitions for progress reporting.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// All events emitted by the pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    /// Directory scan events
    Scan(ScanEvent),
    /// Metadata extraction and persistence events
    Ingest(IngestEvent),
    /// Duplicate detection events
    Dedup(DedupEvent),
    /// Destination copy events
    Materialize(MaterializeEvent),
    /// Pipeline-level events
    Pipeline(PipelineEvent),
}

/// Events during the scanning phase
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ScanEvent {
    /// Scanning has started
    Started { root: PathBuf },
    /// A RAW file was found
    FileFound { path: PathBuf },
    /// An error occurred but scanning continues
    Error { path: PathBuf, message: String },
    /// Scanning completed
    Completed { total_files: usize },
}

/// Events during the ingestion phase
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum IngestEvent {
    /// Extraction has started for the files not yet in the catalog
    Started { total_files: usize, already_persisted: usize },
    /// A worker result was consumed
    Progress(IngestProgress),
    /// Image and properties rows were written
    Saved { path: PathBuf },
    /// The file was skipped; the batch continues
    Failed { path: PathBuf, message: String },
    /// Ingestion completed
    Completed { saved: usize, failed: usize },
}

/// Progress information during ingestion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestProgress {
    /// Results consumed so far
    pub completed: usize,
    /// Total files submitted to the worker pool
    pub total: usize,
    /// File whose result was just consumed
    pub current_path: PathBuf,
}

/// Events during the deduplication phase
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DedupEvent {
    /// Deduplication has started over the images in the window
    Started { candidates: usize },
    /// A file became the canonical member of its group
    Unique { filename: String },
    /// A file was classified as a duplicate of a canonical file
    Duplicate { filename: String, canonical: String },
    /// Duplicates by metadata whose content signatures disagree
    SignatureMismatch { filename: String, canonical: String },
    /// Deduplication completed
    Completed { unique: usize, duplicates: usize },
}

/// Events during the materialization phase
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum MaterializeEvent {
    /// Copying has started
    Started { total_files: usize },
    /// A file was copied into the destination tree
    Copied { from: PathBuf, to: PathBuf },
    /// The destination already holds a file with that name
    Skipped { from: PathBuf, to: PathBuf },
    /// The copy failed; remaining files are still processed
    Failed { filename: String, message: String },
    /// Copying completed
    Completed { copied: usize, skipped: usize, failed: usize },
}

/// Pipeline-level events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PipelineEvent {
    /// Pipeline has started
    Started,
    /// Moving to a new phase
    PhaseChanged { phase: PipelinePhase },
    /// Pipeline completed successfully
    Completed { summary: PipelineSummary },
}

/// Phases of the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PipelinePhase {
    Scanning,
    Ingesting,
    Deduplicating,
    Materializing,
}

/// Summary of pipeline results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSummary {
    /// RAW files found under the source root
    pub total_files: usize,
    /// Files written to the catalog in this run
    pub saved: usize,
    /// Canonical files in the window
    pub unique: usize,
    /// Files classified as duplicates
    pub duplicates: usize,
    /// Files copied to the destination
    pub copied: usize,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl std::fmt::Display for PipelinePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelinePhase::Scanning => write!(f, "Scanning"),
            PipelinePhase::Ingesting => write!(f, "Ingesting"),
            PipelinePhase::Deduplicating => write!(f, "Deduplicating"),
            PipelinePhase::Materializing => write!(f, "Materializing"),
        }
    }
}
