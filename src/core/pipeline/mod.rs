//! # Pipeline Module
//!
//! Orchestrates the full catalog workflow.
//!
//! ## Pipeline Stages
//! 1. **Scan** - Discover RAW files and drop those already catalogued
//! 2. **Ingest** - Extract and validate on a worker pool, persist on the caller
//! 3. **Deduplicate** - Register canonical files within the date window
//! 4. **Materialize** - Copy canonical files into the date tree
//!
//! Stages run strictly one after another. Re-running the pipeline over the
//! same tree is safe: every write is idempotent.

mod executor;
mod ingest;

pub use executor::{Pipeline, PipelineBuilder, PipelineConfig, PipelineResult, DEFAULT_WORKERS};
pub use ingest::IngestReport;
