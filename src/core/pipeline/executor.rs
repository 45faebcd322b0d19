//! Pipeline execution implementation.

use super::ingest::{ingest_files, IngestReport};
use crate::core::dedup::{DateWindow, DedupReport, Deduplicator};
use crate::core::extractor::{MagickExtractor, MetadataExtractor};
use crate::core::materializer::{MaterializeReport, Materializer};
use crate::core::model::CatalogCounts;
use crate::core::repository::{LibraryRepository, SqliteRepository, DEFAULT_DATABASE};
use crate::core::scanner::{RawFile, RawFileScanner, ScanConfig};
use crate::error::{LibraryError, Result};
use crate::events::{null_sender, Event, EventSender, PipelineEvent, PipelinePhase, PipelineSummary};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Default size of the extraction worker pool
pub const DEFAULT_WORKERS: usize = 4;

/// Result of pipeline execution
#[derive(Debug, Clone, Serialize)]
pub struct PipelineResult {
    pub ingest: IngestReport,
    pub dedup: DedupReport,
    /// `None` when materialization was disabled
    pub materialize: Option<MaterializeReport>,
    /// Catalog row counts after the run
    pub counts: CatalogCounts,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

/// Configuration for the pipeline
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Directory searched for RAW files
    pub source: PathBuf,
    /// Root of the `{year}/{month}/{day}` tree
    pub destination: PathBuf,
    /// Capture dates considered by deduplication
    pub window: DateWindow,
    /// Extraction worker threads
    pub workers: usize,
    /// Scanner configuration
    pub scan_config: ScanConfig,
    /// Whether unique images are copied to the destination
    pub materialize: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            source: PathBuf::new(),
            destination: PathBuf::new(),
            window: DateWindow::all(),
            workers: DEFAULT_WORKERS,
            scan_config: ScanConfig::default(),
            materialize: true,
        }
    }
}

/// Builder for pipeline configuration
pub struct PipelineBuilder {
    config: PipelineConfig,
    extractor: Option<Arc<dyn MetadataExtractor>>,
    repository: Option<Box<dyn LibraryRepository>>,
}

impl PipelineBuilder {
    /// Create a new pipeline builder
    pub fn new() -> Self {
        Self {
            config: PipelineConfig::default(),
            extractor: None,
            repository: None,
        }
    }

    pub fn source(mut self, source: impl Into<PathBuf>) -> Self {
        self.config.source = source.into();
        self
    }

    pub fn destination(mut self, destination: impl Into<PathBuf>) -> Self {
        self.config.destination = destination.into();
        self
    }

    pub fn window(mut self, window: DateWindow) -> Self {
        self.config.window = window;
        self
    }

    /// Set the number of extraction workers
    pub fn workers(mut self, workers: usize) -> Self {
        self.config.workers = workers;
        self
    }

    /// Set scanner configuration
    pub fn scan_config(mut self, config: ScanConfig) -> Self {
        self.config.scan_config = config;
        self
    }

    /// Set the metadata extractor (defaults to `magick identify -verbose`)
    pub fn extractor(mut self, extractor: Arc<dyn MetadataExtractor>) -> Self {
        self.extractor = Some(extractor);
        self
    }

    /// Set the catalog (defaults to `sqlite.db` in the working directory)
    pub fn repository(mut self, repository: Box<dyn LibraryRepository>) -> Self {
        self.repository = Some(repository);
        self
    }

    /// Enable or disable copying to the destination
    pub fn materialize(mut self, enabled: bool) -> Self {
        self.config.materialize = enabled;
        self
    }

    /// Build the pipeline
    pub fn build(self) -> Result<Pipeline> {
        if self.config.source.as_os_str().is_empty() {
            return Err(LibraryError::Config("No source directory given".to_string()));
        }
        if self.config.materialize && self.config.destination.as_os_str().is_empty() {
            return Err(LibraryError::Config(
                "No destination directory given".to_string(),
            ));
        }
        if self.config.workers == 0 {
            return Err(LibraryError::Config(
                "At least one worker is required".to_string(),
            ));
        }

        let repository = match self.repository {
            Some(repository) => repository,
            None => Box::new(SqliteRepository::open(Path::new(DEFAULT_DATABASE))?),
        };
        let extractor = self
            .extractor
            .unwrap_or_else(|| Arc::new(MagickExtractor::default()));

        Ok(Pipeline {
            config: self.config,
            extractor,
            repository,
        })
    }
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// The ingestion, deduplication and materialization pipeline
pub struct Pipeline {
    config: PipelineConfig,
    extractor: Arc<dyn MetadataExtractor>,
    repository: Box<dyn LibraryRepository>,
}

impl Pipeline {
    /// Create a new pipeline builder
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// The catalog this pipeline writes to
    pub fn repository(&self) -> &dyn LibraryRepository {
        self.repository.as_ref()
    }

    /// Run the pipeline without events
    pub fn run(&self) -> Result<PipelineResult> {
        self.run_with_events(&null_sender())
    }

    /// Run every phase in order, reporting progress through `events`
    pub fn run_with_events(&self, events: &EventSender) -> Result<PipelineResult> {
        let start_time = Instant::now();
        events.send(Event::Pipeline(PipelineEvent::Started));

        let ingest = self.ingest(events)?;
        let dedup = self.deduplicate(events)?;
        let materialize = if self.config.materialize {
            Some(self.materialize(events)?)
        } else {
            debug!("Materialization disabled");
            None
        };

        let counts = self.repository.counts()?;
        let duration_ms = start_time.elapsed().as_millis() as u64;

        events.send(Event::Pipeline(PipelineEvent::Completed {
            summary: PipelineSummary {
                total_files: ingest.discovered,
                saved: ingest.saved,
                unique: dedup.unique,
                duplicates: dedup.duplicates.len(),
                copied: materialize.as_ref().map_or(0, |m| m.copied),
                duration_ms,
            },
        }));

        Ok(PipelineResult {
            ingest,
            dedup,
            materialize,
            counts,
            duration_ms,
        })
    }

    /// Scan the source tree and catalog every file not already stored
    pub fn ingest(&self, events: &EventSender) -> Result<IngestReport> {
        events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
            phase: PipelinePhase::Scanning,
        }));

        let scanner = RawFileScanner::new(self.config.scan_config.clone());
        let scan_result = scanner.scan_with_events(&self.config.source, events)?;

        let mut report = IngestReport {
            discovered: scan_result.files.len(),
            ..IngestReport::default()
        };
        for error in scan_result.errors {
            warn!("{}", error);
            report.errors.push(error.to_string());
        }

        let pending = self.pending_files(scan_result.files, &mut report);
        info!(
            "Found {} RAW files, {} not yet catalogued",
            report.discovered,
            pending.len()
        );

        events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
            phase: PipelinePhase::Ingesting,
        }));

        ingest_files(
            pending,
            Arc::clone(&self.extractor),
            self.repository.as_ref(),
            self.config.workers,
            &mut report,
            events,
        )?;

        Ok(report)
    }

    /// Drop files whose image and properties are both catalogued
    fn pending_files(&self, files: Vec<RawFile>, report: &mut IngestReport) -> Vec<RawFile> {
        files
            .into_iter()
            .filter(|file| {
                let filename = file.filename();
                match self.repository.is_fully_persisted(&filename) {
                    Ok(true) => {
                        debug!("{} already in the catalog, skipping", filename);
                        report.already_persisted += 1;
                        false
                    }
                    Ok(false) => true,
                    Err(e) => {
                        error!("Failed to check catalog for {}: {}", filename, e);
                        true
                    }
                }
            })
            .collect()
    }

    /// Classify catalogued images in the configured window
    pub fn deduplicate(&self, events: &EventSender) -> Result<DedupReport> {
        events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
            phase: PipelinePhase::Deduplicating,
        }));

        Deduplicator::new(self.repository.as_ref(), self.config.window).run(events)
    }

    /// Copy every unique image into the destination tree
    pub fn materialize(&self, events: &EventSender) -> Result<MaterializeReport> {
        events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
            phase: PipelinePhase::Materializing,
        }));

        Materializer::new(self.repository.as_ref(), self.config.destination.clone()).run(events)
    }
}
