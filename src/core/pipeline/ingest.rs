//! Concurrent extraction with single-threaded persistence.
//!
//! Workers only extract and parse. Every validated record travels back over
//! a channel and is written by the thread that called [`ingest_files`], in
//! the order the workers finish.

use crate::core::extractor::MetadataExtractor;
use crate::core::mapper::parse_document;
use crate::core::model::MetadataRecord;
use crate::core::repository::LibraryRepository;
use crate::core::scanner::RawFile;
use crate::error::{LibraryError, PersistenceError, Result};
use crate::events::{Event, EventSender, IngestEvent, IngestProgress};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Outcome of the ingestion phase
#[derive(Debug, Clone, Default, Serialize)]
pub struct IngestReport {
    /// RAW files found under the source root
    pub discovered: usize,
    /// Files skipped because the catalog already holds them
    pub already_persisted: usize,
    /// Files whose image and properties were written in this run
    pub saved: usize,
    /// Files that failed extraction, validation or persistence
    pub failed: usize,
    pub errors: Vec<String>,
}

/// What persisting one record did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Persisted {
    Saved,
    AlreadyPresent,
}

type WorkerResult = (PathBuf, Result<MetadataRecord>);

/// Extract `files` on a pool of `workers` threads and persist the results.
///
/// The report is updated in place so scan-phase counts are kept.
pub(super) fn ingest_files(
    files: Vec<RawFile>,
    extractor: Arc<dyn MetadataExtractor>,
    repository: &dyn LibraryRepository,
    workers: usize,
    report: &mut IngestReport,
    events: &EventSender,
) -> Result<()> {
    let total = files.len();
    events.send(Event::Ingest(IngestEvent::Started {
        total_files: total,
        already_persisted: report.already_persisted,
    }));

    if total > 0 {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("ingest-{}", i))
            .build()
            .map_err(|e| LibraryError::Config(format!("Failed to start worker pool: {}", e)))?;

        let (sender, receiver) = crossbeam_channel::unbounded::<WorkerResult>();

        for file in files {
            let sender = sender.clone();
            let extractor = Arc::clone(&extractor);
            pool.spawn(move || {
                let path = file.path;
                let result = extract_record(extractor.as_ref(), &path);
                let _ = sender.send((path, result));
            });
        }
        // The receiver loop ends once every worker has dropped its clone
        drop(sender);

        for (index, (path, result)) in receiver.iter().enumerate() {
            events.send(Event::Ingest(IngestEvent::Progress(IngestProgress {
                completed: index + 1,
                total,
                current_path: path.clone(),
            })));

            let outcome = result.and_then(|record| {
                persist_record(repository, &path, &record).map_err(LibraryError::from)
            });

            match outcome {
                Ok(Persisted::Saved) => {
                    info!("Saved {}", path.display());
                    report.saved += 1;
                    events.send(Event::Ingest(IngestEvent::Saved { path }));
                }
                Ok(Persisted::AlreadyPresent) => {
                    debug!("{} is already in the catalog", path.display());
                    report.already_persisted += 1;
                }
                Err(e) => {
                    error!("Skipping {}: {}", path.display(), e);
                    report.failed += 1;
                    report.errors.push(e.to_string());
                    events.send(Event::Ingest(IngestEvent::Failed {
                        path,
                        message: e.to_string(),
                    }));
                }
            }
        }
    }

    info!(
        "Ingestion complete: {} saved, {} failed, {} already catalogued",
        report.saved, report.failed, report.already_persisted
    );
    events.send(Event::Ingest(IngestEvent::Completed {
        saved: report.saved,
        failed: report.failed,
    }));

    Ok(())
}

fn extract_record(extractor: &dyn MetadataExtractor, path: &Path) -> Result<MetadataRecord> {
    let document = extractor.extract(path)?;
    Ok(parse_document(&document)?)
}

/// Write the image, then its properties.
///
/// Properties are only attempted once the image row exists, so a failed
/// image write never leaves orphaned properties behind.
fn persist_record(
    repository: &dyn LibraryRepository,
    scanned: &Path,
    record: &MetadataRecord,
) -> std::result::Result<Persisted, PersistenceError> {
    let filename = &record.image.filename;
    if Path::new(filename) != scanned {
        warn!(
            "Metadata tool reported {} for {}; cataloguing under the reported name",
            filename,
            scanned.display()
        );
    }

    let image_created = repository.create_image(&record.image)?.is_some();
    let properties_created = repository
        .create_properties(&record.properties, filename)?
        .is_some();

    if image_created || properties_created {
        Ok(Persisted::Saved)
    } else {
        Ok(Persisted::AlreadyPresent)
    }
}
