//! # Materializer Module
//!
//! Copies canonical files into a `{year}/{month}/{day}` tree.
//!
//! Path components are unpadded (`2022/10/1`) and come from the capture
//! date in its own recorded offset. Sources are never modified.

mod executor;

pub use executor::{copy_into, CopyOutcome};

use crate::core::repository::LibraryRepository;
use crate::error::{MaterializationError, Result};
use crate::events::{Event, EventSender, MaterializeEvent};
use chrono::{DateTime, Datelike, FixedOffset};
use serde::Serialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

/// Outcome of one materialization pass
#[derive(Debug, Clone, Default, Serialize)]
pub struct MaterializeReport {
    pub copied: usize,
    /// Destination already held the file or one with its name
    pub skipped: usize,
    pub failed: usize,
    pub errors: Vec<String>,
}

/// Directory a file captured at `date` belongs in
pub fn destination_dir(root: &Path, date: DateTime<FixedOffset>) -> PathBuf {
    root.join(date.year().to_string())
        .join(date.month().to_string())
        .join(date.day().to_string())
}

/// Copies every registered unique image into the destination tree
pub struct Materializer<'a> {
    repository: &'a dyn LibraryRepository,
    destination: PathBuf,
}

impl<'a> Materializer<'a> {
    pub fn new(repository: &'a dyn LibraryRepository, destination: impl Into<PathBuf>) -> Self {
        Self {
            repository,
            destination: destination.into(),
        }
    }

    /// Copy each canonical file; per-file failures are logged and counted
    pub fn run(&self, events: &EventSender) -> Result<MaterializeReport> {
        let entries = self.repository.list_unique_images()?;

        info!(
            "Materializing {} unique images into {}",
            entries.len(),
            self.destination.display()
        );
        events.send(Event::Materialize(MaterializeEvent::Started {
            total_files: entries.len(),
        }));

        let mut report = MaterializeReport::default();
        let mut created_dirs: HashSet<PathBuf> = HashSet::new();

        for entry in &entries {
            let filename = &entry.image.filename;
            let result = entry
                .create_date()
                .ok_or_else(|| MaterializationError::MissingCaptureDate {
                    filename: filename.clone(),
                })
                .and_then(|date| {
                    let directory = destination_dir(&self.destination, date);
                    ensure_dir(&directory, &mut created_dirs)?;
                    copy_into(Path::new(filename), &directory)
                });

            match result {
                Ok(CopyOutcome::Copied(to)) => {
                    debug!("Copied {} to {}", filename, to.display());
                    report.copied += 1;
                    events.send(Event::Materialize(MaterializeEvent::Copied {
                        from: PathBuf::from(filename),
                        to,
                    }));
                }
                Ok(CopyOutcome::AlreadyPresent(to)) => {
                    warn!("{} already exists, not copying {}", to.display(), filename);
                    report.skipped += 1;
                    events.send(Event::Materialize(MaterializeEvent::Skipped {
                        from: PathBuf::from(filename),
                        to,
                    }));
                }
                Ok(CopyOutcome::SameFile(to)) => {
                    debug!("{} is already in place", to.display());
                    report.skipped += 1;
                    events.send(Event::Materialize(MaterializeEvent::Skipped {
                        from: PathBuf::from(filename),
                        to,
                    }));
                }
                Err(e) => {
                    error!("Failed to materialize {}: {}", filename, e);
                    report.failed += 1;
                    report.errors.push(e.to_string());
                    events.send(Event::Materialize(MaterializeEvent::Failed {
                        filename: filename.clone(),
                        message: e.to_string(),
                    }));
                }
            }
        }

        info!(
            "Materialization complete: {} copied, {} skipped, {} failed",
            report.copied, report.skipped, report.failed
        );
        events.send(Event::Materialize(MaterializeEvent::Completed {
            copied: report.copied,
            skipped: report.skipped,
            failed: report.failed,
        }));

        Ok(report)
    }
}

fn ensure_dir(
    directory: &Path,
    created: &mut HashSet<PathBuf>,
) -> std::result::Result<(), MaterializationError> {
    if created.contains(directory) {
        return Ok(());
    }
    fs::create_dir_all(directory).map_err(|e| MaterializationError::CreateDirectory {
        path: directory.to_path_buf(),
        source: e,
    })?;
    created.insert(directory.to_path_buf());
    Ok(())
}
