//! Basename and capture-date duplicate classification.

use super::DateWindow;
use crate::core::model::CatalogEntry;
use crate::core::repository::LibraryRepository;
use crate::error::Result;
use crate::events::{DedupEvent, Event, EventSender};
use serde::Serialize;
use std::collections::HashSet;
use tracing::{debug, error, info, warn};

/// A file judged to be a copy of a canonical file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateMatch {
    pub filename: String,
    pub canonical: String,
    /// Whether the content signatures agree as well
    pub signature_matches: bool,
}

/// Outcome of one deduplication pass
#[derive(Debug, Clone, Default, Serialize)]
pub struct DedupReport {
    /// Images in the window that were classified
    pub examined: usize,
    /// Images classified as canonical in this pass
    pub unique: usize,
    /// Canonical images that had no marker before this pass
    pub newly_registered: usize,
    pub duplicates: Vec<DuplicateMatch>,
    /// Duplicates whose content signatures disagree
    pub signature_mismatches: usize,
}

/// Classifies every catalogued image in a date window
pub struct Deduplicator<'a> {
    repository: &'a dyn LibraryRepository,
    window: DateWindow,
}

/// Per-pass bookkeeping; never persisted
#[derive(Default)]
struct PassState {
    seen_basenames: HashSet<String>,
    registered: HashSet<String>,
}

impl<'a> Deduplicator<'a> {
    pub fn new(repository: &'a dyn LibraryRepository, window: DateWindow) -> Self {
        Self { repository, window }
    }

    /// Classify the images in the window, registering canonical files.
    ///
    /// Images are visited in catalog insertion order, so whichever copy was
    /// ingested first becomes canonical. Canonical markers are only ever
    /// added, never withdrawn.
    pub fn run(&self, events: &EventSender) -> Result<DedupReport> {
        let candidates = self
            .repository
            .find_images_by_date_range(self.window.from(), self.window.to())?;

        info!(
            "Deduplicating {} images between {} and {}",
            candidates.len(),
            self.window.from().to_rfc3339(),
            self.window.to().to_rfc3339()
        );
        events.send(Event::Dedup(DedupEvent::Started {
            candidates: candidates.len(),
        }));

        let mut report = DedupReport::default();
        let mut state = PassState::default();

        for candidate in &candidates {
            if candidate.properties.is_none() {
                continue;
            }
            report.examined += 1;

            let basename = candidate.image.basename();
            if state.seen_basenames.insert(basename.clone()) {
                self.register(candidate, &mut state, &mut report, events);
                continue;
            }

            match self.find_canonical(candidate, &basename, &state) {
                Some(canonical) => self.record_duplicate(candidate, &canonical, &mut report, events),
                None => self.register(candidate, &mut state, &mut report, events),
            }
        }

        info!(
            "Deduplication complete: {} unique, {} duplicates",
            report.unique,
            report.duplicates.len()
        );
        events.send(Event::Dedup(DedupEvent::Completed {
            unique: report.unique,
            duplicates: report.duplicates.len(),
        }));

        Ok(report)
    }

    /// First canonical file in the window that `candidate` duplicates
    fn find_canonical(
        &self,
        candidate: &CatalogEntry,
        basename: &str,
        state: &PassState,
    ) -> Option<CatalogEntry> {
        let others = match self.repository.find_images_by_basename(basename) {
            Ok(others) => others,
            Err(e) => {
                error!("Failed to look up images named {}: {}", basename, e);
                return None;
            }
        };

        others
            .into_iter()
            .filter(|other| other.image.basename() == basename)
            .filter(|other| other.image.filename != candidate.image.filename)
            .filter(|other| other.create_date().is_some_and(|d| self.window.contains(d)))
            .filter(|other| self.is_canonical(&other.image.filename, state))
            .find(|other| same_photo(candidate, other))
    }

    fn is_canonical(&self, filename: &str, state: &PassState) -> bool {
        if state.registered.contains(filename) {
            return true;
        }
        match self.repository.find_unique_image_by_filename(filename) {
            Ok(found) => found.is_some(),
            Err(e) => {
                error!("Failed to check unique marker for {}: {}", filename, e);
                false
            }
        }
    }

    fn register(
        &self,
        entry: &CatalogEntry,
        state: &mut PassState,
        report: &mut DedupReport,
        events: &EventSender,
    ) {
        let filename = &entry.image.filename;

        match self.repository.add_unique_image(filename) {
            Ok(Some(_)) => {
                info!("Registered {} as unique", filename);
                report.newly_registered += 1;
            }
            Ok(None) => debug!("{} was already registered as unique", filename),
            // Already logged by the repository
            Err(_) => return,
        }

        state.registered.insert(filename.clone());
        report.unique += 1;
        events.send(Event::Dedup(DedupEvent::Unique {
            filename: filename.clone(),
        }));
    }

    fn record_duplicate(
        &self,
        entry: &CatalogEntry,
        canonical: &CatalogEntry,
        report: &mut DedupReport,
        events: &EventSender,
    ) {
        let filename = entry.image.filename.clone();
        let canonical_name = canonical.image.filename.clone();
        info!("{} is a duplicate of {}", filename, canonical_name);

        let signature_matches = signatures_match(entry, canonical);
        if !signature_matches {
            warn!(
                "{} and {} match by metadata but their content signatures differ",
                filename, canonical_name
            );
            report.signature_mismatches += 1;
            events.send(Event::Dedup(DedupEvent::SignatureMismatch {
                filename: filename.clone(),
                canonical: canonical_name.clone(),
            }));
        }

        events.send(Event::Dedup(DedupEvent::Duplicate {
            filename: filename.clone(),
            canonical: canonical_name.clone(),
        }));
        report.duplicates.push(DuplicateMatch {
            filename,
            canonical: canonical_name,
            signature_matches,
        });
    }
}

/// Same reported filesize and same capture instant
fn same_photo(a: &CatalogEntry, b: &CatalogEntry) -> bool {
    match (a.create_date(), b.create_date()) {
        (Some(date_a), Some(date_b)) => a.image.filesize == b.image.filesize && date_a == date_b,
        _ => false,
    }
}

fn signatures_match(a: &CatalogEntry, b: &CatalogEntry) -> bool {
    match (&a.properties, &b.properties) {
        (Some(pa), Some(pb)) => pa.signature == pb.signature,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::mapper::fixtures::{record, FixtureImage};
    use crate::core::repository::SqliteRepository;
    use crate::events::{null_sender, EventChannel};

    fn ingest(repo: &SqliteRepository, image: FixtureImage) {
        let record = record(image);
        repo.create_image(&record.image).unwrap();
        repo.create_properties(&record.properties, &record.image.filename)
            .unwrap();
    }

    fn october() -> DateWindow {
        DateWindow::parse("2022-10-01", "2022-10-10").unwrap()
    }

    fn unique_names(repo: &SqliteRepository) -> Vec<String> {
        repo.list_unique_images()
            .unwrap()
            .into_iter()
            .map(|e| e.image.filename)
            .collect()
    }

    #[test]
    fn same_basename_size_and_date_is_a_duplicate() {
        let repo = SqliteRepository::open_in_memory().unwrap();
        ingest(&repo, FixtureImage::new("/a/IMG001.ARW").filesize("1000B").create_date("2022-10-01T10:00:00"));
        ingest(&repo, FixtureImage::new("/b/IMG001.ARW").filesize("1000B").create_date("2022-10-01T10:00:00"));
        ingest(&repo, FixtureImage::new("/c/IMG002.ARW").filesize("2000B").create_date("2022-10-05T10:00:00"));

        let report = Deduplicator::new(&repo, october()).run(&null_sender()).unwrap();

        assert_eq!(report.examined, 3);
        assert_eq!(report.unique, 2);
        assert_eq!(
            report.duplicates,
            vec![DuplicateMatch {
                filename: "/b/IMG001.ARW".to_string(),
                canonical: "/a/IMG001.ARW".to_string(),
                signature_matches: true,
            }]
        );
        assert_eq!(unique_names(&repo), vec!["/a/IMG001.ARW", "/c/IMG002.ARW"]);
    }

    #[test]
    fn differing_filesize_keeps_both() {
        let repo = SqliteRepository::open_in_memory().unwrap();
        ingest(&repo, FixtureImage::new("/a/IMG001.ARW").filesize("1000B"));
        ingest(&repo, FixtureImage::new("/b/IMG001.ARW").filesize("1001B"));

        let report = Deduplicator::new(&repo, october()).run(&null_sender()).unwrap();

        assert!(report.duplicates.is_empty());
        assert_eq!(unique_names(&repo), vec!["/a/IMG001.ARW", "/b/IMG001.ARW"]);
    }

    #[test]
    fn differing_capture_date_keeps_both() {
        let repo = SqliteRepository::open_in_memory().unwrap();
        ingest(&repo, FixtureImage::new("/a/IMG001.ARW").create_date("2022-10-01T10:00:00"));
        ingest(&repo, FixtureImage::new("/b/IMG001.ARW").create_date("2022-10-01T10:00:01"));

        let report = Deduplicator::new(&repo, october()).run(&null_sender()).unwrap();

        assert_eq!(report.unique, 2);
        assert!(report.duplicates.is_empty());
    }

    #[test]
    fn third_copy_matches_the_right_representative() {
        let repo = SqliteRepository::open_in_memory().unwrap();
        ingest(&repo, FixtureImage::new("/a/IMG001.ARW").filesize("1000B"));
        ingest(&repo, FixtureImage::new("/b/IMG001.ARW").filesize("2000B"));
        ingest(&repo, FixtureImage::new("/c/IMG001.ARW").filesize("2000B"));

        let report = Deduplicator::new(&repo, october()).run(&null_sender()).unwrap();

        assert_eq!(report.unique, 2);
        assert_eq!(report.duplicates.len(), 1);
        assert_eq!(report.duplicates[0].filename, "/c/IMG001.ARW");
        assert_eq!(report.duplicates[0].canonical, "/b/IMG001.ARW");
    }

    #[test]
    fn similar_basenames_are_not_grouped() {
        let repo = SqliteRepository::open_in_memory().unwrap();
        ingest(&repo, FixtureImage::new("/a/IMG001.ARW"));
        ingest(&repo, FixtureImage::new("/b/XIMG001.ARW"));

        let report = Deduplicator::new(&repo, october()).run(&null_sender()).unwrap();

        assert_eq!(report.unique, 2);
        assert!(report.duplicates.is_empty());
    }

    #[test]
    fn images_outside_window_are_ignored() {
        let repo = SqliteRepository::open_in_memory().unwrap();
        ingest(&repo, FixtureImage::new("/a/IMG001.ARW").create_date("2022-09-15T10:00:00"));
        ingest(&repo, FixtureImage::new("/b/IMG001.ARW").create_date("2022-09-15T10:00:00"));
        ingest(&repo, FixtureImage::new("/c/IMG002.ARW").create_date("2022-10-02T10:00:00"));

        let report = Deduplicator::new(&repo, october()).run(&null_sender()).unwrap();

        assert_eq!(report.examined, 1);
        assert!(report.duplicates.is_empty());
        assert_eq!(unique_names(&repo), vec!["/c/IMG002.ARW"]);
    }

    #[test]
    fn representative_outside_window_is_not_compared() {
        let repo = SqliteRepository::open_in_memory().unwrap();
        ingest(&repo, FixtureImage::new("/a/IMG001.ARW").create_date("2022-09-15T10:00:00"));
        ingest(&repo, FixtureImage::new("/b/IMG001.ARW").create_date("2022-09-15T10:00:00"));

        let september = DateWindow::parse("2022-09-01", "2022-09-30").unwrap();
        Deduplicator::new(&repo, september).run(&null_sender()).unwrap();
        assert_eq!(unique_names(&repo), vec!["/a/IMG001.ARW"]);

        // A later pass over a window that excludes both files changes nothing
        let report = Deduplicator::new(&repo, october()).run(&null_sender()).unwrap();
        assert_eq!(report.examined, 0);
        assert_eq!(unique_names(&repo), vec!["/a/IMG001.ARW"]);
    }

    #[test]
    fn signature_mismatch_is_reported_but_not_acted_on() {
        let repo = SqliteRepository::open_in_memory().unwrap();
        ingest(&repo, FixtureImage::new("/a/IMG001.ARW").signature("aaaa"));
        ingest(&repo, FixtureImage::new("/b/IMG001.ARW").signature("bbbb"));

        let (sender, receiver) = EventChannel::new();
        let report = Deduplicator::new(&repo, october()).run(&sender).unwrap();
        drop(sender);

        assert_eq!(report.signature_mismatches, 1);
        assert_eq!(report.duplicates.len(), 1);
        assert!(!report.duplicates[0].signature_matches);
        assert_eq!(unique_names(&repo), vec!["/a/IMG001.ARW"]);

        let mismatches = receiver
            .iter()
            .filter(|e| matches!(e, Event::Dedup(DedupEvent::SignatureMismatch { .. })))
            .count();
        assert_eq!(mismatches, 1);
    }

    #[test]
    fn rerun_is_stable() {
        let repo = SqliteRepository::open_in_memory().unwrap();
        ingest(&repo, FixtureImage::new("/a/IMG001.ARW"));
        ingest(&repo, FixtureImage::new("/b/IMG001.ARW"));

        let first = Deduplicator::new(&repo, october()).run(&null_sender()).unwrap();
        let second = Deduplicator::new(&repo, october()).run(&null_sender()).unwrap();

        assert_eq!(first.newly_registered, 1);
        assert_eq!(second.newly_registered, 0);
        assert_eq!(second.unique, 1);
        assert_eq!(second.duplicates, first.duplicates);
        assert_eq!(repo.counts().unwrap().unique_images, 1);
    }

    #[test]
    fn copy_arriving_in_a_later_run_is_a_duplicate() {
        let repo = SqliteRepository::open_in_memory().unwrap();
        ingest(&repo, FixtureImage::new("/a/IMG001.ARW"));
        Deduplicator::new(&repo, october()).run(&null_sender()).unwrap();

        ingest(&repo, FixtureImage::new("/b/IMG001.ARW"));
        let report = Deduplicator::new(&repo, october()).run(&null_sender()).unwrap();

        assert_eq!(report.duplicates.len(), 1);
        assert_eq!(report.duplicates[0].canonical, "/a/IMG001.ARW");
        assert_eq!(unique_names(&repo), vec!["/a/IMG001.ARW"]);
    }
}
