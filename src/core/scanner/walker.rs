//! Directory walking implementation using walkdir.

use super::{filter::RawFilter, RawFile, ScanResult};
use crate::error::ScanError;
use crate::events::{Event, EventSender, ScanEvent};
use std::fs;
use std::path::Path;
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Configuration for the directory scanner
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Whether to follow symbolic links
    pub follow_symlinks: bool,
    /// Whether to include dot-files and descend into dot-directories
    pub include_hidden: bool,
    /// Extensions to include, without the leading dot
    pub extensions: Vec<String>,
    /// Whether extensions are matched ignoring case
    pub ignore_case: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            follow_symlinks: false,
            include_hidden: true,
            extensions: vec!["ARW".to_string()],
            ignore_case: false,
        }
    }
}

/// Scanner implementation using the walkdir crate
pub struct RawFileScanner {
    config: ScanConfig,
    filter: RawFilter,
}

impl RawFileScanner {
    /// Create a new scanner with the given configuration
    pub fn new(config: ScanConfig) -> Self {
        let filter = RawFilter::new()
            .with_hidden(config.include_hidden)
            .with_ignore_case(config.ignore_case)
            .with_extensions(config.extensions.clone());

        Self { config, filter }
    }

    /// Scan a directory tree without progress events
    pub fn scan(&self, root: &Path) -> Result<ScanResult, ScanError> {
        self.scan_with_events(root, &crate::events::null_sender())
    }

    /// Scan a directory tree, reporting each file found.
    ///
    /// The root is canonicalized first so every returned path is absolute.
    /// A missing root is fatal; unreadable entries below it are collected
    /// as non-fatal errors.
    pub fn scan_with_events(
        &self,
        root: &Path,
        events: &EventSender,
    ) -> Result<ScanResult, ScanError> {
        events.send(Event::Scan(ScanEvent::Started {
            root: root.to_path_buf(),
        }));

        let root = fs::canonicalize(root).map_err(|_| ScanError::DirectoryNotFound {
            path: root.to_path_buf(),
        })?;

        if !root.is_dir() {
            return Err(ScanError::DirectoryNotFound { path: root });
        }

        debug!(root = %root.display(), "Searching for RAW files");

        let mut files = Vec::new();
        let mut errors = Vec::new();

        let walker = WalkDir::new(&root)
            .follow_links(self.config.follow_symlinks)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                // Skip hidden directories unless configured otherwise
                self.config.include_hidden
                    || entry.depth() == 0
                    || !entry.file_type().is_dir()
                    || !entry.file_name().to_string_lossy().starts_with('.')
            });

        for entry_result in walker {
            match entry_result {
                Ok(entry) => {
                    if !entry.file_type().is_file() && !entry.path().is_file() {
                        continue;
                    }

                    let path = entry.path();
                    if !self.filter.should_include(path) {
                        continue;
                    }

                    match fs::metadata(path) {
                        Ok(metadata) => {
                            let file = RawFile {
                                path: path.to_path_buf(),
                                size: metadata.len(),
                            };

                            events.send(Event::Scan(ScanEvent::FileFound {
                                path: file.path.clone(),
                            }));

                            files.push(file);
                        }
                        Err(e) => {
                            let error = ScanError::ReadDirectory {
                                path: path.to_path_buf(),
                                source: e,
                            };
                            warn!("{}", error);
                            events.send(Event::Scan(ScanEvent::Error {
                                path: path.to_path_buf(),
                                message: error.to_string(),
                            }));
                            errors.push(error);
                        }
                    }
                }
                Err(e) => {
                    let path = e.path().map(|p| p.to_path_buf()).unwrap_or_default();

                    let error = if e.io_error().map(|e| e.kind())
                        == Some(std::io::ErrorKind::PermissionDenied)
                    {
                        ScanError::PermissionDenied { path: path.clone() }
                    } else {
                        ScanError::ReadDirectory {
                            path: path.clone(),
                            source: std::io::Error::other(e.to_string()),
                        }
                    };

                    warn!("{}", error);
                    events.send(Event::Scan(ScanEvent::Error {
                        path,
                        message: error.to_string(),
                    }));

                    errors.push(error);
                }
            }
        }

        events.send(Event::Scan(ScanEvent::Completed {
            total_files: files.len(),
        }));

        Ok(ScanResult { files, errors })
    }
}
