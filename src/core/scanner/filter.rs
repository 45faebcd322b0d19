//! File filtering logic for the scanner.

use std::collections::HashSet;
use std::path::Path;

/// Filters files to determine if they are RAW files we ingest
pub struct RawFilter {
    /// File extensions to include
    extensions: HashSet<String>,
    /// Whether extensions are compared ignoring case
    ignore_case: bool,
    /// Whether to include hidden files
    include_hidden: bool,
}

impl RawFilter {
    /// Create a new filter accepting Sony `.ARW` files
    pub fn new() -> Self {
        Self {
            extensions: ["ARW".to_string()].into_iter().collect(),
            ignore_case: false,
            include_hidden: true,
        }
    }

    /// Include hidden files (starting with .), the default
    pub fn with_hidden(mut self, include: bool) -> Self {
        self.include_hidden = include;
        self
    }

    /// Compare extensions ignoring ASCII case
    pub fn with_ignore_case(mut self, ignore_case: bool) -> Self {
        self.ignore_case = ignore_case;
        let current = std::mem::take(&mut self.extensions);
        self.extensions = Self::normalize(current.into_iter(), ignore_case);
        self
    }

    /// Override the list of extensions to accept
    pub fn with_extensions(mut self, extensions: Vec<String>) -> Self {
        self.extensions = Self::normalize(extensions.into_iter(), self.ignore_case);
        self
    }

    fn normalize(extensions: impl Iterator<Item = String>, ignore_case: bool) -> HashSet<String> {
        extensions
            .map(|ext| {
                let ext = ext.trim_start_matches('.').to_string();
                if ignore_case {
                    ext.to_lowercase()
                } else {
                    ext
                }
            })
            .collect()
    }

    /// Check if a file should be included
    pub fn should_include(&self, path: &Path) -> bool {
        if !self.include_hidden {
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                if name.starts_with('.') {
                    return false;
                }
            }
        }

        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if self.ignore_case => self.extensions.contains(&ext.to_lowercase()),
            Some(ext) => self.extensions.contains(ext),
            None => false,
        }
    }
}

impl Default for RawFilter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_includes_arw() {
        let filter = RawFilter::new();
        assert!(filter.should_include(Path::new("/photos/DSC02029.ARW")));
    }

    #[test]
    fn filter_is_case_sensitive_by_default() {
        let filter = RawFilter::new();
        assert!(!filter.should_include(Path::new("/photos/DSC02029.arw")));
    }

    #[test]
    fn filter_can_ignore_case() {
        let filter = RawFilter::new().with_ignore_case(true);
        assert!(filter.should_include(Path::new("/photos/DSC02029.arw")));
        assert!(filter.should_include(Path::new("/photos/DSC02029.ARW")));
    }

    #[test]
    fn filter_excludes_other_formats() {
        let filter = RawFilter::new();
        assert!(!filter.should_include(Path::new("/photos/DSC02029.JPG")));
        assert!(!filter.should_include(Path::new("/photos/DSC02029.xmp")));
    }

    #[test]
    fn filter_accepts_custom_extensions() {
        let filter = RawFilter::new().with_extensions(vec![".NEF".to_string(), "CR3".to_string()]);
        assert!(filter.should_include(Path::new("/photos/a.NEF")));
        assert!(filter.should_include(Path::new("/photos/b.CR3")));
        assert!(!filter.should_include(Path::new("/photos/c.ARW")));
    }

    #[test]
    fn filter_includes_hidden_by_default() {
        let filter = RawFilter::new();
        assert!(filter.should_include(Path::new("/photos/.DSC02029.ARW")));
    }

    #[test]
    fn filter_can_exclude_hidden() {
        let filter = RawFilter::new().with_hidden(false);
        assert!(!filter.should_include(Path::new("/photos/.DSC02029.ARW")));
    }

    #[test]
    fn filter_handles_no_extension() {
        let filter = RawFilter::new();
        assert!(!filter.should_include(Path::new("/photos/ARW")));
    }
}
