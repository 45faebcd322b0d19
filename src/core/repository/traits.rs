//! Repository trait definition.

use crate::core::model::{CatalogCounts, CatalogEntry, Image, Properties, UniqueImage};
use crate::error::PersistenceError;
use chrono::{DateTime, FixedOffset};

/// Catalog operations used by the pipeline phases
pub trait LibraryRepository: Send + Sync {
    fn find_image_by_filename(&self, filename: &str) -> Result<Option<Image>, PersistenceError>;

    fn find_properties_by_filename(
        &self,
        filename: &str,
    ) -> Result<Option<Properties>, PersistenceError>;

    /// Images whose filename ends with `basename`, in insertion order.
    ///
    /// This is a suffix match: `IMG001.ARW` also matches `/a/XIMG001.ARW`.
    /// Callers that need exact basename equality must filter the result.
    fn find_images_by_basename(&self, basename: &str)
        -> Result<Vec<CatalogEntry>, PersistenceError>;

    /// Images whose capture date lies in `[from, to]`, in insertion order.
    ///
    /// Images without properties are never returned.
    fn find_images_by_date_range(
        &self,
        from: DateTime<FixedOffset>,
        to: DateTime<FixedOffset>,
    ) -> Result<Vec<CatalogEntry>, PersistenceError>;

    /// Insert an image; `Ok(None)` if the filename is already catalogued
    fn create_image(&self, image: &Image) -> Result<Option<Image>, PersistenceError>;

    /// Attach properties to an existing image.
    ///
    /// Returns `Ok(None)` when the image does not exist or already has
    /// properties.
    fn create_properties(
        &self,
        properties: &Properties,
        filename: &str,
    ) -> Result<Option<Properties>, PersistenceError>;

    fn find_unique_image_by_filename(
        &self,
        filename: &str,
    ) -> Result<Option<UniqueImage>, PersistenceError>;

    /// Register a canonical filename; `Ok(None)` if it is already registered
    fn add_unique_image(&self, filename: &str) -> Result<Option<UniqueImage>, PersistenceError>;

    /// Every registered unique image with its catalog data, in registration order
    fn list_unique_images(&self) -> Result<Vec<CatalogEntry>, PersistenceError>;

    fn counts(&self) -> Result<CatalogCounts, PersistenceError>;

    /// Whether both the image and its properties are stored.
    ///
    /// Files for which this holds are skipped by later scans.
    fn is_fully_persisted(&self, filename: &str) -> Result<bool, PersistenceError> {
        if self.find_image_by_filename(filename)?.is_none() {
            return Ok(false);
        }
        Ok(self.find_properties_by_filename(filename)?.is_some())
    }
}
