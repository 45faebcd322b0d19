//! # Model Module
//!
//! Catalog entities shared by the mapper, the repository, the deduplicator
//! and the materializer.
//!
//! ## Entities
//! - `Image` - technical properties of one file, keyed by absolute filename
//! - `Properties` - camera/capture metadata, at most one per `Image`
//! - `UniqueImage` - marker for the canonical file of a duplicate group

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Technical properties of a RAW file, copied verbatim from the extraction tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    /// Absolute path of the file (catalog key)
    pub filename: String,
    pub format: String,
    pub class: String,
    pub geometry: String,
    pub units: String,
    pub colorspace: String,
    pub image_type: String,
    pub base_type: String,
    pub endianness: String,
    pub depth: String,
    pub rendering_intent: String,
    pub gamma: f64,
    pub matte_color: String,
    pub background_color: String,
    pub border_color: String,
    pub transparent_color: String,
    pub interlace: String,
    pub intensity: String,
    pub compose: String,
    pub page_geometry: String,
    pub dispose: String,
    pub iterations: i64,
    pub compression: String,
    pub orientation: String,
    pub tainted: bool,
    /// Size as reported by the tool (e.g. "24.7MiB")
    pub filesize: String,
    pub number_pixels: String,
    pub pixel_cache_type: String,
    pub pixels_per_second: String,
    pub user_time: String,
    /// Seconds the tool spent on the file
    pub elapsed_time: f64,
    /// Tool version string
    pub version: String,
}

impl Image {
    /// Final path component of the filename, the duplicate grouping key
    pub fn basename(&self) -> String {
        basename_of(&self.filename)
    }
}

/// Camera and capture metadata of a RAW file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Properties {
    pub date_create: DateTime<FixedOffset>,
    pub date_modify: DateTime<FixedOffset>,
    pub date_timestamp: DateTime<FixedOffset>,
    pub dng_camera_model_name: String,
    /// When the shot was taken; drives deduplication windows and the
    /// destination layout
    pub dng_create_date: DateTime<FixedOffset>,
    pub dng_exposure_time: String,
    pub dng_f_number: f64,
    pub dng_focal_length: String,
    pub dng_focal_length_in_35mm_format: String,
    pub dng_gps_altitude: Option<String>,
    pub dng_gps_latitude: Option<String>,
    pub dng_gps_longitude: Option<String>,
    pub dng_iso_setting: i64,
    pub dng_lens: String,
    pub dng_lens_f_stops: f64,
    pub dng_lens_type: Option<String>,
    pub dng_make: String,
    pub dng_max_aperture_at_max_focal: f64,
    pub dng_max_aperture_at_min_focal: f64,
    pub dng_max_aperture_value: f64,
    pub dng_max_focal_length: String,
    pub dng_min_focal_length: String,
    pub dng_software: String,
    pub dng_wb_rb_levels: String,
    /// Pixel-data hash computed by the tool, independent of metadata
    pub signature: String,
    pub xmp_rating: i64,
}

/// A validated extraction result, ready to be persisted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataRecord {
    pub image: Image,
    pub properties: Properties,
}

/// An image together with its properties, if they were persisted
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogEntry {
    pub image: Image,
    pub properties: Option<Properties>,
}

impl CatalogEntry {
    /// Capture date, if properties exist
    pub fn create_date(&self) -> Option<DateTime<FixedOffset>> {
        self.properties.as_ref().map(|p| p.dng_create_date)
    }
}

/// Marker row: this filename is the canonical member of its duplicate group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UniqueImage {
    pub id: i64,
    pub image_filename: String,
}

/// Row counts of the three catalog tables
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogCounts {
    pub images: usize,
    pub properties: usize,
    pub unique_images: usize,
}

/// Final path component of a filename string
pub fn basename_of(filename: &str) -> String {
    Path::new(filename)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| filename.to_string())
}

/// Parse a timestamp as written by the extraction tool.
///
/// Accepts RFC 3339, naive ISO-8601 date-times (taken as UTC) and the
/// EXIF `YYYY:MM:DD HH:MM:SS` layout.
pub fn parse_timestamp(value: &str) -> Option<DateTime<FixedOffset>> {
    let value = value.trim();

    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed);
    }
    if let Ok(parsed) = DateTime::parse_from_rfc2822(value) {
        return Some(parsed);
    }

    const ZONED_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f%:z", "%Y:%m:%d %H:%M:%S%.f%:z"];
    for format in ZONED_FORMATS {
        if let Ok(parsed) = DateTime::parse_from_str(value, format) {
            return Some(parsed);
        }
    }

    const NAIVE_FORMATS: &[&str] = &[
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y:%m:%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ];
    for format in NAIVE_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(value, format) {
            return Some(parsed.and_utc().fixed_offset());
        }
    }

    None
}

/// Parse a bare calendar date in one of the common layouts.
///
/// Month names may be full or abbreviated. Slash and dot layouts are only
/// accepted year-first or day-first-with-dots, never the ambiguous `01/02/2022`.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    const DATE_FORMATS: &[&str] = &[
        "%Y-%m-%d",
        "%Y/%m/%d",
        "%Y:%m:%d",
        "%Y.%m.%d",
        "%Y%m%d",
        "%d.%m.%Y",
        "%d %B %Y",
        "%d-%b-%Y",
        "%B %d, %Y",
        "%B %d %Y",
    ];

    let value = value.trim();
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn basename_ignores_directories() {
        assert_eq!(basename_of("/a/b/DSC02029.ARW"), "DSC02029.ARW");
        assert_eq!(basename_of("DSC02029.ARW"), "DSC02029.ARW");
    }

    #[test]
    fn parses_rfc3339_with_offset() {
        let parsed = parse_timestamp("2022-10-07T18:20:11+02:00").unwrap();
        assert_eq!(parsed.offset().local_minus_utc(), 2 * 3600);
        assert_eq!(parsed.hour(), 18);
    }

    #[test]
    fn naive_timestamps_are_utc() {
        let parsed = parse_timestamp("2022-10-01T12:01:02").unwrap();
        assert_eq!(parsed.offset().local_minus_utc(), 0);
        assert_eq!(parsed.day(), 1);
        assert_eq!(parsed.second(), 2);
    }

    #[test]
    fn parses_exif_layout() {
        let parsed = parse_timestamp("2022:10:05 08:00:00").unwrap();
        assert_eq!((parsed.year(), parsed.month(), parsed.day()), (2022, 10, 5));
    }

    #[test]
    fn parses_mail_style_and_minute_precision() {
        let parsed = parse_timestamp("Sat, 1 Oct 2022 12:01:02 +0200").unwrap();
        assert_eq!(parsed.offset().local_minus_utc(), 2 * 3600);
        assert_eq!(parsed.hour(), 12);

        let parsed = parse_timestamp("2022-10-01 12:01").unwrap();
        assert_eq!((parsed.hour(), parsed.minute(), parsed.second()), (12, 1, 0));
    }

    #[test]
    fn rejects_garbage_timestamp() {
        assert!(parse_timestamp("yesterday afternoon").is_none());
        assert!(parse_timestamp("").is_none());
    }

    #[test]
    fn parses_bare_dates() {
        let expected = NaiveDate::from_ymd_opt(2022, 10, 1).unwrap();
        assert_eq!(parse_date("2022-10-01"), Some(expected));
        assert_eq!(parse_date("2022/10/01"), Some(expected));
        assert_eq!(parse_date("1 October 2022"), Some(expected));
        assert_eq!(parse_date("1 Oct 2022"), Some(expected));
        assert_eq!(parse_date("01-Oct-2022"), Some(expected));
        assert_eq!(parse_date("Oct 1, 2022"), Some(expected));
        assert_eq!(parse_date("October 1 2022"), Some(expected));
        assert_eq!(parse_date("01.10.2022"), Some(expected));
        assert_eq!(parse_date("10/01/2022"), None);
        assert_eq!(parse_date("not a date"), None);
    }
}
