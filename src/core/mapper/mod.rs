//! # Mapper Module
//!
//! Turns the tool's raw text into a validated [`MetadataRecord`].
//!
//! ## Validation
//! Every persisted attribute has exactly one source label in the document.
//! A missing required label, or a value that does not convert to the
//! attribute's type, rejects the whole document; nothing of it is stored.

mod document;

#[cfg(test)]
pub(crate) mod fixtures;

use self::document::Section;
use crate::core::extractor::RawDocument;
use crate::core::model::{Image, MetadataRecord, Properties};
use crate::error::ValidationError;
use serde_yaml::Value;

/// Top-level key of an `identify -verbose` document
pub const IMAGE_SECTION: &str = "Image";
/// Nested group holding camera and capture metadata
pub const PROPERTIES_SECTION: &str = "Properties";

const RGB_CHANNELS: [&str; 3] = ["Red", "Green", "Blue"];
const CHROMATICITY_LABELS: [&str; 4] =
    ["red primary", "green primary", "blue primary", "white point"];

/// Parse and validate one extraction result
pub fn parse_document(document: &RawDocument) -> Result<MetadataRecord, ValidationError> {
    let tree: Value =
        serde_yaml::from_str(&document.text).map_err(|e| ValidationError::Malformed {
            path: document.path.clone(),
            reason: e.to_string(),
        })?;

    let image = Section::root(&document.path, &tree, IMAGE_SECTION)?;
    let properties = image.section(PROPERTIES_SECTION)?;
    validate_groups(&image)?;

    Ok(MetadataRecord {
        image: map_image(&image)?,
        properties: map_properties(&properties)?,
    })
}

fn map_image(s: &Section<'_>) -> Result<Image, ValidationError> {
    Ok(Image {
        filename: s.text("Filename")?,
        format: s.text("Format")?,
        class: s.text("Class")?,
        geometry: s.text("Geometry")?,
        units: s.text("Units")?,
        colorspace: s.text("Colorspace")?,
        image_type: s.text("Type")?,
        base_type: s.text("Base type")?,
        endianness: s.text("Endianness")?,
        depth: s.text("Depth")?,
        rendering_intent: s.text("Rendering intent")?,
        gamma: s.float("Gamma")?,
        matte_color: s.text("Matte color")?,
        background_color: s.text("Background color")?,
        border_color: s.text("Border color")?,
        transparent_color: s.text("Transparent color")?,
        interlace: s.text("Interlace")?,
        intensity: s.text("Intensity")?,
        compose: s.text("Compose")?,
        page_geometry: s.text("Page geometry")?,
        dispose: s.text("Dispose")?,
        iterations: s.integer("Iterations")?,
        compression: s.text("Compression")?,
        orientation: s.text("Orientation")?,
        tainted: s.boolean("Tainted")?,
        filesize: s.text("Filesize")?,
        number_pixels: s.text("Number pixels")?,
        pixel_cache_type: s.text("Pixel cache type")?,
        pixels_per_second: s.text("Pixels per second")?,
        user_time: s.text("User time")?,
        elapsed_time: s.seconds("Elapsed time")?,
        version: s.text("Version")?,
    })
}

/// Check the nested groups that are required but not stored
fn validate_groups(image: &Section<'_>) -> Result<(), ValidationError> {
    let depth = image.section("Channel depth")?;
    for channel in RGB_CHANNELS {
        depth.text(channel)?;
    }

    let channels = image.section("Channel statistics")?;
    channels.integer("Pixels")?;
    for channel in RGB_CHANNELS {
        validate_statistics(&channels.section(channel)?)?;
    }

    validate_statistics(&image.section("Image statistics")?.section("Overall")?)?;

    let chromaticity = image.section("Chromaticity")?;
    for label in CHROMATICITY_LABELS {
        chromaticity.text(label)?;
    }

    image.section("Profiles")?.text("Profile-xmp")?;
    image.section("Artifacts")?.boolean("verbose")?;
    Ok(())
}

fn validate_statistics(s: &Section<'_>) -> Result<(), ValidationError> {
    for label in ["min", "max", "mean", "median", "standard deviation"] {
        s.text(label)?;
    }
    for label in ["kurtosis", "skewness", "entropy"] {
        s.float(label)?;
    }
    Ok(())
}

fn map_properties(s: &Section<'_>) -> Result<Properties, ValidationError> {
    Ok(Properties {
        date_create: s.timestamp("date:create")?,
        date_modify: s.timestamp("date:modify")?,
        date_timestamp: s.timestamp("date:timestamp")?,
        dng_camera_model_name: s.text("dng:camera.model.name")?,
        dng_create_date: s.timestamp("dng:create.date")?,
        dng_exposure_time: s.text("dng:exposure.time")?,
        dng_f_number: s.float("dng:f.number")?,
        dng_focal_length: s.text("dng:focal.length")?,
        dng_focal_length_in_35mm_format: s.text("dng:focal.length.in.35mm.format")?,
        dng_gps_altitude: s.optional_text("dng:gps.altitude")?,
        dng_gps_latitude: s.optional_text("dng:gps.latitude")?,
        dng_gps_longitude: s.optional_text("dng:gps.longitude")?,
        dng_iso_setting: s.integer("dng:iso.setting")?,
        dng_lens: s.text("dng:lens")?,
        dng_lens_f_stops: s.float("dng:lens.f.stops")?,
        dng_lens_type: s.nullable_text("dng:lens.type")?,
        dng_make: s.text("dng:make")?,
        dng_max_aperture_at_max_focal: s.float("dng:max.aperture.at.max.focal")?,
        dng_max_aperture_at_min_focal: s.float("dng:max.aperture.at.min.focal")?,
        dng_max_aperture_value: s.float("dng:max.aperture.value")?,
        dng_max_focal_length: s.text("dng:max.focal.length")?,
        dng_min_focal_length: s.text("dng:min.focal.length")?,
        dng_software: s.text("dng:software")?,
        dng_wb_rb_levels: s.text("dng:wb.rb.levels")?,
        signature: s.text("signature")?,
        xmp_rating: s.integer("xmp:Rating")?,
    })
}
