//! SQLite catalog backend.

use super::LibraryRepository;
use crate::core::model::{CatalogCounts, CatalogEntry, Image, Properties, UniqueImage};
use crate::error::PersistenceError;
use chrono::{DateTime, FixedOffset};
use rusqlite::types::{FromSql, Type};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, error, warn};

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS images (
        filename TEXT PRIMARY KEY,
        format TEXT NOT NULL,
        class TEXT NOT NULL,
        geometry TEXT NOT NULL,
        units TEXT NOT NULL,
        colorspace TEXT NOT NULL,
        type TEXT NOT NULL,
        base_type TEXT NOT NULL,
        endianness TEXT NOT NULL,
        depth TEXT NOT NULL,
        rendering_intent TEXT NOT NULL,
        gamma REAL NOT NULL,
        matte_color TEXT NOT NULL,
        background_color TEXT NOT NULL,
        border_color TEXT NOT NULL,
        transparent_color TEXT NOT NULL,
        interlace TEXT NOT NULL,
        intensity TEXT NOT NULL,
        compose TEXT NOT NULL,
        page_geometry TEXT NOT NULL,
        dispose TEXT NOT NULL,
        iterations INTEGER NOT NULL,
        compression TEXT NOT NULL,
        orientation TEXT NOT NULL,
        tainted INTEGER NOT NULL,
        filesize TEXT NOT NULL,
        number_pixels TEXT NOT NULL,
        pixel_cache_type TEXT NOT NULL,
        pixels_per_second TEXT NOT NULL,
        user_time TEXT NOT NULL,
        elapsed_time REAL NOT NULL,
        version TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS properties (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        image_filename TEXT NOT NULL UNIQUE
            REFERENCES images(filename) ON DELETE CASCADE,
        date_create TEXT NOT NULL,
        date_modify TEXT NOT NULL,
        date_timestamp TEXT NOT NULL,
        dng_camera_model_name TEXT NOT NULL,
        dng_create_date TEXT NOT NULL,
        dng_create_ts INTEGER NOT NULL,
        dng_exposure_time TEXT NOT NULL,
        dng_f_number REAL NOT NULL,
        dng_focal_length TEXT NOT NULL,
        dng_focal_length_in_35mm_format TEXT NOT NULL,
        dng_gps_altitude TEXT,
        dng_gps_latitude TEXT,
        dng_gps_longitude TEXT,
        dng_iso_setting INTEGER NOT NULL,
        dng_lens TEXT NOT NULL,
        dng_lens_f_stops REAL NOT NULL,
        dng_lens_type TEXT,
        dng_make TEXT NOT NULL,
        dng_max_aperture_at_max_focal REAL NOT NULL,
        dng_max_aperture_at_min_focal REAL NOT NULL,
        dng_max_aperture_value REAL NOT NULL,
        dng_max_focal_length TEXT NOT NULL,
        dng_min_focal_length TEXT NOT NULL,
        dng_software TEXT NOT NULL,
        dng_wb_rb_levels TEXT NOT NULL,
        signature TEXT NOT NULL,
        xmp_rating INTEGER NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_properties_create_ts ON properties(dng_create_ts);

    CREATE TABLE IF NOT EXISTS unique_images (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        image_filename TEXT NOT NULL UNIQUE
    );
";

const IMAGE_COLUMNS: &str = "i.filename, i.format, i.class, i.geometry, i.units, i.colorspace,
    i.type, i.base_type, i.endianness, i.depth, i.rendering_intent, i.gamma, i.matte_color,
    i.background_color, i.border_color, i.transparent_color, i.interlace, i.intensity,
    i.compose, i.page_geometry, i.dispose, i.iterations, i.compression, i.orientation,
    i.tainted, i.filesize, i.number_pixels, i.pixel_cache_type, i.pixels_per_second,
    i.user_time, i.elapsed_time, i.version";

const PROPERTY_COLUMNS: &str = "p.date_create, p.date_modify, p.date_timestamp,
    p.dng_camera_model_name, p.dng_create_date, p.dng_exposure_time, p.dng_f_number,
    p.dng_focal_length, p.dng_focal_length_in_35mm_format, p.dng_gps_altitude,
    p.dng_gps_latitude, p.dng_gps_longitude, p.dng_iso_setting, p.dng_lens,
    p.dng_lens_f_stops, p.dng_lens_type, p.dng_make, p.dng_max_aperture_at_max_focal,
    p.dng_max_aperture_at_min_focal, p.dng_max_aperture_value, p.dng_max_focal_length,
    p.dng_min_focal_length, p.dng_software, p.dng_wb_rb_levels, p.signature, p.xmp_rating";

/// SQLite-backed catalog
///
/// A single connection behind a mutex. Writers are expected to be one
/// thread at a time, so the lock is never contended in the pipeline.
pub struct SqliteRepository {
    conn: Mutex<Connection>,
    db_path: PathBuf,
}

impl SqliteRepository {
    /// Open or create a catalog database at the given path
    pub fn open(path: &Path) -> Result<Self, PersistenceError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| PersistenceError::OpenFailed {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        }

        let conn = Connection::open(path).map_err(|e| PersistenceError::OpenFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        // WAL lets readers proceed while a write is in progress
        conn.execute_batch("PRAGMA journal_mode=WAL;")
            .map_err(|e| PersistenceError::QueryFailed(e.to_string()))?;

        Self::initialize(conn, path.to_path_buf())
    }

    /// Open a private catalog that lives only as long as this value
    pub fn open_in_memory() -> Result<Self, PersistenceError> {
        let conn = Connection::open_in_memory().map_err(|e| PersistenceError::OpenFailed {
            path: PathBuf::from(":memory:"),
            reason: e.to_string(),
        })?;
        Self::initialize(conn, PathBuf::from(":memory:"))
    }

    fn initialize(conn: Connection, db_path: PathBuf) -> Result<Self, PersistenceError> {
        conn.execute_batch("PRAGMA foreign_keys=ON;")
            .map_err(|e| PersistenceError::QueryFailed(e.to_string()))?;
        conn.execute_batch(SCHEMA)
            .map_err(|e| PersistenceError::QueryFailed(e.to_string()))?;

        debug!("Catalog ready at {}", db_path.display());

        Ok(Self {
            conn: Mutex::new(conn),
            db_path,
        })
    }

    /// Location of the database file
    pub fn path(&self) -> &Path {
        &self.db_path
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, PersistenceError> {
        self.conn.lock().map_err(|_| PersistenceError::Poisoned)
    }

    fn query_entries(
        &self,
        filter: &str,
        params: &[&dyn rusqlite::ToSql],
    ) -> Result<Vec<CatalogEntry>, PersistenceError> {
        let conn = self.lock()?;
        let sql = format!(
            "SELECT {IMAGE_COLUMNS}, p.id, {PROPERTY_COLUMNS}
             FROM images i
             LEFT JOIN properties p ON p.image_filename = i.filename
             {filter}"
        );

        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| PersistenceError::QueryFailed(e.to_string()))?;

        let entries = stmt
            .query_map(params, |row| read_entry(&mut RowCursor::new(row)))
            .map_err(|e| PersistenceError::QueryFailed(e.to_string()))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| PersistenceError::QueryFailed(e.to_string()))?;

        Ok(entries)
    }
}

impl LibraryRepository for SqliteRepository {
    fn find_image_by_filename(&self, filename: &str) -> Result<Option<Image>, PersistenceError> {
        let conn = self.lock()?;

        conn.query_row(
            &format!("SELECT {IMAGE_COLUMNS} FROM images i WHERE i.filename = ?"),
            [filename],
            |row| read_image(&mut RowCursor::new(row)),
        )
        .optional()
        .map_err(|e| PersistenceError::QueryFailed(e.to_string()))
    }

    fn find_properties_by_filename(
        &self,
        filename: &str,
    ) -> Result<Option<Properties>, PersistenceError> {
        let conn = self.lock()?;

        conn.query_row(
            &format!("SELECT {PROPERTY_COLUMNS} FROM properties p WHERE p.image_filename = ?"),
            [filename],
            |row| read_properties(&mut RowCursor::new(row)),
        )
        .optional()
        .map_err(|e| PersistenceError::QueryFailed(e.to_string()))
    }

    fn find_images_by_basename(
        &self,
        basename: &str,
    ) -> Result<Vec<CatalogEntry>, PersistenceError> {
        let pattern = like_suffix(basename);
        self.query_entries(
            "WHERE i.filename LIKE ?1 ESCAPE '\\' ORDER BY i.rowid",
            &[&pattern],
        )
    }

    fn find_images_by_date_range(
        &self,
        from: DateTime<FixedOffset>,
        to: DateTime<FixedOffset>,
    ) -> Result<Vec<CatalogEntry>, PersistenceError> {
        let from = from.timestamp_millis();
        let to = to.timestamp_millis();
        self.query_entries(
            "WHERE p.dng_create_ts BETWEEN ?1 AND ?2 ORDER BY i.rowid",
            &[&from, &to],
        )
    }

    fn create_image(&self, image: &Image) -> Result<Option<Image>, PersistenceError> {
        let conn = self.lock()?;

        let inserted = conn
            .execute(
                "INSERT OR IGNORE INTO images (
                    filename, format, class, geometry, units, colorspace, type, base_type,
                    endianness, depth, rendering_intent, gamma, matte_color, background_color,
                    border_color, transparent_color, interlace, intensity, compose,
                    page_geometry, dispose, iterations, compression, orientation, tainted,
                    filesize, number_pixels, pixel_cache_type, pixels_per_second, user_time,
                    elapsed_time, version
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15,
                    ?16, ?17, ?18, ?19, ?20, ?21, ?22, ?23, ?24, ?25, ?26, ?27, ?28, ?29, ?30,
                    ?31, ?32)",
                params![
                    image.filename,
                    image.format,
                    image.class,
                    image.geometry,
                    image.units,
                    image.colorspace,
                    image.image_type,
                    image.base_type,
                    image.endianness,
                    image.depth,
                    image.rendering_intent,
                    image.gamma,
                    image.matte_color,
                    image.background_color,
                    image.border_color,
                    image.transparent_color,
                    image.interlace,
                    image.intensity,
                    image.compose,
                    image.page_geometry,
                    image.dispose,
                    image.iterations,
                    image.compression,
                    image.orientation,
                    image.tainted,
                    image.filesize,
                    image.number_pixels,
                    image.pixel_cache_type,
                    image.pixels_per_second,
                    image.user_time,
                    image.elapsed_time,
                    image.version,
                ],
            )
            .map_err(|e| {
                error!("Failed to save image {}: {}", image.filename, e);
                PersistenceError::WriteFailed {
                    entity: "image",
                    filename: image.filename.clone(),
                    reason: e.to_string(),
                }
            })?;

        if inserted == 0 {
            error!("Image {} already exists in the catalog", image.filename);
            return Ok(None);
        }

        Ok(Some(image.clone()))
    }

    fn create_properties(
        &self,
        properties: &Properties,
        filename: &str,
    ) -> Result<Option<Properties>, PersistenceError> {
        let write_failed = |e: rusqlite::Error| {
            error!("Failed to save properties for {}: {}", filename, e);
            PersistenceError::WriteFailed {
                entity: "properties",
                filename: filename.to_string(),
                reason: e.to_string(),
            }
        };

        let mut conn = self.lock()?;
        let tx = conn.transaction().map_err(write_failed)?;

        let parent_exists = tx
            .query_row("SELECT 1 FROM images WHERE filename = ?", [filename], |_| Ok(()))
            .optional()
            .map_err(write_failed)?
            .is_some();
        if !parent_exists {
            error!("Cannot save properties for {}: image is not in the catalog", filename);
            return Ok(None);
        }

        let inserted = tx
            .execute(
                "INSERT OR IGNORE INTO properties (
                    image_filename, date_create, date_modify, date_timestamp,
                    dng_camera_model_name, dng_create_date, dng_create_ts, dng_exposure_time,
                    dng_f_number, dng_focal_length, dng_focal_length_in_35mm_format,
                    dng_gps_altitude, dng_gps_latitude, dng_gps_longitude, dng_iso_setting,
                    dng_lens, dng_lens_f_stops, dng_lens_type, dng_make,
                    dng_max_aperture_at_max_focal, dng_max_aperture_at_min_focal,
                    dng_max_aperture_value, dng_max_focal_length, dng_min_focal_length,
                    dng_software, dng_wb_rb_levels, signature, xmp_rating
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15,
                    ?16, ?17, ?18, ?19, ?20, ?21, ?22, ?23, ?24, ?25, ?26, ?27, ?28)",
                params![
                    filename,
                    properties.date_create.to_rfc3339(),
                    properties.date_modify.to_rfc3339(),
                    properties.date_timestamp.to_rfc3339(),
                    properties.dng_camera_model_name,
                    properties.dng_create_date.to_rfc3339(),
                    properties.dng_create_date.timestamp_millis(),
                    properties.dng_exposure_time,
                    properties.dng_f_number,
                    properties.dng_focal_length,
                    properties.dng_focal_length_in_35mm_format,
                    properties.dng_gps_altitude,
                    properties.dng_gps_latitude,
                    properties.dng_gps_longitude,
                    properties.dng_iso_setting,
                    properties.dng_lens,
                    properties.dng_lens_f_stops,
                    properties.dng_lens_type,
                    properties.dng_make,
                    properties.dng_max_aperture_at_max_focal,
                    properties.dng_max_aperture_at_min_focal,
                    properties.dng_max_aperture_value,
                    properties.dng_max_focal_length,
                    properties.dng_min_focal_length,
                    properties.dng_software,
                    properties.dng_wb_rb_levels,
                    properties.signature,
                    properties.xmp_rating,
                ],
            )
            .map_err(write_failed)?;

        tx.commit().map_err(write_failed)?;

        if inserted == 0 {
            warn!("Properties for {} already exist in the catalog", filename);
            return Ok(None);
        }

        Ok(Some(properties.clone()))
    }

    fn find_unique_image_by_filename(
        &self,
        filename: &str,
    ) -> Result<Option<UniqueImage>, PersistenceError> {
        let conn = self.lock()?;

        conn.query_row(
            "SELECT id, image_filename FROM unique_images WHERE image_filename = ?",
            [filename],
            |row| {
                Ok(UniqueImage {
                    id: row.get(0)?,
                    image_filename: row.get(1)?,
                })
            },
        )
        .optional()
        .map_err(|e| PersistenceError::QueryFailed(e.to_string()))
    }

    fn add_unique_image(&self, filename: &str) -> Result<Option<UniqueImage>, PersistenceError> {
        let conn = self.lock()?;

        let inserted = conn
            .execute(
                "INSERT OR IGNORE INTO unique_images (image_filename) VALUES (?)",
                [filename],
            )
            .map_err(|e| {
                error!("Failed to register unique image {}: {}", filename, e);
                PersistenceError::WriteFailed {
                    entity: "unique image",
                    filename: filename.to_string(),
                    reason: e.to_string(),
                }
            })?;

        if inserted == 0 {
            debug!("{} is already registered as unique", filename);
            return Ok(None);
        }

        Ok(Some(UniqueImage {
            id: conn.last_insert_rowid(),
            image_filename: filename.to_string(),
        }))
    }

    fn list_unique_images(&self) -> Result<Vec<CatalogEntry>, PersistenceError> {
        let conn = self.lock()?;
        let sql = format!(
            "SELECT {IMAGE_COLUMNS}, p.id, {PROPERTY_COLUMNS}
             FROM unique_images u
             JOIN images i ON i.filename = u.image_filename
             LEFT JOIN properties p ON p.image_filename = i.filename
             ORDER BY u.id"
        );

        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| PersistenceError::QueryFailed(e.to_string()))?;

        let entries = stmt
            .query_map([], |row| read_entry(&mut RowCursor::new(row)))
            .map_err(|e| PersistenceError::QueryFailed(e.to_string()))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| PersistenceError::QueryFailed(e.to_string()))?;

        Ok(entries)
    }

    fn counts(&self) -> Result<CatalogCounts, PersistenceError> {
        let conn = self.lock()?;

        let count = |table: &str| -> Result<usize, PersistenceError> {
            conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
                row.get::<_, i64>(0).map(|v| v as usize)
            })
            .map_err(|e| PersistenceError::QueryFailed(e.to_string()))
        };

        Ok(CatalogCounts {
            images: count("images")?,
            properties: count("properties")?,
            unique_images: count("unique_images")?,
        })
    }
}

/// `LIKE` pattern matching any filename that ends with `basename`
fn like_suffix(basename: &str) -> String {
    let mut pattern = String::with_capacity(basename.len() + 1);
    pattern.push('%');
    for c in basename.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern
}

/// Reads consecutive columns from a row
struct RowCursor<'a, 'stmt> {
    row: &'a Row<'stmt>,
    index: usize,
}

impl<'a, 'stmt> RowCursor<'a, 'stmt> {
    fn new(row: &'a Row<'stmt>) -> Self {
        Self { row, index: 0 }
    }

    fn next<T: FromSql>(&mut self) -> rusqlite::Result<T> {
        let value = self.row.get(self.index);
        self.index += 1;
        value
    }

    fn timestamp(&mut self) -> rusqlite::Result<DateTime<FixedOffset>> {
        let index = self.index;
        let text: String = self.next()?;
        DateTime::parse_from_rfc3339(&text)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(index, Type::Text, Box::new(e)))
    }
}

fn read_entry(cursor: &mut RowCursor<'_, '_>) -> rusqlite::Result<CatalogEntry> {
    let image = read_image(cursor)?;
    let properties_id: Option<i64> = cursor.next()?;
    let properties = match properties_id {
        Some(_) => Some(read_properties(cursor)?),
        None => None,
    };
    Ok(CatalogEntry { image, properties })
}

fn read_image(c: &mut RowCursor<'_, '_>) -> rusqlite::Result<Image> {
    Ok(Image {
        filename: c.next()?,
        format: c.next()?,
        class: c.next()?,
        geometry: c.next()?,
        units: c.next()?,
        colorspace: c.next()?,
        image_type: c.next()?,
        base_type: c.next()?,
        endianness: c.next()?,
        depth: c.next()?,
        rendering_intent: c.next()?,
        gamma: c.next()?,
        matte_color: c.next()?,
        background_color: c.next()?,
        border_color: c.next()?,
        transparent_color: c.next()?,
        interlace: c.next()?,
        intensity: c.next()?,
        compose: c.next()?,
        page_geometry: c.next()?,
        dispose: c.next()?,
        iterations: c.next()?,
        compression: c.next()?,
        orientation: c.next()?,
        tainted: c.next()?,
        filesize: c.next()?,
        number_pixels: c.next()?,
        pixel_cache_type: c.next()?,
        pixels_per_second: c.next()?,
        user_time: c.next()?,
        elapsed_time: c.next()?,
        version: c.next()?,
    })
}

fn read_properties(c: &mut RowCursor<'_, '_>) -> rusqlite::Result<Properties> {
    Ok(Properties {
        date_create: c.timestamp()?,
        date_modify: c.timestamp()?,
        date_timestamp: c.timestamp()?,
        dng_camera_model_name: c.next()?,
        dng_create_date: c.timestamp()?,
        dng_exposure_time: c.next()?,
        dng_f_number: c.next()?,
        dng_focal_length: c.next()?,
        dng_focal_length_in_35mm_format: c.next()?,
        dng_gps_altitude: c.next()?,
        dng_gps_latitude: c.next()?,
        dng_gps_longitude: c.next()?,
        dng_iso_setting: c.next()?,
        dng_lens: c.next()?,
        dng_lens_f_stops: c.next()?,
        dng_lens_type: c.next()?,
        dng_make: c.next()?,
        dng_max_aperture_at_max_focal: c.next()?,
        dng_max_aperture_at_min_focal: c.next()?,
        dng_max_aperture_value: c.next()?,
        dng_max_focal_length: c.next()?,
        dng_min_focal_length: c.next()?,
        dng_software: c.next()?,
        dng_wb_rb_levels: c.next()?,
        signature: c.next()?,
        xmp_rating: c.next()?,
    })
}
