//! # Dedup Module
//!
//! Decides which catalogued files are the same photo.
//!
//! ## Rule
//! Files are grouped by basename. Within a date window, the first file
//! seen for a basename becomes its canonical representative. A later file
//! with that basename is a duplicate when its reported filesize and
//! capture date both equal those of a representative; otherwise it
//! becomes a representative too.
//!
//! Content signatures are compared for duplicates, but a mismatch is only
//! reported. It never overrides the metadata decision.

mod deduplicator;
mod window;

pub use deduplicator::{DedupReport, Deduplicator, DuplicateMatch};
pub use window::DateWindow;
