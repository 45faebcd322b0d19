//! # raw-dedup CLI
//!
//! Command-line interface for the RAW library pipeline.
//!
//! ## Usage
//! ```bash
//! raw-dedup /Volumes/card ~/Pictures/library 2022-10-01 2022-10-10
//! raw-dedup /Volumes/card ~/Pictures/library 2022-10-01 2022-10-10 --output json
//! ```

mod cli;

use raw_library::Result;

fn main() -> Result<()> {
    cli::run()
}
