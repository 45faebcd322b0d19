//! # CLI Module
//!
//! Command-line interface for the RAW library pipeline.
//!
//! ## Usage
//! ```bash
//! # Catalog a card, deduplicate the first ten days of October and copy
//! raw-dedup /Volumes/card ~/Pictures/library 2022-10-01 2022-10-10
//!
//! # Use a specific catalog and ImageMagick build
//! raw-dedup /Volumes/card ~/Pictures/library 2022-10-01 2022-10-10 \
//!     --db ~/Pictures/library.db --magick /opt/im7/bin/magick
//!
//! # Catalog and deduplicate only, JSON summary
//! raw-dedup /Volumes/card ~/Pictures/library 2022-10-01 2022-10-10 \
//!     --skip-materialize --output json
//! ```

use clap::{Parser, ValueEnum};
use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use raw_library::core::dedup::DateWindow;
use raw_library::core::extractor::{ExtractorConfig, MagickExtractor};
use raw_library::core::pipeline::{Pipeline, PipelineResult, DEFAULT_WORKERS};
use raw_library::core::repository::SqliteRepository;
use raw_library::error::Result;
use raw_library::events::{Event, EventChannel, IngestEvent, PipelineEvent};
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;

const WINDOW_HELP: &str = "\
FROM and TO accept:
  timestamps   2022-10-01T12:00:00+02:00, 2022-10-01 12:00, 2022:10:01 12:00:00,
               Sat, 1 Oct 2022 12:00:00 +0200 (no offset means UTC)
  dates        2022-10-01, 2022/10/01, 2022.10.01, 01.10.2022, 1 Oct 2022,
               01-Oct-2022, Oct 1, 2022, October 1 2022
A bare FROM date starts at 00:00:00 UTC; a bare TO date ends at 23:59:59.999 UTC.";

/// Catalog RAW files, find copies and build a date-partitioned library
#[derive(Parser, Debug)]
#[command(name = "raw-dedup")]
#[command(author, version, about, long_about = None, after_help = WINDOW_HELP)]
pub struct Cli {
    /// Directory searched recursively for *.ARW files
    source: PathBuf,

    /// Root of the {year}/{month}/{day} library
    destination: PathBuf,

    /// Start of the capture-date window (timestamp or date)
    from: String,

    /// End of the capture-date window; a bare date includes the whole day
    to: String,

    /// Catalog database path
    #[arg(long, default_value = raw_library::core::repository::DEFAULT_DATABASE)]
    db: PathBuf,

    /// ImageMagick executable
    #[arg(long, env = "MAGICK_EXEC_PATH", default_value = "magick")]
    magick: PathBuf,

    /// Number of extraction workers
    #[arg(short, long, default_value_t = DEFAULT_WORKERS)]
    workers: usize,

    /// Output format
    #[arg(short, long, default_value = "pretty")]
    output: OutputFormat,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Catalog and deduplicate without copying
    #[arg(long)]
    skip_materialize: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable output with colors
    Pretty,
    /// JSON output for scripting
    Json,
}

/// Run the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    raw_library::init_tracing(cli.verbose);

    let term = Term::stderr();
    let pretty = matches!(cli.output, OutputFormat::Pretty);

    if pretty {
        term.write_line(&format!(
            "{} {}",
            style("RAW Library").bold().cyan(),
            style(concat!("v", env!("CARGO_PKG_VERSION"))).dim()
        ))
        .ok();
        term.write_line("").ok();
    }

    let window = DateWindow::parse(&cli.from, &cli.to)?;
    let repository = SqliteRepository::open(&cli.db)?;
    let extractor = MagickExtractor::new(ExtractorConfig::with_program(cli.magick.clone()));

    let pipeline = Pipeline::builder()
        .source(cli.source.clone())
        .destination(cli.destination.clone())
        .window(window)
        .workers(cli.workers)
        .extractor(Arc::new(extractor))
        .repository(Box::new(repository))
        .materialize(!cli.skip_materialize)
        .build()?;

    // Set up event handling
    let (sender, receiver) = EventChannel::new();

    let progress = if pretty {
        let pb = ProgressBar::new(0);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("█▓░"),
        );
        Some(pb)
    } else {
        None
    };

    let progress_clone = progress.clone();
    let verbose = cli.verbose;

    // Handle events in a separate thread
    let event_thread = thread::spawn(move || {
        for event in receiver.iter() {
            let Some(pb) = progress_clone.as_ref() else {
                continue;
            };
            match event {
                Event::Pipeline(PipelineEvent::PhaseChanged { phase }) => {
                    pb.set_message(format!("{}", phase));
                }
                Event::Ingest(IngestEvent::Started { total_files, .. }) => {
                    pb.set_length(total_files as u64);
                    pb.set_position(0);
                }
                Event::Ingest(IngestEvent::Progress(p)) => {
                    pb.set_position(p.completed as u64);
                    if verbose {
                        pb.set_message(
                            p.current_path
                                .file_name()
                                .unwrap_or_default()
                                .to_string_lossy()
                                .into_owned(),
                        );
                    }
                }
                Event::Pipeline(PipelineEvent::Completed { .. }) => {
                    pb.finish_and_clear();
                }
                _ => {}
            }
        }
    });

    let result = pipeline.run_with_events(&sender);

    // Drop sender to signal event thread to finish
    drop(sender);
    event_thread.join().ok();
    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    let result = result?;
    match cli.output {
        OutputFormat::Pretty => print_pretty_results(&term, &result, cli.verbose),
        OutputFormat::Json => print_json_results(&result),
    }

    Ok(())
}

fn print_pretty_results(term: &Term, result: &PipelineResult, verbose: bool) {
    term.write_line(&format!("{} Run Complete", style("✓").green().bold()))
        .ok();
    term.write_line("").ok();

    let ingest = &result.ingest;
    term.write_line(&format!(
        "  {} RAW files found in {:.1}s",
        style(ingest.discovered).cyan(),
        result.duration_ms as f64 / 1000.0
    ))
    .ok();
    term.write_line(&format!(
        "  {} newly catalogued, {} already catalogued",
        style(ingest.saved).cyan(),
        style(ingest.already_persisted).dim()
    ))
    .ok();
    if ingest.failed > 0 {
        term.write_line(&format!(
            "  {} files could not be read",
            style(ingest.failed).red()
        ))
        .ok();
    }

    let dedup = &result.dedup;
    term.write_line(&format!(
        "  {} unique, {} duplicates",
        style(dedup.unique).cyan(),
        style(dedup.duplicates.len()).yellow()
    ))
    .ok();
    if dedup.signature_mismatches > 0 {
        term.write_line(&format!(
            "  {} duplicates with differing content signatures",
            style(dedup.signature_mismatches).yellow()
        ))
        .ok();
    }

    match &result.materialize {
        Some(m) => {
            term.write_line(&format!(
                "  {} copied, {} already in place",
                style(m.copied).cyan(),
                style(m.skipped).dim()
            ))
            .ok();
            if m.failed > 0 {
                term.write_line(&format!("  {} copies failed", style(m.failed).red()))
                    .ok();
            }
        }
        None => {
            term.write_line(&format!("  {}", style("Copying skipped").dim()))
                .ok();
        }
    }

    if verbose && !dedup.duplicates.is_empty() {
        term.write_line("").ok();
        term.write_line(&format!("{}", style("Duplicates:").bold().underlined()))
            .ok();
        for duplicate in &dedup.duplicates {
            term.write_line(&format!(
                "  {} {} {}",
                style("○").dim(),
                duplicate.filename,
                style(format!("(copy of {})", duplicate.canonical)).dim()
            ))
            .ok();
        }
    }

    term.write_line("").ok();
    term.write_line(&format!(
        "  Catalog: {} images, {} properties, {} unique",
        result.counts.images, result.counts.properties, result.counts.unique_images
    ))
    .ok();
}

fn print_json_results(result: &PipelineResult) {
    match serde_json::to_string_pretty(result) {
        Ok(json) => println!("{}", json),
        Err(e) => tracing::error!("Failed to serialize results: {}", e),
    }
}
