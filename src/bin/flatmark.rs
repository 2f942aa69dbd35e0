//! flatmark: flatten ST.96 trademark XML collections into TSV tables
//!
//! Usage:
//!   # All datasets from one collection file
//!   flatmark collection.xml
//!
//!   # Selected datasets from a directory of collections
//!   flatmark --dataset main --dataset goods ./XML_raw --output-dir ./csv

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use flatmark::extractor::{ExtractStats, Extractor};
use flatmark::{Dataset, RecordSource, TableWriter};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "flatmark")]
#[command(about = "Flatten ST.96 trademark XML collections into TSV tables", long_about = None)]
#[command(version)]
struct Args {
    /// XML collection file, or a directory of .xml collections
    #[arg(value_name = "PATH")]
    input: PathBuf,

    /// Dataset to produce (repeatable; all datasets if omitted)
    #[arg(long, short = 'd', value_name = "NAME")]
    dataset: Vec<Dataset>,

    /// Directory for the output tables
    #[arg(long, short = 'o', default_value = ".")]
    output_dir: PathBuf,

    /// Suppress progress bars
    #[arg(long, short = 'q')]
    quiet: bool,

    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = match args.verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let collections = collect_inputs(&args.input)?;
    if collections.is_empty() {
        bail!("no .xml collections found under {}", args.input.display());
    }
    info!(count = collections.len(), "found XML collections");

    let datasets: Vec<Dataset> = if args.dataset.is_empty() {
        Dataset::ALL.to_vec()
    } else {
        args.dataset.clone()
    };

    std::fs::create_dir_all(&args.output_dir).with_context(|| {
        format!("failed to create output directory: {}", args.output_dir.display())
    })?;

    for dataset in datasets {
        let extractor = Extractor::new(dataset.schema()?);
        let out_path = args.output_dir.join(format!("{}.csv", dataset.file_stem()));
        let mut writer = TableWriter::create(&out_path, &extractor.schema().header)?;

        let mut totals = ExtractStats::default();
        for (i, collection) in collections.iter().enumerate() {
            let progress = make_progress(args.quiet, dataset, i + 1, collections.len());
            let mut source = RecordSource::open(collection)
                .with_context(|| format!("failed to open {}", collection.display()))?;

            for record in &mut source {
                let record = record
                    .with_context(|| format!("error reading {}", collection.display()))?;
                totals.records += 1;
                match extractor.extract_record(&record) {
                    Some(rows) => {
                        for row in &rows {
                            writer.write_row(row)?;
                        }
                        totals.rows += rows.len() as u64;
                    }
                    None => totals.skipped += 1,
                }
                progress.inc(1);
            }
            progress.finish_and_clear();
        }
        writer.flush()?;

        info!(
            dataset = %dataset,
            records = totals.records,
            rows = totals.rows,
            skipped = totals.skipped,
            output = %out_path.display(),
            "dataset complete"
        );
    }

    Ok(())
}

/// A single .xml file, or every .xml file directly under a directory, sorted
/// for reproducible output order.
fn collect_inputs(input: &Path) -> Result<Vec<PathBuf>> {
    if input.is_file() {
        return Ok(vec![input.to_path_buf()]);
    }
    let mut files = Vec::new();
    for entry in std::fs::read_dir(input)
        .with_context(|| format!("failed to read directory: {}", input.display()))?
    {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|e| e == "xml") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn make_progress(quiet: bool, dataset: Dataset, index: usize, total: usize) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg} {pos} records")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(format!("{dataset}: collection {index} of {total}"));
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}
