//! `layer-print`: simulate a layer-by-layer print job from CSV data.
//!
//! ```text
//! layer-print <PRINT_NAME> <OUTPUT_FOLDER> <supervised|automatic> <CSV_FILE>
//! ```
//!
//! Supervised runs prefetch a bounded window of layers while the operator
//! confirms each one; automatic runs process every layer at once. Pass
//! `--sequential` for the one-at-a-time variants.
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use layer_print::logging::init_logging;
use layer_print::prompt::ConsolePrompter;
use layer_print::{Args, LayerProcessor, PrintRunner, RowSource, SummaryReport};
use print_artifacts::FsArtifactStore;
use print_transport::HttpFetcher;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose)?;

    let config = args.run_config()?;

    let rows = RowSource::from_path(&args.csv_file)?;
    println!(
        "Loaded {} layers from {}",
        rows.len(),
        args.csv_file.display()
    );

    std::fs::create_dir_all(&config.output_folder).with_context(|| {
        format!(
            "failed to create output folder {}",
            config.output_folder.display()
        )
    })?;
    info!(path = %config.output_folder.display(), "output folder ready");

    let fetcher = HttpFetcher::new(config.fetch).context("failed to build image fetcher")?;
    let store = FsArtifactStore::new(&config.output_folder);
    let processor = LayerProcessor::new(Arc::new(fetcher), Arc::new(store), config.fetch.timeout);

    let mut prompter = ConsolePrompter::new();
    let report = PrintRunner::new(config.clone(), rows, processor)
        .run(&mut prompter)
        .await;

    let aborted = report.aborted;
    SummaryReport::new(config.print_name.as_str(), report.counters).publish(&config.output_folder);
    if aborted {
        // Blocking fetches cannot be interrupted; runtime shutdown waits for
        // them up to the fetch timeout.
        info!(
            timeout_secs = config.fetch.timeout.as_secs(),
            "waiting for in-flight image fetches to finish before exit"
        );
    }
    Ok(())
}
