//! dockscore — Collects gnina docking scores into one ranked table.
//! Entry point for the `dockscore` binary.

mod config;

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use dockscore_molecules::{discover, Aggregation, Aggregator, SdfParser};
use dockscore_ranker::{completion_line, rank, write_csv, write_failure_report};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Print the skipped-file block, write the ranked table, print the summary.
fn report(agg: Aggregation, output: &Path) -> anyhow::Result<usize> {
    let mut stdout = std::io::stdout().lock();
    write_failure_report(&mut stdout, &agg.failures)?;

    let table = rank(agg.rows);
    write_csv(output, &table)?;

    writeln!(stdout, "{}", completion_line(table.len(), output))?;
    Ok(table.len())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout carries the run report
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("dockscore=info,warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let config = config::Config::load()?;
    info!(
        input = %config.input.dir.display(),
        output = %config.output.path.display(),
        workers = config.processing.workers,
        "Configuration loaded"
    );

    let files = discover(&config.input.dir, &config.input.suffix);

    let aggregator = Aggregator::new(Arc::new(SdfParser::new()))
        .with_policy(config.processing.malformed);
    info!(n_files = files.len(), malformed = ?aggregator.policy(), "Aggregating");
    let agg = aggregator
        .run_concurrent(files, config.processing.workers)
        .await?;

    let n_rows = report(agg, &config.output.path)?;
    info!(n_rows, "Run complete");
    Ok(())
}
