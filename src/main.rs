use anyhow::{ensure, Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use removebg_batch::progress_tracker::LogWriter;
use removebg_batch::{run_with_remove_bg, Config};

fn main() -> Result<()> {
    let config = Config::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(LogWriter::new)
        .with_target(false)
        .without_time()
        .init();

    ensure!(
        config.input_dir.is_dir(),
        "Input directory does not exist: {}",
        config.input_dir.display()
    );
    ensure!(!config.api_key.trim().is_empty(), "API key is empty");

    let summary = run_with_remove_bg(config).context("Batch could not start")?;

    for line in summary.failure_lines() {
        warn!("{}", line);
    }
    info!(
        "Done: {} saved, {} skipped, {} failed",
        summary.saved(),
        summary.skipped(),
        summary.failed()
    );

    Ok(())
}
