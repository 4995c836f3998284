pub mod batch;
pub mod client;
pub mod config;
pub mod errors;
pub mod imageops;
pub mod normalize;
pub mod progress_tracker;
pub mod traits;

pub mod mocks;

pub use batch::{
    is_supported_extension, BatchBackgroundRemover, BatchSummary, FileOutcome, FileReport,
    SkipReason, Stage, SUPPORTED_EXTENSIONS,
};
pub use client::RemoveBgClient;
pub use config::Config;
pub use errors::{BgRemoveError, Result};
pub use normalize::Normalizer;
pub use traits::*;

/// Run a whole batch against the real remove.bg API.
pub fn run_with_remove_bg(config: Config) -> Result<BatchSummary> {
    let client = RemoveBgClient::new(&config)?;
    BatchBackgroundRemover::new(client, config).run()
}
