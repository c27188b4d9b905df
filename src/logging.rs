use std::fs::File;
use std::path::Path;
use std::sync::Mutex;

use anyhow::{anyhow, Context, Result};
use tracing_subscriber::EnvFilter;

/// Initializes the global subscriber.
///
/// Stdout is the game screen, so logs only go to `log_file` when one is
/// given. `RUST_LOG` overrides the level; otherwise `verbose` selects debug
/// over info.
pub fn init(verbose: bool, log_file: Option<&Path>) -> Result<()> {
    let Some(path) = log_file else { return Ok(()) };

    let file = File::create(path)
        .with_context(|| format!("failed to create log file {}", path.display()))?;
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|err| anyhow!("failed to install log subscriber: {err}"))
}
