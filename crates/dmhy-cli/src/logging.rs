use anyhow::{Result, anyhow};
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "warn,dmhy=info,dmhy_core=info,dmhy_cli=info";

/// Initialize logging to stderr, filtered by `RUST_LOG`.
///
/// Stdout is left to the result table and the magnet link.
pub fn init_logging() -> Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow!(e))?;

    tracing::debug!("logging initialized");
    Ok(())
}
