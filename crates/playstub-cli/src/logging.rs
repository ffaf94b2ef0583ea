//! Log output for the binary.
//!
//! Logs go to stderr so `eval` output on stdout stays machine-readable.
//! `RUST_LOG` overrides the level chosen by `-v`/`-q`.

use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use tracing_subscriber::EnvFilter;

/// Install the global fmt subscriber
pub fn init(config: &CliConfig) -> CliResult<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.verbosity.log_filter()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| CliError::logging(e.to_string()))
}
