// Logging module - diagnostic tracing setup
use crate::domain::error::{TermError, TermResult};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use std::io;

/// Filter used when `RUST_LOG` is not set
pub fn default_filter(verbose: bool) -> &'static str {
    if verbose {
        "serialterm=debug,warn"
    } else {
        "serialterm=warn"
    }
}

/// Initialize logging system.
///
/// Diagnostics go to stderr so they never mix with the device stream on
/// stdout. A second call returns an error.
pub fn init_logging(verbose: bool) -> TermResult<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbose)));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_target(true)
                .with_level(true)
                .with_thread_names(true)
                .with_line_number(true)
        )
        .try_init()
        .map_err(|e| TermError::ConfigInvalid {
            message: format!("Failed to initialize logging: {}", e),
        })?;

    tracing::debug!("serialterm logging system initialized");
    Ok(())
}
