//! Log subscriber setup for the binary.

use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::{Error, Result};

pub const DEFAULT_FILTER: &str = "planewar=info";
pub const VERBOSE_FILTER: &str = "planewar=debug,info";

/// Install the global `tracing` subscriber.
///
/// `RUST_LOG` wins when set; otherwise `verbose` picks between the info and
/// debug defaults.
pub fn init_logging(verbose: bool) -> Result<()> {
    let fallback = if verbose { VERBOSE_FILTER } else { DEFAULT_FILTER };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber).map_err(|e| {
        Error::InvalidConfiguration {
            message: format!("setting default subscriber failed: {e}"),
        }
    })
}
