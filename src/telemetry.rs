//! Logging setup for the `mcvary` binary.

use std::sync::Once;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Environment variable holding the log filter, e.g. `MCVARY_LOG=mcvary=debug`.
pub const LOG_ENV: &str = "MCVARY_LOG";

static INIT: Once = Once::new();

/// Install the stderr subscriber. Falls back to `mcvary=info` (or
/// `mcvary=debug` when `verbose`) if `MCVARY_LOG` is unset or invalid.
///
/// Later calls are no-ops.
pub fn init_tracing(verbose: bool) {
    INIT.call_once(|| {
        let fallback = if verbose { "mcvary=debug" } else { "mcvary=info" };
        let filter =
            EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(fallback));

        // A subscriber installed by an embedding program wins.
        let _ = tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false),
            )
            .with(filter)
            .try_init();
    });
}
