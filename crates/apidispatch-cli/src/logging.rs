//! Log setup: `tracing` events to stderr, filtered by `APIDISPATCH_LOG`

use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "APIDISPATCH_LOG";

/// Install the global subscriber.
///
/// `APIDISPATCH_LOG` takes precedence; otherwise `warn`, or `debug` with `-v`.
pub fn init(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(fallback));

    // A subscriber may already be installed (tests); keep it.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .try_init();
}
