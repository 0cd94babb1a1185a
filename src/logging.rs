//! Diagnostic logging for the `keeda` binary.
//!
//! The library only emits `tracing` events; installing a subscriber is
//! the binary's job.  Events carry ids and paths, never secret values.

use tracing_subscriber::EnvFilter;

/// Environment variable holding an `EnvFilter` directive, e.g. `keedavault=debug`.
pub const LOG_ENV: &str = "KEEDA_LOG";

/// Install a stderr `fmt` subscriber.
///
/// `KEEDA_LOG` wins when set and valid; otherwise `--verbose` selects
/// `debug` and the default is `warn`, so normal output stays clean.
/// Calling this twice is harmless.
pub fn init(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(fallback));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
