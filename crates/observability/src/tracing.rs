//! Tracing/logging initialization.
//!
//! One JSON line per event on stdout, filtered by `RUST_LOG`.

use tracing_subscriber::EnvFilter;

/// Filter applied when `RUST_LOG` is unset or unparsable.
pub const DEFAULT_FILTER: &str = "info";

/// Build the event filter: `RUST_LOG` when valid, else `default_directives`.
pub fn env_filter(default_directives: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives))
}

/// Install the global JSON subscriber.
///
/// Returns `false` when a subscriber was already installed (e.g. by a test
/// harness or an earlier call).
pub fn init(default_directives: &str) -> bool {
    let installed = tracing_subscriber::fmt()
        .with_env_filter(env_filter(default_directives))
        .json()
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(false)
        .try_init()
        .is_ok();

    if installed {
        ::tracing::debug!(default_directives, "tracing subscriber installed");
    }
    installed
}
