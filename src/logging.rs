//! Diagnostic logging to stderr.
//!
//! `RUST_LOG` selects what is logged. Without it the level is `warn`, or
//! `debug` for milepatch itself when `--debug` is set. Output is compact and
//! goes to stderr so it never mixes with progress on stdout.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter directives used when `RUST_LOG` is unset.
#[must_use]
pub const fn default_directives(debug: bool) -> &'static str {
    if debug { "warn,milepatch=debug" } else { "warn" }
}

/// Installs the global subscriber.
///
/// A subscriber installed earlier, as in tests, is left in place.
pub fn init(debug: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(debug)));

    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .compact()
                .with_target(false),
        )
        .try_init();
    if installed.is_err() {
        tracing::debug!("global subscriber already installed");
    }
}
