//! Tracing setup
//!
//! Logs go to stderr so stdout carries only the report.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Builds the filter: `RUST_LOG` wins, otherwise warnings only, or debug
/// output for this crate when `verbose` is set.
pub fn env_filter(verbose: bool) -> EnvFilter {
    let fallback = if verbose {
        "memcached_itool=debug"
    } else {
        "memcached_itool=warn"
    };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| fallback.into())
}

/// Installs the global subscriber.
pub fn init(verbose: bool) {
    tracing_subscriber::registry()
        .with(env_filter(verbose))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}
