//! Tracing subscriber setup.
//!
//! Logs go to stderr so stdout carries only the JSON the commands print.

use std::env;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_DIRECTIVE: &str = "fitstreak=info";

/// Install the global subscriber. `RUST_LOG` replaces the default filter.
pub fn init() {
    let env_filter = env::var("RUST_LOG").map_or_else(
        |_| EnvFilter::new(DEFAULT_DIRECTIVE),
        |directive| EnvFilter::new(&directive),
    );

    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact();

    // A second init (tests calling main twice) is harmless.
    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(layer)
        .try_init();
}
