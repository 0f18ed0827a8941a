//! Shared tracing/logging initialization.
//!
//! Sets up `tracing_subscriber` with an env-filter and optional JSON output.
//! `RUST_LOG` wins over the configured level when it is set.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::LoggingConfig;
use crate::error::{Error, Result};

/// Crates whose events the configured level applies to.
const NOISEKIT_TARGETS: [&str; 3] = ["noisekit", "noisekit_core", "noisekit_crypto"];

/// Build the default filter directive for `level`, e.g.
/// `"noisekit=info,noisekit_core=info,noisekit_crypto=info"`.
pub fn default_filter(level: &str) -> String {
    NOISEKIT_TARGETS
        .iter()
        .map(|target| format!("{target}={level}"))
        .collect::<Vec<_>>()
        .join(",")
}

/// Initialise the global tracing subscriber.
///
/// Fails if a global subscriber is already installed or the level is not a
/// valid filter directive.
pub fn init_tracing(logging: &LoggingConfig) -> Result<()> {
    let directives =
        std::env::var("RUST_LOG").unwrap_or_else(|_| default_filter(&logging.level));
    let env_filter = tracing_subscriber::EnvFilter::try_new(&directives)
        .map_err(|e| Error::Tracing(format!("invalid filter {directives:?}: {e}")))?;

    let result = if logging.json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init()
    };
    result.map_err(|e| Error::Tracing(e.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn default_filter_covers_all_crates() {
        assert_eq!(
            default_filter("debug"),
            "noisekit=debug,noisekit_core=debug,noisekit_crypto=debug"
        );
    }

    #[test]
    fn second_init_is_an_error_not_a_panic() {
        let logging = LoggingConfig::default();
        // The first call may or may not win depending on other tests in this
        // binary; the second one can never succeed.
        let _ = init_tracing(&logging);
        assert!(matches!(init_tracing(&logging), Err(Error::Tracing(_))));
    }
}
