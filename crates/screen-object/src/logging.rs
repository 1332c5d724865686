//! Tracing subscriber setup for test binaries.
//!
//! The library only emits `tracing` events; installing a subscriber is left
//! to the test harness. These helpers cover the common case.

use std::sync::Once;

use tracing_subscriber::EnvFilter;

/// Filter variable consulted first
pub const LOG_ENV: &str = "SCREEN_OBJECT_LOG";

/// Filter used when neither `SCREEN_OBJECT_LOG` nor `RUST_LOG` is set
pub const DEFAULT_FILTER: &str = "warn";

/// Output format of the installed subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human readable lines
    #[default]
    Pretty,
    /// One JSON object per event
    Json,
}

/// Build the filter from `SCREEN_OBJECT_LOG`, then `RUST_LOG`, then [`DEFAULT_FILTER`]
#[must_use]
pub fn env_filter() -> EnvFilter {
    let directives = std::env::var(LOG_ENV)
        .or_else(|_| std::env::var(EnvFilter::DEFAULT_ENV))
        .unwrap_or_else(|_| DEFAULT_FILTER.to_string());
    EnvFilter::try_new(&directives).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install a global subscriber once per process; later calls are no-ops.
///
/// Output goes through the test writer so `cargo test` captures it per test.
pub fn init_logging(format: LogFormat) {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let builder = tracing_subscriber::fmt()
            .with_env_filter(env_filter())
            .with_test_writer();
        let _ = match format {
            LogFormat::Pretty => builder.try_init(),
            LogFormat::Json => builder.json().try_init(),
        };
    });
}

/// [`init_logging`] with human readable output
pub fn init_test_logging() {
    init_logging(LogFormat::Pretty);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_idempotent() {
        init_test_logging();
        init_test_logging();
        init_logging(LogFormat::Json);
        tracing::debug!("subscriber installed");
    }

    #[test]
    fn test_env_filter_builds() {
        let filter = env_filter();
        assert!(!filter.to_string().is_empty());
    }
}
