//! tracing setup for the binary. Logs go to stderr; stdout carries JSON results.

use std::sync::Once;
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::LogFormat;
use crate::config::{DEFAULT_LOG_FILTER, LogConfig};

static INIT: Once = Once::new();

/// Install the global subscriber. Later calls are ignored.
pub fn init_tracing(config: &LogConfig) {
    INIT.call_once(|| {
        let (env_filter, rejected) = match EnvFilter::try_new(&config.filter) {
            Ok(filter) => (filter, None),
            Err(e) => (EnvFilter::new(DEFAULT_LOG_FILTER), Some(e)),
        };

        let registry = tracing_subscriber::registry().with(env_filter);
        match config.format {
            LogFormat::Text => registry
                .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
                .init(),
            LogFormat::Json => registry
                .with(
                    fmt::layer()
                        .json()
                        .with_writer(std::io::stderr)
                        .with_target(true)
                        .with_current_span(true),
                )
                .init(),
        }

        if let Some(e) = rejected {
            tracing::warn!(filter = %config.filter, error = %e, "invalid log filter, using default");
        }
        debug!(format = ?config.format, "tracing initialized");
    });
}
