//! Tracing subscriber setup for the server binary.
//!
//! `RUST_LOG` takes precedence over the configured filter.

use crate::config::{LogConfig, LogFormat};
use crate::error::{Error, Result};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber.
///
/// # Errors
///
/// Returns an error if the filter is invalid or a subscriber is already set.
pub fn init(config: &LogConfig) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.filter)
            .map_err(|e| Error::Config(format!("log filter '{}': {e}", config.filter)))?,
    };
    let registry = tracing_subscriber::registry().with(filter);
    let installed = match config.format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).try_init(),
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).try_init(),
    };
    installed.map_err(|e| Error::Config(format!("logging already initialised: {e}")))?;
    tracing::debug!(format = ?config.format, "logging initialised");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[serial_test::serial]
    fn test_init_only_once() {
        let config = LogConfig::default();
        // Another test binary may have installed one already; the second
        // call must fail either way.
        let _ = init(&config);
        assert!(matches!(init(&config), Err(Error::Config(_))));
    }

    #[test]
    #[serial_test::serial]
    fn test_invalid_filter_is_rejected() {
        std::env::remove_var("RUST_LOG");
        let config =
            LogConfig { filter: "todo_store=notalevel".to_string(), ..LogConfig::default() };
        assert!(matches!(init(&config), Err(Error::Config(_))));
    }
}
