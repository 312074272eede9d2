//! Logging configuration
//!
//! Console logging through `tracing-subscriber`, filtered by `RUST_LOG` when set
//! and by the configured filter otherwise.

use serde::Deserialize;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Logging configuration options
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "volume_profile_va=debug")
    pub level_filter: String,
    /// Whether to emit ANSI colors
    pub ansi: bool,
    /// Whether to include the event target (module path)
    pub with_target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level_filter: "info,volume_profile_va=info".to_string(),
            ansi: true,
            with_target: true,
        }
    }
}

impl LoggingConfig {
    /// Environment filter; `RUST_LOG` takes precedence over the configured one
    pub fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.level_filter))
    }
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init_logging(config: &LoggingConfig) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let console_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_ansi(config.ansi)
        .with_level(true)
        .with_target(config.with_target)
        .with_filter(config.env_filter());

    tracing_subscriber::registry().with(console_layer).try_init()?;

    tracing::info!(
        package_version = env!("CARGO_PKG_VERSION"),
        filter = %config.level_filter,
        "Logging initialized"
    );
    Ok(())
}

/// Initialize simple logging for testing or minimal setups
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LoggingConfig::default();
        assert!(config.level_filter.contains("volume_profile_va"));
        assert!(config.ansi);
    }

    #[test]
    fn test_config_from_toml() {
        let config: LoggingConfig = toml::from_str("level_filter = \"debug\"\nansi = false\n").unwrap();
        assert_eq!(config.level_filter, "debug");
        assert!(!config.ansi);
        assert!(config.with_target);
    }

    #[test]
    fn test_second_init_fails_cleanly() {
        init_test_logging();
        let config = LoggingConfig {
            ansi: false,
            ..LoggingConfig::default()
        };
        assert!(init_logging(&config).is_err());
    }
}
