//! # Structured Logging
//!
//! tracing subscriber setup for hosts and test runs, with plain, pretty or
//! JSON output.

use serde::Deserialize;
use stagehand_core::{Configuration, Environment};
use std::io;
use tracing_subscriber::{fmt::Layer, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Logging configuration for a host
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "warn")
    pub level: String,
    /// Enable JSON structured logging (vs plain text)
    pub json_format: bool,
    /// Enable pretty printing for development
    pub pretty_print: bool,
    /// Environment filter (supports complex filters like "stagehand_http=debug,tower_http=info")
    pub env_filter: Option<String>,
    /// Service name to include in the startup entry
    pub service_name: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
            pretty_print: true,
            env_filter: None,
            service_name: None,
        }
    }
}

impl LoggingConfig {
    /// Create production logging configuration
    pub fn production() -> Self {
        Self {
            level: "info".to_string(),
            json_format: true,
            pretty_print: false,
            env_filter: Some("info,tower_http=warn,sqlx=warn".to_string()),
            service_name: None,
        }
    }

    /// Create development logging configuration
    pub fn development() -> Self {
        Self {
            level: "debug".to_string(),
            json_format: false,
            pretty_print: true,
            env_filter: Some("debug,hyper=info,sqlx=info".to_string()),
            service_name: None,
        }
    }

    /// Create test logging configuration (minimal output)
    pub fn test() -> Self {
        Self {
            level: "error".to_string(),
            json_format: false,
            pretty_print: false,
            env_filter: Some("error".to_string()),
            service_name: None,
        }
    }

    /// Preset matching a hosting environment
    pub fn for_environment(environment: &Environment) -> Self {
        if environment.is_development() {
            Self::development()
        } else if environment.is_testing() {
            Self::test()
        } else {
            Self::production()
        }
    }

    /// Environment preset overridden by the `logging` configuration section
    pub fn from_configuration(environment: &Environment, configuration: &Configuration) -> Self {
        configuration
            .get_optional::<LoggingConfig>("logging")
            .ok()
            .flatten()
            .unwrap_or_else(|| Self::for_environment(environment))
    }

    /// Set service name
    pub fn with_service(mut self, name: &str) -> Self {
        self.service_name = Some(name.to_string());
        self
    }

    /// Set environment filter
    pub fn with_env_filter<S: Into<String>>(mut self, filter: S) -> Self {
        self.env_filter = Some(filter.into());
        self
    }
}

/// Initialize structured logging for the process
///
/// Only the first call installs a subscriber; later calls are no-ops, so
/// every test may call it.
pub fn init_logging(config: LoggingConfig) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let env_filter = config.env_filter.as_deref().unwrap_or(&config.level);

    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(env_filter))?;

    let installed = if config.json_format {
        tracing_subscriber::registry()
            .with(filter)
            .with(Layer::new().with_writer(io::stdout).json())
            .try_init()
    } else if config.pretty_print {
        tracing_subscriber::registry()
            .with(filter)
            .with(Layer::new().with_writer(io::stdout).pretty())
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(Layer::new().with_writer(io::stdout))
            .try_init()
    };

    if installed.is_err() {
        return Ok(());
    }

    tracing::info!(
        target: "stagehand::logging",
        service = config.service_name.as_deref().unwrap_or("stagehand"),
        "Structured logging initialized (level: {}, format: {})",
        config.level,
        if config.json_format { "JSON" } else { "text" }
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use stagehand_core::ConfigurationBuilder;

    #[test]
    fn test_presets_follow_environment() {
        assert!(LoggingConfig::for_environment(&Environment::Production).json_format);
        assert_eq!(
            LoggingConfig::for_environment(&Environment::IntegrationTesting).level,
            "error"
        );
        assert_eq!(LoggingConfig::for_environment(&Environment::Development).level, "debug");
    }

    #[test]
    fn test_logging_section_overrides_preset() {
        let configuration = ConfigurationBuilder::new(".")
            .add_in_memory(json!({ "logging": { "level": "warn", "json_format": true } }))
            .build()
            .unwrap();

        let config = LoggingConfig::from_configuration(&Environment::Development, &configuration);
        assert_eq!(config.level, "warn");
        assert!(config.json_format);
        assert!(config.pretty_print);
    }

    #[test]
    fn test_repeated_initialization_is_tolerated() {
        assert!(init_logging(LoggingConfig::test()).is_ok());
        assert!(init_logging(LoggingConfig::test()).is_ok());
    }
}
