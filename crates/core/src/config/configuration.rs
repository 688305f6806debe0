//! Layered configuration
//!
//! Sources are merged in the order they were added; a later source overrides
//! keys set by earlier ones. Keys are addressed with `.` between sections
//! (`database.connection_string`). Environment variables use `__` as the
//! section separator and are lower-cased, so settings files should use
//! lower-case snake_case keys to be overridable from the environment.

use std::path::{Path, PathBuf};

use figment::providers::{Env, Format, Json, Serialized};
use figment::{Figment, Provider};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::{ConfigError, ConfigSource};

/// Ordered list of configuration sources rooted at a base path
#[derive(Debug, Clone)]
pub struct ConfigurationBuilder {
    base_path: PathBuf,
    sources: Vec<ConfigSource>,
}

impl ConfigurationBuilder {
    /// Create a builder resolving relative file paths against `base_path`
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            sources: Vec::new(),
        }
    }

    /// Directory relative file sources are resolved against
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Append a source
    pub fn add_source(&mut self, source: ConfigSource) -> &mut Self {
        self.sources.push(source);
        self
    }

    /// Append a JSON file that must exist
    pub fn add_json_file(&mut self, path: impl Into<PathBuf>) -> &mut Self {
        self.add_source(ConfigSource::JsonFile {
            path: path.into(),
            optional: false,
        })
    }

    /// Append a JSON file that is skipped when missing
    pub fn add_optional_json_file(&mut self, path: impl Into<PathBuf>) -> &mut Self {
        self.add_source(ConfigSource::JsonFile {
            path: path.into(),
            optional: true,
        })
    }

    /// Append every process environment variable
    pub fn add_environment_variables(&mut self) -> &mut Self {
        self.add_source(ConfigSource::EnvironmentVariables { prefix: None })
    }

    /// Append the environment variables starting with `prefix`, prefix stripped
    pub fn add_prefixed_environment_variables(&mut self, prefix: impl Into<String>) -> &mut Self {
        self.add_source(ConfigSource::EnvironmentVariables {
            prefix: Some(prefix.into()),
        })
    }

    /// Append programmatic values
    pub fn add_in_memory(&mut self, values: serde_json::Value) -> &mut Self {
        let values = match values {
            serde_json::Value::Object(map) => map,
            other => {
                let mut map = serde_json::Map::new();
                map.insert("value".to_string(), other);
                map
            }
        };
        self.add_source(ConfigSource::InMemory(values))
    }

    /// Sources in merge order
    pub fn sources(&self) -> &[ConfigSource] {
        &self.sources
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_path.join(path)
        }
    }

    /// Merge every source into a [`Configuration`]
    pub fn build(&self) -> Result<Configuration, ConfigError> {
        let mut figment = Figment::new();

        for source in &self.sources {
            figment = match source {
                ConfigSource::JsonFile { path, optional } => {
                    let full_path = self.resolve(path);
                    if !full_path.is_file() {
                        if *optional {
                            debug!(path = %full_path.display(), "optional configuration file not found");
                            continue;
                        }
                        return Err(ConfigError::FileNotFound {
                            path: full_path.display().to_string(),
                        });
                    }
                    debug!(path = %full_path.display(), "loading configuration file");
                    figment.merge(Json::file(full_path))
                }
                ConfigSource::EnvironmentVariables { prefix: Some(prefix) } => {
                    figment.merge(Env::prefixed(prefix).split("__"))
                }
                ConfigSource::EnvironmentVariables { prefix: None } => {
                    figment.merge(Env::raw().split("__"))
                }
                ConfigSource::InMemory(values) => figment.merge(Serialized::defaults(values)),
            };
        }

        // Parse failures stay inside the figment until first read
        figment.data()?;

        Ok(Configuration {
            figment,
            sources: self.sources.clone(),
        })
    }
}

/// Merged, read-only configuration
#[derive(Debug, Clone)]
pub struct Configuration {
    figment: Figment,
    sources: Vec<ConfigSource>,
}

impl Configuration {
    /// Configuration with no sources
    pub fn empty() -> Self {
        Self {
            figment: Figment::new(),
            sources: Vec::new(),
        }
    }

    /// Deserialize the value at `key`
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<T, ConfigError> {
        Ok(self.figment.extract_inner(key)?)
    }

    /// Deserialize the value at `key`, `None` when the key is absent
    pub fn get_optional<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, ConfigError> {
        if !self.contains(key) {
            return Ok(None);
        }
        self.get(key).map(Some)
    }

    /// Deserialize the value at `key`, falling back to `default` when absent or invalid
    pub fn get_or<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        self.get(key).unwrap_or(default)
    }

    /// Deserialize the whole configuration tree
    pub fn extract<T: DeserializeOwned>(&self) -> Result<T, ConfigError> {
        Ok(self.figment.extract()?)
    }

    /// Check if `key` is set by any source
    pub fn contains(&self, key: &str) -> bool {
        self.figment.find_value(key).is_ok()
    }

    /// Sources this configuration was merged from
    pub fn sources(&self) -> &[ConfigSource] {
        &self.sources
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;
    use serial_test::serial;
    use std::fs;

    #[derive(Debug, Deserialize, PartialEq)]
    struct DatabaseSection {
        connection_string: String,
        #[serde(default)]
        pool_size: Option<u32>,
    }

    fn write_settings(dir: &Path, name: &str, value: serde_json::Value) {
        fs::write(dir.join(name), serde_json::to_string_pretty(&value).unwrap()).unwrap();
    }

    #[test]
    fn test_later_files_override_earlier_ones() {
        let dir = tempfile::tempdir().unwrap();
        write_settings(
            dir.path(),
            "appsettings.json",
            json!({ "name": "inventory", "database": { "connection_string": "postgres://base", "pool_size": 5 } }),
        );
        write_settings(
            dir.path(),
            "appsettings.Testing.json",
            json!({ "database": { "connection_string": "postgres://testing" } }),
        );

        let config = ConfigurationBuilder::new(dir.path())
            .add_json_file("appsettings.json")
            .add_json_file("appsettings.Testing.json")
            .build()
            .unwrap();

        let database: DatabaseSection = config.get("database").unwrap();
        assert_eq!(database.connection_string, "postgres://testing");
        assert_eq!(database.pool_size, Some(5));
        assert_eq!(config.get::<String>("name").unwrap(), "inventory");
        assert_eq!(config.sources().len(), 2);
    }

    #[test]
    fn test_missing_required_file_fails() {
        let dir = tempfile::tempdir().unwrap();

        let error = ConfigurationBuilder::new(dir.path())
            .add_json_file("appsettings.IntegrationTests.json")
            .build()
            .unwrap_err();

        assert!(matches!(error, ConfigError::FileNotFound { .. }));
        assert!(error.is_missing());
    }

    #[test]
    fn test_missing_optional_file_is_skipped() {
        let dir = tempfile::tempdir().unwrap();

        let config = ConfigurationBuilder::new(dir.path())
            .add_optional_json_file("appsettings.json")
            .add_in_memory(json!({ "name": "fallback" }))
            .build()
            .unwrap();

        assert_eq!(config.get::<String>("name").unwrap(), "fallback");
        assert!(!config.contains("database.connection_string"));
        assert_eq!(config.get_optional::<String>("database.connection_string").unwrap(), None);
        assert_eq!(config.get_or("log_level", "info".to_string()), "info");
    }

    #[test]
    #[serial]
    fn test_environment_variables_override_files() {
        let dir = tempfile::tempdir().unwrap();
        write_settings(
            dir.path(),
            "appsettings.json",
            json!({ "database": { "connection_string": "postgres://file" } }),
        );
        std::env::set_var("STAGEHAND_CFG_TEST_DATABASE__CONNECTION_STRING", "postgres://env");

        let config = ConfigurationBuilder::new(dir.path())
            .add_json_file("appsettings.json")
            .add_prefixed_environment_variables("STAGEHAND_CFG_TEST_")
            .build()
            .unwrap();

        std::env::remove_var("STAGEHAND_CFG_TEST_DATABASE__CONNECTION_STRING");

        assert_eq!(
            config.get::<String>("database.connection_string").unwrap(),
            "postgres://env"
        );
    }

    #[test]
    fn test_malformed_file_fails_to_build() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("appsettings.json"), "{ \"database\": ").unwrap();

        let error = ConfigurationBuilder::new(dir.path())
            .add_json_file("appsettings.json")
            .build()
            .unwrap_err();
        assert!(matches!(error, ConfigError::Extraction(_)));
    }

    #[test]
    fn test_missing_key_reports_extraction_error() {
        let config = Configuration::empty();
        let error = config.get::<String>("auth.signing_key").unwrap_err();
        assert!(matches!(error, ConfigError::Extraction(_)));
    }
}
