use std::path::PathBuf;

/// A single configuration source, merged in the order it was added
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigSource {
    /// JSON file, resolved against the builder's base path when relative
    JsonFile { path: PathBuf, optional: bool },
    /// Process environment variables, optionally filtered by prefix.
    /// `__` separates nested sections.
    EnvironmentVariables { prefix: Option<String> },
    /// Values provided programmatically
    InMemory(serde_json::Map<String, serde_json::Value>),
}

impl ConfigSource {
    /// Check if source is a file
    pub fn is_file(&self) -> bool {
        matches!(self, ConfigSource::JsonFile { .. })
    }

    /// Check if source is environment variables
    pub fn is_env_var(&self) -> bool {
        matches!(self, ConfigSource::EnvironmentVariables { .. })
    }

    /// Get source description
    pub fn description(&self) -> String {
        match self {
            ConfigSource::JsonFile { path, optional } => format!(
                "Configuration file: {}{}",
                path.display(),
                if *optional { " (optional)" } else { "" }
            ),
            ConfigSource::EnvironmentVariables { prefix: Some(prefix) } => {
                format!("Environment variables: {}*", prefix)
            }
            ConfigSource::EnvironmentVariables { prefix: None } => {
                "Environment variables".to_string()
            }
            ConfigSource::InMemory(values) => format!("In-memory values ({} keys)", values.len()),
        }
    }
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}
