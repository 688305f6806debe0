use std::str::FromStr;

use crate::config::ConfigError;

/// Hosting environment
///
/// The canonical name (see [`Environment::name`]) selects the
/// `appsettings.{name}.json` file loaded by convention.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Environment {
    Development,
    Testing,
    IntegrationTesting,
    #[default]
    Production,
    Custom(String),
}

impl Environment {
    /// Canonical environment name
    pub fn name(&self) -> &str {
        match self {
            Environment::Development => "Development",
            Environment::Testing => "Testing",
            Environment::IntegrationTesting => "IntegrationTesting",
            Environment::Production => "Production",
            Environment::Custom(name) => name,
        }
    }

    /// File name of the environment-specific settings file
    pub fn settings_file(&self) -> String {
        format!("appsettings.{}.json", self.name())
    }

    /// Check if environment is development
    pub fn is_development(&self) -> bool {
        matches!(self, Environment::Development)
    }

    /// Check if environment is one of the test environments
    pub fn is_testing(&self) -> bool {
        matches!(self, Environment::Testing | Environment::IntegrationTesting)
    }

    /// Check if environment is production
    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ConfigError::invalid_value(
                "environment",
                s,
                "a non-empty environment name",
            ));
        }

        let normalized: String = trimmed
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .collect::<String>()
            .to_lowercase();

        Ok(match normalized.as_str() {
            "development" | "dev" => Environment::Development,
            "testing" | "test" => Environment::Testing,
            "integrationtesting" => Environment::IntegrationTesting,
            "production" | "prod" => Environment::Production,
            _ => Environment::Custom(trimmed.to_string()),
        })
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_environments() {
        assert_eq!("dev".parse::<Environment>().unwrap(), Environment::Development);
        assert_eq!(
            "IntegrationTesting".parse::<Environment>().unwrap(),
            Environment::IntegrationTesting
        );
        assert_eq!(
            "integration_testing".parse::<Environment>().unwrap(),
            Environment::IntegrationTesting
        );
        assert_eq!("PROD".parse::<Environment>().unwrap(), Environment::Production);
    }

    #[test]
    fn test_custom_environment_keeps_name() {
        let env: Environment = "Staging".parse().unwrap();
        assert_eq!(env, Environment::Custom("Staging".to_string()));
        assert_eq!(env.settings_file(), "appsettings.Staging.json");
    }

    #[test]
    fn test_empty_environment_is_rejected() {
        assert!("  ".parse::<Environment>().is_err());
    }

    #[test]
    fn test_settings_file_convention() {
        assert_eq!(
            Environment::IntegrationTesting.settings_file(),
            "appsettings.IntegrationTesting.json"
        );
        assert!(Environment::IntegrationTesting.is_testing());
        assert!(Environment::default().is_production());
    }
}
