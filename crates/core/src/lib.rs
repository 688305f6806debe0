pub mod config;
pub mod container;
pub mod errors;

// Re-export key types for convenience
pub use config::{ConfigError, ConfigSource, Configuration, ConfigurationBuilder, Environment};
pub use container::{
    ServiceCollection, ServiceDescriptor, ServiceDescriptorBuilder, ServiceFactory, ServiceId,
    ServiceProvider, ServiceScope,
};
pub use errors::{ApiError, ApiErrorResponse, CoreError};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Framework information
pub const FRAMEWORK_NAME: &str = "stagehand";

/// Get framework version
pub fn version() -> &'static str {
    VERSION
}

/// Get framework name
pub fn name() -> &'static str {
    FRAMEWORK_NAME
}
