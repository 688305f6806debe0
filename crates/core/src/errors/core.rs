use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::ConfigError;

/// Errors raised while registering or resolving services
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Invalid registration: {message}")]
    Validation { message: String },

    #[error("No registration for '{service_type}'")]
    ServiceNotFound { service_type: String },

    #[error("Scoped service '{service_type}' cannot be resolved from the root provider")]
    ScopeRequired { service_type: String },

    #[error("Instance cache for '{resource}' is poisoned")]
    LockError { resource: String },

    #[error("Dependency cycle: {path} (re-entered at {cycle_service})")]
    CircularDependency { path: String, cycle_service: String },

    #[error("Descriptor cannot be built: {message}")]
    InvalidServiceDescriptor { message: String },

    #[error("Service '{service_type}' was registered as '{registered_as}' but resolved as another type")]
    TypeMismatch {
        service_type: String,
        registered_as: String,
    },

    #[error("Factory for '{service_type}' failed: {source}")]
    ServiceInitializationFailed {
        service_type: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl CoreError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn service_not_found(service_type: impl Into<String>) -> Self {
        Self::ServiceNotFound {
            service_type: service_type.into(),
        }
    }

    /// Wrap a failure raised while constructing a service
    pub fn initialization<E>(service_type: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::ServiceInitializationFailed {
            service_type: service_type.into(),
            source: Box::new(source),
        }
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    pub fn is_service_not_found(&self) -> bool {
        matches!(self, Self::ServiceNotFound { .. })
    }
}

/// `{ "error": { ... } }` envelope used by error responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiError,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
    pub hint: Option<String>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            hint: None,
        }
    }

    pub fn with_hint(mut self, hint: Option<impl Into<String>>) -> Self {
        self.hint = hint.map(Into::into);
        self
    }
}

impl From<ApiError> for ApiErrorResponse {
    fn from(error: ApiError) -> Self {
        Self { error }
    }
}
