//! Host and request errors
//!
//! Every variant maps to a stable error code (see [`HttpError::error_code`])
//! that appears in the JSON body of error responses.

use stagehand_core::{ConfigError, CoreError};
use thiserror::Error;

use crate::data::DataError;

pub type HttpResult<T> = Result<T, HttpError>;

#[derive(Error, Debug)]
pub enum HttpError {
    /// Settings could not be loaded or did not deserialize
    #[error(transparent)]
    Configuration(#[from] ConfigError),

    /// A handler or extractor needed a service the container could not provide
    #[error("Cannot resolve '{service}': {reason}")]
    ServiceResolution { service: String, reason: String },

    #[error("Listener failed: {message}")]
    Server { message: String },

    #[error("Malformed request: {message}")]
    BadRequest { message: String },

    #[error("Validation failed: {message}")]
    Validation { message: String },

    #[error("Not found: {resource}")]
    NotFound { resource: String },

    #[error("Already exists: {resource}")]
    Conflict { resource: String },

    #[error("Authentication required")]
    Unauthorized,

    #[error("Policy '{policy}' denied the request")]
    Forbidden { policy: String },

    #[error("Datastore failure: {message}")]
    Datastore { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl HttpError {
    pub fn server(message: impl Into<String>) -> Self {
        HttpError::Server {
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        HttpError::BadRequest {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        HttpError::Validation {
            message: message.into(),
        }
    }

    pub fn not_found(resource: impl Into<String>) -> Self {
        HttpError::NotFound {
            resource: resource.into(),
        }
    }

    pub fn forbidden(policy: impl Into<String>) -> Self {
        HttpError::Forbidden {
            policy: policy.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        HttpError::Internal {
            message: message.into(),
        }
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, HttpError::Configuration(_))
    }

    /// Stable code carried in error response bodies
    pub fn error_code(&self) -> &'static str {
        match self {
            HttpError::Configuration(_) => "CONFIGURATION_ERROR",
            HttpError::ServiceResolution { .. } => "SERVICE_RESOLUTION_FAILED",
            HttpError::Server { .. } => "SERVER_ERROR",
            HttpError::BadRequest { .. } => "BAD_REQUEST",
            HttpError::Validation { .. } => "VALIDATION_ERROR",
            HttpError::NotFound { .. } => "RESOURCE_NOT_FOUND",
            HttpError::Conflict { .. } => "RESOURCE_CONFLICT",
            HttpError::Unauthorized => "UNAUTHORIZED_ACCESS",
            HttpError::Forbidden { .. } => "ACCESS_FORBIDDEN",
            HttpError::Datastore { .. } => "DATASTORE_ERROR",
            HttpError::Internal { .. } => "INTERNAL_ERROR",
        }
    }
}

impl From<CoreError> for HttpError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Config(config) => HttpError::Configuration(config),
            CoreError::ServiceNotFound { ref service_type }
            | CoreError::ScopeRequired { ref service_type }
            | CoreError::ServiceInitializationFailed {
                ref service_type, ..
            } => HttpError::ServiceResolution {
                service: service_type.clone(),
                reason: err.to_string(),
            },
            other => HttpError::internal(other.to_string()),
        }
    }
}

impl From<DataError> for HttpError {
    fn from(err: DataError) -> Self {
        match err {
            DataError::NotFound { collection, id } => HttpError::NotFound {
                resource: format!("{}/{}", collection, id),
            },
            DataError::Conflict { collection, id } => HttpError::Conflict {
                resource: format!("{}/{}", collection, id),
            },
            other => HttpError::Datastore {
                message: other.to_string(),
            },
        }
    }
}

impl From<serde_json::Error> for HttpError {
    fn from(err: serde_json::Error) -> Self {
        HttpError::internal(format!("document did not (de)serialize: {}", err))
    }
}
