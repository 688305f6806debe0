//! # stagehand-http
//!
//! Web hosting for stagehand applications.
//!
//! This crate provides:
//! - A [`WebHostBuilder`] composing an application from its [`Startup`] type
//! - Per-request service scopes and the [`Inject`] extractor
//! - Datastore options with Postgres and in-memory stores
//! - Health checks and the `/health` report endpoint
//! - JWT authentication and policy-based authorization
//! - Structured logging setup

// Core modules
pub mod auth;
pub mod data;
pub mod errors;
pub mod health;
pub mod hosting;
pub mod logging;
pub mod server;

// Main hosting API
pub use errors::{HttpError, HttpResult};
pub use hosting::{AppState, HostContext, Inject, RequestServices, Startup, WebHost, WebHostBuilder};

// Re-export datastore types
pub use data::{
    DataError, DataStore, DatabaseProvider, DbContext, DbContextOptions, DbContextOptionsBuilder,
    InMemoryDataStore, InMemoryDatabaseRoot, PostgresDataStore, ServiceCollectionDataExt,
};

// Re-export health types
pub use health::{
    health_endpoint, HealthCheck, HealthCheckResult, HealthReport, HealthStatus,
    NpgsqlHealthCheck, ServiceCollectionHealthExt, SqlServerHealthCheck,
};

// Re-export auth types
pub use auth::{
    AuthenticateResult, AuthenticationService, AuthorizationOptions, AuthorizationPolicy,
    Authorized, ClaimsPrincipal, DefaultPolicyEvaluator, JwtSettings, PolicyAuthorizationResult,
    PolicyEvaluator, PolicyName, ServiceCollectionAuthExt,
};

// Re-export logging
pub use logging::{init_logging, LoggingConfig};
