//! Health checks
//!
//! Checks are ordinary services. [`ServiceCollectionHealthExt::add_health_check`]
//! registers the check together with a [`HealthCheckRegistration`] naming it;
//! removing the check's service later silently drops it from reports.

pub mod check;
pub mod npgsql;
pub mod report;
pub mod sql_server;

pub use check::{
    HealthCheck, HealthCheckRegistration, HealthCheckResult, HealthStatus,
    ServiceCollectionHealthExt,
};
pub use npgsql::NpgsqlHealthCheck;
pub use report::{health_endpoint, HealthReport, HealthReportEntry};
pub use sql_server::SqlServerHealthCheck;
