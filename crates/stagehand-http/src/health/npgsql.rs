use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::PgPool;

use super::check::{HealthCheck, HealthCheckResult};
use crate::data::postgres::lazy_pool;
use crate::data::DataResult;

/// Runs `SELECT 1` against a Postgres database
#[derive(Debug)]
pub struct NpgsqlHealthCheck {
    pool: PgPool,
    timeout: Duration,
}

impl NpgsqlHealthCheck {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

    /// Create the check; the connection is only opened when it runs
    pub fn new(connection_string: &str) -> DataResult<Self> {
        Ok(Self {
            pool: lazy_pool(connection_string, Self::DEFAULT_TIMEOUT)?,
            timeout: Self::DEFAULT_TIMEOUT,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl HealthCheck for NpgsqlHealthCheck {
    async fn check_health(&self) -> HealthCheckResult {
        match tokio::time::timeout(self.timeout, sqlx::query("SELECT 1").execute(&self.pool)).await {
            Ok(Ok(_)) => HealthCheckResult::healthy(),
            Ok(Err(e)) => HealthCheckResult::unhealthy(format!("postgres query failed: {}", e)),
            Err(_) => HealthCheckResult::unhealthy(format!(
                "postgres did not answer within {:?}",
                self.timeout
            )),
        }
    }
}
