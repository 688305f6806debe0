use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use stagehand_core::{CoreError, ServiceCollection, ServiceId, ServiceProvider};

/// Outcome of a single check, ordered from best to worst
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthCheckResult {
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl HealthCheckResult {
    pub fn healthy() -> Self {
        Self {
            status: HealthStatus::Healthy,
            description: None,
        }
    }

    pub fn degraded(description: impl Into<String>) -> Self {
        Self {
            status: HealthStatus::Degraded,
            description: Some(description.into()),
        }
    }

    pub fn unhealthy(description: impl Into<String>) -> Self {
        Self {
            status: HealthStatus::Unhealthy,
            description: Some(description.into()),
        }
    }
}

#[async_trait]
pub trait HealthCheck: Send + Sync + 'static {
    async fn check_health(&self) -> HealthCheckResult;
}

/// Named entry in the health report, pointing at the check's service
#[derive(Clone)]
pub struct HealthCheckRegistration {
    pub name: String,
    pub check_type: ServiceId,
    resolve: fn(&ServiceProvider) -> Result<Arc<dyn HealthCheck>, CoreError>,
}

impl HealthCheckRegistration {
    pub fn new<H: HealthCheck>(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            check_type: ServiceId::of::<H>(),
            resolve: resolve_check::<H>,
        }
    }

    /// Resolve the check, `None` if its service is no longer registered
    pub fn resolve(
        &self,
        services: &ServiceProvider,
    ) -> Option<Result<Arc<dyn HealthCheck>, CoreError>> {
        if !services.contains_id(&self.check_type) {
            return None;
        }
        Some((self.resolve)(services))
    }
}

impl std::fmt::Debug for HealthCheckRegistration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HealthCheckRegistration")
            .field("name", &self.name)
            .field("check_type", &self.check_type)
            .finish()
    }
}

fn resolve_check<H: HealthCheck>(services: &ServiceProvider) -> Result<Arc<dyn HealthCheck>, CoreError> {
    let check: Arc<dyn HealthCheck> = services.resolve::<H>()?;
    Ok(check)
}

pub trait ServiceCollectionHealthExt {
    /// Register `H` as a singleton and list it under `name` in health reports
    fn add_health_check<H, F>(&mut self, name: impl Into<String>, factory: F) -> &mut Self
    where
        H: HealthCheck,
        F: Fn(&ServiceProvider) -> Result<Arc<H>, CoreError> + Send + Sync + 'static;
}

impl ServiceCollectionHealthExt for ServiceCollection {
    fn add_health_check<H, F>(&mut self, name: impl Into<String>, factory: F) -> &mut Self
    where
        H: HealthCheck,
        F: Fn(&ServiceProvider) -> Result<Arc<H>, CoreError> + Send + Sync + 'static,
    {
        self.add_singleton(factory)
            .add_instance(Arc::new(HealthCheckRegistration::new::<H>(name)))
    }
}
