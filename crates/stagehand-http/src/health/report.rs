use std::collections::BTreeMap;
use std::time::Instant;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use stagehand_core::ServiceProvider;
use tracing::{debug, warn};

use super::check::{HealthCheckRegistration, HealthCheckResult, HealthStatus};
use crate::hosting::RequestServices;

#[derive(Debug, Clone, Serialize)]
pub struct HealthReportEntry {
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub duration_ms: u128,
}

/// Aggregated result of every registered check
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub total_duration_ms: u128,
    pub entries: BTreeMap<String, HealthReportEntry>,
}

impl HealthReport {
    /// Run every registered check in registration order
    pub async fn collect(services: &ServiceProvider) -> Self {
        let started = Instant::now();
        let registrations = services
            .resolve_all::<HealthCheckRegistration>()
            .unwrap_or_default();

        let mut entries = BTreeMap::new();
        for registration in registrations {
            let Some(resolved) = registration.resolve(services) else {
                debug!(check = %registration.name, "health check service removed, skipping");
                continue;
            };

            let check_started = Instant::now();
            let result = match resolved {
                Ok(check) => check.check_health().await,
                Err(e) => HealthCheckResult::unhealthy(e.to_string()),
            };
            if result.status != HealthStatus::Healthy {
                warn!(check = %registration.name, status = ?result.status, "health check not healthy");
            }

            entries.insert(
                registration.name.clone(),
                HealthReportEntry {
                    status: result.status,
                    description: result.description,
                    duration_ms: check_started.elapsed().as_millis(),
                },
            );
        }

        let status = entries
            .values()
            .map(|entry| entry.status)
            .max()
            .unwrap_or(HealthStatus::Healthy);

        Self {
            status,
            total_duration_ms: started.elapsed().as_millis(),
            entries,
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.status == HealthStatus::Healthy
    }
}

/// `GET /health` handler: 200 unless a check is unhealthy, then 503
pub async fn health_endpoint(RequestServices(services): RequestServices) -> Response {
    let report = HealthReport::collect(&services).await;
    let status = if report.status == HealthStatus::Unhealthy {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    };
    (status, Json(report)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::{HealthCheck, ServiceCollectionHealthExt};
    use async_trait::async_trait;
    use stagehand_core::ServiceCollection;
    use std::sync::Arc;

    struct StaticCheck(HealthCheckResult);

    #[async_trait]
    impl HealthCheck for StaticCheck {
        async fn check_health(&self) -> HealthCheckResult {
            self.0.clone()
        }
    }

    struct SlowDiskCheck;

    #[async_trait]
    impl HealthCheck for SlowDiskCheck {
        async fn check_health(&self) -> HealthCheckResult {
            HealthCheckResult::degraded("disk latency above threshold")
        }
    }

    #[tokio::test]
    async fn test_empty_report_is_healthy() {
        let provider = ServiceCollection::new().build_provider();
        let report = HealthReport::collect(&provider).await;
        assert!(report.is_healthy());
        assert!(report.entries.is_empty());
    }

    #[tokio::test]
    async fn test_worst_status_wins() {
        let mut services = ServiceCollection::new();
        services
            .add_health_check("static", |_| Ok(Arc::new(StaticCheck(HealthCheckResult::healthy()))))
            .add_health_check("disk", |_| Ok(Arc::new(SlowDiskCheck)));

        let report = HealthReport::collect(&services.build_provider()).await;
        assert_eq!(report.status, HealthStatus::Degraded);
        assert_eq!(report.entries.len(), 2);
        assert_eq!(report.entries["static"].status, HealthStatus::Healthy);
    }

    #[tokio::test]
    async fn test_removed_check_is_skipped() {
        let mut services = ServiceCollection::new();
        services
            .add_health_check("static", |_| {
                Ok(Arc::new(StaticCheck(HealthCheckResult::unhealthy("down"))))
            })
            .add_health_check("disk", |_| Ok(Arc::new(SlowDiskCheck)));
        services.remove_all::<StaticCheck>();

        let report = HealthReport::collect(&services.build_provider()).await;
        assert_eq!(report.entries.len(), 1);
        assert!(report.entries.contains_key("disk"));
        assert_eq!(report.status, HealthStatus::Degraded);
    }

    #[tokio::test]
    async fn test_failing_factory_reports_unhealthy() {
        let mut services = ServiceCollection::new();
        services.add_health_check::<StaticCheck, _>("broken", |_| {
            Err(stagehand_core::CoreError::validation("missing connection string"))
        });

        let report = HealthReport::collect(&services.build_provider()).await;
        assert_eq!(report.status, HealthStatus::Unhealthy);
        assert!(report.entries["broken"]
            .description
            .as_deref()
            .unwrap()
            .contains("missing connection string"));
    }
}
