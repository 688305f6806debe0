use axum::Router;
use stagehand_core::{CoreError, ServiceCollection};

use super::context::HostContext;
use super::state::AppState;
use crate::data::DbContext;

/// Composition root of an application
///
/// The host calls [`Startup::configure_services`] once per build, before any
/// test registrations, and [`Startup::configure_routes`] once the provider
/// exists.
pub trait Startup: Default + Send + Sync + 'static {
    /// Primary data context; its options are what tests swap for an in-memory store
    type DbContext: DbContext;

    /// Application name used in logs
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    fn configure_services(
        &self,
        context: &HostContext,
        services: &mut ServiceCollection,
    ) -> Result<(), CoreError>;

    fn configure_routes(&self, router: Router<AppState>) -> Router<AppState>;
}
