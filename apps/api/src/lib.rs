//! Inventory API
//!
//! A small Postgres-backed inventory service with health checks and JWT
//! protected writes. Integration tests run it through the test host factory.

pub mod routes;

use std::sync::Arc;

use axum::Router;
use serde::Deserialize;
use stagehand_core::{CoreError, ServiceCollection};
use stagehand_http::{
    AppState, AuthorizationPolicy, DataStore, DbContext, HostContext, NpgsqlHealthCheck,
    PolicyName, ServiceCollectionAuthExt, ServiceCollectionDataExt, ServiceCollectionHealthExt,
    SqlServerHealthCheck, Startup,
};

/// Documents collection holding inventory items
pub const ITEMS_COLLECTION: &str = "items";

/// Policy guarding item writes
pub struct InventoryWrite;

impl PolicyName for InventoryWrite {
    const NAME: &'static str = "inventory.write";
}

pub const INVENTORY_WRITER_ROLE: &str = "inventory-writer";

/// Data context over the inventory database
pub struct InventoryDbContext {
    store: Arc<dyn DataStore>,
}

impl DbContext for InventoryDbContext {
    fn new(store: Arc<dyn DataStore>) -> Self {
        Self { store }
    }

    fn store(&self) -> &Arc<dyn DataStore> {
        &self.store
    }
}

/// `inventory` configuration section
#[derive(Debug, Clone, Deserialize)]
pub struct InventorySettings {
    #[serde(default = "default_max_quantity")]
    pub max_quantity: u32,
}

fn default_max_quantity() -> u32 {
    10_000
}

impl Default for InventorySettings {
    fn default() -> Self {
        Self {
            max_quantity: default_max_quantity(),
        }
    }
}

#[derive(Default)]
pub struct InventoryApp;

impl Startup for InventoryApp {
    type DbContext = InventoryDbContext;

    fn name(&self) -> &'static str {
        "inventory-api"
    }

    fn configure_services(
        &self,
        context: &HostContext,
        services: &mut ServiceCollection,
    ) -> Result<(), CoreError> {
        let configuration = context.configuration();
        let connection_string: String = configuration.get("database.connection_string")?;
        let reporting: String = configuration.get("database.reporting_connection_string")?;
        let settings: InventorySettings = configuration
            .get_optional("inventory")?
            .unwrap_or_default();

        let postgres = connection_string.clone();
        services
            .add_instance(Arc::new(settings))
            .add_db_context::<InventoryDbContext, _>(|options| {
                options.use_postgres(connection_string);
            })?
            .add_health_check("postgres", move |_| {
                let check = NpgsqlHealthCheck::new(&postgres)
                    .map_err(|e| CoreError::initialization("NpgsqlHealthCheck", e))?;
                Ok(Arc::new(check))
            })
            .add_health_check("reporting", move |_| {
                Ok(Arc::new(SqlServerHealthCheck::new(&reporting)?))
            })
            .add_jwt_authentication()
            .add_authorization(|options| {
                options.add_policy(
                    AuthorizationPolicy::new(InventoryWrite::NAME).require_role(INVENTORY_WRITER_ROLE),
                );
            });
        Ok(())
    }

    fn configure_routes(&self, router: Router<AppState>) -> Router<AppState> {
        routes::register(router)
    }
}
