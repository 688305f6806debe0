use std::path::PathBuf;
use std::sync::Arc;

use axum::{middleware, Router};
use stagehand_core::{ConfigurationBuilder, Environment, ServiceCollection};
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

use super::context::HostContext;
use super::host::WebHost;
use super::scope::request_scope;
use super::startup::Startup;
use super::state::AppState;
use crate::data::InMemoryDatabaseRoot;
use crate::errors::HttpResult;

type ConfigureConfiguration = Box<dyn FnOnce(&Environment, &mut ConfigurationBuilder) + Send>;
type ConfigureServices = Box<dyn FnOnce(&HostContext, &mut ServiceCollection) + Send>;

/// Builds a [`WebHost`] for the application `A`
///
/// Configuration sources, in merge order:
/// 1. `appsettings.json` (optional)
/// 2. `appsettings.{Environment}.json` (optional)
/// 3. environment variables prefixed with [`Self::ENVIRONMENT_PREFIX`]
/// 4. whatever [`Self::configure_app_configuration`] delegates add
///
/// Service registrations, in order: framework services, `A::configure_services`,
/// [`Self::configure_services`] delegates, [`Self::configure_test_services`] delegates.
pub struct WebHostBuilder<A: Startup> {
    startup: A,
    environment: Environment,
    content_root: PathBuf,
    configuration_delegates: Vec<ConfigureConfiguration>,
    service_delegates: Vec<ConfigureServices>,
    test_service_delegates: Vec<ConfigureServices>,
}

impl<A: Startup> WebHostBuilder<A> {
    pub const ENVIRONMENT_PREFIX: &'static str = "STAGEHAND_";

    /// Builder in the production environment, rooted at the working directory
    pub fn new() -> Self {
        Self {
            startup: A::default(),
            environment: Environment::Production,
            content_root: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            configuration_delegates: Vec::new(),
            service_delegates: Vec::new(),
            test_service_delegates: Vec::new(),
        }
    }

    pub fn use_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    pub fn use_content_root(mut self, content_root: impl Into<PathBuf>) -> Self {
        self.content_root = content_root.into();
        self
    }

    /// Add configuration sources after the defaults
    pub fn configure_app_configuration<F>(mut self, configure: F) -> Self
    where
        F: FnOnce(&Environment, &mut ConfigurationBuilder) + Send + 'static,
    {
        self.configuration_delegates.push(Box::new(configure));
        self
    }

    /// Adjust registrations after the application registered its own
    pub fn configure_services<F>(mut self, configure: F) -> Self
    where
        F: FnOnce(&HostContext, &mut ServiceCollection) + Send + 'static,
    {
        self.service_delegates.push(Box::new(configure));
        self
    }

    /// Adjust registrations last, after every other delegate
    pub fn configure_test_services<F>(mut self, configure: F) -> Self
    where
        F: FnOnce(&HostContext, &mut ServiceCollection) + Send + 'static,
    {
        self.test_service_delegates.push(Box::new(configure));
        self
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    /// Load configuration, register services and wire the router
    pub fn build(self) -> HttpResult<WebHost> {
        let mut configuration = ConfigurationBuilder::new(&self.content_root);
        configuration
            .add_optional_json_file("appsettings.json")
            .add_optional_json_file(self.environment.settings_file())
            .add_prefixed_environment_variables(Self::ENVIRONMENT_PREFIX);
        for configure in self.configuration_delegates {
            configure(&self.environment, &mut configuration);
        }
        let configuration = Arc::new(configuration.build()?);
        debug!(sources = configuration.sources().len(), "configuration loaded");

        let context = HostContext::new(self.environment, self.content_root, configuration.clone());

        let mut services = ServiceCollection::new();
        services
            .add_instance(configuration)
            .add_instance(Arc::new(context.clone()))
            .add_instance(Arc::new(InMemoryDatabaseRoot::new()));

        self.startup.configure_services(&context, &mut services)?;
        for configure in self.service_delegates {
            configure(&context, &mut services);
        }
        for configure in self.test_service_delegates {
            configure(&context, &mut services);
        }

        let registrations = services.len();
        let provider = services.build_provider();
        let state = AppState {
            services: provider.clone(),
            context: context.clone(),
        };

        let router = self
            .startup
            .configure_routes(Router::new())
            .layer(middleware::from_fn_with_state(state.clone(), request_scope))
            .layer(TraceLayer::new_for_http())
            .with_state(state);

        info!(
            application = self.startup.name(),
            environment = %context.environment(),
            registrations,
            "host built"
        );

        Ok(WebHost::new(provider, context, router))
    }
}

impl<A: Startup> Default for WebHostBuilder<A> {
    fn default() -> Self {
        Self::new()
    }
}
