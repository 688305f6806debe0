use std::marker::PhantomData;
use std::path::PathBuf;
use std::sync::Arc;

use stagehand_core::{Environment, ServiceCollection, ServiceDescriptor};
use stagehand_http::data::db_context_descriptor;
use stagehand_http::{
    AuthenticationService, DbContextOptions, DbContextOptionsBuilder, NpgsqlHealthCheck,
    PolicyEvaluator, SqlServerHealthCheck, Startup, WebHostBuilder,
};
use tracing::{debug, info};

use crate::host::TestHost;
use crate::policy::TestingPolicyEvaluator;
use crate::TestResult;

/// Settings file layered on top of the application's own configuration
pub const INTEGRATION_SETTINGS_FILE: &str = "appsettings.IntegrationTests.json";

/// Name of the in-memory store replacing the primary datastore
pub const IN_MEMORY_DATABASE_NAME: &str = "InMemoryDbForTesting";

/// Registrations added after the production ones are removed
struct Substitutions {
    options: ServiceDescriptor,
    evaluator: Option<ServiceDescriptor>,
    overrides: ServiceCollection,
}

impl Substitutions {
    fn prepare<A: Startup>(
        enable_test_auth_policy: bool,
        overrides: ServiceCollection,
    ) -> TestResult<Self> {
        let options = DbContextOptionsBuilder::<A::DbContext>::new()
            .use_in_memory_database(IN_MEMORY_DATABASE_NAME)
            .build()?;

        let evaluator = if enable_test_auth_policy {
            Some(
                ServiceDescriptor::builder::<dyn PolicyEvaluator>()
                    .implemented_by::<TestingPolicyEvaluator>()
                    .with_factory(|_| {
                        let evaluator: Arc<dyn PolicyEvaluator> =
                            Arc::new(TestingPolicyEvaluator::new());
                        Ok(evaluator)
                    })
                    .build()?,
            )
        } else {
            None
        };

        Ok(Self {
            options: ServiceDescriptor::instance(Arc::new(options)),
            evaluator,
            overrides,
        })
    }

    fn apply<A: Startup>(self, services: &mut ServiceCollection) {
        let removed = [
            services.remove_all::<DbContextOptions<A::DbContext>>(),
            services.remove_all::<NpgsqlHealthCheck>(),
            services.remove_all::<SqlServerHealthCheck>(),
            services.remove_all::<AuthenticationService>(),
        ];
        debug!(
            datastore = removed[0],
            npgsql_health = removed[1],
            sql_server_health = removed[2],
            authentication = removed[3],
            "removed production registrations"
        );

        if let Some(evaluator) = self.evaluator {
            services.add(evaluator);
            debug!("registered testing policy evaluator");
        }

        services.add(self.options);
        services.try_add(db_context_descriptor::<A::DbContext>());
        debug!(database = IN_MEMORY_DATABASE_NAME, "registered in-memory datastore");

        let count = self.overrides.len();
        services.extend(self.overrides);
        debug!(count, "appended test overrides");
    }
}

/// Swap the production registrations of `A` for test doubles
///
/// Removes every registration of the primary datastore options, the Postgres
/// and SQL Server health checks and the JWT authentication service, then
/// registers the in-memory datastore and, when `enable_test_auth_policy` is
/// set, the [`TestingPolicyEvaluator`]. `overrides` are appended last in their
/// own order, so they win single resolution over everything before them.
pub fn substitute_services<A: Startup>(
    services: &mut ServiceCollection,
    enable_test_auth_policy: bool,
    overrides: ServiceCollection,
) -> TestResult<()> {
    Substitutions::prepare::<A>(enable_test_auth_policy, overrides)?.apply::<A>(services);
    Ok(())
}

/// Builds [`TestHost`]s for the application `A`
///
/// ```rust,ignore
/// let host = TestHostFactory::<InventoryApp>::new()
///     .enable_test_auth_policy(true)
///     .with_service(ServiceDescriptor::instance(Arc::new(FixedClock::at(noon))))
///     .build()?;
/// ```
pub struct TestHostFactory<A: Startup> {
    overrides: ServiceCollection,
    enable_test_auth_policy: bool,
    content_root: Option<PathBuf>,
    settings_file: String,
    _app: PhantomData<fn() -> A>,
}

impl<A: Startup> TestHostFactory<A> {
    pub fn new() -> Self {
        Self {
            overrides: ServiceCollection::new(),
            enable_test_auth_policy: false,
            content_root: None,
            settings_file: INTEGRATION_SETTINGS_FILE.to_string(),
            _app: PhantomData,
        }
    }

    /// Append every registration in `services` to the overrides
    pub fn with_services(mut self, services: ServiceCollection) -> Self {
        self.overrides.extend(services);
        self
    }

    pub fn with_service(mut self, descriptor: ServiceDescriptor) -> Self {
        self.overrides.add(descriptor);
        self
    }

    pub fn enable_test_auth_policy(mut self, enabled: bool) -> Self {
        self.enable_test_auth_policy = enabled;
        self
    }

    /// Directory the settings files are read from, defaults to the working directory
    pub fn content_root(mut self, content_root: impl Into<PathBuf>) -> Self {
        self.content_root = Some(content_root.into());
        self
    }

    pub fn settings_file(mut self, settings_file: impl Into<String>) -> Self {
        self.settings_file = settings_file.into();
        self
    }

    /// Host builder with the test configuration and substitutions attached
    pub fn web_host_builder(self) -> TestResult<WebHostBuilder<A>> {
        let substitutions =
            Substitutions::prepare::<A>(self.enable_test_auth_policy, self.overrides)?;

        let mut builder = WebHostBuilder::<A>::new().use_environment(Environment::IntegrationTesting);
        if let Some(content_root) = self.content_root {
            builder = builder.use_content_root(content_root);
        }

        let settings_file = self.settings_file;
        Ok(builder
            .configure_app_configuration(move |_, configuration| {
                configuration
                    .add_json_file(settings_file)
                    .add_environment_variables();
            })
            .configure_test_services(move |_, services| substitutions.apply::<A>(services)))
    }

    pub fn build(self) -> TestResult<TestHost> {
        let enable_test_auth_policy = self.enable_test_auth_policy;
        let host = self.web_host_builder()?.build()?;
        info!(
            environment = %host.environment(),
            test_auth_policy = enable_test_auth_policy,
            "test host ready"
        );
        Ok(TestHost::new(host))
    }
}

impl<A: Startup> Default for TestHostFactory<A> {
    fn default() -> Self {
        Self::new()
    }
}

/// Build an in-process test host for `A`
///
/// The host runs in the `IntegrationTesting` environment with
/// `appsettings.IntegrationTests.json` and environment variables layered on
/// top of the application's configuration. See [`substitute_services`] for
/// the registrations that are swapped out.
pub fn create_test_host<A: Startup>(
    overrides: ServiceCollection,
    enable_test_auth_policy: bool,
) -> TestResult<TestHost> {
    TestHostFactory::<A>::new()
        .with_services(overrides)
        .enable_test_auth_policy(enable_test_auth_policy)
        .build()
}
