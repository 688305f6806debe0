use stagehand_core::{Configuration, Environment, ServiceProvider};
use stagehand_http::WebHost;

use crate::client::TestClient;

/// In-process application built by the test host factory
///
/// Dropping the host drops its provider, singletons and in-memory data.
#[derive(Debug, Clone)]
pub struct TestHost {
    host: WebHost,
}

impl TestHost {
    pub(crate) fn new(host: WebHost) -> Self {
        Self { host }
    }

    /// Root service provider
    pub fn services(&self) -> &ServiceProvider {
        self.host.services()
    }

    pub fn configuration(&self) -> &Configuration {
        self.host.configuration()
    }

    pub fn environment(&self) -> &Environment {
        self.host.environment()
    }

    /// New service scope, for resolving scoped services outside a request
    pub fn create_scope(&self) -> ServiceProvider {
        self.host.services().create_scope()
    }

    pub fn client(&self) -> TestClient {
        TestClient::new(self.host.clone())
    }

    pub fn web_host(&self) -> &WebHost {
        &self.host
    }

    pub fn into_web_host(self) -> WebHost {
        self.host
    }
}
