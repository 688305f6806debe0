//! # stagehand-testing - Integration Test Hosts
//!
//! Builds a fully wired, in-process instance of an application for
//! integration tests. The factory runs the application's own startup, then
//! swaps production infrastructure for test doubles:
//!
//! - the primary datastore becomes the in-memory store `InMemoryDbForTesting`
//! - the Postgres and SQL Server health checks are removed
//! - the JWT [`AuthenticationService`](stagehand_http::AuthenticationService) is removed
//! - optionally, every policy is satisfied by a [`TestingPolicyEvaluator`]
//! - caller-supplied overrides are appended last
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use stagehand_core::ServiceCollection;
//! use stagehand_testing::prelude::*;
//!
//! #[tokio::test]
//! async fn lists_items() -> TestResult<()> {
//!     let host = create_test_host::<InventoryApp>(ServiceCollection::new(), true)?;
//!     host.client().get("/api/items").send().await?.assert_status(200);
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod factory;
pub mod host;
pub mod policy;

// Re-export commonly used types
pub use client::{RequestBuilder, TestClient, TestResponse};
pub use factory::{
    create_test_host, substitute_services, TestHostFactory, INTEGRATION_SETTINGS_FILE,
    IN_MEMORY_DATABASE_NAME,
};
pub use host::TestHost;
pub use policy::TestingPolicyEvaluator;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        client::{TestClient, TestResponse},
        factory::{create_test_host, TestHostFactory},
        host::TestHost,
        policy::TestingPolicyEvaluator,
        utils, TestError, TestResult,
    };

    // Re-export commonly used external types
    pub use serde_json::{json, Value as JsonValue};
}

// Error handling
#[derive(thiserror::Error, Debug)]
pub enum TestError {
    #[error("Host construction failed: {0}")]
    Host(#[from] stagehand_http::HttpError),

    #[error("Container error: {0}")]
    Container(#[from] stagehand_core::CoreError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Request error: {0}")]
    Request(String),

    #[error("Assertion failed: {message}")]
    Assertion { message: String },
}

impl TestError {
    /// Check if the error came from loading configuration
    pub fn is_configuration(&self) -> bool {
        match self {
            TestError::Host(error) => error.is_configuration(),
            TestError::Container(error) => error.is_configuration(),
            _ => false,
        }
    }
}

pub type TestResult<T> = Result<T, TestError>;

pub mod utils {
    /// Random alphanumeric string, for keys that must not collide across tests
    pub fn random_string(prefix: Option<&str>) -> String {
        use rand::Rng;
        let suffix: String = rand::thread_rng()
            .sample_iter(&rand::distributions::Alphanumeric)
            .take(8)
            .map(char::from)
            .collect();

        match prefix {
            Some(p) => format!("{}_{}", p, suffix),
            None => suffix,
        }
    }
}
