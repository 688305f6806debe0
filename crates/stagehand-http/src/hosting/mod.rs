//! Web hosting
//!
//! [`WebHostBuilder`] composes an application described by a [`Startup`]
//! type: it loads configuration, lets the application (and then tests)
//! register services, builds the provider and wraps the application's routes
//! in a per-request service scope.

pub mod builder;
pub mod context;
pub mod host;
pub mod scope;
pub mod startup;
pub mod state;

pub use builder::WebHostBuilder;
pub use context::HostContext;
pub use host::WebHost;
pub use scope::request_scope;
pub use startup::Startup;
pub use state::{AppState, Inject, RequestServices};
