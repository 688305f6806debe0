//! Datastore abstraction
//!
//! A [`DbContext`] is built per request scope from the [`DbContextOptions`]
//! registered for it. The options pick the backing [`DataStore`]: a Postgres
//! database in production or a named in-memory store under test.

pub mod context;
pub mod memory;
pub mod options;
pub mod postgres;
pub mod store;

pub use context::{db_context_descriptor, DbContext, ServiceCollectionDataExt};
pub use memory::{InMemoryDataStore, InMemoryDatabaseRoot};
pub use options::{DatabaseProvider, DbContextOptions, DbContextOptionsBuilder};
pub use postgres::PostgresDataStore;
pub use store::{DataError, DataResult, DataStore};
