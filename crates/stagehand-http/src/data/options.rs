use std::fmt;
use std::marker::PhantomData;
use std::sync::{Arc, OnceLock};

use stagehand_core::{CoreError, ServiceProvider};
use tracing::debug;

use super::memory::InMemoryDatabaseRoot;
use super::postgres::PostgresDataStore;
use super::store::DataStore;

/// Backing store selected for a context
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseProvider {
    Postgres { connection_string: String },
    InMemory { database_name: String },
}

impl DatabaseProvider {
    pub fn is_in_memory(&self) -> bool {
        matches!(self, DatabaseProvider::InMemory { .. })
    }

    /// In-memory database name, if any
    pub fn in_memory_name(&self) -> Option<&str> {
        match self {
            DatabaseProvider::InMemory { database_name } => Some(database_name),
            DatabaseProvider::Postgres { .. } => None,
        }
    }
}

/// Datastore configuration for the context type `C`
///
/// Registered as a singleton, so the store it opens is shared by every
/// context instance built from it.
pub struct DbContextOptions<C> {
    provider: DatabaseProvider,
    store: OnceLock<Arc<dyn DataStore>>,
    _context: PhantomData<fn() -> C>,
}

impl<C> DbContextOptions<C> {
    pub fn provider(&self) -> &DatabaseProvider {
        &self.provider
    }

    /// Open (or reuse) the store these options point at
    ///
    /// In-memory stores come from the [`InMemoryDatabaseRoot`] registered in
    /// `services`, so they live exactly as long as the host.
    pub fn store(&self, services: &ServiceProvider) -> Result<Arc<dyn DataStore>, CoreError> {
        if let Some(store) = self.store.get() {
            return Ok(store.clone());
        }

        let store: Arc<dyn DataStore> = match &self.provider {
            DatabaseProvider::InMemory { database_name } => {
                let root = services.resolve::<InMemoryDatabaseRoot>()?;
                root.database(database_name)
                    .map_err(|e| CoreError::initialization(std::any::type_name::<C>(), e))?
            }
            DatabaseProvider::Postgres { connection_string } => {
                Arc::new(
                    PostgresDataStore::connect_lazy(connection_string)
                        .map_err(|e| CoreError::initialization(std::any::type_name::<C>(), e))?,
                )
            }
        };
        debug!(
            context = std::any::type_name::<C>(),
            provider = store.provider_name(),
            "opened datastore"
        );

        Ok(self.store.get_or_init(|| store).clone())
    }
}

impl<C> fmt::Debug for DbContextOptions<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbContextOptions")
            .field("context", &std::any::type_name::<C>())
            .field("provider", &self.provider)
            .finish()
    }
}

/// Builder for [`DbContextOptions`]
pub struct DbContextOptionsBuilder<C> {
    provider: Option<DatabaseProvider>,
    _context: PhantomData<fn() -> C>,
}

impl<C> DbContextOptionsBuilder<C> {
    pub fn new() -> Self {
        Self {
            provider: None,
            _context: PhantomData,
        }
    }

    pub fn use_postgres(&mut self, connection_string: impl Into<String>) -> &mut Self {
        self.provider = Some(DatabaseProvider::Postgres {
            connection_string: connection_string.into(),
        });
        self
    }

    pub fn use_in_memory_database(&mut self, database_name: impl Into<String>) -> &mut Self {
        self.provider = Some(DatabaseProvider::InMemory {
            database_name: database_name.into(),
        });
        self
    }

    pub fn is_configured(&self) -> bool {
        self.provider.is_some()
    }

    pub fn build(&self) -> Result<DbContextOptions<C>, CoreError> {
        let provider = self.provider.clone().ok_or_else(|| {
            CoreError::validation(format!(
                "no database provider configured for {}",
                std::any::type_name::<C>()
            ))
        })?;

        Ok(DbContextOptions {
            provider,
            store: OnceLock::new(),
            _context: PhantomData,
        })
    }
}

impl<C> Default for DbContextOptionsBuilder<C> {
    fn default() -> Self {
        Self::new()
    }
}
