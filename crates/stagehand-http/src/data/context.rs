use std::sync::Arc;

use stagehand_core::{CoreError, ServiceCollection, ServiceDescriptor};

use super::options::{DbContextOptions, DbContextOptionsBuilder};
use super::store::DataStore;

/// Application data context bound to a [`DataStore`]
pub trait DbContext: Send + Sync + 'static {
    fn new(store: Arc<dyn DataStore>) -> Self
    where
        Self: Sized;

    fn store(&self) -> &Arc<dyn DataStore>;
}

/// Scoped registration building `C` from its registered options
pub fn db_context_descriptor<C: DbContext>() -> ServiceDescriptor {
    ServiceDescriptor::scoped(|services| {
        let options = services.resolve::<DbContextOptions<C>>()?;
        let store = options.store(services)?;
        Ok(Arc::new(C::new(store)))
    })
}

/// Datastore registrations on a [`ServiceCollection`]
pub trait ServiceCollectionDataExt {
    /// Register `DbContextOptions<C>` and, unless already present, the scoped context `C`
    fn add_db_context<C, F>(&mut self, configure: F) -> Result<&mut Self, CoreError>
    where
        C: DbContext,
        F: FnOnce(&mut DbContextOptionsBuilder<C>);
}

impl ServiceCollectionDataExt for ServiceCollection {
    fn add_db_context<C, F>(&mut self, configure: F) -> Result<&mut Self, CoreError>
    where
        C: DbContext,
        F: FnOnce(&mut DbContextOptionsBuilder<C>),
    {
        let mut builder = DbContextOptionsBuilder::<C>::new();
        configure(&mut builder);
        let options = builder.build()?;

        self.add_instance(Arc::new(options));
        self.try_add(db_context_descriptor::<C>());
        Ok(self)
    }
}
