use std::any::{Any, TypeId};
use std::marker::PhantomData;
use std::sync::Arc;

use crate::container::provider::ServiceProvider;
use crate::container::scope::ServiceScope;
use crate::errors::CoreError;

/// Capability identifier for a registration
///
/// Capabilities are keyed by `TypeId`, so both concrete types and trait
/// objects (`dyn PolicyEvaluator`) can be registered and removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ServiceId {
    pub type_id: TypeId,
    pub type_name: &'static str,
}

impl ServiceId {
    /// Create a new service ID for a type
    pub fn of<T: 'static + ?Sized>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
        }
    }

    /// Check if this ServiceId identifies `T`
    pub fn is<T: 'static + ?Sized>(&self) -> bool {
        self.type_id == TypeId::of::<T>()
    }

    /// Get the type name as a string
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

impl std::fmt::Display for ServiceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.type_name)
    }
}

/// Type-erased factory. The produced `Any` always holds an `Arc<T>` for the
/// capability `T` of the owning descriptor.
pub type ServiceFactory =
    Arc<dyn Fn(&ServiceProvider) -> Result<Arc<dyn Any + Send + Sync>, CoreError> + Send + Sync>;

fn erase<T, F>(factory: F) -> ServiceFactory
where
    T: ?Sized + Send + Sync + 'static,
    F: Fn(&ServiceProvider) -> Result<Arc<T>, CoreError> + Send + Sync + 'static,
{
    Arc::new(move |provider: &ServiceProvider| {
        let instance: Arc<T> = factory(provider)?;
        Ok(Arc::new(instance) as Arc<dyn Any + Send + Sync>)
    })
}

/// A single (capability, implementation, lifetime) registration
#[derive(Clone)]
pub struct ServiceDescriptor {
    /// Capability this registration satisfies
    pub service_id: ServiceId,
    /// Name of the implementing type, for diagnostics
    pub implementation_type: &'static str,
    /// Service lifetime
    pub lifetime: ServiceScope,
    factory: ServiceFactory,
}

impl std::fmt::Debug for ServiceDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceDescriptor")
            .field("service_id", &self.service_id)
            .field("implementation_type", &self.implementation_type)
            .field("lifetime", &self.lifetime)
            .field("factory", &"<factory_fn>")
            .finish()
    }
}

impl ServiceDescriptor {
    /// Create a descriptor from a factory with an explicit lifetime
    pub fn from_factory<T, F>(lifetime: ServiceScope, factory: F) -> Self
    where
        T: ?Sized + Send + Sync + 'static,
        F: Fn(&ServiceProvider) -> Result<Arc<T>, CoreError> + Send + Sync + 'static,
    {
        Self {
            service_id: ServiceId::of::<T>(),
            implementation_type: std::any::type_name::<T>(),
            lifetime,
            factory: erase(factory),
        }
    }

    /// Create a singleton descriptor
    pub fn singleton<T, F>(factory: F) -> Self
    where
        T: ?Sized + Send + Sync + 'static,
        F: Fn(&ServiceProvider) -> Result<Arc<T>, CoreError> + Send + Sync + 'static,
    {
        Self::from_factory(ServiceScope::Singleton, factory)
    }

    /// Create a scoped descriptor
    pub fn scoped<T, F>(factory: F) -> Self
    where
        T: ?Sized + Send + Sync + 'static,
        F: Fn(&ServiceProvider) -> Result<Arc<T>, CoreError> + Send + Sync + 'static,
    {
        Self::from_factory(ServiceScope::Scoped, factory)
    }

    /// Create a transient descriptor
    pub fn transient<T, F>(factory: F) -> Self
    where
        T: ?Sized + Send + Sync + 'static,
        F: Fn(&ServiceProvider) -> Result<Arc<T>, CoreError> + Send + Sync + 'static,
    {
        Self::from_factory(ServiceScope::Transient, factory)
    }

    /// Create a singleton descriptor around an existing instance
    pub fn instance<T>(instance: Arc<T>) -> Self
    where
        T: ?Sized + Send + Sync + 'static,
    {
        Self::singleton(move |_| Ok(instance.clone()))
    }

    /// Start a fluent descriptor for capability `T`
    pub fn builder<T: ?Sized + Send + Sync + 'static>() -> ServiceDescriptorBuilder<T> {
        ServiceDescriptorBuilder::new()
    }

    /// Check whether this descriptor registers capability `T`
    pub fn is_for<T: ?Sized + 'static>(&self) -> bool {
        self.service_id.is::<T>()
    }

    /// Run the factory against a provider
    pub(crate) fn activate(
        &self,
        provider: &ServiceProvider,
    ) -> Result<Arc<dyn Any + Send + Sync>, CoreError> {
        (self.factory)(provider)
    }
}

/// Builder for descriptors that name their implementation type
pub struct ServiceDescriptorBuilder<T: ?Sized> {
    implementation_type: Option<&'static str>,
    lifetime: ServiceScope,
    factory: Option<ServiceFactory>,
    _phantom: PhantomData<fn() -> Box<T>>,
}

impl<T: ?Sized + Send + Sync + 'static> ServiceDescriptorBuilder<T> {
    /// Create a new builder with singleton lifetime
    pub fn new() -> Self {
        Self {
            implementation_type: None,
            lifetime: ServiceScope::Singleton,
            factory: None,
            _phantom: PhantomData,
        }
    }

    /// Set the service lifetime
    pub fn with_lifetime(mut self, lifetime: ServiceScope) -> Self {
        self.lifetime = lifetime;
        self
    }

    /// Record the implementing type for diagnostics
    pub fn implemented_by<I: ?Sized + 'static>(mut self) -> Self {
        self.implementation_type = Some(std::any::type_name::<I>());
        self
    }

    /// Set the factory function
    pub fn with_factory<F>(mut self, factory: F) -> Self
    where
        F: Fn(&ServiceProvider) -> Result<Arc<T>, CoreError> + Send + Sync + 'static,
    {
        self.factory = Some(erase(factory));
        self
    }

    /// Build the service descriptor
    pub fn build(self) -> Result<ServiceDescriptor, CoreError> {
        let factory = self
            .factory
            .ok_or_else(|| CoreError::InvalidServiceDescriptor {
                message: format!(
                    "Factory function is required for {}",
                    std::any::type_name::<T>()
                ),
            })?;

        Ok(ServiceDescriptor {
            service_id: ServiceId::of::<T>(),
            implementation_type: self
                .implementation_type
                .unwrap_or_else(std::any::type_name::<T>),
            lifetime: self.lifetime,
            factory,
        })
    }
}

impl<T: ?Sized + Send + Sync + 'static> Default for ServiceDescriptorBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Greeter: Send + Sync {
        fn greet(&self) -> String;
    }

    #[derive(Debug, Default)]
    struct EnglishGreeter;

    impl Greeter for EnglishGreeter {
        fn greet(&self) -> String {
            "hello".to_string()
        }
    }

    #[test]
    fn test_service_id_for_trait_objects() {
        let id = ServiceId::of::<dyn Greeter>();

        assert!(id.is::<dyn Greeter>());
        assert!(!id.is::<EnglishGreeter>());
        assert!(id.type_name().contains("Greeter"));
        assert_ne!(id, ServiceId::of::<EnglishGreeter>());
    }

    #[test]
    fn test_builder_records_implementation() {
        let descriptor = ServiceDescriptor::builder::<dyn Greeter>()
            .with_lifetime(ServiceScope::Transient)
            .implemented_by::<EnglishGreeter>()
            .with_factory(|_| Ok(Arc::new(EnglishGreeter) as Arc<dyn Greeter>))
            .build()
            .unwrap();

        assert!(descriptor.is_for::<dyn Greeter>());
        assert_eq!(descriptor.lifetime, ServiceScope::Transient);
        assert!(descriptor.implementation_type.ends_with("EnglishGreeter"));
    }

    #[test]
    fn test_builder_requires_factory() {
        let result = ServiceDescriptor::builder::<dyn Greeter>().build();
        assert!(matches!(
            result,
            Err(CoreError::InvalidServiceDescriptor { .. })
        ));
    }

    #[test]
    fn test_instance_descriptor_is_singleton() {
        let descriptor = ServiceDescriptor::instance(Arc::new(EnglishGreeter));
        assert!(descriptor.lifetime.is_singleton());
        assert!(descriptor.is_for::<EnglishGreeter>());
    }
}
