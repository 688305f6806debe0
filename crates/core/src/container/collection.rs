use std::sync::Arc;

use tracing::trace;

use crate::container::descriptor::{ServiceDescriptor, ServiceId};
use crate::container::provider::ServiceProvider;
use crate::errors::CoreError;

/// Ordered set of service registrations
///
/// Registrations keep their insertion order. Resolving a single capability
/// picks the last registration, resolving all of them follows insertion order.
#[derive(Debug, Clone, Default)]
pub struct ServiceCollection {
    descriptors: Vec<ServiceDescriptor>,
}

impl ServiceCollection {
    /// Create an empty collection
    pub fn new() -> Self {
        Self {
            descriptors: Vec::new(),
        }
    }

    /// Append a descriptor
    pub fn add(&mut self, descriptor: ServiceDescriptor) -> &mut Self {
        trace!(
            service = descriptor.service_id.type_name(),
            implementation = descriptor.implementation_type,
            lifetime = %descriptor.lifetime,
            "registering service"
        );
        self.descriptors.push(descriptor);
        self
    }

    /// Register a singleton factory
    pub fn add_singleton<T, F>(&mut self, factory: F) -> &mut Self
    where
        T: ?Sized + Send + Sync + 'static,
        F: Fn(&ServiceProvider) -> Result<Arc<T>, CoreError> + Send + Sync + 'static,
    {
        self.add(ServiceDescriptor::singleton(factory))
    }

    /// Register a scoped factory
    pub fn add_scoped<T, F>(&mut self, factory: F) -> &mut Self
    where
        T: ?Sized + Send + Sync + 'static,
        F: Fn(&ServiceProvider) -> Result<Arc<T>, CoreError> + Send + Sync + 'static,
    {
        self.add(ServiceDescriptor::scoped(factory))
    }

    /// Register a transient factory
    pub fn add_transient<T, F>(&mut self, factory: F) -> &mut Self
    where
        T: ?Sized + Send + Sync + 'static,
        F: Fn(&ServiceProvider) -> Result<Arc<T>, CoreError> + Send + Sync + 'static,
    {
        self.add(ServiceDescriptor::transient(factory))
    }

    /// Register an existing instance as a singleton
    pub fn add_instance<T>(&mut self, instance: Arc<T>) -> &mut Self
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.add(ServiceDescriptor::instance(instance))
    }

    /// Append the descriptor only if its capability has no registration yet
    pub fn try_add(&mut self, descriptor: ServiceDescriptor) -> bool {
        if self.contains_id(&descriptor.service_id) {
            return false;
        }
        self.add(descriptor);
        true
    }

    /// Remove every registration of capability `T`, returning how many were removed
    ///
    /// Removing a capability that was never registered is a no-op.
    pub fn remove_all<T: ?Sized + 'static>(&mut self) -> usize {
        self.remove_id(&ServiceId::of::<T>())
    }

    /// Remove every registration with the given id
    pub fn remove_id(&mut self, service_id: &ServiceId) -> usize {
        let before = self.descriptors.len();
        self.descriptors.retain(|d| d.service_id != *service_id);
        let removed = before - self.descriptors.len();
        if removed > 0 {
            trace!(service = service_id.type_name(), removed, "removed registrations");
        }
        removed
    }

    /// Check if capability `T` has at least one registration
    pub fn contains<T: ?Sized + 'static>(&self) -> bool {
        self.contains_id(&ServiceId::of::<T>())
    }

    /// Check if a service id has at least one registration
    pub fn contains_id(&self, service_id: &ServiceId) -> bool {
        self.descriptors.iter().any(|d| d.service_id == *service_id)
    }

    /// Number of registrations for capability `T`
    pub fn count_of<T: ?Sized + 'static>(&self) -> usize {
        self.descriptors.iter().filter(|d| d.is_for::<T>()).count()
    }

    /// Last registration for capability `T`, the one `resolve` would use
    pub fn last_of<T: ?Sized + 'static>(&self) -> Option<&ServiceDescriptor> {
        self.descriptors.iter().rev().find(|d| d.is_for::<T>())
    }

    /// Total number of registrations
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Iterate registrations in insertion order
    pub fn iter(&self) -> std::slice::Iter<'_, ServiceDescriptor> {
        self.descriptors.iter()
    }

    /// Freeze the registrations into a root provider
    pub fn build_provider(self) -> ServiceProvider {
        ServiceProvider::from_descriptors(self.descriptors)
    }
}

impl Extend<ServiceDescriptor> for ServiceCollection {
    fn extend<I: IntoIterator<Item = ServiceDescriptor>>(&mut self, iter: I) {
        for descriptor in iter {
            self.add(descriptor);
        }
    }
}

impl FromIterator<ServiceDescriptor> for ServiceCollection {
    fn from_iter<I: IntoIterator<Item = ServiceDescriptor>>(iter: I) -> Self {
        let mut collection = Self::new();
        collection.extend(iter);
        collection
    }
}

impl IntoIterator for ServiceCollection {
    type Item = ServiceDescriptor;
    type IntoIter = std::vec::IntoIter<ServiceDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.descriptors.into_iter()
    }
}

impl<'a> IntoIterator for &'a ServiceCollection {
    type Item = &'a ServiceDescriptor;
    type IntoIter = std::slice::Iter<'a, ServiceDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.descriptors.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Clock(&'static str);

    #[derive(Debug)]
    struct Mailer;

    #[test]
    fn test_remove_all_removes_every_registration() {
        let mut services = ServiceCollection::new();
        services
            .add_instance(Arc::new(Clock("system")))
            .add_instance(Arc::new(Mailer))
            .add_instance(Arc::new(Clock("fixed")));

        assert_eq!(services.count_of::<Clock>(), 2);
        assert_eq!(services.remove_all::<Clock>(), 2);
        assert!(!services.contains::<Clock>());
        assert!(services.contains::<Mailer>());
        assert_eq!(services.len(), 1);
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let mut services = ServiceCollection::new();
        services.add_instance(Arc::new(Mailer));

        assert_eq!(services.remove_all::<Clock>(), 0);
        assert_eq!(services.len(), 1);
    }

    #[test]
    fn test_try_add_keeps_existing_registration() {
        let mut services = ServiceCollection::new();
        services.add_instance(Arc::new(Clock("system")));

        assert!(!services.try_add(ServiceDescriptor::instance(Arc::new(Clock("fixed")))));
        assert!(services.try_add(ServiceDescriptor::instance(Arc::new(Mailer))));
        assert_eq!(services.count_of::<Clock>(), 1);
    }

    #[test]
    fn test_extend_preserves_order_without_dedup() {
        let mut services = ServiceCollection::new();
        services.add_instance(Arc::new(Clock("system")));

        let overrides: ServiceCollection = vec![
            ServiceDescriptor::instance(Arc::new(Clock("fixed"))),
            ServiceDescriptor::instance(Arc::new(Mailer)),
        ]
        .into_iter()
        .collect();
        services.extend(overrides);

        let names: Vec<_> = services
            .iter()
            .map(|d| d.service_id.type_name())
            .collect();
        assert_eq!(names.len(), 3);
        assert!(names[0].ends_with("Clock"));
        assert!(names[1].ends_with("Clock"));
        assert!(names[2].ends_with("Mailer"));
        assert_eq!(services.count_of::<Clock>(), 2);
    }

    #[test]
    fn test_last_of_matches_resolution_order() {
        let mut services = ServiceCollection::new();
        services
            .add_instance(Arc::new(Clock("system")))
            .add_instance(Arc::new(Clock("fixed")));

        let provider = services.clone().build_provider();
        assert_eq!(provider.resolve::<Clock>().unwrap().0, "fixed");
        assert_eq!(services.last_of::<Clock>().unwrap().lifetime, crate::container::ServiceScope::Singleton);
    }
}
