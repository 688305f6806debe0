use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use uuid::Uuid;

use crate::container::descriptor::{ServiceDescriptor, ServiceId};
use crate::container::scope::ServiceScope;
use crate::errors::CoreError;

type Instance = Arc<dyn Any + Send + Sync>;

thread_local! {
    /// Capabilities currently being constructed on this thread
    static RESOLUTION_STACK: RefCell<Vec<ServiceId>> = const { RefCell::new(Vec::new()) };
}

/// Pops the resolution stack when construction finishes or fails
struct ResolutionGuard;

impl ResolutionGuard {
    fn enter(service_id: ServiceId) -> Result<Self, CoreError> {
        RESOLUTION_STACK.with(|stack| {
            let mut stack = stack.borrow_mut();
            if stack.contains(&service_id) {
                let mut path: Vec<&str> = stack.iter().map(|id| id.type_name()).collect();
                path.push(service_id.type_name());
                return Err(CoreError::CircularDependency {
                    path: path.join(" -> "),
                    cycle_service: service_id.type_name().to_string(),
                });
            }
            stack.push(service_id);
            Ok(ResolutionGuard)
        })
    }
}

impl Drop for ResolutionGuard {
    fn drop(&mut self) {
        RESOLUTION_STACK.with(|stack| {
            stack.borrow_mut().pop();
        });
    }
}

#[derive(Debug)]
struct ProviderRoot {
    descriptors: Vec<ServiceDescriptor>,
    index: HashMap<TypeId, Vec<usize>>,
    singletons: RwLock<HashMap<usize, Instance>>,
}

#[derive(Debug)]
struct ScopeState {
    id: Uuid,
    instances: RwLock<HashMap<usize, Instance>>,
}

/// Built, immutable service container
///
/// Cloning a provider is cheap and shares its caches. A root provider owns
/// singletons; [`ServiceProvider::create_scope`] derives a provider that
/// additionally caches scoped services.
#[derive(Debug, Clone)]
pub struct ServiceProvider {
    root: Arc<ProviderRoot>,
    scope: Option<Arc<ScopeState>>,
}

impl ServiceProvider {
    pub(crate) fn from_descriptors(descriptors: Vec<ServiceDescriptor>) -> Self {
        let mut index: HashMap<TypeId, Vec<usize>> = HashMap::new();
        for (position, descriptor) in descriptors.iter().enumerate() {
            index
                .entry(descriptor.service_id.type_id)
                .or_default()
                .push(position);
        }

        Self {
            root: Arc::new(ProviderRoot {
                descriptors,
                index,
                singletons: RwLock::new(HashMap::new()),
            }),
            scope: None,
        }
    }

    /// Resolve capability `T` using its last registration
    pub fn resolve<T: ?Sized + Send + Sync + 'static>(&self) -> Result<Arc<T>, CoreError> {
        let position = self
            .positions::<T>()
            .and_then(|positions| positions.last().copied())
            .ok_or_else(|| CoreError::service_not_found(std::any::type_name::<T>()))?;

        let instance = self.activate(position)?;
        self.downcast::<T>(&instance, position)
    }

    /// Resolve capability `T`, returning `None` if it cannot be resolved
    pub fn try_resolve<T: ?Sized + Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.resolve::<T>().ok()
    }

    /// Resolve every registration of `T` in registration order
    pub fn resolve_all<T: ?Sized + Send + Sync + 'static>(&self) -> Result<Vec<Arc<T>>, CoreError> {
        let Some(positions) = self.positions::<T>() else {
            return Ok(Vec::new());
        };

        positions
            .iter()
            .map(|&position| {
                let instance = self.activate(position)?;
                self.downcast::<T>(&instance, position)
            })
            .collect()
    }

    /// Check if capability `T` is registered
    pub fn contains<T: ?Sized + 'static>(&self) -> bool {
        self.root.index.contains_key(&TypeId::of::<T>())
    }

    /// Check if a service id is registered
    pub fn contains_id(&self, service_id: &ServiceId) -> bool {
        self.root.index.contains_key(&service_id.type_id)
    }

    /// Total number of registrations
    pub fn service_count(&self) -> usize {
        self.root.descriptors.len()
    }

    /// Registered capabilities in registration order
    pub fn registered_services(&self) -> Vec<ServiceId> {
        self.root.descriptors.iter().map(|d| d.service_id).collect()
    }

    /// Create a child scope sharing this provider's singletons
    pub fn create_scope(&self) -> ServiceProvider {
        ServiceProvider {
            root: self.root.clone(),
            scope: Some(Arc::new(ScopeState {
                id: Uuid::new_v4(),
                instances: RwLock::new(HashMap::new()),
            })),
        }
    }

    /// Identifier of the scope, `None` for the root provider
    pub fn scope_id(&self) -> Option<Uuid> {
        self.scope.as_ref().map(|scope| scope.id)
    }

    /// Check if this is the root provider
    pub fn is_root(&self) -> bool {
        self.scope.is_none()
    }

    fn positions<T: ?Sized + 'static>(&self) -> Option<&Vec<usize>> {
        self.root.index.get(&TypeId::of::<T>())
    }

    fn root_provider(&self) -> ServiceProvider {
        ServiceProvider {
            root: self.root.clone(),
            scope: None,
        }
    }

    fn activate(&self, position: usize) -> Result<Instance, CoreError> {
        let descriptor = &self.root.descriptors[position];

        match descriptor.lifetime {
            ServiceScope::Singleton => {
                // Singletons only ever see the root, so they cannot capture scoped services
                let root = self.root_provider();
                cached(&self.root.singletons, "singletons", position, || {
                    root.create(position)
                })
            }
            ServiceScope::Scoped => {
                let scope = self.scope.as_ref().ok_or_else(|| CoreError::ScopeRequired {
                    service_type: descriptor.service_id.type_name().to_string(),
                })?;
                cached(&scope.instances, "scoped_instances", position, || {
                    self.create(position)
                })
            }
            ServiceScope::Transient => self.create(position),
        }
    }

    fn create(&self, position: usize) -> Result<Instance, CoreError> {
        let descriptor = &self.root.descriptors[position];
        let _guard = ResolutionGuard::enter(descriptor.service_id)?;
        descriptor.activate(self)
    }

    fn downcast<T: ?Sized + Send + Sync + 'static>(
        &self,
        instance: &Instance,
        position: usize,
    ) -> Result<Arc<T>, CoreError> {
        instance
            .downcast_ref::<Arc<T>>()
            .cloned()
            .ok_or_else(|| CoreError::TypeMismatch {
                service_type: std::any::type_name::<T>().to_string(),
                registered_as: self.root.descriptors[position].implementation_type.to_string(),
            })
    }
}

/// Return the cached instance at `position`, creating it outside the lock.
/// Concurrent creators race; the first insert wins and is returned to everyone.
fn cached<F>(
    cache: &RwLock<HashMap<usize, Instance>>,
    resource: &str,
    position: usize,
    create: F,
) -> Result<Instance, CoreError>
where
    F: FnOnce() -> Result<Instance, CoreError>,
{
    {
        let instances = cache.read().map_err(|_| CoreError::LockError {
            resource: resource.to_string(),
        })?;
        if let Some(instance) = instances.get(&position) {
            return Ok(instance.clone());
        }
    }

    let created = create()?;

    let mut instances = cache.write().map_err(|_| CoreError::LockError {
        resource: resource.to_string(),
    })?;
    Ok(instances.entry(position).or_insert(created).clone())
}
