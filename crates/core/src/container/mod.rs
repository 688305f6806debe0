pub mod collection;
pub mod descriptor;
pub mod provider;
pub mod scope;

pub use collection::ServiceCollection;
pub use descriptor::{ServiceDescriptor, ServiceDescriptorBuilder, ServiceFactory, ServiceId};
pub use provider::ServiceProvider;
pub use scope::ServiceScope;
