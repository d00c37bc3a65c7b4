mod builder;
mod cache;
mod constructor;
mod container;
mod dependency;
mod injectable;
mod key;
mod options;
mod provider;
mod registry;
mod resolver;

pub use builder::{ContainerBuilder, InstanceBuilder, ProviderBuilder};
pub use constructor::{Fallible, Injected, IntoProduct, ParamSpec, Plain};
pub use container::Container;
pub use dependency::{Component, Dependency};
pub use injectable::Injectable;
pub use key::{TypeKey, Value};
pub use options::{Arguments, CallOptions, ResolveOptions};
pub use provider::{RegistrationInfo, RegistrationKind};

pub(crate) use cache::LifecycleCache;
pub(crate) use registry::Registry;
