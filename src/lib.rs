//! # Wireup
//!
//! A runtime dependency injection container for Rust.
//!
//! Providers are registered as constructor functions (or pre-built instances)
//! and the container builds object graphs on demand by matching each
//! constructor parameter to a provider of that type.
//!
//! ## Features
//!
//! - **Constructor Injection**: Any `Fn(A1, .., An) -> R` (up to 12 parameters) is a provider
//! - **Singleton and Transient Lifestyles**: Shared instances or a fresh build per resolution
//! - **Named and Default Providers**: Pick between several providers of one type
//! - **Trait Object Support**: Serve `Arc<dyn Trait>` from a concrete provider with `bind`
//! - **Optional Dependencies**: `Option<Arc<T>>` parameters marked `optional` (or `#[inject(optional)]`) fall back to `None` when their dependency graph cannot be satisfied
//! - **Modular Architecture**: Organize registrations with `#[module]` declarations
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use wireup::Container;
//!
//! trait Repository: Send + Sync {
//!     fn find(&self, id: u32) -> String;
//! }
//!
//! struct MemoryRepository;
//!
//! impl Repository for MemoryRepository {
//!     fn find(&self, id: u32) -> String {
//!         format!("user-{}", id)
//!     }
//! }
//!
//! struct UserService {
//!     repository: Arc<dyn Repository>,
//!     prefix: String,
//! }
//!
//! let container = Container::new();
//! container
//!     .provide(|| Arc::new(MemoryRepository))
//!     .bind(|r: Arc<MemoryRepository>| r as Arc<dyn Repository>)
//!     .register()
//!     .unwrap();
//! container
//!     .provide(|repository: Arc<dyn Repository>, prefix: String| {
//!         Arc::new(UserService { repository, prefix })
//!     })
//!     .parameter(1, "> ".to_string())
//!     .register()
//!     .unwrap();
//!
//! let service = container.resolve::<Arc<UserService>>().unwrap();
//! assert_eq!(format!("{}{}", service.prefix, service.repository.find(7)), "> user-7");
//!
//! let found = container
//!     .call(|repository: Arc<dyn Repository>| repository.find(1))
//!     .unwrap();
//! assert_eq!(found, "user-1");
//! ```

extern crate self as wireup;

pub mod config;
pub mod di;
pub mod error;
pub mod module;

// Re-export core types
pub use config::{ContainerConfig, Lifestyle, OptionalAmbiguity};
pub use di::{
    Arguments, CallOptions, Component, Container, ContainerBuilder, Dependency, Fallible,
    Injectable, Injected, InstanceBuilder, IntoProduct, ParamSpec, Plain, ProviderBuilder,
    RegistrationInfo, RegistrationKind, ResolveOptions, TypeKey, Value,
};
pub use error::{Result, WireupError};
pub use module::Module;

// Re-export macros
pub use wireup_macro::{Injectable as DeriveInjectable, module};

/// Prelude module for convenient imports
///
/// ```
/// use wireup::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::{ContainerConfig, Lifestyle, OptionalAmbiguity};
    pub use crate::di::{
        Arguments, CallOptions, Component, Container, ContainerBuilder, Dependency, Injectable,
        ResolveOptions,
    };
    pub use crate::error::{Result, WireupError};
    pub use crate::module::Module;
    pub use crate::{DeriveInjectable as Injectable, module};
    pub use std::sync::Arc;
}
