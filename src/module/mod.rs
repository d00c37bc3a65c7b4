use crate::di::Container;
use crate::error::Result;

/// Trait for groups of registrations
///
/// Modules are typically defined using the `#[module]` macro, which automatically
/// implements this trait and generates the registration logic.
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use wireup::{DeriveInjectable, module};
///
/// trait UserRepository: Send + Sync {}
///
/// #[derive(DeriveInjectable)]
/// pub struct InMemoryUserRepository {}
///
/// impl UserRepository for InMemoryUserRepository {}
///
/// #[derive(DeriveInjectable)]
/// pub struct UserService {
///     repository: Arc<dyn UserRepository>,
/// }
///
/// #[module(
///     providers = [UserService, InMemoryUserRepository],
///     bindings = [(dyn UserRepository => InMemoryUserRepository)],
/// )]
/// pub struct AppModule;
///
/// let container = AppModule::create_container().unwrap();
/// assert!(container.resolve::<Arc<UserService>>().is_ok());
/// ```
///
/// Install modules through [`Container::install`], which skips modules the
/// container already has. Calling `register` directly bypasses that check.
pub trait Module: 'static {
    /// Register all imports, providers and bindings of this module
    fn register(container: &Container) -> Result<()>;
}
