use crate::di::{Container, ProviderBuilder};
use std::sync::Arc;

/// Trait for types that can be constructed by the DI container
///
/// This trait is typically implemented automatically via the `#[derive(Injectable)]` macro,
/// which turns every field into a constructor parameter.
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use wireup::{Container, DeriveInjectable};
///
/// trait UserRepository: Send + Sync {}
///
/// #[derive(DeriveInjectable)]
/// pub struct UserService {
///     // Resolved from the container
///     repository: Arc<dyn UserRepository>,
///     #[inject(name = "audit", optional)]
///     audit: Option<Arc<dyn UserRepository>>,
/// }
///
/// let container = Container::new();
/// container.register_injectable::<UserService>().unwrap();
/// assert!(container.contains::<Arc<UserService>>());
/// ```
pub trait Injectable: Sized + Send + Sync + 'static {
    /// Start a registration of `Arc<Self>` with the options declared on the type.
    ///
    /// The returned builder can be refined further before calling `register`.
    fn provide(container: &Container) -> ProviderBuilder<'_, Arc<Self>>;
}
