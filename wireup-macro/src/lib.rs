use proc_macro::TokenStream;

mod injectable;
mod module;

/// Derive macro for registering a struct through constructor injection
///
/// Every field becomes a constructor parameter, in declaration order, resolved
/// from the container by its type.
///
/// Field options:
/// - `#[inject(name = "...")]` resolves the field from the provider registered under that name
/// - `#[inject(optional)]` leaves the field absent (`None` or `Default`) when no provider matches
///
/// Struct options:
/// - `#[inject(name = "...")]` registers the provider under a name
/// - `#[inject(default)]` makes it the default among unnamed providers of its type
/// - `#[inject(transient)]` builds a fresh instance per resolution
///
/// # Example
/// ```ignore
/// use std::sync::Arc;
/// use wireup::DeriveInjectable;
///
/// trait UserRepository: Send + Sync {}
///
/// #[derive(DeriveInjectable)]
/// #[inject(transient)]
/// pub struct UserService {
///     repository: Arc<dyn UserRepository>,
///     #[inject(name = "cache", optional)]
///     cache: Option<Arc<dyn UserRepository>>,
/// }
/// ```
#[proc_macro_derive(Injectable, attributes(inject))]
pub fn derive_injectable(input: TokenStream) -> TokenStream {
    injectable::derive_injectable(input)
}

/// Attribute macro for defining a module with imports, providers and bindings
///
/// # Example
/// ```ignore
/// use std::sync::Arc;
/// use wireup::{DeriveInjectable, module};
///
/// trait UserRepository: Send + Sync {}
///
/// #[derive(DeriveInjectable)]
/// pub struct UserRepositoryImpl {}
///
/// impl UserRepository for UserRepositoryImpl {}
///
/// #[module(
///     providers = [UserRepositoryImpl],
///     bindings = [(dyn UserRepository => UserRepositoryImpl)],
/// )]
/// pub struct AppModule;
/// ```
#[proc_macro_attribute]
pub fn module(attr: TokenStream, item: TokenStream) -> TokenStream {
    module::module_attribute(attr, item)
}
