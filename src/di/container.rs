use crate::config::ContainerConfig;
use crate::di::constructor::{ErasedConstructor, Injected, IntoProduct};
use crate::di::provider::{ProviderRecord, Recipe, RegistrationInfo};
use crate::di::resolver::{InProgress, Resolver};
use crate::di::{
    CallOptions, Component, Dependency, Injectable, InstanceBuilder, LifecycleCache,
    ProviderBuilder, Registry, ResolveOptions,
};
use crate::error::{Result, WireupError};
use crate::module::Module;
use dashmap::DashSet;
use std::any::{TypeId, type_name};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Thread-safe dependency injection container.
///
/// Cloning a `Container` yields another handle to the same registry and
/// singleton cache.
#[derive(Clone, Default)]
pub struct Container {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    registry: RwLock<Registry>,
    cache: LifecycleCache,
    config: ContainerConfig,
    modules: DashSet<TypeId>,
}

impl Container {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ContainerConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                registry: RwLock::new(Registry::default()),
                cache: LifecycleCache::default(),
                config,
                modules: DashSet::new(),
            }),
        }
    }

    pub fn config(&self) -> &ContainerConfig {
        &self.inner.config
    }

    /// Start a constructor registration.
    ///
    /// The constructor's parameters are resolved from the container when the
    /// provided type is first requested.
    pub fn provide<F, Args, M>(
        &self,
        constructor: F,
    ) -> ProviderBuilder<'_, <F::Output as IntoProduct<M>>::Component>
    where
        F: Injected<Args> + Send + Sync + 'static,
        F::Output: IntoProduct<M>,
        Args: 'static,
        M: 'static,
    {
        ProviderBuilder::new(self, ErasedConstructor::new(constructor))
    }

    /// Register a constructor with default options.
    pub fn register<F, Args, M>(&self, constructor: F) -> Result<()>
    where
        F: Injected<Args> + Send + Sync + 'static,
        F::Output: IntoProduct<M>,
        Args: 'static,
        M: 'static,
    {
        self.provide(constructor).register()
    }

    /// Start an instance registration.
    pub fn instance<C: Component>(&self, instance: C) -> InstanceBuilder<'_> {
        InstanceBuilder::new(self, instance)
    }

    /// Register a pre-built instance under the slot type `C`.
    ///
    /// Use a turbofish to register a concrete value against an interface:
    /// `container.register_instance::<Arc<dyn Store>>(Arc::new(MemoryStore))`.
    pub fn register_instance<C: Component>(&self, instance: C) -> Result<()> {
        self.instance(instance).register()
    }

    /// Register a type deriving [`Injectable`] with its declared options.
    pub fn register_injectable<T: Injectable>(&self) -> Result<()> {
        T::provide(self).register()
    }

    /// Apply a module's registrations.
    ///
    /// Each module is installed at most once per container, so a module
    /// reached through several imports registers its providers only once.
    pub fn install<M: Module>(&self) -> Result<()> {
        let module = TypeId::of::<M>();
        if !self.inner.modules.insert(module) {
            tracing::debug!("Module already installed: {}", type_name::<M>());
            return Ok(());
        }

        M::register(self).inspect_err(|_| {
            self.inner.modules.remove(&module);
        })?;
        tracing::debug!("Installed module: {}", type_name::<M>());
        Ok(())
    }

    pub fn resolve<C: Dependency>(&self) -> Result<C> {
        self.resolve_with(ResolveOptions::new())
    }

    pub fn resolve_named<C: Dependency>(&self, name: impl Into<String>) -> Result<C> {
        self.resolve_with(ResolveOptions::new().named(name))
    }

    /// Resolve `C`, building its dependency graph as needed.
    pub fn resolve_with<C: Dependency>(&self, options: ResolveOptions) -> Result<C> {
        let key = C::key();
        let value = {
            let registry = self.read_registry();
            let record = registry.lookup(key, options.name.as_deref())?;
            self.resolver(&registry)
                .build(record, Some(&options.call), &mut InProgress::default())
        };

        let value = value.inspect_err(|e| {
            tracing::debug!("Resolution of {} failed: {}", key.describe(options.name.as_deref()), e)
        })?;
        C::from_value(&value).ok_or_else(|| WireupError::slot_assignment(key))
    }

    pub fn call<F, Args>(&self, function: F) -> Result<F::Output>
    where
        F: Injected<Args>,
    {
        self.call_with(function, CallOptions::new())
    }

    /// Invoke `function` with its parameters supplied by the container.
    ///
    /// The function is treated as an unregistered, transient constructor; its
    /// return value is handed back as is. The registry lock is released before
    /// the function runs.
    pub fn call_with<F, Args>(&self, function: F, options: CallOptions) -> Result<F::Output>
    where
        F: Injected<Args>,
    {
        let target = type_name::<F>();
        let params = F::params();
        let args = {
            let registry = self.read_registry();
            self.resolver(&registry).assemble(
                target,
                &params,
                &Recipe::default(),
                Some(&options),
                &mut InProgress::default(),
            )?
        };

        function
            .invoke(args)
            .map_err(|source| WireupError::invocation(target, source))
    }

    /// Drop every registration and cached instance.
    pub fn reset(&self) {
        let mut registry = self.write_registry();
        let dropped = registry.len();
        registry.clear();
        self.inner.cache.clear();
        self.inner.modules.clear();
        tracing::debug!("Container reset ({} providers dropped)", dropped);
    }

    pub fn contains<C: Dependency>(&self) -> bool {
        self.read_registry().contains(C::key(), None)
    }

    pub fn contains_named<C: Dependency>(&self, name: &str) -> bool {
        self.read_registry().contains(C::key(), Some(name))
    }

    /// Number of registrations, interface bindings included.
    pub fn len(&self) -> usize {
        self.read_registry().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of all registrations, ordered by type name then registration order.
    pub fn registrations(&self) -> Vec<RegistrationInfo> {
        let mut infos: Vec<RegistrationInfo> =
            self.read_registry().records().map(ProviderRecord::info).collect();
        infos.sort_by(|a, b| a.type_name.cmp(&b.type_name));
        infos
    }

    /// Number of singleton instances built so far.
    pub fn cached_instances(&self) -> usize {
        self.inner.cache.len()
    }

    pub(crate) fn insert(&self, records: impl IntoIterator<Item = ProviderRecord>) {
        let mut registry = self.write_registry();
        for record in records {
            let description = record.describe();
            match registry.insert(record) {
                Some(replaced) => {
                    self.inner.cache.evict(replaced);
                    tracing::debug!("Replaced provider: {}", description);
                }
                None => tracing::debug!("Registered provider: {}", description),
            }
        }
    }

    fn resolver<'a>(&'a self, registry: &'a Registry) -> Resolver<'a> {
        Resolver::new(registry, &self.inner.cache, &self.inner.config)
    }

    fn read_registry(&self) -> RwLockReadGuard<'_, Registry> {
        self.inner
            .registry
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn write_registry(&self) -> RwLockWriteGuard<'_, Registry> {
        self.inner
            .registry
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
