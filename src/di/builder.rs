use crate::config::{ContainerConfig, Lifestyle};
use crate::di::constructor::ErasedConstructor;
use crate::di::provider::{CastFn, ProviderKind, ProviderRecord, Recipe, RecordId};
use crate::di::{Arguments, Component, Container, Dependency, TypeKey, Value};
use crate::error::{Result, WireupError};
use crate::module::Module;
use std::marker::PhantomData;
use std::sync::Arc;

struct Binding {
    key: TypeKey,
    cast: CastFn,
}

/// Collects the options of one constructor registration.
///
/// Created by [`Container::provide`]; nothing is registered until
/// [`ProviderBuilder::register`] is called.
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use wireup::Container;
///
/// struct Greeter {
///     greeting: String,
/// }
///
/// let container = Container::new();
/// container
///     .provide(|greeting: String| Arc::new(Greeter { greeting }))
///     .parameter(0, "hello".to_string())
///     .transient()
///     .register()
///     .unwrap();
///
/// let greeter = container.resolve::<Arc<Greeter>>().unwrap();
/// assert_eq!(greeter.greeting, "hello");
/// ```
#[must_use = "the provider is only registered by calling `register`"]
pub struct ProviderBuilder<'c, C> {
    container: &'c Container,
    constructor: ErasedConstructor,
    name: Option<String>,
    is_default: bool,
    lifestyle: Option<Lifestyle>,
    recipe: Recipe,
    bindings: Vec<Binding>,
    _component: PhantomData<fn() -> C>,
}

impl<'c, C: Component> ProviderBuilder<'c, C> {
    pub(crate) fn new(container: &'c Container, constructor: ErasedConstructor) -> Self {
        Self {
            container,
            constructor,
            name: None,
            is_default: false,
            lifestyle: None,
            recipe: Recipe::default(),
            bindings: Vec::new(),
            _component: PhantomData,
        }
    }

    /// Register under `name`; named lookups and `depends_on` select it.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Make this provider win unnamed lookups among several unnamed providers.
    pub fn as_default(mut self) -> Self {
        self.is_default = true;
        self
    }

    /// Substitute the absent value at these positions when no provider matches.
    pub fn optional(mut self, positions: impl IntoIterator<Item = usize>) -> Self {
        self.recipe.optional.extend(positions);
        self
    }

    /// Pass a literal value for one parameter instead of resolving it.
    pub fn parameter<V: Component>(mut self, position: usize, value: V) -> Self {
        self.recipe.parameters.insert(position, value.into_value());
        self
    }

    pub fn parameters(mut self, parameters: Arguments) -> Self {
        self.recipe.parameters.extend(parameters.into_values());
        self
    }

    /// Resolve one parameter from the provider registered under `name`.
    pub fn depends_on(mut self, position: usize, name: impl Into<String>) -> Self {
        self.recipe.depends_on.insert(position, name.into());
        self
    }

    pub fn lifestyle(mut self, lifestyle: Lifestyle) -> Self {
        self.lifestyle = Some(lifestyle);
        self
    }

    pub fn transient(self) -> Self {
        self.lifestyle(Lifestyle::Transient)
    }

    pub fn singleton(self) -> Self {
        self.lifestyle(Lifestyle::Singleton)
    }

    /// Validate the options and add the provider (and its bindings) to the container.
    pub fn register(self) -> Result<()> {
        let produced = C::key();
        let ProviderBuilder {
            container,
            constructor,
            name,
            is_default,
            lifestyle,
            recipe,
            bindings,
            ..
        } = self;

        validate(produced, &constructor, &recipe)?;
        if let Some(binding) = bindings.iter().find(|b| b.key == produced) {
            return Err(WireupError::invalid_provider(
                produced.name(),
                format!("cannot bind {} to itself", binding.key.name()),
            ));
        }

        let record = ProviderRecord {
            id: RecordId::next(),
            produced,
            name,
            is_default,
            lifestyle: lifestyle.unwrap_or(container.config().default_lifestyle),
            kind: ProviderKind::Constructor {
                constructor,
                recipe,
            },
        };

        let aliases: Vec<ProviderRecord> = bindings
            .into_iter()
            .map(|binding| ProviderRecord {
                id: RecordId::next(),
                produced: binding.key,
                name: record.name.clone(),
                is_default: record.is_default,
                lifestyle: record.lifestyle,
                kind: ProviderKind::Alias {
                    target: Box::new(record.clone()),
                    cast: binding.cast,
                },
            })
            .collect();

        container.insert(std::iter::once(record).chain(aliases));
        Ok(())
    }
}

impl<'c, T: ?Sized + Send + Sync + 'static> ProviderBuilder<'c, Arc<T>> {
    /// Also serve this provider under an interface type.
    ///
    /// The interface registration forwards to this one, so both slot types
    /// resolve to the same singleton.
    ///
    /// ```
    /// use std::sync::Arc;
    /// use wireup::Container;
    ///
    /// trait Clock: Send + Sync {
    ///     fn now(&self) -> u64;
    /// }
    ///
    /// struct FixedClock;
    ///
    /// impl Clock for FixedClock {
    ///     fn now(&self) -> u64 {
    ///         42
    ///     }
    /// }
    ///
    /// let container = Container::new();
    /// container
    ///     .provide(|| Arc::new(FixedClock))
    ///     .bind(|clock: Arc<FixedClock>| clock as Arc<dyn Clock>)
    ///     .register()
    ///     .unwrap();
    ///
    /// assert_eq!(container.resolve::<Arc<dyn Clock>>().unwrap().now(), 42);
    /// ```
    pub fn bind<I, F>(mut self, cast: F) -> Self
    where
        I: ?Sized + Send + Sync + 'static,
        F: Fn(Arc<T>) -> Arc<I> + Send + Sync + 'static,
    {
        let cast: CastFn = Arc::new(move |value: Value| {
            let concrete = value.downcast_ref::<Arc<T>>()?.clone();
            Some(cast(concrete).into_value())
        });
        self.bindings.push(Binding {
            key: <Arc<I>>::key(),
            cast,
        });
        self
    }
}

fn validate(produced: TypeKey, constructor: &ErasedConstructor, recipe: &Recipe) -> Result<()> {
    let params = constructor.params();
    let invalid = |message: String| Err(WireupError::invalid_provider(produced.name(), message));

    for &position in &recipe.optional {
        match params.get(position) {
            None => return invalid(format!("optional position {} is out of range", position)),
            Some(param) if !param.is_nullable() => {
                return invalid(format!(
                    "parameter {} ({}) has no absent value and cannot be optional",
                    position,
                    param.key().name()
                ));
            }
            Some(_) => {}
        }
    }

    for (&position, value) in &recipe.parameters {
        match params.get(position) {
            None => return invalid(format!("parameter position {} is out of range", position)),
            Some(param) if !param.accepts(value) => {
                return invalid(format!(
                    "parameter {} expects {}",
                    position,
                    param.key().name()
                ));
            }
            Some(_) => {}
        }
    }

    if let Some(position) = recipe.depends_on.keys().find(|p| **p >= params.len()) {
        return invalid(format!("depends_on position {} is out of range", position));
    }

    Ok(())
}

/// Collects the options of one instance registration.
#[must_use = "the instance is only registered by calling `register`"]
pub struct InstanceBuilder<'c> {
    container: &'c Container,
    produced: TypeKey,
    value: Value,
    name: Option<String>,
    is_default: bool,
}

impl<'c> InstanceBuilder<'c> {
    pub(crate) fn new<C: Component>(container: &'c Container, instance: C) -> Self {
        Self {
            container,
            produced: C::key(),
            value: instance.into_value(),
            name: None,
            is_default: false,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn as_default(mut self) -> Self {
        self.is_default = true;
        self
    }

    pub fn register(self) -> Result<()> {
        let record = ProviderRecord {
            id: RecordId::next(),
            produced: self.produced,
            name: self.name,
            is_default: self.is_default,
            lifestyle: Lifestyle::Singleton,
            kind: ProviderKind::Instance(self.value),
        };
        self.container.insert(std::iter::once(record));
        Ok(())
    }
}

type Step = Box<dyn FnOnce(&Container) -> Result<()>>;

/// Builder for constructing a dependency injection container
///
/// Queues instances and modules and applies them in order on [`build`](Self::build).
///
/// # Example
/// ```
/// use wireup::{ContainerBuilder, ContainerConfig, Lifestyle};
///
/// let container = ContainerBuilder::new()
///     .config(ContainerConfig::new().with_default_lifestyle(Lifestyle::Transient))
///     .instance(8080u16)
///     .build()
///     .unwrap();
///
/// assert_eq!(container.resolve::<u16>().unwrap(), 8080);
/// ```
pub struct ContainerBuilder {
    config: ContainerConfig,
    steps: Vec<Step>,
}

impl ContainerBuilder {
    /// Create a new container builder
    pub fn new() -> Self {
        Self {
            config: ContainerConfig::default(),
            steps: Vec::new(),
        }
    }

    pub fn config(mut self, config: ContainerConfig) -> Self {
        self.config = config;
        self
    }

    /// Register a pre-built instance
    pub fn instance<C: Component>(mut self, instance: C) -> Self {
        self.steps
            .push(Box::new(move |container| container.register_instance(instance)));
        self
    }

    /// Install a module's registrations
    pub fn module<M: Module>(mut self) -> Self {
        self.steps.push(Box::new(|container| container.install::<M>()));
        self
    }

    /// Build the container
    pub fn build(self) -> Result<Container> {
        let container = Container::with_config(self.config);
        for step in self.steps {
            step(&container)?;
        }
        Ok(container)
    }
}

impl Default for ContainerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
