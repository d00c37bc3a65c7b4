use crate::config::{ContainerConfig, OptionalAmbiguity};
use crate::di::constructor::ParamSpec;
use crate::di::options::CallOptions;
use crate::di::provider::{ProviderKind, ProviderRecord, Recipe};
use crate::di::{LifecycleCache, Registry, TypeKey, Value};
use crate::error::{Result, WireupError};
use anyhow::anyhow;
use std::sync::MutexGuard;

/// Types currently being built on this resolution's call stack.
///
/// Also carries the cache population lock once this resolution first misses
/// a singleton slot. The lock is held until the top-level call finishes, so
/// nested misses never try to take it twice.
#[derive(Default)]
pub(crate) struct InProgress<'a> {
    stack: Vec<TypeKey>,
    population: Option<MutexGuard<'a, ()>>,
}

impl InProgress<'_> {
    fn contains(&self, key: TypeKey) -> bool {
        self.stack.contains(&key)
    }

    fn push(&mut self, key: TypeKey) {
        self.stack.push(key);
    }

    fn pop(&mut self) {
        self.stack.pop();
    }

    fn cycle(&self, key: TypeKey) -> String {
        let start = self.stack.iter().position(|k| *k == key).unwrap_or(0);
        self.stack[start..]
            .iter()
            .chain(std::iter::once(&key))
            .map(TypeKey::name)
            .collect::<Vec<_>>()
            .join(" -> ")
    }
}

/// Walks the registry and builds object graphs.
///
/// A resolver borrows the registry for the whole top-level call, so the
/// graph is built against one coherent registry state.
pub(crate) struct Resolver<'a> {
    registry: &'a Registry,
    cache: &'a LifecycleCache,
    config: &'a ContainerConfig,
}

impl<'a> Resolver<'a> {
    pub(crate) fn new(
        registry: &'a Registry,
        cache: &'a LifecycleCache,
        config: &'a ContainerConfig,
    ) -> Self {
        Self {
            registry,
            cache,
            config,
        }
    }

    /// Build the value served by `record`.
    ///
    /// `overrides` apply to this record's own parameters only.
    pub(crate) fn build(
        &self,
        record: &ProviderRecord,
        overrides: Option<&CallOptions>,
        in_progress: &mut InProgress<'a>,
    ) -> Result<Value> {
        if in_progress.contains(record.produced) {
            return Err(WireupError::CircularDependency {
                cycle: in_progress.cycle(record.produced),
            });
        }

        match &record.kind {
            ProviderKind::Instance(value) => Ok(value.clone()),
            ProviderKind::Alias { target, cast } => {
                in_progress.push(record.produced);
                let built = self.build(target, overrides, in_progress);
                in_progress.pop();

                cast(built?).ok_or_else(|| WireupError::slot_assignment(record.produced))
            }
            ProviderKind::Constructor {
                constructor,
                recipe,
            } => {
                if !record.lifestyle.is_transient() {
                    if let Some(value) = self.cached(record, in_progress) {
                        return Ok(value);
                    }
                }

                let target = record.describe();
                tracing::trace!("Building: {}", target);

                in_progress.push(record.produced);
                let built = self
                    .assemble(&target, constructor.params(), recipe, overrides, in_progress)
                    .and_then(|args| {
                        constructor
                            .invoke(args)
                            .map_err(|source| WireupError::invocation(&target, source))
                    });
                in_progress.pop();

                let value = built?;
                if record.lifestyle.is_transient() {
                    Ok(value)
                } else {
                    Ok(self.cache.store(record.id, value))
                }
            }
        }
    }

    /// Look up a singleton slot, taking the population lock on the first
    /// miss of this resolution and checking again under it.
    fn cached(
        &self,
        record: &ProviderRecord,
        in_progress: &mut InProgress<'a>,
    ) -> Option<Value> {
        let hit = self.cache.get(record.id).or_else(|| {
            if in_progress.population.is_some() {
                return None;
            }
            in_progress.population = Some(self.cache.lock_population());
            self.cache.get(record.id)
        });
        if hit.is_some() {
            tracing::trace!("Cache hit: {}", record.describe());
        }
        hit
    }

    /// Compute the ordered argument list for a callable.
    ///
    /// Per position the first match wins: call-time argument, registration
    /// parameter, then a resolved dependency (named by call-time or
    /// registration `depends_on`). `None` marks an optional parameter whose
    /// dependency could not be found.
    pub(crate) fn assemble(
        &self,
        target: &str,
        params: &[ParamSpec],
        recipe: &Recipe,
        overrides: Option<&CallOptions>,
        in_progress: &mut InProgress<'a>,
    ) -> Result<Vec<Option<Value>>> {
        if let Some(overrides) = overrides {
            if let Some(position) = overrides.positions().find(|p| *p >= params.len()) {
                return Err(WireupError::invocation(
                    target,
                    anyhow!(
                        "override for position {} but the callable takes {} parameters",
                        position,
                        params.len()
                    ),
                ));
            }
        }

        let mut args = Vec::with_capacity(params.len());
        for (position, param) in params.iter().enumerate() {
            args.push(self.argument(target, position, param, recipe, overrides, in_progress)?);
        }
        Ok(args)
    }

    fn argument(
        &self,
        target: &str,
        position: usize,
        param: &ParamSpec,
        recipe: &Recipe,
        overrides: Option<&CallOptions>,
        in_progress: &mut InProgress<'a>,
    ) -> Result<Option<Value>> {
        if let Some(value) = overrides.and_then(|o| o.arguments.get(position)) {
            if !param.accepts(value) {
                return Err(WireupError::invocation(
                    target,
                    anyhow!("argument {} is not a {}", position, param.key().name()),
                ));
            }
            return Ok(Some(value.clone()));
        }

        if let Some(value) = recipe.parameters.get(&position) {
            return Ok(Some(value.clone()));
        }

        let name = overrides
            .and_then(|o| o.depends_on.get(&position))
            .or_else(|| recipe.depends_on.get(&position))
            .map(String::as_str);

        // An optional parameter is also left absent when its dependency is
        // registered but something deeper in its graph is missing.
        let built = self
            .registry
            .lookup(param.key(), name)
            .and_then(|record| self.build(record, None, in_progress));

        match built {
            Ok(value) => Ok(Some(value)),
            Err(err) if recipe.optional.contains(&position) && self.substitutable(&err) => {
                tracing::debug!(
                    "Optional parameter {} of {} left absent: {}",
                    position,
                    target,
                    err
                );
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    fn substitutable(&self, err: &WireupError) -> bool {
        match err {
            WireupError::ProviderNotFound { .. } => true,
            WireupError::AmbiguousProvider { .. } => {
                self.config.optional_ambiguity == OptionalAmbiguity::Substitute
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_message_starts_at_repeated_type() {
        let mut in_progress = InProgress::default();
        in_progress.push(TypeKey::of::<u8>());
        in_progress.push(TypeKey::of::<u16>());
        in_progress.push(TypeKey::of::<u32>());
        assert!(in_progress.contains(TypeKey::of::<u16>()));
        assert_eq!(in_progress.cycle(TypeKey::of::<u16>()), "u16 -> u32 -> u16");
        in_progress.pop();
        assert!(!in_progress.contains(TypeKey::of::<u32>()));
    }
}
