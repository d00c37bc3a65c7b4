use crate::di::{Component, Value};
use std::collections::HashMap;

/// Literal values keyed by parameter position.
///
/// Used both for registration-time parameters and for call-time arguments.
///
/// # Example
/// ```
/// use wireup::Arguments;
///
/// let args = Arguments::new().with(2, "studyzy".to_string());
/// assert_eq!(args.len(), 1);
/// ```
#[derive(Clone, Default)]
pub struct Arguments {
    values: HashMap<usize, Value>,
}

impl Arguments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with<V: Component>(mut self, position: usize, value: V) -> Self {
        self.insert(position, value);
        self
    }

    pub fn insert<V: Component>(&mut self, position: usize, value: V) {
        self.values.insert(position, value.into_value());
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub(crate) fn get(&self, position: usize) -> Option<&Value> {
        self.values.get(&position)
    }

    pub(crate) fn positions(&self) -> impl Iterator<Item = usize> + '_ {
        self.values.keys().copied()
    }

    pub(crate) fn into_values(self) -> HashMap<usize, Value> {
        self.values
    }
}

/// Per-call overrides for the parameters of the callable being invoked.
///
/// Overrides only apply to the top-level callable; dependencies resolved
/// further down the graph never see them.
#[derive(Clone, Default)]
pub struct CallOptions {
    pub(crate) arguments: Arguments,
    pub(crate) depends_on: HashMap<usize, String>,
}

impl CallOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pass a literal value for one parameter instead of resolving it.
    pub fn argument<V: Component>(mut self, position: usize, value: V) -> Self {
        self.arguments.insert(position, value);
        self
    }

    pub fn arguments(mut self, arguments: Arguments) -> Self {
        self.arguments.values.extend(arguments.into_values());
        self
    }

    /// Resolve one parameter from the provider registered under `name`.
    pub fn depends_on(mut self, position: usize, name: impl Into<String>) -> Self {
        self.depends_on.insert(position, name.into());
        self
    }

    pub(crate) fn positions(&self) -> impl Iterator<Item = usize> + '_ {
        self.arguments
            .positions()
            .chain(self.depends_on.keys().copied())
    }
}

/// Options for a single resolution.
#[derive(Clone, Default)]
pub struct ResolveOptions {
    pub(crate) name: Option<String>,
    pub(crate) call: CallOptions,
}

impl ResolveOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve the provider registered under `name`.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn argument<V: Component>(mut self, position: usize, value: V) -> Self {
        self.call = self.call.argument(position, value);
        self
    }

    pub fn arguments(mut self, arguments: Arguments) -> Self {
        self.call = self.call.arguments(arguments);
        self
    }

    pub fn depends_on(mut self, position: usize, name: impl Into<String>) -> Self {
        self.call = self.call.depends_on(position, name);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_call_options_positions() {
        let options = CallOptions::new()
            .argument(0, 1u8)
            .arguments(Arguments::new().with(2, "x".to_string()))
            .depends_on(1, "named");
        let mut positions: Vec<usize> = options.positions().collect();
        positions.sort_unstable();
        assert_eq!(positions, vec![0, 1, 2]);
    }

    #[test]
    fn test_later_argument_wins() {
        let args = Arguments::new().with(0, 1u8).with(0, 2u8);
        assert_eq!(args.len(), 1);
        assert_eq!(args.get(0).unwrap().downcast_ref::<u8>(), Some(&2));
    }
}
