use crate::config::Lifestyle;
use crate::di::constructor::ErasedConstructor;
use crate::di::{TypeKey, Value};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use strum_macros::Display;

static NEXT_RECORD_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of one registration; the lifecycle cache is keyed by it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct RecordId(u64);

impl RecordId {
    pub(crate) fn next() -> Self {
        Self(NEXT_RECORD_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Converts a value built by an alias target into the alias's slot type.
pub(crate) type CastFn = Arc<dyn Fn(Value) -> Option<Value> + Send + Sync>;

/// Registration-time options applied to a constructor's parameters.
#[derive(Clone, Default)]
pub(crate) struct Recipe {
    pub(crate) parameters: HashMap<usize, Value>,
    pub(crate) depends_on: HashMap<usize, String>,
    pub(crate) optional: HashSet<usize>,
}

#[derive(Clone)]
pub(crate) enum ProviderKind {
    Constructor {
        constructor: ErasedConstructor,
        recipe: Recipe,
    },
    Instance(Value),
    /// Forwards to a concrete record; shares its identity and cache slot.
    Alias {
        target: Box<ProviderRecord>,
        cast: CastFn,
    },
}

#[derive(Clone)]
pub(crate) struct ProviderRecord {
    pub(crate) id: RecordId,
    pub(crate) produced: TypeKey,
    pub(crate) name: Option<String>,
    pub(crate) is_default: bool,
    pub(crate) lifestyle: Lifestyle,
    pub(crate) kind: ProviderKind,
}

impl ProviderRecord {
    pub(crate) fn describe(&self) -> String {
        self.produced.describe(self.name.as_deref())
    }

    pub(crate) fn info(&self) -> RegistrationInfo {
        let (kind, dependencies) = match &self.kind {
            ProviderKind::Constructor { constructor, .. } => (
                RegistrationKind::Constructor,
                constructor
                    .params()
                    .iter()
                    .map(|param| param.key().name().to_string())
                    .collect(),
            ),
            ProviderKind::Instance(_) => (RegistrationKind::Instance, Vec::new()),
            ProviderKind::Alias { target, .. } => {
                (RegistrationKind::Alias, vec![target.produced.name().to_string()])
            }
        };

        RegistrationInfo {
            type_name: self.produced.name().to_string(),
            name: self.name.clone(),
            is_default: self.is_default,
            kind,
            lifestyle: self.lifestyle,
            dependencies,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RegistrationKind {
    Constructor,
    Instance,
    Alias,
}

/// A read-only snapshot of one registration.
///
/// For constructors `dependencies` lists the parameter types in order; for
/// aliases it holds the concrete type being forwarded to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegistrationInfo {
    pub type_name: String,
    pub name: Option<String>,
    pub is_default: bool,
    pub kind: RegistrationKind,
    pub lifestyle: Lifestyle,
    pub dependencies: Vec<String>,
}
