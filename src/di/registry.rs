use crate::di::TypeKey;
use crate::di::provider::{ProviderRecord, RecordId};
use crate::error::{Result, WireupError};
use std::collections::HashMap;

/// Provider records grouped by produced type, in registration order.
#[derive(Default)]
pub(crate) struct Registry {
    providers: HashMap<TypeKey, Vec<ProviderRecord>>,
}

impl Registry {
    /// Insert a record.
    ///
    /// A named record replaces any record with the same type and name and the
    /// replaced id is returned so its cached instance can be evicted. Unnamed
    /// records accumulate; the default flag decides between them.
    pub(crate) fn insert(&mut self, record: ProviderRecord) -> Option<RecordId> {
        let records = self.providers.entry(record.produced).or_default();

        if record.is_default && record.name.is_none() {
            for other in records.iter_mut().filter(|r| r.name.is_none()) {
                other.is_default = false;
            }
        }

        let existing = match record.name {
            Some(_) => records.iter_mut().find(|r| r.name == record.name),
            None => None,
        };

        match existing {
            Some(slot) => {
                let replaced = slot.id;
                *slot = record;
                Some(replaced)
            }
            None => {
                records.push(record);
                None
            }
        }
    }

    /// Find the record serving `(key, name)`.
    ///
    /// A named lookup is an exact match. An unnamed lookup only considers
    /// unnamed records: one record is returned as is, several fall back to the
    /// one marked default.
    pub(crate) fn lookup(&self, key: TypeKey, name: Option<&str>) -> Result<&ProviderRecord> {
        let records = self.providers.get(&key).map(Vec::as_slice).unwrap_or_default();

        if let Some(name) = name {
            return records
                .iter()
                .find(|r| r.name.as_deref() == Some(name))
                .ok_or_else(|| WireupError::not_found(key, Some(name)));
        }

        let unnamed: Vec<&ProviderRecord> = records.iter().filter(|r| r.name.is_none()).collect();
        match unnamed.as_slice() {
            [] => Err(WireupError::not_found(key, None)),
            [only] => Ok(*only),
            candidates => candidates
                .iter()
                .find(|r| r.is_default)
                .copied()
                .ok_or_else(|| WireupError::AmbiguousProvider {
                    type_name: key.name().to_string(),
                    candidates: candidates.len(),
                }),
        }
    }

    pub(crate) fn contains(&self, key: TypeKey, name: Option<&str>) -> bool {
        self.providers
            .get(&key)
            .is_some_and(|records| records.iter().any(|r| r.name.as_deref() == name))
    }

    pub(crate) fn records(&self) -> impl Iterator<Item = &ProviderRecord> {
        self.providers.values().flatten()
    }

    pub(crate) fn len(&self) -> usize {
        self.providers.values().map(Vec::len).sum()
    }

    pub(crate) fn clear(&mut self) {
        self.providers.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Lifestyle;
    use crate::di::Component;
    use crate::di::provider::ProviderKind;

    fn record(value: &'static str, name: Option<&str>, is_default: bool) -> ProviderRecord {
        ProviderRecord {
            id: RecordId::next(),
            produced: TypeKey::of::<&'static str>(),
            name: name.map(str::to_string),
            is_default,
            lifestyle: Lifestyle::Singleton,
            kind: ProviderKind::Instance(value.into_value()),
        }
    }

    fn instance_of(record: &ProviderRecord) -> &'static str {
        match &record.kind {
            ProviderKind::Instance(value) => *value.downcast_ref::<&'static str>().unwrap(),
            _ => unreachable!(),
        }
    }

    fn key() -> TypeKey {
        TypeKey::of::<&'static str>()
    }

    #[test]
    fn test_single_unnamed_record() {
        let mut registry = Registry::default();
        registry.insert(record("a", None, false));
        assert_eq!(instance_of(registry.lookup(key(), None).unwrap()), "a");
    }

    #[test]
    fn test_ambiguous_without_default() {
        let mut registry = Registry::default();
        registry.insert(record("a", None, false));
        registry.insert(record("b", Some("b"), false));
        assert_eq!(instance_of(registry.lookup(key(), None).unwrap()), "a");

        registry.insert(record("c", None, false));
        let err = registry.lookup(key(), None).err().unwrap();
        assert!(matches!(err, WireupError::AmbiguousProvider { candidates: 2, .. }));
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_default_breaks_ties_and_moves() {
        let mut registry = Registry::default();
        registry.insert(record("x", None, true));
        registry.insert(record("y", None, false));
        assert_eq!(instance_of(registry.lookup(key(), None).unwrap()), "x");

        registry.insert(record("z", None, true));
        assert_eq!(instance_of(registry.lookup(key(), None).unwrap()), "z");
    }

    #[test]
    fn test_named_lookup_missing() {
        let mut registry = Registry::default();
        registry.insert(record("a", None, false));
        let err = registry.lookup(key(), Some("missing")).err().unwrap();
        assert!(err.is_not_found());
        assert!(registry.lookup(TypeKey::of::<u8>(), None).err().unwrap().is_not_found());
    }

    #[test]
    fn test_replace_returns_previous_id() {
        let mut registry = Registry::default();
        let first = record("a", Some("n"), false);
        let first_id = first.id;
        assert!(registry.insert(first).is_none());
        assert_eq!(registry.insert(record("b", Some("n"), false)), Some(first_id));
        assert!(registry.contains(key(), Some("n")));
        assert!(!registry.contains(key(), None));
    }

    #[test]
    fn test_clear() {
        let mut registry = Registry::default();
        registry.insert(record("a", None, false));
        registry.clear();
        assert_eq!(registry.len(), 0);
        assert!(registry.lookup(key(), None).is_err());
    }
}
