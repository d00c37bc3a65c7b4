use crate::di::Value;
use crate::di::provider::RecordId;
use dashmap::DashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Singleton instances, one slot per provider record.
///
/// Slots are filled lazily after the first successful build and only
/// dropped on eviction (record replaced) or a container reset. Filling a
/// slot requires the population lock, so a singleton constructor runs at
/// most once per slot even when resolutions race.
#[derive(Default)]
pub(crate) struct LifecycleCache {
    instances: DashMap<RecordId, Value>,
    population: Mutex<()>,
}

impl LifecycleCache {
    /// Exclusive right to fill empty slots.
    ///
    /// Callers re-check the slot after acquiring, since the previous holder
    /// may have filled it.
    pub(crate) fn lock_population(&self) -> MutexGuard<'_, ()> {
        self.population.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn get(&self, id: RecordId) -> Option<Value> {
        self.instances.get(&id).map(|entry| entry.value().clone())
    }

    /// Store a freshly built instance unless another build got there first,
    /// and return whichever instance now occupies the slot.
    pub(crate) fn store(&self, id: RecordId, value: Value) -> Value {
        self.instances.entry(id).or_insert(value).value().clone()
    }

    pub(crate) fn evict(&self, id: RecordId) {
        self.instances.remove(&id);
    }

    pub(crate) fn clear(&self) {
        self.instances.clear();
    }

    pub(crate) fn len(&self) -> usize {
        self.instances.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::di::Component;
    use std::sync::Arc;

    #[test]
    fn test_first_store_wins() {
        let cache = LifecycleCache::default();
        let id = RecordId::next();
        let first = cache.store(id, 1u32.into_value());
        let second = cache.store(id, 2u32.into_value());
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.get(id).unwrap().downcast_ref::<u32>(), Some(&1));
    }

    #[test]
    fn test_evict_and_clear() {
        let cache = LifecycleCache::default();
        let a = RecordId::next();
        let b = RecordId::next();
        cache.store(a, 1u32.into_value());
        cache.store(b, 2u32.into_value());
        cache.evict(a);
        assert!(cache.get(a).is_none());
        assert_eq!(cache.len(), 1);
        cache.clear();
        assert!(cache.get(b).is_none());
    }

    #[test]
    fn test_population_lock_survives_poisoning() {
        let cache = Arc::new(LifecycleCache::default());
        let poisoner = cache.clone();
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.lock_population();
            panic!("constructor panicked");
        })
        .join();

        let _guard = cache.lock_population();
        let id = RecordId::next();
        cache.store(id, 3u32.into_value());
        assert_eq!(cache.get(id).unwrap().downcast_ref::<u32>(), Some(&3));
    }
}
