/// Fixed-capacity key/value cache with FIFO eviction
///
/// Eviction order is first-insertion order. Overwriting a key keeps its
/// original position, so a frequently refreshed key still ages out.

use crate::config::ConfigError;
use indexmap::{Equivalent, IndexMap};
use std::fmt;
use std::hash::Hash;
use std::num::NonZeroUsize;

#[derive(Clone)]
pub struct BoundedCache<K, V> {
    capacity: usize,
    // Iteration order is insertion order.
    values: IndexMap<K, V>,
}

impl<K, V> BoundedCache<K, V>
where
    K: Eq + Hash,
{
    pub fn new(capacity: usize) -> Result<Self, ConfigError> {
        NonZeroUsize::new(capacity)
            .map(Self::with_capacity)
            .ok_or(ConfigError::InvalidCapacity(capacity))
    }

    pub fn with_capacity(capacity: NonZeroUsize) -> Self {
        let capacity = capacity.get();
        BoundedCache {
            capacity,
            values: IndexMap::with_capacity(capacity),
        }
    }

    /// Insert or overwrite a value.
    ///
    /// Returns the evicted key/value pair if a new key pushed the cache over
    /// capacity.
    pub fn set(&mut self, key: K, value: V) -> Option<(K, V)> {
        if self.values.insert(key, value).is_some() {
            return None;
        }
        if self.values.len() > self.capacity {
            self.values.shift_remove_index(0)
        } else {
            None
        }
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        Q: Hash + Equivalent<K> + ?Sized,
    {
        self.values.get(key)
    }

    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        Q: Hash + Equivalent<K> + ?Sized,
    {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Keys in insertion order, oldest first
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.values.keys()
    }

    /// Entries in insertion order, oldest first
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.values.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&K, &mut V)> {
        self.values.iter_mut()
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }
}

impl<K, V> fmt::Debug for BoundedCache<K, V>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.values.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_capacity_rejected() {
        let result = BoundedCache::<String, u32>::new(0);
        assert!(matches!(result, Err(ConfigError::InvalidCapacity(0))));
    }

    #[test]
    fn test_set_and_get() {
        let mut cache = BoundedCache::new(2).unwrap();
        cache.set("key1", "value1");
        assert_eq!(cache.len(), 1);
        cache.set("key2", "value2");
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get(&"key1"), Some(&"value1"));
        assert!(cache.contains(&"key2"));
        assert_eq!(cache.get(&"missing"), None);
    }

    #[test]
    fn test_evicts_oldest() {
        let mut cache = BoundedCache::new(2).unwrap();
        cache.set("key1", 1);
        cache.set("key2", 2);
        let evicted = cache.set("key3", 3);

        assert_eq!(evicted, Some(("key1", 1)));
        assert_eq!(cache.len(), 2);
        assert!(!cache.contains(&"key1"));
        assert_eq!(cache.keys().copied().collect::<Vec<_>>(), vec!["key2", "key3"]);
    }

    #[test]
    fn test_capacity_plus_one_keeps_latest_in_order() {
        let capacity = 5;
        let mut cache = BoundedCache::new(capacity).unwrap();
        for i in 0..=capacity {
            cache.set(i, i * 10);
        }

        assert_eq!(cache.len(), capacity);
        assert!(!cache.contains(&0));
        let kept: Vec<_> = cache.iter().map(|(k, v)| (*k, *v)).collect();
        assert_eq!(kept, vec![(1, 10), (2, 20), (3, 30), (4, 40), (5, 50)]);
    }

    #[test]
    fn test_overwrite_keeps_insertion_position() {
        let mut cache = BoundedCache::new(2).unwrap();
        cache.set("a", 1);
        cache.set("b", 2);
        assert_eq!(cache.set("a", 10), None);
        assert_eq!(cache.get(&"a"), Some(&10));

        // "a" is still the oldest insertion, so it goes first.
        cache.set("c", 3);
        assert!(!cache.contains(&"a"));
        assert!(cache.contains(&"b"));
        assert!(cache.contains(&"c"));
    }

    #[test]
    fn test_iter_mut() {
        let mut cache = BoundedCache::new(3).unwrap();
        cache.set("a", 1);
        cache.set("b", 2);
        for (_, value) in cache.iter_mut() {
            *value += 1;
        }
        assert_eq!(cache.get(&"a"), Some(&2));
        assert_eq!(cache.get(&"b"), Some(&3));
    }

    #[test]
    fn test_clear_keeps_capacity() {
        let mut cache = BoundedCache::new(2).unwrap();
        cache.set("a", 1);
        cache.set("b", 2);
        cache.clear();

        assert!(cache.is_empty());
        assert_eq!(cache.capacity(), 2);
        assert!(!cache.contains(&"a"));

        // Eviction order restarts from the next insertion.
        cache.set("c", 3);
        cache.set("d", 4);
        assert_eq!(cache.set("e", 5), Some(("c", 3)));
        assert_eq!(cache.keys().copied().collect::<Vec<_>>(), vec!["d", "e"]);
    }

    #[test]
    fn test_debug_is_insertion_ordered() {
        let mut cache = BoundedCache::new(3).unwrap();
        cache.set("z", 1);
        cache.set("a", 2);
        assert_eq!(format!("{:?}", cache), r#"{"z": 1, "a": 2}"#);
    }
}
