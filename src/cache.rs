// src/cache.rs
//! Time-bounded, size-bounded key/value store used for both cache tiers.
//! Expiry is checked lazily on read; eviction drops the oldest-inserted key
//! first once the entry ceiling is exceeded (insertion order, not LRU).

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::{Duration, Instant};

struct Entry<V> {
    value: V,
    inserted_at: Instant,
}

struct Inner<V> {
    map: HashMap<String, Entry<V>>,
    order: VecDeque<String>,
}

pub struct TtlCache<V> {
    inner: Mutex<Inner<V>>,
    ttl: Duration,
    max_entries: usize,
}

impl<V: Clone> TtlCache<V> {
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            inner: Mutex::new(Inner {
                map: HashMap::new(),
                order: VecDeque::new(),
            }),
            ttl,
            max_entries,
        }
    }

    /// Fresh value for `key`, or `None`. An expired entry is treated as
    /// absent and removed on the spot.
    pub fn get(&self, key: &str) -> Option<V> {
        let mut inner = self.inner.lock().expect("cache mutex poisoned");
        let expired = match inner.map.get(key) {
            Some(entry) => entry.inserted_at.elapsed() > self.ttl,
            None => return None,
        };
        if expired {
            inner.map.remove(key);
            inner.order.retain(|k| k != key);
            return None;
        }
        inner.map.get(key).map(|e| e.value.clone())
    }

    /// Insert or overwrite. Overwriting refreshes both the timestamp and the
    /// key's position in the eviction order. Concurrent writers race
    /// last-write-wins.
    pub fn insert(&self, key: &str, value: V) {
        let mut inner = self.inner.lock().expect("cache mutex poisoned");
        let entry = Entry {
            value,
            inserted_at: Instant::now(),
        };
        if inner.map.insert(key.to_string(), entry).is_some() {
            inner.order.retain(|k| k != key);
        }
        inner.order.push_back(key.to_string());
        while inner.map.len() > self.max_entries {
            match inner.order.pop_front() {
                Some(oldest) => {
                    inner.map.remove(&oldest);
                }
                None => break,
            }
        }
    }

    pub fn clear(&self) {
        let mut inner = self.inner.lock().expect("cache mutex poisoned");
        inner.map.clear();
        inner.order.clear();
    }

    pub fn len(&self) -> usize {
        self.inner.lock().expect("cache mutex poisoned").map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_entries_are_returned() {
        let cache = TtlCache::new(Duration::from_secs(60), 10);
        cache.insert("k", 42);
        assert_eq!(cache.get("k"), Some(42));
    }

    #[test]
    fn expired_entries_are_absent_and_evicted() {
        let cache = TtlCache::new(Duration::from_millis(20), 10);
        cache.insert("k", 1);
        std::thread::sleep(Duration::from_millis(40));
        assert_eq!(cache.get("k"), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn oldest_inserted_key_is_evicted_first() {
        let cache = TtlCache::new(Duration::from_secs(60), 2);
        cache.insert("a", 1);
        cache.insert("b", 2);
        cache.insert("c", 3);
        assert_eq!(cache.get("a"), None);
        assert_eq!(cache.get("b"), Some(2));
        assert_eq!(cache.get("c"), Some(3));
    }

    #[test]
    fn overwrite_refreshes_eviction_position() {
        let cache = TtlCache::new(Duration::from_secs(60), 2);
        cache.insert("a", 1);
        cache.insert("b", 2);
        cache.insert("a", 10);
        cache.insert("c", 3);
        // "b" is now the oldest and gets dropped, not "a".
        assert_eq!(cache.get("a"), Some(10));
        assert_eq!(cache.get("b"), None);
        assert_eq!(cache.get("c"), Some(3));
    }
}
