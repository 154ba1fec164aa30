//! プロセス内メモリの QueryCache 実装

use crate::ports::outbound::{QueryCache, QueryKey};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Debug, Clone)]
struct CacheEntry {
    value: Value,
    stale: bool,
}

#[derive(Debug, Default)]
pub struct InMemoryQueryCache {
    entries: Mutex<HashMap<QueryKey, CacheEntry>>,
}

impl InMemoryQueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// 保持しているキー（テスト・デバッグ用、ソート済み）
    pub fn keys(&self) -> Vec<QueryKey> {
        let mut keys: Vec<QueryKey> = match self.entries.lock() {
            Ok(entries) => entries.keys().cloned().collect(),
            Err(poisoned) => poisoned.into_inner().keys().cloned().collect(),
        };
        keys.sort();
        keys
    }

    fn with_entries<R>(&self, f: impl FnOnce(&mut HashMap<QueryKey, CacheEntry>) -> R) -> R {
        match self.entries.lock() {
            Ok(mut entries) => f(&mut entries),
            Err(poisoned) => f(&mut poisoned.into_inner()),
        }
    }
}

impl QueryCache for InMemoryQueryCache {
    fn get(&self, key: &QueryKey) -> Option<Value> {
        self.with_entries(|entries| entries.get(key).map(|e| e.value.clone()))
    }

    fn set(&self, key: &QueryKey, value: Option<Value>) {
        self.with_entries(|entries| match value {
            Some(value) => {
                entries.insert(key.clone(), CacheEntry { value, stale: false });
            }
            None => {
                entries.remove(key);
            }
        })
    }

    fn invalidate(&self, prefix: &QueryKey) {
        self.with_entries(|entries| {
            for (key, entry) in entries.iter_mut() {
                if key.starts_with(prefix) {
                    entry.stale = true;
                }
            }
        })
    }

    fn is_stale(&self, key: &QueryKey) -> bool {
        self.with_entries(|entries| entries.get(key).map(|e| e.stale).unwrap_or(true))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_set_get_remove() {
        let cache = InMemoryQueryCache::new();
        let key = QueryKey::memories();
        assert!(cache.get(&key).is_none());
        assert!(cache.is_stale(&key));

        cache.set(&key, Some(json!([1, 2])));
        assert_eq!(cache.get(&key), Some(json!([1, 2])));
        assert!(!cache.is_stale(&key));

        cache.set(&key, None);
        assert!(cache.get(&key).is_none());
        assert!(cache.keys().is_empty());
    }

    #[test]
    fn test_invalidate_by_prefix_keeps_values() {
        let cache = InMemoryQueryCache::new();
        cache.set(&QueryKey::memories(), Some(json!([])));
        cache.set(&QueryKey::memory("m1"), Some(json!({"id": "m1"})));
        cache.set(&QueryKey::sharing("m1"), Some(json!({})));

        cache.invalidate(&QueryKey::memories());

        assert!(cache.is_stale(&QueryKey::memories()));
        assert!(cache.is_stale(&QueryKey::memory("m1")));
        assert!(!cache.is_stale(&QueryKey::sharing("m1")));
        assert_eq!(cache.get(&QueryKey::memory("m1")), Some(json!({"id": "m1"})));
    }

    #[test]
    fn test_invalidate_single_memory_leaves_list_fresh() {
        let cache = InMemoryQueryCache::new();
        cache.set(&QueryKey::memories(), Some(json!([])));
        cache.set(&QueryKey::memory("m1"), Some(json!({})));
        cache.invalidate(&QueryKey::memory("m1"));
        assert!(!cache.is_stale(&QueryKey::memories()));
        assert!(cache.is_stale(&QueryKey::memory("m1")));
    }
}
