//! QueryClient: QueryCache の型付きファサード
//!
//! キャッシュには JSON のまま入れ、読み書きの境界で serde を通す。

use crate::error::Error;
use crate::ports::outbound::{QueryCache, QueryKey};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;

#[derive(Clone)]
pub struct QueryClient {
    cache: Arc<dyn QueryCache>,
}

impl QueryClient {
    pub fn new(cache: Arc<dyn QueryCache>) -> Self {
        Self { cache }
    }

    pub fn cache(&self) -> &dyn QueryCache {
        self.cache.as_ref()
    }

    pub fn get_query_data<T: DeserializeOwned>(&self, key: &QueryKey) -> Result<Option<T>, Error> {
        match self.cache.get(key) {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    pub fn set_query_data<T: Serialize>(&self, key: &QueryKey, data: &T) -> Result<(), Error> {
        let value = serde_json::to_value(data)?;
        self.cache.set(key, Some(value));
        Ok(())
    }

    pub fn remove_query_data(&self, key: &QueryKey) {
        self.cache.set(key, None);
    }

    /// prefix に一致するエントリを stale にする（次の fetch_query で取り直す）
    pub fn invalidate_queries(&self, prefix: &QueryKey) {
        self.cache.invalidate(prefix);
    }

    /// fresh なキャッシュがあればそれを、無ければ fetch して保存してから返す
    pub fn fetch_query<T, F>(&self, key: &QueryKey, fetch: F) -> Result<T, Error>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Result<T, Error>,
    {
        if !self.cache.is_stale(key) {
            if let Some(data) = self.get_query_data(key)? {
                return Ok(data);
            }
        }
        let data = fetch()?;
        self.set_query_data(key, &data)?;
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::InMemoryQueryCache;
    use std::cell::Cell;

    fn client() -> QueryClient {
        QueryClient::new(Arc::new(InMemoryQueryCache::new()))
    }

    #[test]
    fn test_fetch_query_uses_fresh_cache() {
        let qc = client();
        let key = QueryKey::memories();
        let calls = Cell::new(0);
        let fetch = || {
            calls.set(calls.get() + 1);
            Ok(vec!["a".to_string()])
        };
        assert_eq!(qc.fetch_query(&key, fetch).unwrap(), vec!["a"]);
        assert_eq!(qc.fetch_query(&key, fetch).unwrap(), vec!["a"]);
        assert_eq!(calls.get(), 1);

        qc.invalidate_queries(&key);
        let refreshed: Vec<String> = qc.fetch_query(&key, || Ok(vec!["b".to_string()])).unwrap();
        assert_eq!(refreshed, vec!["b"]);
    }

    #[test]
    fn test_fetch_error_leaves_cache_untouched() {
        let qc = client();
        let key = QueryKey::memory("m1");
        let err = qc
            .fetch_query::<String, _>(&key, || Err(Error::remote(Some(500), "down")))
            .unwrap_err();
        assert!(err.is_remote());
        assert!(qc.get_query_data::<String>(&key).unwrap().is_none());
    }

    #[test]
    fn test_type_mismatch_is_json_error() {
        let qc = client();
        let key = QueryKey::account();
        qc.set_query_data(&key, &"not a number").unwrap();
        let err = qc.get_query_data::<u32>(&key).unwrap_err();
        assert_eq!(err.exit_code(), 65);
        qc.remove_query_data(&key);
        assert!(qc.get_query_data::<u32>(&key).unwrap().is_none());
    }
}
