//! Cache store
//!
//! One raw body per endpoint key, last write wins. No eviction and no expiry.

use std::collections::HashMap;
use std::fmt::Debug;

use parking_lot::RwLock;

use crate::error::Error;

/// Per-endpoint response cache
///
/// Implementations must tolerate concurrent calls from any thread.
pub trait CacheStore: Send + Sync + Debug {
    /// Whether a value is stored under `key`
    fn has(&self, key: &str) -> Result<bool, Error> {
        Ok(self.get(key)?.is_some())
    }

    /// Value stored under `key`
    fn get(&self, key: &str) -> Result<Option<String>, Error>;

    /// Store `value` under `key`, replacing any previous value
    fn put(&self, key: &str, value: &str) -> Result<(), Error>;
}

/// In memory [`CacheStore`]
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether nothing is stored
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl CacheStore for MemoryCache {
    fn has(&self, key: &str) -> Result<bool, Error> {
        Ok(self.entries.read().contains_key(key))
    }

    fn get(&self, key: &str) -> Result<Option<String>, Error> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn put(&self, key: &str, value: &str) -> Result<(), Error> {
        self.entries
            .write()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use super::*;

    #[test]
    fn test_last_write_wins() {
        let cache = MemoryCache::new();
        assert!(!cache.has("a").expect("has"));

        cache.put("a", "1").expect("put");
        cache.put("a", "2").expect("put");

        assert!(cache.has("a").expect("has"));
        assert_eq!(cache.get("a").expect("get").as_deref(), Some("2"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_concurrent_endpoints() {
        let cache = Arc::new(MemoryCache::new());

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || {
                    for n in 0..100 {
                        cache
                            .put(&format!("endpoint-{i}"), &n.to_string())
                            .expect("put");
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().expect("writer thread");
        }

        assert_eq!(cache.len(), 8);
        for i in 0..8 {
            assert_eq!(
                cache.get(&format!("endpoint-{i}")).expect("get").as_deref(),
                Some("99")
            );
        }
    }
}
