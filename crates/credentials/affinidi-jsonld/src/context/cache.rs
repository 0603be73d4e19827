use std::fmt;
use std::sync::Arc;

use moka::policy::EvictionPolicy;
use moka::sync::Cache;
use serde_json::Value;

use super::ActiveContext;
use crate::digest::sha256_hex;

/// Bounded LRU cache of resolved contexts.
///
/// Entries are keyed by the parent context's fingerprint and the local
/// context that was applied to it, so equal derivations share one entry.
/// Clones share the same underlying store.
#[derive(Clone)]
pub struct ContextCache {
    cache: Cache<String, Arc<ActiveContext>>,
}

impl ContextCache {
    pub fn new(max_capacity: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_capacity)
            .eviction_policy(EvictionPolicy::lru())
            .build();
        Self { cache }
    }

    /// Cache key for applying `local` on top of `parent`.
    pub fn key(parent: &ActiveContext, local: &Value) -> String {
        let mut data = parent.fingerprint().to_string();
        data.push('\n');
        data.push_str(&local.to_string());
        sha256_hex(data.as_bytes())
    }

    pub fn get(&self, key: &str) -> Option<Arc<ActiveContext>> {
        let hit = self.cache.get(key);
        tracing::trace!(key, hit = hit.is_some(), "context cache lookup");
        hit
    }

    pub fn insert(&self, key: String, context: Arc<ActiveContext>) {
        self.cache.insert(key, context);
    }

    /// Approximate number of cached contexts.
    pub fn entry_count(&self) -> u64 {
        self.cache.run_pending_tasks();
        self.cache.entry_count()
    }
}

impl Default for ContextCache {
    fn default() -> Self {
        Self::new(100)
    }
}

impl fmt::Debug for ContextCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextCache")
            .field("entries", &self.cache.entry_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn key_depends_on_parent_and_local() {
        let root = ActiveContext::new(None);
        let based = ActiveContext::new(Some("http://example.com/".into()));
        let local = json!({"name": "http://schema.org/name"});

        assert_eq!(ContextCache::key(&root, &local), ContextCache::key(&root, &local));
        assert_ne!(ContextCache::key(&root, &local), ContextCache::key(&based, &local));
        assert_ne!(
            ContextCache::key(&root, &local),
            ContextCache::key(&root, &json!({}))
        );
    }

    #[test]
    fn stores_and_shares_entries() {
        let cache = ContextCache::new(10);
        let shared = cache.clone();
        let ctx = Arc::new(ActiveContext::new(None));
        cache.insert("k".into(), ctx.clone());

        let hit = shared.get("k").unwrap();
        assert!(Arc::ptr_eq(&hit, &ctx));
        assert_eq!(shared.entry_count(), 1);
        assert!(cache.get("missing").is_none());
    }
}
