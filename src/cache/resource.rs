//! Cache-aside service for Azure resource collections

use super::ttl::TtlCache;
use anyhow::Result;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

/// TTL applied when configuration supplies none or a non-positive value.
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// Provides caching for Azure resource listings
///
/// Values are stored as opaque [`serde_json::Value`] payloads; callers
/// round-trip their typed collections through serde and treat returned
/// values as read-only.
pub struct ResourceCache {
    cache: Arc<TtlCache<Value>>,
    default_ttl: Duration,
}

impl ResourceCache {
    pub fn new(default_ttl: Duration) -> Self {
        let default_ttl = if default_ttl.is_zero() {
            DEFAULT_TTL
        } else {
            default_ttl
        };
        Self {
            cache: Arc::new(TtlCache::new()),
            default_ttl,
        }
    }

    /// Spawn the periodic sweep for the underlying store.
    pub fn spawn_sweeper(&self, interval: Duration) -> tokio::task::JoinHandle<()> {
        self.cache.spawn_sweeper(interval)
    }

    /// Retrieve a value from the cache, or fetch and store it on a miss.
    ///
    /// A fetch failure caches nothing: the error propagates and the next
    /// call for the same key invokes its fetch again. There is no
    /// single-flight de-duplication: concurrent callers racing on a cold
    /// key may each invoke their fetch independently; call volume here is
    /// bounded by interactive navigation, so the extra requests are
    /// tolerated rather than coordinated.
    pub async fn get_or_fetch<F, Fut>(&self, key: &str, fetch: F) -> Result<Value>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Value>>,
    {
        self.get_or_fetch_with_ttl(key, self.default_ttl, fetch).await
    }

    /// Same as [`ResourceCache::get_or_fetch`] with a caller-supplied TTL.
    pub async fn get_or_fetch_with_ttl<F, Fut>(&self, key: &str, ttl: Duration, fetch: F) -> Result<Value>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Value>>,
    {
        if let Some(cached) = self.cache.get(key) {
            tracing::debug!("cache hit for {}", key);
            return Ok(cached);
        }

        tracing::debug!("cache miss for {}, fetching", key);
        let value = fetch().await?;

        let ttl = if ttl.is_zero() { self.default_ttl } else { ttl };
        self.cache.set(key, value.clone(), ttl);

        Ok(value)
    }

    /// Remove a specific key.
    pub fn invalidate_key(&self, key: &str) {
        self.cache.delete(key);
    }

    /// Remove every key starting with the given prefix.
    ///
    /// Sibling collections under other prefixes stay cached; invalidating
    /// a parent key never implicitly invalidates children; callers
    /// invalidate each affected key explicitly.
    pub fn invalidate_prefix(&self, prefix: &str) {
        let removed = self.cache.remove_where(|key| key.starts_with(prefix));
        if removed > 0 {
            tracing::debug!("invalidated {} entr(ies) under prefix {}", removed, prefix);
        }
    }

    /// Remove every entry.
    pub fn clear(&self) {
        self.cache.clear();
    }

    /// Number of stored entries, expired ones included.
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}

/// Cache key builders
///
/// Keys are namespaced `"<namespace>:<parent-id>:<sub-path>"` so sibling
/// collections never collide.
pub mod keys {
    pub fn subscriptions() -> String {
        "subscriptions".to_string()
    }

    pub fn resource_groups(subscription_id: &str) -> String {
        format!("resourcegroups:{}", subscription_id)
    }

    pub fn resource_types(subscription_id: &str, resource_group: &str) -> String {
        format!("resourcetypes:{}:{}", subscription_id, resource_group)
    }

    pub fn resources(subscription_id: &str, resource_group: &str, resource_type: &str) -> String {
        format!("resources:{}:{}:{}", subscription_id, resource_group, resource_type)
    }

    pub fn virtual_machines(subscription_id: &str, resource_group: &str) -> String {
        format!("vms:{}:{}", subscription_id, resource_group)
    }

    pub fn aks_clusters(subscription_id: &str, resource_group: &str) -> String {
        format!("aks:{}:{}", subscription_id, resource_group)
    }

    pub fn vm_commands() -> String {
        "vmcommands".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_get_or_fetch_caches_success() {
        let cache = ResourceCache::new(Duration::from_secs(60));

        let value = cache
            .get_or_fetch("key", || async { Ok(json!(["a", "b"])) })
            .await
            .unwrap();
        assert_eq!(value, json!(["a", "b"]));

        // Second call must not invoke the fetch.
        let value = cache
            .get_or_fetch("key", || async { panic!("fetch invoked on a warm key") })
            .await
            .unwrap();
        assert_eq!(value, json!(["a", "b"]));
    }

    #[tokio::test]
    async fn test_fetch_failure_is_not_cached() {
        let cache = ResourceCache::new(Duration::from_secs(60));

        let result = cache
            .get_or_fetch("key", || async { anyhow::bail!("transient") })
            .await;
        assert!(result.is_err());

        // The failure must not have been stored as the answer.
        let value = cache
            .get_or_fetch("key", || async { Ok(json!(42)) })
            .await
            .unwrap();
        assert_eq!(value, json!(42));
    }

    #[tokio::test]
    async fn test_invalidate_prefix_scoping() {
        let cache = ResourceCache::new(Duration::from_secs(60));
        cache
            .get_or_fetch(&keys::virtual_machines("sub1", "rg1"), || async { Ok(json!(1)) })
            .await
            .unwrap();
        cache
            .get_or_fetch(&keys::aks_clusters("sub1", "rg1"), || async { Ok(json!(2)) })
            .await
            .unwrap();

        cache.invalidate_prefix("vms:");

        // AKS entry survives; VM entry refetches.
        let value = cache
            .get_or_fetch(&keys::aks_clusters("sub1", "rg1"), || async {
                panic!("aks entry was evicted")
            })
            .await
            .unwrap();
        assert_eq!(value, json!(2));
        let value = cache
            .get_or_fetch(&keys::virtual_machines("sub1", "rg1"), || async { Ok(json!(3)) })
            .await
            .unwrap();
        assert_eq!(value, json!(3));
    }

    #[test]
    fn test_zero_ttl_falls_back_to_default() {
        let cache = ResourceCache::new(Duration::ZERO);
        assert_eq!(cache.default_ttl, DEFAULT_TTL);
    }

    #[test]
    fn test_key_generation() {
        assert_eq!(keys::subscriptions(), "subscriptions");
        assert_eq!(keys::resource_groups("sub123"), "resourcegroups:sub123");
        assert_eq!(
            keys::resources("sub123", "rg123", "Microsoft.Compute/virtualMachines"),
            "resources:sub123:rg123:Microsoft.Compute/virtualMachines"
        );
        assert_eq!(keys::virtual_machines("sub123", "rg123"), "vms:sub123:rg123");
        assert_eq!(keys::aks_clusters("sub123", "rg123"), "aks:sub123:rg123");
    }
}
