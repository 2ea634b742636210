//! Tests for the TTL cache and the cache-aside layer
//!
//! Covers the TTL property, cache-aside idempotence, fetch-failure
//! non-poisoning, sweep behavior, and explicit invalidation scoping.

use az9s::cache::{ResourceCache, TtlCache, keys};
use serde_json::json;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

#[test]
fn test_ttl_property() {
    let cache = TtlCache::new();
    cache.set("key", "value".to_string(), Duration::from_millis(100));

    // Before the TTL elapses the value is served.
    assert_eq!(cache.get("key"), Some("value".to_string()));

    // After the TTL elapses the read reports absent.
    std::thread::sleep(Duration::from_millis(150));
    assert_eq!(cache.get("key"), None);
}

#[test]
fn test_expired_entry_survives_until_sweep() {
    let cache = TtlCache::new();
    cache.set("key", 1u32, Duration::from_millis(20));
    std::thread::sleep(Duration::from_millis(50));

    // The read path never deletes.
    assert_eq!(cache.get("key"), None);
    assert_eq!(cache.len(), 1);

    assert_eq!(cache.remove_expired(), 1);
    assert_eq!(cache.len(), 0);
}

#[tokio::test]
async fn test_sweeper_removes_expired_entries() {
    let cache: Arc<TtlCache<u32>> = Arc::new(TtlCache::new());
    cache.set("a", 1, Duration::from_millis(20));
    cache.set("b", 2, Duration::from_millis(20));
    cache.set("keep", 3, Duration::from_secs(60));

    let sweeper = cache.spawn_sweeper(Duration::from_millis(50));
    tokio::time::sleep(Duration::from_millis(200)).await;

    assert_eq!(cache.len(), 1);
    assert_eq!(cache.get("keep"), Some(3));
    sweeper.abort();
}

#[tokio::test]
async fn test_cache_aside_idempotence() {
    let cache = ResourceCache::new(Duration::from_secs(60));
    let calls = AtomicUsize::new(0);

    let first = cache
        .get_or_fetch("subs", || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(json!(["sub-a", "sub-b"]))
        })
        .await
        .unwrap();

    let second = cache
        .get_or_fetch("subs", || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(json!(["sub-a", "sub-b"]))
        })
        .await
        .unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_fetch_failure_is_not_poisoning() {
    let cache = ResourceCache::new(Duration::from_secs(60));

    let result = cache
        .get_or_fetch("subs", || async { anyhow::bail!("network down") })
        .await;
    assert!(result.is_err());

    // A subsequent call with a succeeding fetch must invoke it, proving
    // the earlier failure was not cached as the answer.
    let called = AtomicUsize::new(0);
    let value = cache
        .get_or_fetch("subs", || async {
            called.fetch_add(1, Ordering::SeqCst);
            Ok(json!(["sub-a"]))
        })
        .await
        .unwrap();
    assert_eq!(called.load(Ordering::SeqCst), 1);
    assert_eq!(value, json!(["sub-a"]));
}

#[tokio::test]
async fn test_expiry_triggers_refetch() {
    let cache = ResourceCache::new(Duration::from_secs(60));
    let calls = AtomicUsize::new(0);

    for _ in 0..2 {
        cache
            .get_or_fetch_with_ttl("key", Duration::from_millis(50), || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(json!(1))
            })
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
    }

    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_invalidate_key_forces_refetch() {
    let cache = ResourceCache::new(Duration::from_secs(60));
    let calls = AtomicUsize::new(0);
    let key = keys::resource_groups("sub-a");

    for _ in 0..2 {
        cache
            .get_or_fetch(&key, || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(json!(["rg-1"]))
            })
            .await
            .unwrap();
    }
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    cache.invalidate_key(&key);
    cache
        .get_or_fetch(&key, || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(json!(["rg-1"]))
        })
        .await
        .unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_invalidate_prefix_leaves_siblings() {
    let cache = ResourceCache::new(Duration::from_secs(60));

    cache
        .get_or_fetch(&keys::virtual_machines("sub", "rg1"), || async { Ok(json!(1)) })
        .await
        .unwrap();
    cache
        .get_or_fetch(&keys::virtual_machines("sub", "rg2"), || async { Ok(json!(2)) })
        .await
        .unwrap();
    cache
        .get_or_fetch(&keys::aks_clusters("sub", "rg1"), || async { Ok(json!(3)) })
        .await
        .unwrap();

    cache.invalidate_prefix("vms:");
    assert_eq!(cache.len(), 1);

    // The AKS sibling is still served from cache.
    let value = cache
        .get_or_fetch(&keys::aks_clusters("sub", "rg1"), || async {
            panic!("sibling collection was evicted")
        })
        .await
        .unwrap();
    assert_eq!(value, json!(3));
}

#[tokio::test]
async fn test_end_to_end_subscription_scenario() {
    // (1) Empty cache: the fetch runs once and its value is returned.
    let cache = ResourceCache::new(Duration::from_secs(60));
    let fetches = AtomicUsize::new(0);

    let value = cache
        .get_or_fetch(&keys::subscriptions(), || async {
            fetches.fetch_add(1, Ordering::SeqCst);
            Ok(json!(["sub-a", "sub-b"]))
        })
        .await
        .unwrap();
    assert_eq!(value, json!(["sub-a", "sub-b"]));
    assert_eq!(fetches.load(Ordering::SeqCst), 1);

    // (2) An immediate second call returns the same list without invoking
    // the new fetch at all.
    let value = cache
        .get_or_fetch(&keys::subscriptions(), || async {
            panic!("second fetch must not be invoked")
        })
        .await
        .unwrap();
    assert_eq!(value, json!(["sub-a", "sub-b"]));
}
