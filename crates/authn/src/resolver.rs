//! Cache-aside resolution of client details.
//!
//! This module provides [`ClientDetailsResolver`], which maps a client
//! identifier to its registered [`ClientDetails`] on the critical path of
//! every token issuance and validation.
//!
//! # Architecture
//!
//! ```text
//! resolve(client_id)
//!   → missing/empty id?  → ClientNotFound (no cache or store access)
//!   → cache.get(region, id)      hit  → return
//!   → store.find_by_client_id    miss → ClientNotFound
//!   → cache.put(region, id, details)  → return
//! ```
//!
//! # Guarantees
//!
//! - The cache only ever holds values the store returned for the same id.
//! - A cache hit performs no store read and no cache write.
//! - A miss followed by a store hit performs exactly one store read and one cache write.
//! - A store read that overlaps [`invalidate`](ClientDetailsResolver::invalidate) or
//!   [`clear`](ClientDetailsResolver::clear) does not write the cache.
//! - Store and cache failures surface as [`AuthError::Storage`] carrying the original error. They
//!   are never retried and never reported as `ClientNotFound`.
//!
//! Concurrent misses for the same unseen id may each read the store and write
//! the cache. The writes are value-equal, so the last one winning is harmless.
//!
//! # Examples
//!
//! ```no_run
//! use std::sync::Arc;
//! use tokenauth_common_authn::{ClientDetailsResolver, ResolverConfig};
//! use tokenauth_common_storage::client::MemoryClientDetailsStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(MemoryClientDetailsStore::new());
//! let resolver = ClientDetailsResolver::from_config(store, &ResolverConfig::default())?;
//!
//! match resolver.resolve(Some("billing-frontend")).await {
//!     Ok(details) => println!("signing with {}", details.signature_algorithm),
//!     Err(err) if err.is_client_not_found() => println!("deny"),
//!     Err(err) => return Err(err.into()),
//! }
//! # Ok(())
//! # }
//! ```

use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use fail::fail_point;
use tokenauth_common_storage::{
    CacheRegion, ConfigError, MokaRegionCache, RegionCache, StorageError,
    client::{ClientDetails, ClientDetailsStore},
};

use crate::{config::ResolverConfig, error::AuthError};

/// Cache type the resolver reads and populates.
pub type ClientDetailsCache = dyn RegionCache<Arc<ClientDetails>>;

/// Resolves client identifiers to their registered configuration.
///
/// Consults the region cache before the durable store and keeps the cache
/// warm on misses. Holds no mutable state besides its counters, so a single
/// instance is shared across request tasks behind an `Arc`.
pub struct ClientDetailsResolver {
    /// Durable source of truth.
    store: Arc<dyn ClientDetailsStore>,
    /// Region-scoped cache in front of the store.
    cache: Arc<ClientDetailsCache>,
    /// Region holding client details.
    region: CacheRegion,
    /// Lookups answered from the cache.
    cache_hits: AtomicU64,
    /// Lookups that had to go to the store.
    cache_misses: AtomicU64,
    /// Lookups rejected with `ClientNotFound`.
    not_found: AtomicU64,
    /// Lookups that failed on the store or cache.
    infrastructure_errors: AtomicU64,
    /// Monotonic counter bumped by every invalidation.
    ///
    /// A store read that straddles a bump may have fetched a record the
    /// registration side already changed or removed, so its result is
    /// returned but not cached.
    invalidation_gen: AtomicU64,
}

/// Point-in-time copy of the resolver's counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolverMetricsSnapshot {
    /// Lookups answered from the cache.
    pub cache_hits: u64,
    /// Lookups that had to go to the store.
    pub cache_misses: u64,
    /// Lookups rejected with `ClientNotFound`, including missing ids.
    pub not_found: u64,
    /// Lookups that failed on the store or cache.
    pub infrastructure_errors: u64,
}

impl ResolverMetricsSnapshot {
    /// Fraction of cache probes that hit, between 0.0 and 1.0.
    #[must_use]
    pub fn hit_rate(&self) -> f64 {
        let probes = self.cache_hits + self.cache_misses;
        if probes == 0 {
            return 0.0;
        }
        self.cache_hits as f64 / probes as f64
    }
}

impl ClientDetailsResolver {
    /// Creates a resolver over explicit collaborators.
    ///
    /// # Arguments
    ///
    /// * `store` - Durable client registry
    /// * `cache` - Cache shared with other components; only `region` is touched
    /// * `region` - Region holding client details
    #[must_use]
    pub fn new(
        store: Arc<dyn ClientDetailsStore>,
        cache: Arc<ClientDetailsCache>,
        region: CacheRegion,
    ) -> Self {
        Self {
            store,
            cache,
            region,
            cache_hits: AtomicU64::new(0),
            cache_misses: AtomicU64::new(0),
            not_found: AtomicU64::new(0),
            infrastructure_errors: AtomicU64::new(0),
            invalidation_gen: AtomicU64::new(0),
        }
    }

    /// Creates a resolver with an in-process [`MokaRegionCache`] sized by
    /// `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `config` fails validation.
    pub fn from_config(
        store: Arc<dyn ClientDetailsStore>,
        config: &ResolverConfig,
    ) -> Result<Self, ConfigError> {
        let cache_config = config.cache_config()?;
        let cache = MokaRegionCache::new(cache_config.clone())
            .with_region(config.region.clone(), cache_config);
        Ok(Self::new(store, Arc::new(cache), config.region.clone()))
    }

    /// Returns the client details registered for `client_id`.
    ///
    /// A missing or empty identifier is rejected immediately, without
    /// touching the cache or the store. Identifiers are otherwise not
    /// validated; a malformed one simply is not found.
    ///
    /// # Errors
    ///
    /// - [`AuthError::ClientNotFound`] if the identifier is missing or empty, or no client is
    ///   registered under it
    /// - [`AuthError::Storage`] with the original [`StorageError`] if the cache or store fails
    #[tracing::instrument(skip(self), fields(region = %self.region))]
    pub async fn resolve(&self, client_id: Option<&str>) -> Result<Arc<ClientDetails>, AuthError> {
        let Some(client_id) = client_id.filter(|id| !id.is_empty()) else {
            self.not_found.fetch_add(1, Ordering::Relaxed);
            tracing::debug!("rejecting lookup without client id");
            return Err(AuthError::client_not_found(client_id));
        };

        let cached = self.cache.get(&self.region, client_id).await;
        if let Some(details) = self.observe(cached)? {
            self.cache_hits.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(cache = "region", "cache hit");
            return Ok(details);
        }
        self.cache_misses.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(cache = "region", "cache miss");

        // Snapshot before the store read; `invalidate` and `clear` bump it.
        let gen_before = self.invalidation_gen.load(Ordering::Acquire);

        fail_point!("resolver-before-store-fetch", |_| {
            Err(AuthError::Storage(StorageError::internal("injected failure before store fetch")))
        });

        let found = self.store.find_by_client_id(client_id).await;
        let Some(details) = self.observe(found)? else {
            self.not_found.fetch_add(1, Ordering::Relaxed);
            tracing::debug!("client not registered");
            return Err(AuthError::client_not_found(Some(client_id)));
        };

        let details = Arc::new(details);
        if self.invalidation_gen.load(Ordering::Acquire) != gen_before {
            tracing::debug!("discarding store result: invalidation occurred during fetch");
            return Ok(details);
        }
        let stored = self.cache.put(&self.region, client_id, Arc::clone(&details)).await;
        self.observe(stored)?;
        tracing::debug!(cache = "store", "store hit, populated cache");

        Ok(details)
    }

    /// Drops the cached entry for `client_id`.
    ///
    /// Called by the registration side after it changes or removes a
    /// client, so the next [`resolve`](Self::resolve) reads the store.
    /// Lookups whose store read is in flight at this point still return
    /// what they read but leave the cache untouched.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Storage`] if the cache fails.
    #[tracing::instrument(skip(self), fields(region = %self.region))]
    pub async fn invalidate(&self, client_id: &str) -> Result<(), AuthError> {
        self.invalidation_gen.fetch_add(1, Ordering::Release);
        self.cache.invalidate(&self.region, client_id).await?;
        let resource = format!("region:{}/client:{client_id}", self.region);
        tracing::info!(
            audit.action = "invalidate_client_details",
            audit.resource = %resource,
            audit.result = "success",
            "audit_event"
        );
        Ok(())
    }

    /// Drops every cached client in the resolver's region.
    ///
    /// Every following lookup goes to the store once, so use this sparingly.
    /// In-flight store reads do not repopulate the cache.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Storage`] if the cache fails.
    #[tracing::instrument(skip(self), fields(region = %self.region))]
    pub async fn clear(&self) -> Result<(), AuthError> {
        self.invalidation_gen.fetch_add(1, Ordering::Release);
        self.cache.clear(&self.region).await?;
        tracing::info!(
            audit.action = "clear_client_details",
            audit.resource = %self.region,
            audit.result = "success",
            "audit_event"
        );
        Ok(())
    }

    /// Returns the region this resolver caches into.
    #[must_use]
    pub fn region(&self) -> &CacheRegion {
        &self.region
    }

    /// Returns a snapshot of the lookup counters.
    #[must_use]
    pub fn metrics(&self) -> ResolverMetricsSnapshot {
        ResolverMetricsSnapshot {
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            cache_misses: self.cache_misses.load(Ordering::Relaxed),
            not_found: self.not_found.load(Ordering::Relaxed),
            infrastructure_errors: self.infrastructure_errors.load(Ordering::Relaxed),
        }
    }

    /// Counts and logs a collaborator failure, passing the error through.
    fn observe<T>(&self, result: Result<T, StorageError>) -> Result<T, AuthError> {
        result.map_err(|err| {
            self.infrastructure_errors.fetch_add(1, Ordering::Relaxed);
            tracing::warn!(error = %err, transient = err.is_transient(), "client details lookup failed");
            AuthError::Storage(err)
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use std::time::Duration;

    use tokenauth_common_storage::{
        CacheConfig,
        client::MemoryClientDetailsStore,
        testutil::{CountingCache, CountingStore, sample_client_details},
    };

    use super::*;

    type TestCache = CountingCache<Arc<ClientDetails>, MokaRegionCache<Arc<ClientDetails>>>;

    fn setup(
        clients: impl IntoIterator<Item = ClientDetails>,
    ) -> (ClientDetailsResolver, Arc<CountingStore>, Arc<TestCache>) {
        let store = Arc::new(CountingStore::with_clients(clients));
        let cache = Arc::new(CountingCache::new(MokaRegionCache::new(CacheConfig::default())));
        let resolver = ClientDetailsResolver::new(
            Arc::clone(&store) as Arc<dyn ClientDetailsStore>,
            Arc::clone(&cache) as Arc<ClientDetailsCache>,
            CacheRegion::client_details(),
        );
        (resolver, store, cache)
    }

    #[tokio::test]
    async fn test_store_hit_populates_cache() {
        let (resolver, store, cache) = setup([sample_client_details("web")]);

        let details = resolver.resolve(Some("web")).await.expect("resolve");

        assert_eq!(*details, sample_client_details("web"));
        assert_eq!(store.find_count(), 1);
        assert_eq!(cache.get_count(), 1);
        let puts = cache.puts();
        assert_eq!(puts.len(), 1);
        assert_eq!(puts[0].region, CacheRegion::client_details());
        assert_eq!(puts[0].key, "web");
        assert_eq!(*puts[0].value, sample_client_details("web"));
    }

    #[tokio::test]
    async fn test_second_lookup_served_from_cache() {
        let (resolver, store, cache) = setup([sample_client_details("web")]);

        let first = resolver.resolve(Some("web")).await.expect("first");
        let second = resolver.resolve(Some("web")).await.expect("second");

        assert_eq!(first, second);
        assert_eq!(store.find_count(), 1, "second lookup must not read the store");
        assert_eq!(cache.get_count(), 2);
        assert_eq!(cache.put_count(), 1, "second lookup must not write the cache");
    }

    #[tokio::test]
    async fn test_unknown_client() {
        let (resolver, store, cache) = setup([]);

        let result = resolver.resolve(Some("ghost")).await;

        assert!(
            matches!(result, Err(AuthError::ClientNotFound { client_id: Some(ref id) }) if id == "ghost")
        );
        assert_eq!(store.find_count(), 1);
        assert_eq!(cache.get_count(), 1);
        assert_eq!(cache.put_count(), 0);
    }

    #[tokio::test]
    async fn test_unknown_client_is_not_negatively_cached() {
        let (resolver, store, _cache) = setup([]);

        assert!(resolver.resolve(Some("late")).await.is_err());
        store.inner().register(sample_client_details("late"));

        let details = resolver.resolve(Some("late")).await.expect("registered later");
        assert_eq!(details.client_id, "late");
        assert_eq!(store.find_count(), 2);
    }

    #[tokio::test]
    async fn test_missing_id_short_circuits() {
        let (resolver, store, cache) = setup([sample_client_details("web")]);

        let result = resolver.resolve(None).await;

        assert!(matches!(result, Err(AuthError::ClientNotFound { client_id: None })));
        assert_eq!(store.find_count(), 0);
        assert_eq!(cache.get_count(), 0);
        assert_eq!(cache.put_count(), 0);
    }

    #[tokio::test]
    async fn test_empty_id_short_circuits() {
        let (resolver, store, cache) = setup([]);

        let result = resolver.resolve(Some("")).await;

        assert!(matches!(result, Err(AuthError::ClientNotFound { .. })));
        assert_eq!(store.find_count(), 0);
        assert_eq!(cache.get_count(), 0);
    }

    #[tokio::test]
    async fn test_store_failure_propagates_unchanged() {
        let (resolver, store, cache) = setup([sample_client_details("web")]);
        store.set_failure(Some(|| StorageError::connection("registry unreachable")));

        let result = resolver.resolve(Some("web")).await;

        let err = result.expect_err("store failure");
        assert!(
            matches!(err, AuthError::Storage(StorageError::Connection { ref message, .. }) if message == "registry unreachable")
        );
        assert!(!err.is_client_not_found());
        assert_eq!(cache.put_count(), 0);
        assert_eq!(store.find_count(), 1, "no retries");
    }

    #[tokio::test]
    async fn test_cache_read_failure_propagates_without_store_read() {
        let (resolver, store, cache) = setup([sample_client_details("web")]);
        cache.set_failure(Some(StorageError::timeout));

        let result = resolver.resolve(Some("web")).await;

        assert!(matches!(result, Err(AuthError::Storage(StorageError::Timeout))));
        assert_eq!(store.find_count(), 0);
    }

    #[tokio::test]
    async fn test_metrics() {
        let (resolver, store, _cache) = setup([sample_client_details("web")]);

        resolver.resolve(Some("web")).await.expect("miss then store hit");
        resolver.resolve(Some("web")).await.expect("cache hit");
        let _ = resolver.resolve(Some("ghost")).await;
        let _ = resolver.resolve(None).await;
        store.set_failure(Some(StorageError::timeout));
        let _ = resolver.resolve(Some("other")).await;

        let metrics = resolver.metrics();
        assert_eq!(
            metrics,
            ResolverMetricsSnapshot {
                cache_hits: 1,
                cache_misses: 3,
                not_found: 2,
                infrastructure_errors: 1,
            }
        );
        assert!((metrics.hit_rate() - 0.25).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_invalidate_forces_store_read() {
        let (resolver, store, _cache) = setup([sample_client_details("web")]);
        resolver.resolve(Some("web")).await.expect("warm");

        let mut updated = sample_client_details("web");
        updated.scopes = vec!["admin".to_owned()];
        store.inner().register(updated.clone());

        // Still cached until invalidated.
        assert_eq!(*resolver.resolve(Some("web")).await.expect("cached"), sample_client_details("web"));

        resolver.invalidate("web").await.expect("invalidate");
        assert_eq!(*resolver.resolve(Some("web")).await.expect("fresh"), updated);
        assert_eq!(store.find_count(), 2);
    }

    #[tokio::test]
    async fn test_invalidation_bumps_generation() {
        let (resolver, _store, _cache) = setup([sample_client_details("web")]);

        resolver.invalidate("web").await.expect("invalidate");
        resolver.invalidate("ghost").await.expect("invalidate unknown");
        resolver.clear().await.expect("clear");

        assert_eq!(resolver.invalidation_gen.load(Ordering::Acquire), 3);
    }

    #[tokio::test]
    async fn test_clear_drops_all_clients() {
        let (resolver, store, _cache) =
            setup([sample_client_details("web"), sample_client_details("mobile")]);
        resolver.resolve(Some("web")).await.expect("warm web");
        resolver.resolve(Some("mobile")).await.expect("warm mobile");

        resolver.clear().await.expect("clear");
        store.reset_count();

        resolver.resolve(Some("web")).await.expect("web");
        resolver.resolve(Some("mobile")).await.expect("mobile");
        assert_eq!(store.find_count(), 2);
    }

    #[tokio::test]
    async fn test_region_is_respected() {
        let store = Arc::new(MemoryClientDetailsStore::new());
        store.register(sample_client_details("web"));
        let cache: Arc<MokaRegionCache<Arc<ClientDetails>>> = Arc::new(MokaRegionCache::default());
        let region = CacheRegion::from("tenant-a-clients");

        let resolver = ClientDetailsResolver::new(
            store as Arc<dyn ClientDetailsStore>,
            Arc::clone(&cache) as Arc<ClientDetailsCache>,
            region.clone(),
        );
        resolver.resolve(Some("web")).await.expect("resolve");

        assert!(cache.get(&region, "web").await.expect("get").is_some());
        assert!(cache.get(&CacheRegion::client_details(), "web").await.expect("get").is_none());
    }

    #[tokio::test]
    async fn test_from_config_uses_configured_region() {
        let store = Arc::new(MemoryClientDetailsStore::new());
        store.register(sample_client_details("web"));
        let config = ResolverConfig::builder()
            .region("jwt_configuration")
            .ttl(Duration::from_secs(30))
            .build();

        let resolver =
            ClientDetailsResolver::from_config(store as Arc<dyn ClientDetailsStore>, &config)
                .expect("valid config");

        assert_eq!(resolver.region().as_str(), "jwt_configuration");
        assert!(resolver.resolve(Some("web")).await.is_ok());
    }

    #[test]
    fn test_from_config_rejects_invalid() {
        let store = Arc::new(MemoryClientDetailsStore::new());
        let config = ResolverConfig::builder().max_entries(0).build();
        let result =
            ClientDetailsResolver::from_config(store as Arc<dyn ClientDetailsStore>, &config);
        assert!(matches!(result, Err(ConfigError::BelowMinimum { field: "max_entries", .. })));
    }

    #[tokio::test]
    async fn test_disabled_cache_always_reads_store() {
        let store = Arc::new(CountingStore::with_clients([sample_client_details("web")]));
        let config = ResolverConfig::builder().enabled(false).build();
        let resolver = ClientDetailsResolver::from_config(
            Arc::clone(&store) as Arc<dyn ClientDetailsStore>,
            &config,
        )
        .expect("valid config");

        resolver.resolve(Some("web")).await.expect("first");
        resolver.resolve(Some("web")).await.expect("second");
        assert_eq!(store.find_count(), 2);
    }

    mod proptests {
        use std::collections::HashSet;

        use proptest::prelude::*;

        use super::*;

        /// Strategy for a small id alphabet so lookups repeat and collide.
        fn arb_client_id() -> impl Strategy<Value = String> {
            prop_oneof![Just(String::new()), "[a-d]{1,2}"]
        }

        proptest! {
            /// Every lookup agrees with the store, and each registered id is
            /// read from the store and written to the cache exactly once.
            #[test]
            fn resolve_agrees_with_store_and_caches_once(
                registered in proptest::collection::hash_set("[a-d]{1,2}", 0..8),
                lookups in proptest::collection::vec(arb_client_id(), 0..40),
            ) {
                let rt = tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
                    .expect("runtime");

                rt.block_on(async {
                    let (resolver, store, cache) =
                        setup(registered.iter().map(|id| sample_client_details(id)));

                    let mut seen = HashSet::new();
                    let mut unknown_lookups = 0;
                    for id in &lookups {
                        let result = resolver.resolve(Some(id.as_str())).await;
                        if registered.contains(id) {
                            let details = result.expect("registered client resolves");
                            prop_assert_eq!(&details.client_id, id);
                            seen.insert(id.clone());
                        } else {
                            prop_assert!(
                                matches!(result, Err(AuthError::ClientNotFound { .. })),
                                "expected ClientNotFound for {:?}, got {:?}",
                                id,
                                result
                            );
                            if !id.is_empty() {
                                unknown_lookups += 1;
                            }
                        }
                    }

                    prop_assert_eq!(cache.put_count(), seen.len());
                    prop_assert_eq!(store.find_count(), seen.len() + unknown_lookups);
                    prop_assert!(cache.puts().iter().all(|put| put.key == put.value.client_id));
                    Ok(())
                })?;
            }
        }
    }
}
