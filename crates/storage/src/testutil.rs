//! Shared test utilities for client details storage.
//!
//! Provides sample records and instrumented collaborator wrappers that count
//! calls and inject failures. It is feature-gated behind `testutil` to prevent
//! leaking into production builds.
//!
//! # Usage
//!
//! ```toml
//! [dev-dependencies]
//! tokenauth-common-storage = { path = "../storage", features = ["testutil"] }
//! ```
//!
//! ```no_run
//! // Requires the `testutil` feature to be enabled.
//! use tokenauth_common_storage::testutil::{CountingCache, CountingStore, sample_client_details};
//! ```

use std::{
    sync::atomic::{AtomicUsize, Ordering},
    time::Duration,
};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::{
    cache::RegionCache,
    client::{ClientDetails, ClientDetailsStore, MemoryClientDetailsStore},
    error::{StorageError, StorageResult},
    types::CacheRegion,
};

/// Builds a deterministic [`ClientDetails`] for `client_id`.
///
/// Secrets are derived from the id, so two calls with the same id produce
/// value-equal records. The signing secret is long enough for `HS512`.
#[must_use]
pub fn sample_client_details(client_id: &str) -> ClientDetails {
    ClientDetails::builder()
        .client_id(client_id)
        .client_secret(format!("{client_id}-client-secret"))
        .signing_secret(format!("{client_id}-signing-secret-{}", "0123456789abcdef".repeat(4)))
        .access_token_validity(Duration::from_secs(900))
        .refresh_token_validity(Duration::from_secs(3_600))
        .scopes(vec!["read".to_owned(), "write".to_owned()])
        .build()
}

/// Factory producing the error an instrumented collaborator should fail with.
pub type FailureFactory = fn() -> StorageError;

/// [`ClientDetailsStore`] wrapper that counts lookups and can be told to fail.
///
/// Registration goes through [`inner`](Self::inner) and is not counted.
#[derive(Default)]
pub struct CountingStore {
    inner: MemoryClientDetailsStore,
    finds: AtomicUsize,
    fail_with: Mutex<Option<FailureFactory>>,
    delay: Mutex<Duration>,
}

impl CountingStore {
    /// Creates an empty counting store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a counting store pre-populated with `clients`.
    #[must_use]
    pub fn with_clients(clients: impl IntoIterator<Item = ClientDetails>) -> Self {
        let store = Self::new();
        for details in clients {
            store.inner.register(details);
        }
        store
    }

    /// Returns the wrapped in-memory store.
    #[must_use]
    pub fn inner(&self) -> &MemoryClientDetailsStore {
        &self.inner
    }

    /// Number of `find_by_client_id` calls so far.
    #[must_use]
    pub fn find_count(&self) -> usize {
        self.finds.load(Ordering::SeqCst)
    }

    /// Resets the lookup counter.
    pub fn reset_count(&self) {
        self.finds.store(0, Ordering::SeqCst);
    }

    /// Makes every subsequent lookup fail with the produced error, or
    /// succeed again when `None`.
    pub fn set_failure(&self, factory: Option<FailureFactory>) {
        *self.fail_with.lock() = factory;
    }

    /// Delays every subsequent lookup by `delay`.
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock() = delay;
    }
}

#[async_trait]
impl ClientDetailsStore for CountingStore {
    async fn find_by_client_id(&self, client_id: &str) -> StorageResult<Option<ClientDetails>> {
        self.finds.fetch_add(1, Ordering::SeqCst);

        if let Some(factory) = *self.fail_with.lock() {
            return Err(factory());
        }

        let delay = *self.delay.lock();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        self.inner.find_by_client_id(client_id).await
    }
}

/// One recorded [`RegionCache::put`] call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordedPut<V> {
    /// Region written to.
    pub region: CacheRegion,
    /// Key written.
    pub key: String,
    /// Value written.
    pub value: V,
}

/// [`RegionCache`] wrapper that records every call and can be told to fail.
pub struct CountingCache<V, C>
where
    V: Clone + Send + Sync + 'static,
{
    inner: C,
    gets: AtomicUsize,
    puts: Mutex<Vec<RecordedPut<V>>>,
    fail_with: Mutex<Option<FailureFactory>>,
}

impl<V, C> CountingCache<V, C>
where
    V: Clone + Send + Sync + 'static,
    C: RegionCache<V>,
{
    /// Wraps `inner`.
    #[must_use]
    pub fn new(inner: C) -> Self {
        Self {
            inner,
            gets: AtomicUsize::new(0),
            puts: Mutex::new(Vec::new()),
            fail_with: Mutex::new(None),
        }
    }

    /// Returns the wrapped cache; calls through it are not counted.
    #[must_use]
    pub fn inner(&self) -> &C {
        &self.inner
    }

    /// Number of `get` calls so far.
    #[must_use]
    pub fn get_count(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    /// Number of `put` calls so far.
    #[must_use]
    pub fn put_count(&self) -> usize {
        self.puts.lock().len()
    }

    /// Every `put` call so far, in order.
    #[must_use]
    pub fn puts(&self) -> Vec<RecordedPut<V>> {
        self.puts.lock().clone()
    }

    /// Clears the call counters.
    pub fn reset_counts(&self) {
        self.gets.store(0, Ordering::SeqCst);
        self.puts.lock().clear();
    }

    /// Makes every subsequent `get` and `put` fail with the produced error,
    /// or succeed again when `None`.
    pub fn set_failure(&self, factory: Option<FailureFactory>) {
        *self.fail_with.lock() = factory;
    }

    fn injected_failure(&self) -> Option<StorageError> {
        (*self.fail_with.lock()).map(|factory| factory())
    }
}

#[async_trait]
impl<V, C> RegionCache<V> for CountingCache<V, C>
where
    V: Clone + Send + Sync + 'static,
    C: RegionCache<V>,
{
    async fn get(&self, region: &CacheRegion, key: &str) -> StorageResult<Option<V>> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.injected_failure() {
            return Err(err);
        }
        self.inner.get(region, key).await
    }

    async fn put(&self, region: &CacheRegion, key: &str, value: V) -> StorageResult<()> {
        self.puts.lock().push(RecordedPut {
            region: region.clone(),
            key: key.to_owned(),
            value: value.clone(),
        });
        if let Some(err) = self.injected_failure() {
            return Err(err);
        }
        self.inner.put(region, key, value).await
    }

    async fn invalidate(&self, region: &CacheRegion, key: &str) -> StorageResult<()> {
        self.inner.invalidate(region, key).await
    }

    async fn clear(&self, region: &CacheRegion) -> StorageResult<()> {
        self.inner.clear(region).await
    }
}
