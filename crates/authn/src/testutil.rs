//! Shared test utilities for client details resolution.
//!
//! This module wires a [`ClientDetailsResolver`] to the counting collaborators
//! from `tokenauth_common_storage::testutil`, so tests can assert exactly how
//! many store reads and cache writes a lookup caused. It is feature-gated
//! behind `testutil` to prevent leaking into production builds.
//!
//! # Usage
//!
//! In integration tests, enable the feature in `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! tokenauth-common-authn = { path = "../authn", features = ["testutil"] }
//! ```
//!
//! Then import helpers:
//!
//! ```no_run
//! // Requires the `testutil` feature to be enabled.
//! use tokenauth_common_authn::testutil::ResolverFixture;
//! ```

use std::sync::Arc;

use tokenauth_common_storage::{
    CacheConfig, CacheRegion, MokaRegionCache,
    client::{ClientDetails, ClientDetailsStore},
    testutil::{CountingCache, CountingStore},
};

use crate::resolver::{ClientDetailsCache, ClientDetailsResolver};

/// Counting cache over an in-process moka cache, as used by [`ResolverFixture`].
pub type CountingClientCache =
    CountingCache<Arc<ClientDetails>, MokaRegionCache<Arc<ClientDetails>>>;

/// A resolver plus handles on its instrumented collaborators.
pub struct ResolverFixture {
    /// Resolver under test, using the default client details region.
    pub resolver: Arc<ClientDetailsResolver>,
    /// Store behind the resolver.
    pub store: Arc<CountingStore>,
    /// Cache in front of the store.
    pub cache: Arc<CountingClientCache>,
}

impl ResolverFixture {
    /// Builds a fixture whose store already holds `clients`.
    #[must_use]
    pub fn new(clients: impl IntoIterator<Item = ClientDetails>) -> Self {
        Self::with_cache_config(clients, CacheConfig::default())
    }

    /// Builds a fixture with a specific cache eviction policy.
    #[must_use]
    pub fn with_cache_config(
        clients: impl IntoIterator<Item = ClientDetails>,
        config: CacheConfig,
    ) -> Self {
        let store = Arc::new(CountingStore::with_clients(clients));
        let cache = Arc::new(CountingCache::new(MokaRegionCache::new(config)));
        let resolver = Arc::new(ClientDetailsResolver::new(
            Arc::clone(&store) as Arc<dyn ClientDetailsStore>,
            Arc::clone(&cache) as Arc<ClientDetailsCache>,
            CacheRegion::client_details(),
        ));
        Self { resolver, store, cache }
    }

    /// Forgets every call recorded so far on both collaborators.
    pub fn reset_counts(&self) {
        self.store.reset_count();
        self.cache.reset_counts();
    }
}

/// Asserts that a [`Result<T, AuthError>`](crate::error::AuthError) is an
/// `Err` matching the given variant.
///
/// Works with any `AuthError` variant. On failure, prints the expected variant
/// and the actual result for debugging.
///
/// # Examples
///
/// ```no_run
/// // Requires the `testutil` feature to be enabled.
/// use tokenauth_common_authn::assert_auth_error;
/// use tokenauth_common_authn::error::AuthError;
///
/// let result: Result<(), AuthError> = Err(AuthError::client_not_found(Some("web")));
/// assert_auth_error!(result, ClientNotFound);
/// ```
#[macro_export]
macro_rules! assert_auth_error {
    ($result:expr, $variant:ident) => {
        assert!(
            matches!($result, Err($crate::error::AuthError::$variant { .. })),
            "expected AuthError::{}, got: {:?}",
            stringify!($variant),
            $result,
        );
    };
    ($result:expr, $variant:ident, $msg:expr) => {
        assert!(
            matches!($result, Err($crate::error::AuthError::$variant { .. })),
            "{}: expected AuthError::{}, got: {:?}",
            $msg,
            stringify!($variant),
            $result,
        );
    };
}
