//! Region-scoped caching for resolved records.
//!
//! [`RegionCache`] is the cache abstraction consumed by the client details
//! resolver. [`MokaRegionCache`] implements it in-process with [`moka`],
//! keeping one independent cache per [`CacheRegion`].
//!
//! # Design
//!
//! - **Lazy regions**: a region's cache is built on first access from its own [`CacheConfig`],
//!   or from the default config when none was registered for it.
//! - **Isolation**: regions never share entries, even for identical keys.
//! - **Expiry**: eviction is entirely moka's (TTL plus capacity bound). Nothing outside the cache
//!   expires entries.
//! - **Disabled regions**: a region configured with [`CacheConfig::disabled()`] stores nothing and
//!   every lookup misses.
//!
//! # Usage
//!
//! ```no_run
//! # use std::time::Duration;
//! # use tokenauth_common_storage::{CacheConfig, CacheRegion, MokaRegionCache, RegionCache};
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = CacheConfig::builder()
//!     .max_entries(10_000)
//!     .ttl(Duration::from_secs(300))
//!     .build()?;
//! let cache: MokaRegionCache<String> = MokaRegionCache::new(config);
//! let region = CacheRegion::client_details();
//!
//! cache.put(&region, "web", "payload".to_owned()).await?;
//! assert_eq!(cache.get(&region, "web").await?, Some("payload".to_owned()));
//! # Ok(())
//! # }
//! ```

use std::{collections::HashMap, time::Duration};

use async_trait::async_trait;
use moka::future::Cache;
use parking_lot::RwLock;
use tracing::trace;

use crate::{ConfigError, error::StorageResult, types::CacheRegion};

// ───────────────────────────────────────────────────────────────────────────
// CacheConfig
// ───────────────────────────────────────────────────────────────────────────

/// Default maximum number of entries per region.
pub const DEFAULT_MAX_ENTRIES: u64 = 10_000;

/// Default time-to-live of a cached entry (5 minutes).
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// Minimum allowed time-to-live.
const MIN_TTL: Duration = Duration::from_secs(1);

/// Eviction policy of one cache region.
///
/// # Validation
///
/// - `max_entries` must be >= 1
/// - `ttl` must be >= 1 second
///
/// [`CacheConfig::disabled()`] turns caching off for a region.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CacheConfig {
    max_entries: u64,
    ttl: Duration,
    enabled: bool,
}

impl CacheConfig {
    /// Starts a builder seeded with [`DEFAULT_MAX_ENTRIES`] and [`DEFAULT_TTL`].
    pub fn builder() -> CacheConfigBuilder {
        CacheConfigBuilder { max_entries: DEFAULT_MAX_ENTRIES, ttl: DEFAULT_TTL }
    }

    /// Returns a configuration under which nothing is cached.
    pub fn disabled() -> Self {
        Self { max_entries: 0, ttl: Duration::ZERO, enabled: false }
    }

    /// Maximum number of entries kept in the region.
    pub fn max_entries(&self) -> u64 {
        self.max_entries
    }

    /// Time after insertion at which an entry expires.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Whether caching is enabled.
    pub fn enabled(&self) -> bool {
        self.enabled
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { max_entries: DEFAULT_MAX_ENTRIES, ttl: DEFAULT_TTL, enabled: true }
    }
}

/// Builder for [`CacheConfig`].
#[derive(Debug)]
pub struct CacheConfigBuilder {
    max_entries: u64,
    ttl: Duration,
}

impl CacheConfigBuilder {
    /// Sets the maximum number of entries.
    pub fn max_entries(mut self, max_entries: u64) -> Self {
        self.max_entries = max_entries;
        self
    }

    /// Sets the entry time-to-live.
    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Validates and builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::BelowMinimum`] if `max_entries` is 0 or `ttl`
    /// is shorter than one second.
    pub fn build(self) -> Result<CacheConfig, ConfigError> {
        if self.max_entries == 0 {
            return Err(ConfigError::BelowMinimum {
                field: "max_entries",
                value: self.max_entries.to_string(),
                min: "1".to_owned(),
            });
        }
        if self.ttl < MIN_TTL {
            return Err(ConfigError::BelowMinimum {
                field: "ttl",
                value: format!("{}ms", self.ttl.as_millis()),
                min: "1s".to_owned(),
            });
        }
        Ok(CacheConfig { max_entries: self.max_entries, ttl: self.ttl, enabled: true })
    }
}

// ───────────────────────────────────────────────────────────────────────────
// RegionCache
// ───────────────────────────────────────────────────────────────────────────

/// Key-value cache partitioned into named regions.
///
/// Every operation can fail with a [`StorageError`](crate::StorageError) so
/// that out-of-process caches fit behind the same interface. The in-process
/// [`MokaRegionCache`] never fails.
#[async_trait]
pub trait RegionCache<V>: Send + Sync
where
    V: Clone + Send + Sync + 'static,
{
    /// Returns the value cached under `key` in `region`, if any.
    async fn get(&self, region: &CacheRegion, key: &str) -> StorageResult<Option<V>>;

    /// Caches `value` under `key` in `region`, replacing any previous entry.
    async fn put(&self, region: &CacheRegion, key: &str, value: V) -> StorageResult<()>;

    /// Removes the entry for `key` in `region`, if present.
    async fn invalidate(&self, region: &CacheRegion, key: &str) -> StorageResult<()>;

    /// Removes every entry in `region`.
    async fn clear(&self, region: &CacheRegion) -> StorageResult<()>;
}

// ───────────────────────────────────────────────────────────────────────────
// MokaRegionCache
// ───────────────────────────────────────────────────────────────────────────

/// In-process [`RegionCache`] backed by one [`moka`] cache per region.
///
/// `None` slots mark regions that were accessed while disabled.
pub struct MokaRegionCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    regions: RwLock<HashMap<CacheRegion, Option<Cache<String, V>>>>,
    configs: HashMap<CacheRegion, CacheConfig>,
    default_config: CacheConfig,
}

impl<V> MokaRegionCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Creates a cache whose regions all use `default_config`.
    #[must_use]
    pub fn new(default_config: CacheConfig) -> Self {
        Self { regions: RwLock::new(HashMap::new()), configs: HashMap::new(), default_config }
    }

    /// Overrides the configuration of a single region.
    ///
    /// Must be called before the region is first used.
    #[must_use]
    pub fn with_region(mut self, region: impl Into<CacheRegion>, config: CacheConfig) -> Self {
        self.configs.insert(region.into(), config);
        self
    }

    /// Returns the configuration that applies to `region`.
    #[must_use]
    pub fn config_for(&self, region: &CacheRegion) -> &CacheConfig {
        self.configs.get(region).unwrap_or(&self.default_config)
    }

    /// Returns the approximate number of entries in `region`.
    ///
    /// Counts are eventually consistent; call
    /// [`run_pending_tasks`](Self::run_pending_tasks) first for exact values.
    #[must_use]
    pub fn entry_count(&self, region: &CacheRegion) -> u64 {
        self.existing(region).map_or(0, |cache| cache.entry_count())
    }

    /// Flushes moka's pending maintenance work in every region.
    pub async fn run_pending_tasks(&self) {
        let caches: Vec<Cache<String, V>> =
            self.regions.read().values().filter_map(Clone::clone).collect();
        for cache in caches {
            cache.run_pending_tasks().await;
        }
    }

    /// Returns the cache for `region`, building it on first use.
    fn region_cache(&self, region: &CacheRegion) -> Option<Cache<String, V>> {
        if let Some(slot) = self.regions.read().get(region) {
            return slot.clone();
        }

        let config = self.config_for(region).clone();
        self.regions
            .write()
            .entry(region.clone())
            .or_insert_with(|| {
                trace!(%region, enabled = config.enabled, "creating cache region");
                config.enabled.then(|| {
                    Cache::builder()
                        .max_capacity(config.max_entries)
                        .time_to_live(config.ttl)
                        .build()
                })
            })
            .clone()
    }

    /// Returns the cache for `region` only if it was already built.
    fn existing(&self, region: &CacheRegion) -> Option<Cache<String, V>> {
        self.regions.read().get(region).cloned().flatten()
    }
}

impl<V> Default for MokaRegionCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}

#[async_trait]
impl<V> RegionCache<V> for MokaRegionCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    async fn get(&self, region: &CacheRegion, key: &str) -> StorageResult<Option<V>> {
        let Some(cache) = self.region_cache(region) else {
            return Ok(None);
        };
        let value = cache.get(key).await;
        trace!(%region, hit = value.is_some(), "region cache lookup");
        Ok(value)
    }

    async fn put(&self, region: &CacheRegion, key: &str, value: V) -> StorageResult<()> {
        if let Some(cache) = self.region_cache(region) {
            cache.insert(key.to_owned(), value).await;
        }
        Ok(())
    }

    async fn invalidate(&self, region: &CacheRegion, key: &str) -> StorageResult<()> {
        if let Some(cache) = self.existing(region) {
            cache.invalidate(key).await;
        }
        Ok(())
    }

    async fn clear(&self, region: &CacheRegion) -> StorageResult<()> {
        if let Some(cache) = self.existing(region) {
            cache.invalidate_all();
        }
        Ok(())
    }
}
