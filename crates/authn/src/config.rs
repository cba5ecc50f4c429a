//! Configuration for the client details resolver.
//!
//! The cache region name and its eviction policy come from service
//! configuration rather than being fixed in code.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use tokenauth_common_authn::ResolverConfig;
//!
//! let config: ResolverConfig = serde_json::from_str(
//!     r#"{ "region": "jwt_configuration", "max_entries": 500, "ttl": "10m" }"#,
//! )?;
//! assert_eq!(config.ttl, Duration::from_secs(600));
//! assert!(config.validate().is_ok());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokenauth_common_storage::{
    CacheConfig, CacheRegion, ConfigError,
    cache::{DEFAULT_MAX_ENTRIES, DEFAULT_TTL},
};

/// Settings for [`ClientDetailsResolver`](crate::ClientDetailsResolver).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, bon::Builder)]
#[serde(deny_unknown_fields)]
pub struct ResolverConfig {
    /// Cache region holding client details.
    #[serde(default)]
    #[builder(into, default)]
    pub region: CacheRegion,

    /// Maximum number of cached clients.
    #[serde(default = "default_max_entries")]
    #[builder(default = DEFAULT_MAX_ENTRIES)]
    pub max_entries: u64,

    /// Time after which a cached client is fetched from the store again.
    #[serde(with = "humantime_serde", default = "default_ttl")]
    #[builder(default = DEFAULT_TTL)]
    pub ttl: Duration,

    /// Whether resolved clients are cached at all.
    #[serde(default = "default_enabled")]
    #[builder(default = true)]
    pub enabled: bool,
}

fn default_max_entries() -> u64 {
    DEFAULT_MAX_ENTRIES
}

fn default_ttl() -> Duration {
    DEFAULT_TTL
}

fn default_enabled() -> bool {
    true
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl ResolverConfig {
    /// Checks the configuration without building anything.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the region name is blank or the cache
    /// bounds are out of range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.cache_config().map(|_| ())
    }

    /// Converts the cache settings into a validated [`CacheConfig`].
    ///
    /// # Errors
    ///
    /// Same conditions as [`validate`](Self::validate).
    pub fn cache_config(&self) -> Result<CacheConfig, ConfigError> {
        if self.region.as_str().trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "region",
                reason: "must not be empty".to_owned(),
            });
        }
        if !self.enabled {
            return Ok(CacheConfig::disabled());
        }
        CacheConfig::builder().max_entries(self.max_entries).ttl(self.ttl).build()
    }
}
