//! Client details storage and caching for tokenauth services.
//!
//! This crate provides the collaborators behind client details resolution:
//! the durable [`ClientDetailsStore`](client::ClientDetailsStore) and the
//! region-scoped [`RegionCache`] that fronts it.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │           Token issuance / validation (callers)             │
//! ├─────────────────────────────────────────────────────────────┤
//! │       ClientDetailsResolver (tokenauth-common-authn)        │
//! │              cache probe → store probe → populate           │
//! ├──────────────────────────────┬──────────────────────────────┤
//! │   RegionCache                │   ClientDetailsStore         │
//! │   MokaRegionCache            │   MemoryClientDetailsStore   │
//! │   (in-process, per region)   │   (testing / development)    │
//! └──────────────────────────────┴──────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```
//! use tokenauth_common_storage::{
//!     CacheRegion, MokaRegionCache, RegionCache,
//!     client::{ClientDetails, ClientDetailsStore, MemoryClientDetailsStore},
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = MemoryClientDetailsStore::new();
//!     store.register(
//!         ClientDetails::builder()
//!             .client_id("web")
//!             .client_secret("web-secret".to_owned())
//!             .signing_secret("web-signing-secret".to_owned())
//!             .build(),
//!     );
//!
//!     let cache = MokaRegionCache::default();
//!     let region = CacheRegion::client_details();
//!
//!     if let Some(details) = store.find_by_client_id("web").await? {
//!         cache.put(&region, "web", details).await?;
//!     }
//!     assert!(cache.get(&region, "web").await?.is_some());
//!     Ok(())
//! }
//! ```
//!
//! # Error Handling
//!
//! Stores and caches report infrastructure failures as [`StorageError`].
//! An unknown client is `Ok(None)`, never an error.
//!
//! # Feature Flags
//!
//! - **`testutil`**: Enables the `testutil` module with sample records and counting/failing
//!   collaborator wrappers. Enable it in `[dev-dependencies]` for integration tests.

#![deny(unsafe_code)]

pub mod cache;
pub mod client;
pub mod error;
#[cfg(any(test, feature = "testutil"))]
pub mod testutil;
pub mod types;

pub use cache::{CacheConfig, CacheConfigBuilder, MokaRegionCache, RegionCache};
pub use error::{BoxError, ConfigError, StorageError, StorageResult};
pub use types::CacheRegion;
pub use zeroize::Zeroizing;
