//! # Tokenauth Common Authentication
//!
//! Client details resolution for tokenauth services.
//!
//! This crate provides:
//! - **Client resolution**: cache-aside lookup of a client's configuration on every token issuance
//!   and validation
//! - **Configuration**: region name and eviction policy of the client details cache
//! - **Algorithm validation**: security checks for the algorithm a client is registered with
//! - **Signing keys**: `jsonwebtoken` keys derived from a resolved client
//!
//! ## Features
//!
//! - A missing or empty client id is rejected without touching the cache or the store
//! - Unknown clients are never cached, so a client registered later resolves on the next lookup
//! - Store and cache failures surface unchanged and are never reported as an unknown client
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use tokenauth_common_authn::{ClientDetailsResolver, ResolverConfig, keys::encoding_key};
//! use tokenauth_common_storage::client::MemoryClientDetailsStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(MemoryClientDetailsStore::new());
//! let resolver = ClientDetailsResolver::from_config(store, &ResolverConfig::default())?;
//!
//! let details = resolver.resolve(Some("billing-frontend")).await?;
//! let key = encoding_key(&details)?;
//! # let _ = key;
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

/// Resolver configuration.
pub mod config;
/// Authentication error types.
pub mod error;
/// Signing and verification keys derived from client details.
pub mod keys;
/// Cache-aside client details resolution.
pub mod resolver;
/// Shared test utilities for authentication testing.
#[cfg(any(test, feature = "testutil"))]
pub mod testutil;
/// Algorithm validation.
pub mod validation;

// Re-export key types for convenience
pub use config::ResolverConfig;
pub use error::{AuthError, Result};
pub use resolver::{ClientDetailsResolver, ResolverMetricsSnapshot};
pub use validation::{FORBIDDEN_ALGORITHMS, validate_algorithm};
