//! Durable lookup of registered client configuration.
//!
//! [`ClientDetailsStore`] is the source of truth for client details. Caches
//! sit in front of it but never hold anything it did not return.

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::{
    client::ClientDetails,
    error::{StorageError, StorageResult},
};

/// Read access to the client registry.
///
/// # Returns
///
/// - `Ok(Some(details))` when the client is registered
/// - `Ok(None)` when it is not; absence is never reported as an error
/// - `Err(...)` only for infrastructure failures
///
/// Implementations perform no retries. Retry and timeout policy belong to the
/// caller or to the transport underneath.
#[async_trait]
pub trait ClientDetailsStore: Send + Sync {
    /// Looks up the configuration registered for `client_id`.
    async fn find_by_client_id(&self, client_id: &str) -> StorageResult<Option<ClientDetails>>;
}

/// In-memory [`ClientDetailsStore`] for tests and local development.
///
/// Cloning shares the underlying map, so a test can keep one handle for
/// registration while the resolver reads through another.
///
/// # Examples
///
/// ```
/// use tokenauth_common_storage::client::{
///     ClientDetails, ClientDetailsStore, MemoryClientDetailsStore,
/// };
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = MemoryClientDetailsStore::new();
///     store.register(
///         ClientDetails::builder()
///             .client_id("web")
///             .client_secret("web-secret".to_owned())
///             .signing_secret("web-signing-secret".to_owned())
///             .build(),
///     );
///
///     assert!(store.find_by_client_id("web").await?.is_some());
///     assert!(store.find_by_client_id("mobile").await?.is_none());
///     Ok(())
/// }
/// ```
#[derive(Debug, Default, Clone)]
pub struct MemoryClientDetailsStore {
    clients: Arc<RwLock<HashMap<String, ClientDetails>>>,
}

impl MemoryClientDetailsStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the record for `details.client_id`.
    ///
    /// Returns the previous record, if any.
    #[tracing::instrument(skip(self, details), fields(client_id = %details.client_id))]
    pub fn register(&self, details: ClientDetails) -> Option<ClientDetails> {
        self.clients.write().insert(details.client_id.clone(), details)
    }

    /// Removes the record for `client_id`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NotFound`] if no such client is registered.
    #[tracing::instrument(skip(self))]
    pub fn deregister(&self, client_id: &str) -> StorageResult<ClientDetails> {
        self.clients.write().remove(client_id).ok_or_else(|| StorageError::not_found(client_id))
    }

    /// Returns the number of registered clients.
    #[must_use]
    pub fn len(&self) -> usize {
        self.clients.read().len()
    }

    /// Returns `true` if no client is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clients.read().is_empty()
    }
}

#[async_trait]
impl ClientDetailsStore for MemoryClientDetailsStore {
    #[tracing::instrument(skip(self))]
    async fn find_by_client_id(&self, client_id: &str) -> StorageResult<Option<ClientDetails>> {
        Ok(self.clients.read().get(client_id).cloned())
    }
}
