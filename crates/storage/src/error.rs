//! Storage and configuration error types.
//!
//! [`StorageError`] is the infrastructure failure shared by every collaborator
//! in this crate: the client details store and the region cache both report
//! through it. A missing client is *not* an error at this layer; lookups
//! return `Ok(None)` instead.
//!
//! # Example
//!
//! ```
//! use tokenauth_common_storage::{StorageError, StorageResult};
//!
//! fn fetch_remote() -> StorageResult<Vec<u8>> {
//!     Err(StorageError::connection("client registry unreachable"))
//! }
//!
//! assert!(fetch_remote().unwrap_err().is_transient());
//! ```

use std::sync::Arc;

use thiserror::Error;

/// A shareable boxed error used to keep source chains intact.
pub type BoxError = Arc<dyn std::error::Error + Send + Sync>;

/// Result alias for store and cache operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Infrastructure failures raised by stores and caches.
///
/// # Non-exhaustive
///
/// New variants may be added in minor releases. Downstream matches need a
/// wildcard arm.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    /// A registration-side operation targeted a record that does not exist.
    ///
    /// Lookups never produce this variant.
    #[error("Record not found: {key}")]
    NotFound {
        /// Key of the missing record.
        key: String,
    },

    /// The backing service could not be reached.
    #[error("Connection error: {message}")]
    Connection {
        /// Description of the failure.
        message: String,
        /// Underlying cause, if any.
        #[source]
        source: Option<BoxError>,
    },

    /// A stored record could not be encoded or decoded.
    #[error("Serialization error: {message}")]
    Serialization {
        /// Description of the failure.
        message: String,
        /// Underlying cause, if any.
        #[source]
        source: Option<BoxError>,
    },

    /// Backend-specific failure that fits no other category.
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the failure.
        message: String,
        /// Underlying cause, if any.
        #[source]
        source: Option<BoxError>,
    },

    /// The operation exceeded its time limit.
    #[error("Operation timeout")]
    Timeout,
}

impl StorageError {
    /// Creates a `NotFound` error for the given key.
    #[must_use]
    pub fn not_found(key: impl Into<String>) -> Self {
        Self::NotFound { key: key.into() }
    }

    /// Creates a `Connection` error.
    #[must_use]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection { message: message.into(), source: None }
    }

    /// Creates a `Connection` error that wraps its cause.
    #[must_use]
    pub fn connection_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Connection { message: message.into(), source: Some(Arc::new(source)) }
    }

    /// Creates a `Serialization` error.
    #[must_use]
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization { message: message.into(), source: None }
    }

    /// Creates a `Serialization` error that wraps its cause.
    #[must_use]
    pub fn serialization_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Serialization { message: message.into(), source: Some(Arc::new(source)) }
    }

    /// Creates an `Internal` error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal { message: message.into(), source: None }
    }

    /// Creates a `Timeout` error.
    #[must_use]
    pub fn timeout() -> Self {
        Self::Timeout
    }

    /// Returns `true` for failures that may clear up on their own
    /// (connection loss, timeouts).
    ///
    /// Nothing in this workspace retries on its own; callers layering a retry
    /// policy on top can use this to decide.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Connection { .. } | Self::Timeout)
    }
}

/// Invalid configuration detected while building caches or resolvers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// A numeric or duration field is below its allowed minimum.
    #[error("{field} must be at least {min}, got {value}")]
    BelowMinimum {
        /// Name of the offending field.
        field: &'static str,
        /// The rejected value, rendered for display.
        value: String,
        /// The minimum accepted value, rendered for display.
        min: String,
    },

    /// A field has a value that is not accepted at all.
    #[error("invalid {field}: {reason}")]
    Invalid {
        /// Name of the offending field.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
}
