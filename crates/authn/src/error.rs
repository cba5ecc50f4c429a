//! Authentication error types.
//!
//! [`AuthError::ClientNotFound`] is the single decision the resolver makes on
//! its own: the presented identifier does not belong to a registered client.
//! Infrastructure failures from the store or cache travel through
//! [`AuthError::Storage`] untouched, so callers can answer "deny" and
//! "service unavailable" differently.

use thiserror::Error;
use tokenauth_common_storage::StorageError;

/// Authentication errors.
///
/// # Non-exhaustive
///
/// This enum is marked `#[non_exhaustive]`; new variants may be added in
/// future minor releases. Downstream match expressions must include a
/// wildcard arm (`_ =>`).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AuthError {
    /// No registered client matches the presented identifier, or no
    /// identifier was presented at all.
    #[error("Client not found: {}", .client_id.as_deref().unwrap_or("<none>"))]
    ClientNotFound {
        /// The identifier that was looked up, `None` when it was missing.
        client_id: Option<String>,
    },

    /// The store or cache failed. The inner error is passed through as-is.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// The client's configured algorithm is not accepted.
    #[error("Unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// The client's signing material cannot be turned into a key.
    #[error("Invalid signing key: {0}")]
    InvalidSigningKey(String),
}

impl AuthError {
    /// Creates a `ClientNotFound` error.
    #[must_use]
    pub fn client_not_found(client_id: Option<&str>) -> Self {
        Self::ClientNotFound { client_id: client_id.map(str::to_owned) }
    }

    /// Creates an `UnsupportedAlgorithm` error.
    #[must_use]
    pub fn unsupported_algorithm(message: impl Into<String>) -> Self {
        Self::UnsupportedAlgorithm(message.into())
    }

    /// Creates an `InvalidSigningKey` error.
    #[must_use]
    pub fn invalid_signing_key(message: impl Into<String>) -> Self {
        Self::InvalidSigningKey(message.into())
    }

    /// Returns `true` if the request must be rejected because the client is
    /// unknown.
    #[must_use]
    pub fn is_client_not_found(&self) -> bool {
        matches!(self, Self::ClientNotFound { .. })
    }

    /// Returns `true` for store or cache failures. These say nothing about
    /// the client and must not be reported as an authentication decision.
    #[must_use]
    pub fn is_infrastructure(&self) -> bool {
        matches!(self, Self::Storage(_))
    }
}

/// Result type alias for authentication operations.
pub type Result<T> = std::result::Result<T, AuthError>;
