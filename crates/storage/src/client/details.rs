//! Registered client configuration.

use std::{fmt, str::FromStr, time::Duration};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use zeroize::Zeroizing;

/// Default lifetime of access tokens issued to a client (15 minutes).
pub const DEFAULT_ACCESS_TOKEN_VALIDITY: Duration = Duration::from_secs(900);

/// Default lifetime of refresh tokens issued to a client (1 day).
pub const DEFAULT_REFRESH_TOKEN_VALIDITY: Duration = Duration::from_secs(86_400);

/// Default payload key under which role information is placed in tokens.
pub const DEFAULT_ROLES_CLAIM: &str = "roles";

/// JOSE signature algorithm a client's tokens are signed with.
///
/// Serialized using the JOSE `alg` names (`"HS512"`, `"RS256"`, ...).
#[allow(clippy::upper_case_acronyms)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignatureAlgorithm {
    /// HMAC using SHA-256.
    HS256,
    /// HMAC using SHA-384.
    HS384,
    /// HMAC using SHA-512.
    #[default]
    HS512,
    /// RSASSA-PKCS1-v1_5 using SHA-256.
    RS256,
    /// RSASSA-PKCS1-v1_5 using SHA-384.
    RS384,
    /// RSASSA-PKCS1-v1_5 using SHA-512.
    RS512,
    /// RSASSA-PSS using SHA-256.
    PS256,
    /// RSASSA-PSS using SHA-384.
    PS384,
    /// RSASSA-PSS using SHA-512.
    PS512,
    /// ECDSA using P-256 and SHA-256.
    ES256,
    /// ECDSA using P-384 and SHA-384.
    ES384,
    /// Ed25519.
    EdDSA,
}

impl SignatureAlgorithm {
    /// Every supported algorithm, in declaration order.
    pub const ALL: [Self; 12] = [
        Self::HS256,
        Self::HS384,
        Self::HS512,
        Self::RS256,
        Self::RS384,
        Self::RS512,
        Self::PS256,
        Self::PS384,
        Self::PS512,
        Self::ES256,
        Self::ES384,
        Self::EdDSA,
    ];

    /// Returns the JOSE `alg` name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::HS256 => "HS256",
            Self::HS384 => "HS384",
            Self::HS512 => "HS512",
            Self::RS256 => "RS256",
            Self::RS384 => "RS384",
            Self::RS512 => "RS512",
            Self::PS256 => "PS256",
            Self::PS384 => "PS384",
            Self::PS512 => "PS512",
            Self::ES256 => "ES256",
            Self::ES384 => "ES384",
            Self::EdDSA => "EdDSA",
        }
    }

    /// Returns `true` for HMAC algorithms, whose signing secret is shared
    /// between issuer and validator.
    #[must_use]
    pub fn is_symmetric(self) -> bool {
        matches!(self, Self::HS256 | Self::HS384 | Self::HS512)
    }
}

impl fmt::Display for SignatureAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when parsing an unknown algorithm name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown signature algorithm: {0}")]
pub struct UnknownAlgorithm(pub String);

impl FromStr for SignatureAlgorithm {
    type Err = UnknownAlgorithm;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|alg| alg.as_str() == s)
            .ok_or_else(|| UnknownAlgorithm(s.to_owned()))
    }
}

/// Configuration of one registered client.
///
/// Everything token issuance and validation needs to know about a client:
/// the signing parameters, token lifetimes and the scopes it may request.
/// Records are written by the registration process; this workspace only
/// reads them.
///
/// # Secrets
///
/// `client_secret` and `signing_secret` are wrapped in [`Zeroizing`] so the
/// material is scrubbed on drop, and are redacted from the `Debug` output.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use tokenauth_common_storage::client::{ClientDetails, SignatureAlgorithm};
///
/// let details = ClientDetails::builder()
///     .client_id("billing-frontend")
///     .client_secret("s3cr3t".to_owned())
///     .signing_secret("an-hmac-secret-of-reasonable-length".to_owned())
///     .access_token_validity(Duration::from_secs(300))
///     .scopes(vec!["read".to_owned()])
///     .build();
///
/// assert_eq!(details.signature_algorithm, SignatureAlgorithm::HS512);
/// assert_eq!(details.roles_claim, "roles");
/// assert!(!format!("{details:?}").contains("s3cr3t"));
/// ```
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, bon::Builder)]
#[serde(deny_unknown_fields)]
pub struct ClientDetails {
    /// Unique identifier the client presents.
    #[builder(into)]
    pub client_id: String,

    /// Secret the client authenticates with.
    #[builder(into)]
    pub client_secret: Zeroizing<String>,

    /// Algorithm used to sign this client's tokens.
    #[builder(default)]
    #[serde(default)]
    pub signature_algorithm: SignatureAlgorithm,

    /// HMAC secret or PEM-encoded private key used to sign this client's
    /// tokens.
    #[builder(into)]
    pub signing_secret: Zeroizing<String>,

    /// PEM-encoded public key for asymmetric algorithms. Unused for HMAC,
    /// where `signing_secret` also verifies.
    #[serde(default)]
    pub verification_key: Option<String>,

    /// Lifetime of access tokens.
    #[builder(default = DEFAULT_ACCESS_TOKEN_VALIDITY)]
    #[serde(with = "humantime_serde", default = "default_access_token_validity")]
    pub access_token_validity: Duration,

    /// Lifetime of refresh tokens.
    #[builder(default = DEFAULT_REFRESH_TOKEN_VALIDITY)]
    #[serde(with = "humantime_serde", default = "default_refresh_token_validity")]
    pub refresh_token_validity: Duration,

    /// Scopes the client is allowed to request.
    #[builder(default)]
    #[serde(default)]
    pub scopes: Vec<String>,

    /// Token payload key carrying role information.
    #[builder(into, default = DEFAULT_ROLES_CLAIM.to_owned())]
    #[serde(default = "default_roles_claim")]
    pub roles_claim: String,
}

fn default_access_token_validity() -> Duration {
    DEFAULT_ACCESS_TOKEN_VALIDITY
}

fn default_refresh_token_validity() -> Duration {
    DEFAULT_REFRESH_TOKEN_VALIDITY
}

fn default_roles_claim() -> String {
    DEFAULT_ROLES_CLAIM.to_owned()
}

impl ClientDetails {
    /// Returns `true` if the client may request `scope`.
    #[must_use]
    pub fn allows_scope(&self, scope: &str) -> bool {
        self.scopes.iter().any(|s| s == scope)
    }
}

impl fmt::Debug for ClientDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientDetails")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("signature_algorithm", &self.signature_algorithm)
            .field("signing_secret", &"<redacted>")
            .field("verification_key", &self.verification_key.as_ref().map(|_| "<pem>"))
            .field("access_token_validity", &self.access_token_validity)
            .field("refresh_token_validity", &self.refresh_token_validity)
            .field("scopes", &self.scopes)
            .field("roles_claim", &self.roles_claim)
            .finish()
    }
}
