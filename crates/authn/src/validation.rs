//! Signature algorithm policy for registered clients.
//!
//! Client records name their algorithm with a JOSE `alg` string. These checks
//! run before a resolved client's configuration is handed to the token
//! issuer, so an algorithm the issuer cannot honor is rejected up front.

use jsonwebtoken::Algorithm;
use tokenauth_common_storage::client::SignatureAlgorithm;

use crate::error::AuthError;

/// Algorithms that are never accepted, whatever a client record says.
///
/// `none` disables signature verification entirely.
pub const FORBIDDEN_ALGORITHMS: &[&str] = &["none"];

/// Validates an algorithm name against the accepted set.
///
/// # Errors
///
/// Returns [`AuthError::UnsupportedAlgorithm`] if the name is forbidden or is
/// not one of [`SignatureAlgorithm::ALL`]. Names are case-sensitive.
///
/// # Examples
///
/// ```
/// use tokenauth_common_authn::validation::validate_algorithm;
/// use tokenauth_common_storage::client::SignatureAlgorithm;
///
/// assert_eq!(validate_algorithm("HS512").ok(), Some(SignatureAlgorithm::HS512));
/// assert!(validate_algorithm("none").is_err());
/// assert!(validate_algorithm("hs512").is_err());
/// ```
pub fn validate_algorithm(alg: &str) -> Result<SignatureAlgorithm, AuthError> {
    if FORBIDDEN_ALGORITHMS.contains(&alg) {
        return Err(AuthError::unsupported_algorithm(format!(
            "Algorithm '{alg}' is not allowed for security reasons"
        )));
    }

    alg.parse().map_err(|_| {
        AuthError::unsupported_algorithm(format!("Algorithm '{alg}' is not in accepted list"))
    })
}

/// Maps a client's algorithm onto the `jsonwebtoken` equivalent.
#[must_use]
pub fn jwt_algorithm(alg: SignatureAlgorithm) -> Algorithm {
    match alg {
        SignatureAlgorithm::HS256 => Algorithm::HS256,
        SignatureAlgorithm::HS384 => Algorithm::HS384,
        SignatureAlgorithm::HS512 => Algorithm::HS512,
        SignatureAlgorithm::RS256 => Algorithm::RS256,
        SignatureAlgorithm::RS384 => Algorithm::RS384,
        SignatureAlgorithm::RS512 => Algorithm::RS512,
        SignatureAlgorithm::PS256 => Algorithm::PS256,
        SignatureAlgorithm::PS384 => Algorithm::PS384,
        SignatureAlgorithm::PS512 => Algorithm::PS512,
        SignatureAlgorithm::ES256 => Algorithm::ES256,
        SignatureAlgorithm::ES384 => Algorithm::ES384,
        SignatureAlgorithm::EdDSA => Algorithm::EdDSA,
    }
}

/// Minimum HMAC secret length in bytes: the digest size of the hash.
#[must_use]
pub fn min_hmac_secret_len(alg: SignatureAlgorithm) -> Option<usize> {
    match alg {
        SignatureAlgorithm::HS256 => Some(32),
        SignatureAlgorithm::HS384 => Some(48),
        SignatureAlgorithm::HS512 => Some(64),
        _ => None,
    }
}
