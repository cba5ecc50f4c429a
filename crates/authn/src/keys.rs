//! Signing material derived from a resolved client.
//!
//! The token issuer signs with an [`EncodingKey`] and the validator verifies
//! with a [`DecodingKey`]; both come from the client's [`ClientDetails`].
//! Signing and verification themselves happen in the caller.
//!
//! # Key Material
//!
//! | Algorithm family | `signing_secret`      | `verification_key`   |
//! |------------------|-----------------------|----------------------|
//! | `HS*`            | shared secret (bytes) | unused               |
//! | `RS*` / `PS*`    | RSA private key PEM   | RSA public key PEM   |
//! | `ES*`            | EC private key PEM    | EC public key PEM    |
//! | `EdDSA`          | Ed25519 private PEM   | Ed25519 public PEM   |

use jsonwebtoken::{DecodingKey, EncodingKey};
use tokenauth_common_storage::client::{ClientDetails, SignatureAlgorithm};

use crate::{error::AuthError, validation::min_hmac_secret_len};

/// Builds the key a token issuer signs this client's tokens with.
///
/// # Errors
///
/// Returns [`AuthError::InvalidSigningKey`] if an HMAC secret is shorter than
/// the digest size or a PEM key cannot be parsed.
pub fn encoding_key(details: &ClientDetails) -> Result<EncodingKey, AuthError> {
    let material = details.signing_secret.as_bytes();

    let key = match details.signature_algorithm {
        SignatureAlgorithm::HS256 | SignatureAlgorithm::HS384 | SignatureAlgorithm::HS512 => {
            check_hmac_secret(details)?;
            return Ok(EncodingKey::from_secret(material));
        },
        SignatureAlgorithm::RS256
        | SignatureAlgorithm::RS384
        | SignatureAlgorithm::RS512
        | SignatureAlgorithm::PS256
        | SignatureAlgorithm::PS384
        | SignatureAlgorithm::PS512 => EncodingKey::from_rsa_pem(material),
        SignatureAlgorithm::ES256 | SignatureAlgorithm::ES384 => EncodingKey::from_ec_pem(material),
        SignatureAlgorithm::EdDSA => EncodingKey::from_ed_pem(material),
    };
    key.map_err(|e| pem_error(details, "signing", &e))
}

/// Builds the key a validator checks this client's tokens with.
///
/// # Errors
///
/// Returns [`AuthError::InvalidSigningKey`] if an HMAC secret is too short,
/// an asymmetric client has no `verification_key`, or the PEM cannot be
/// parsed.
pub fn decoding_key(details: &ClientDetails) -> Result<DecodingKey, AuthError> {
    let key = match details.signature_algorithm {
        SignatureAlgorithm::HS256 | SignatureAlgorithm::HS384 | SignatureAlgorithm::HS512 => {
            check_hmac_secret(details)?;
            return Ok(DecodingKey::from_secret(details.signing_secret.as_bytes()));
        },
        SignatureAlgorithm::RS256
        | SignatureAlgorithm::RS384
        | SignatureAlgorithm::RS512
        | SignatureAlgorithm::PS256
        | SignatureAlgorithm::PS384
        | SignatureAlgorithm::PS512 => DecodingKey::from_rsa_pem(public_pem(details)?),
        SignatureAlgorithm::ES256 | SignatureAlgorithm::ES384 => {
            DecodingKey::from_ec_pem(public_pem(details)?)
        },
        SignatureAlgorithm::EdDSA => DecodingKey::from_ed_pem(public_pem(details)?),
    };
    key.map_err(|e| pem_error(details, "verification", &e))
}

fn public_pem(details: &ClientDetails) -> Result<&[u8], AuthError> {
    details.verification_key.as_deref().map(str::as_bytes).ok_or_else(|| {
        AuthError::invalid_signing_key(format!(
            "client '{}' uses {} but has no verification key",
            details.client_id, details.signature_algorithm
        ))
    })
}

fn check_hmac_secret(details: &ClientDetails) -> Result<(), AuthError> {
    let alg = details.signature_algorithm;
    let len = details.signing_secret.len();
    match min_hmac_secret_len(alg) {
        Some(min) if len < min => Err(AuthError::invalid_signing_key(format!(
            "client '{}' has a {len}-byte secret, {alg} requires at least {min}",
            details.client_id
        ))),
        _ => Ok(()),
    }
}

fn pem_error(details: &ClientDetails, which: &str, err: &jsonwebtoken::errors::Error) -> AuthError {
    AuthError::invalid_signing_key(format!(
        "client '{}' has an unreadable {which} key for {}: {err}",
        details.client_id, details.signature_algorithm
    ))
}
