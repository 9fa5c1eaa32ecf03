//! Shared-secret JWT verification.

use std::fmt;

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use thiserror::Error;

use crate::auth::identity::VerifiedIdentity;
use crate::config::AuthConfig;

/// Payload fields the gateway reads. Everything else is ignored.
#[derive(Debug, Deserialize)]
struct GatewayClaims {
    #[serde(default)]
    user: serde_json::Value,
}

/// Why a presented token was rejected.
#[derive(Debug, Error)]
#[error("token verification failed: {0}")]
pub struct TokenError(#[from] jsonwebtoken::errors::Error);

impl TokenError {
    /// Short label for logs and metrics.
    pub fn reason(&self) -> &'static str {
        match self.0.kind() {
            ErrorKind::ExpiredSignature => "expired",
            ErrorKind::ImmatureSignature => "not_yet_valid",
            ErrorKind::InvalidIssuer => "issuer",
            ErrorKind::MissingRequiredClaim(_) => "missing_claim",
            ErrorKind::InvalidSignature => "signature",
            ErrorKind::InvalidAlgorithm => "algorithm",
            _ => "malformed",
        }
    }
}

/// HMAC token verifier bound to one secret and one issuer.
///
/// Stateless: the same token always yields the same result.
#[derive(Clone)]
pub struct TokenVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Do not print key material
        f.debug_struct("TokenVerifier")
            .field("validation", &self.validation)
            .finish()
    }
}

impl TokenVerifier {
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.algorithms = vec![Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];
        validation.set_issuer(&[config.issuer.as_str()]);
        // `exp` is checked when present but not required.
        validation.set_required_spec_claims(&["iss"]);
        validation.validate_nbf = true;
        validation.validate_aud = false;
        validation.leeway = config.leeway_secs;

        Self {
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
        }
    }

    /// Verify signature, issuer and time claims, then return the `user` claim.
    pub fn verify(&self, token: &str) -> Result<VerifiedIdentity, TokenError> {
        let data =
            jsonwebtoken::decode::<GatewayClaims>(token, &self.decoding_key, &self.validation)?;
        Ok(VerifiedIdentity::new(data.claims.user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde_json::json;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn now() -> u64 {
        SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs()
    }

    fn sign(claims: serde_json::Value, secret: &str) -> String {
        encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes())).unwrap()
    }

    fn verifier(secret: &str, issuer: &str) -> TokenVerifier {
        TokenVerifier::new(&AuthConfig::new(secret, issuer))
    }

    #[test]
    fn test_valid_token_yields_user_claim() {
        let user = json!({ "id": 1, "name": "John Doe", "role": "PDM" });
        let token = sign(json!({ "user": user, "iss": "I1" }), "S1");

        let identity = verifier("S1", "I1").verify(&token).unwrap();
        assert_eq!(identity.claims(), &user);
    }

    #[test]
    fn test_verification_is_repeatable() {
        let token = sign(json!({ "user": { "id": 7 }, "iss": "I1" }), "S1");
        let verifier = verifier("S1", "I1");

        let first = verifier.verify(&token).unwrap();
        let second = verifier.verify(&token).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_wrong_issuer() {
        let token = sign(json!({ "user": { "id": 1 }, "iss": "I1" }), "S1");
        let err = verifier("S1", "I2").verify(&token).unwrap_err();
        assert_eq!(err.reason(), "issuer");
    }

    #[test]
    fn test_missing_issuer() {
        let token = sign(json!({ "user": { "id": 1 } }), "S1");
        assert!(verifier("S1", "I1").verify(&token).is_err());
    }

    #[test]
    fn test_wrong_secret() {
        let token = sign(json!({ "user": { "id": 1 }, "iss": "I1" }), "S2");
        let err = verifier("S1", "I1").verify(&token).unwrap_err();
        assert_eq!(err.reason(), "signature");
    }

    #[test]
    fn test_expired() {
        let token = sign(json!({ "user": { "id": 1 }, "iss": "I1", "exp": now() - 120 }), "S1");
        let err = verifier("S1", "I1").verify(&token).unwrap_err();
        assert_eq!(err.reason(), "expired");
    }

    #[test]
    fn test_not_yet_valid() {
        let token = sign(json!({ "user": { "id": 1 }, "iss": "I1", "nbf": now() + 3600 }), "S1");
        assert!(verifier("S1", "I1").verify(&token).is_err());
    }

    #[test]
    fn test_future_expiry_accepted() {
        let token = sign(json!({ "user": { "id": 1 }, "iss": "I1", "exp": now() + 3600 }), "S1");
        assert!(verifier("S1", "I1").verify(&token).is_ok());
    }

    #[test]
    fn test_garbage() {
        let err = verifier("S1", "I1").verify("invalidtoken").unwrap_err();
        assert_eq!(err.reason(), "malformed");
    }

    #[test]
    fn test_missing_user_claim_is_null() {
        let token = sign(json!({ "iss": "I1" }), "S1");
        let identity = verifier("S1", "I1").verify(&token).unwrap();
        assert!(identity.claims().is_null());
    }
}
