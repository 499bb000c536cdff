use crate::error::AppError;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Claims encoded within an issued token.
///
/// Tokens carry no expiry: they stay valid until the matching entry is
/// removed from the holder's stored token list by logout. The issued-at
/// stamp keeps tokens from distinct logins distinct, so revoking one
/// session leaves the others alone.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject of the token: the user's unique identifier.
    pub sub: i32,
    /// Issued-at, seconds since epoch.
    pub iat: i64,
}

/// Signs and verifies session tokens with a process-wide secret.
///
/// The secret is injected at construction (from `Config`), never read from
/// the environment at call time.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenIssuer {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // No expiry claim is issued, so none is required or checked.
        validation.required_spec_claims.clear();
        validation.validate_exp = false;

        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Produces a signed opaque string encoding the user's identity.
    pub fn issue(&self, user_id: i32) -> Result<String, AppError> {
        let claims = Claims {
            sub: user_id,
            iat: chrono::Utc::now().timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| AppError::InternalServerError(format!("Failed to sign token: {}", e)))
    }

    /// Checks the signature and shape of a token and returns the user id it
    /// encodes. Fails with `Unauthorized` on a bad signature or malformed
    /// payload. Revocation is not checked here; callers must cross-check the
    /// stored token list.
    pub fn verify(&self, token: &str) -> Result<i32, AppError> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims.sub)
            .map_err(|e| AppError::Unauthorized(format!("Invalid token: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{decode, DecodingKey, Validation};

    fn lax_validation() -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.required_spec_claims.clear();
        validation.validate_exp = false;
        validation
    }

    #[test_log::test]
    fn test_issue_and_verify_roundtrip() {
        let issuer = TokenIssuer::new("test_secret_for_roundtrip");
        let user_id = 1;
        let token = issuer.issue(user_id).unwrap();
        assert_eq!(issuer.verify(&token).unwrap(), user_id);
    }

    #[test]
    fn test_tokens_carry_no_expiry() {
        let issuer = TokenIssuer::new("test_secret_no_expiry");
        let token = issuer.issue(7).unwrap();

        let claims = decode::<serde_json::Value>(
            &token,
            &DecodingKey::from_secret("test_secret_no_expiry".as_bytes()),
            &lax_validation(),
        )
        .unwrap()
        .claims;

        assert_eq!(claims["sub"], 7);
        assert!(claims.get("exp").is_none());
        assert!(claims["iat"].is_i64());
    }

    #[test]
    fn test_verify_rejects_foreign_signature() {
        let issuer = TokenIssuer::new("one_secret");
        let other = TokenIssuer::new("a_completely_different_secret");

        let token = issuer.issue(42).unwrap();

        match other.verify(&token) {
            Err(AppError::Unauthorized(msg)) => {
                assert!(msg.contains("Invalid token"));
            }
            Ok(_) => panic!("Token signed under another secret must not verify"),
            Err(e) => panic!("Unexpected error type: {:?}", e),
        }
    }

    #[test]
    fn test_verify_rejects_garbage() {
        let issuer = TokenIssuer::new("test_secret_garbage");

        match issuer.verify("not-even-a-token") {
            Err(AppError::Unauthorized(_)) => {}
            Ok(_) => panic!("Garbage must not verify"),
            Err(e) => panic!("Unexpected error type: {:?}", e),
        }
    }

    #[test]
    fn test_tampered_payload_fails() {
        let issuer = TokenIssuer::new("test_secret_tamper");
        let token = issuer.issue(3).unwrap();

        // Flip a character in the payload segment.
        let mut parts: Vec<String> = token.split('.').map(str::to_owned).collect();
        let mut payload: Vec<u8> = parts[1].clone().into_bytes();
        payload[0] = if payload[0] == b'A' { b'B' } else { b'A' };
        parts[1] = String::from_utf8(payload).unwrap();
        let tampered = parts.join(".");

        assert!(issuer.verify(&tampered).is_err());
    }
}
