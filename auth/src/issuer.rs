use crate::jwt::AccessClaims;
use crate::jwt::JwtError;
use crate::jwt::JwtHandler;

/// Issuer of short-lived, stateless access tokens.
///
/// Mints signed bearer credentials bound to a subject email with a fixed
/// lifetime. Nothing is stored: validity is checked purely by signature and
/// expiry claim wherever the token is presented.
pub struct AccessTokenIssuer {
    jwt_handler: JwtHandler,
    lifetime_minutes: i64,
}

impl AccessTokenIssuer {
    /// Create a new issuer.
    ///
    /// # Arguments
    /// * `secret` - Secret key for JWT signing
    /// * `lifetime_minutes` - Lifetime applied to every issued token
    pub fn new(secret: &[u8], lifetime_minutes: i64) -> Self {
        Self {
            jwt_handler: JwtHandler::new(secret),
            lifetime_minutes,
        }
    }

    /// Issue a signed access token for a subject.
    ///
    /// # Errors
    /// * `EncodingFailed` - Token signing failed
    pub fn issue(&self, subject_email: &str) -> Result<String, JwtError> {
        let claims = AccessClaims::for_subject(subject_email, self.lifetime_minutes);
        self.jwt_handler.encode(&claims)
    }

    /// Validate a token and return its claims.
    ///
    /// # Errors
    /// * `TokenExpired` - The token's lifetime has elapsed
    /// * `DecodingFailed` - Signature is invalid or the token is malformed
    pub fn decode(&self, token: &str) -> Result<AccessClaims, JwtError> {
        self.jwt_handler.decode(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_and_decode() {
        let issuer = AccessTokenIssuer::new(b"test_secret_key_at_least_32_bytes!", 15);

        let token = issuer
            .issue("alice@example.com")
            .expect("Failed to issue token");

        let claims = issuer.decode(&token).expect("Failed to decode token");
        assert_eq!(claims.sub, "alice@example.com");
        assert_eq!(claims.exp - claims.iat, 15 * 60);
    }

    #[test]
    fn test_decode_with_wrong_secret() {
        let issuer1 = AccessTokenIssuer::new(b"secret1_at_least_32_bytes_long_key!", 15);
        let issuer2 = AccessTokenIssuer::new(b"secret2_at_least_32_bytes_long_key!", 15);

        let token = issuer1
            .issue("alice@example.com")
            .expect("Failed to issue token");

        assert!(issuer2.decode(&token).is_err());
    }
}
