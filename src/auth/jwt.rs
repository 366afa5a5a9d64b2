/// JWT Token Codec
///
/// Signs and verifies HS256 tokens. The codec holds the keys derived from the
/// configured secret; it has no other state.

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use crate::auth::claims::{Claims, IdentityClaims, TokenKind};
use crate::configuration::JwtSettings;
use crate::error::{AppError, AuthError, ConfigError};

#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    issuer: String,
}

impl TokenCodec {
    /// Build a codec from settings.
    ///
    /// # Errors
    /// Fails when the secret is empty, so a misconfigured process never starts.
    pub fn new(config: &JwtSettings) -> Result<Self, ConfigError> {
        if config.secret.trim().is_empty() {
            return Err(ConfigError::MissingRequired("jwt.secret".to_string()));
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&config.issuer]);
        validation.leeway = 0;

        Ok(Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
            issuer: config.issuer.clone(),
        })
    }

    /// Sign `identity` into a token of the given kind, valid for `expiry_seconds`.
    pub fn sign(
        &self,
        identity: &IdentityClaims,
        kind: TokenKind,
        expiry_seconds: i64,
    ) -> Result<String, AppError> {
        let claims = Claims::new(identity.clone(), kind, expiry_seconds, self.issuer.clone());

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))
    }

    /// Verify signature, issuer and expiry, returning the embedded claims.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!("JWT validation error: {}", e);
                AuthError::InvalidToken(format!("Invalid or expired token: {}", e))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::role::Role;
    use uuid::Uuid;

    fn get_test_config() -> JwtSettings {
        JwtSettings {
            secret: "test-secret-key-at-least-32-characters-long".to_string(),
            access_token_expiry: 900,
            refresh_token_expiry: 604800,
            issuer: "test".to_string(),
        }
    }

    fn identity() -> IdentityClaims {
        IdentityClaims {
            sub: Uuid::new_v4().to_string(),
            employee_id: "EMP100".to_string(),
            email: "emp100@company.com".to_string(),
            role: Role::Hod,
            department_id: Some(7),
            is_active: true,
        }
    }

    #[test]
    fn test_sign_and_verify_round_trip() {
        let codec = TokenCodec::new(&get_test_config()).unwrap();
        let identity = identity();

        let token = codec.sign(&identity, TokenKind::Access, 900).expect("Failed to sign");
        let claims = codec.verify(&token).expect("Failed to verify");

        assert_eq!(claims.identity, identity);
        assert_eq!(claims.typ, TokenKind::Access);
        assert_eq!(claims.iss, "test");
        assert_eq!(token.split('.').count(), 3);
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let codec = TokenCodec::new(&get_test_config()).unwrap();
        let token = codec.sign(&identity(), TokenKind::Access, -5).unwrap();

        assert!(matches!(codec.verify(&token), Err(AuthError::InvalidToken(_))));
    }

    #[test]
    fn test_token_expires_after_its_window() {
        let codec = TokenCodec::new(&get_test_config()).unwrap();
        let token = codec.sign(&identity(), TokenKind::Access, 1).unwrap();

        assert!(codec.verify(&token).is_ok());
        std::thread::sleep(std::time::Duration::from_millis(2100));
        assert!(codec.verify(&token).is_err());
    }

    #[test]
    fn test_malformed_token() {
        let codec = TokenCodec::new(&get_test_config()).unwrap();
        assert!(codec.verify("invalid.token.here").is_err());
        assert!(codec.verify("").is_err());
    }

    #[test]
    fn test_tampered_token() {
        let codec = TokenCodec::new(&get_test_config()).unwrap();
        let token = codec.sign(&identity(), TokenKind::Access, 900).unwrap();

        let tampered = format!("{}X", token);
        assert!(codec.verify(&tampered).is_err());
    }

    #[test]
    fn test_wrong_secret() {
        let codec = TokenCodec::new(&get_test_config()).unwrap();
        let token = codec.sign(&identity(), TokenKind::Access, 900).unwrap();

        let mut other = get_test_config();
        other.secret = "another-secret-entirely-different-0123".to_string();
        let other_codec = TokenCodec::new(&other).unwrap();

        assert!(other_codec.verify(&token).is_err());
    }

    #[test]
    fn test_wrong_issuer() {
        let codec = TokenCodec::new(&get_test_config()).unwrap();
        let token = codec.sign(&identity(), TokenKind::Access, 900).unwrap();

        let mut config = get_test_config();
        config.issuer = "wrong-issuer".to_string();
        let other_codec = TokenCodec::new(&config).unwrap();

        assert!(other_codec.verify(&token).is_err());
    }

    #[test]
    fn test_empty_secret_fails_construction() {
        let mut config = get_test_config();
        config.secret = String::new();
        assert!(TokenCodec::new(&config).is_err());
    }
}
