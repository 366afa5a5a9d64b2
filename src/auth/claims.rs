/// JWT Claims structure
///
/// Every token carries the account's identity (`IdentityClaims`) plus the
/// registered claims (RFC 7519) and the kind of token it is.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::role::Role;
use crate::error::AuthError;

/// Identity of the account a token was issued to
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct IdentityClaims {
    /// Subject (account ID as UUID string)
    pub sub: String,
    pub employee_id: String,
    pub email: String,
    pub role: Role,
    pub department_id: Option<i32>,
    pub is_active: bool,
}

/// Distinguishes access tokens from refresh tokens
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// Full claim set of a signed token
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    #[serde(flatten)]
    pub identity: IdentityClaims,
    /// Token kind
    pub typ: TokenKind,
    /// Unique token ID, keeps two tokens minted in the same second distinct
    pub jti: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    pub iss: String,
}

impl Claims {
    /// Create new claims expiring `expiry_seconds` from now
    pub fn new(
        identity: IdentityClaims,
        typ: TokenKind,
        expiry_seconds: i64,
        issuer: String,
    ) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            identity,
            typ,
            jti: Uuid::new_v4().to_string(),
            exp: now + expiry_seconds,
            iat: now,
            iss: issuer,
        }
    }

    /// Extract the account ID from the subject
    pub fn user_id(&self) -> Result<Uuid, AuthError> {
        Uuid::parse_str(&self.identity.sub)
            .map_err(|_| AuthError::InvalidToken("Invalid subject in token".to_string()))
    }
}

/// Normalized identity of an authenticated caller
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    pub id: Uuid,
    pub employee_id: String,
    pub email: String,
    pub role: Role,
    pub department_id: Option<i32>,
}
