/// Authentication module
///
/// The credential & token authority and the pieces it is built from:
/// JWT codec, password hashing, refresh-token hashing and roles.

mod authority;
mod claims;
mod jwt;
mod password;
mod refresh_token;
mod role;

pub use authority::{AccountSummary, Authority, RegisterAccount, TokenPair, TokenValidation};
pub use claims::{Claims, IdentityClaims, Principal, TokenKind};
pub use jwt::TokenCodec;
pub use password::{hash_password, hash_password_blocking, verify_password};
pub use refresh_token::{hash_refresh_token, verify_refresh_token};
pub use role::Role;
