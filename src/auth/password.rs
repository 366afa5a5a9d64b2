/// Password Hashing and Verification
///
/// bcrypt hashing plus the async wrappers that keep the hashing work off
/// the request worker threads.

use bcrypt::{hash, verify};

use crate::error::AppError;

/// Hash a password using bcrypt at the given cost
pub fn hash_password(password: &str, cost: u32) -> Result<String, AppError> {
    hash(password, cost).map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))
}

/// Verify a password against its bcrypt hash
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
    verify(password, hash)
        .map_err(|e| AppError::Internal(format!("Password verification failed: {}", e)))
}

/// `hash_password` on the blocking thread pool
pub async fn hash_password_blocking(password: String, cost: u32) -> Result<String, AppError> {
    tokio::task::spawn_blocking(move || hash_password(&password, cost)).await?
}

/// `verify_password` on the blocking thread pool
pub async fn verify_password_blocking(password: String, hash: String) -> Result<bool, AppError> {
    tokio::task::spawn_blocking(move || verify_password(&password, &hash)).await?
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_COST: u32 = 4;

    #[test]
    fn test_hash_password() {
        let password = "password123";
        let hash = hash_password(password, TEST_COST).expect("Failed to hash password");

        assert_ne!(password, hash);
        assert!(hash.starts_with("$2"));
    }

    #[test]
    fn test_hash_encodes_cost() {
        let hash = hash_password("password123", 12).expect("Failed to hash password");
        assert!(hash.contains("$12$"));
    }

    #[test]
    fn test_same_password_different_salts() {
        let a = hash_password("password123", TEST_COST).unwrap();
        let b = hash_password("password123", TEST_COST).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_verify_password() {
        let hash = hash_password("password123", TEST_COST).unwrap();

        assert!(verify_password("password123", &hash).unwrap());
        assert!(!verify_password("password124", &hash).unwrap());
    }

    #[test]
    fn test_verify_against_malformed_hash() {
        assert!(verify_password("password123", "not-a-bcrypt-hash").is_err());
    }

    #[tokio::test]
    async fn test_blocking_wrappers() {
        let hash = hash_password_blocking("password123".to_string(), TEST_COST)
            .await
            .unwrap();
        let ok = verify_password_blocking("password123".to_string(), hash)
            .await
            .unwrap();
        assert!(ok);
    }
}
