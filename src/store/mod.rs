/// Credential store
///
/// Data access for accounts and refresh-token records. Implementations own
/// no policy; uniqueness of employee ID, email and per-user refresh tokens is
/// theirs to enforce.

mod memory;
mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::fmt;
use uuid::Uuid;

use crate::auth::Role;
use crate::error::AppError;

pub use memory::InMemoryCredentialStore;
pub use postgres::PgCredentialStore;

/// A stored employee account
#[derive(Clone)]
pub struct Account {
    pub id: Uuid,
    pub employee_id: String,
    pub email: String,
    /// Only populated when the lookup asked for it
    pub password_hash: Option<String>,
    pub role: Role,
    pub department_id: Option<i32>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Copy of the account without its password hash
    pub fn without_password(mut self) -> Self {
        self.password_hash = None;
        self
    }
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("id", &self.id)
            .field("employee_id", &self.employee_id)
            .field("email", &self.email)
            .field("password_hash", &self.password_hash.as_ref().map(|_| "<redacted>"))
            .field("role", &self.role)
            .field("department_id", &self.department_id)
            .field("is_active", &self.is_active)
            .finish()
    }
}

/// Input for account creation; the password is already hashed
#[derive(Clone)]
pub struct NewAccount {
    pub employee_id: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub department_id: Option<i32>,
}

/// The single live refresh token of a user
#[derive(Debug, Clone)]
pub struct RefreshTokenRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token_hash: String,
    pub created_at: DateTime<Utc>,
}

#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn find_account_by_employee_id(
        &self,
        employee_id: &str,
        include_password_hash: bool,
    ) -> Result<Option<Account>, AppError>;

    /// # Errors
    /// `AuthError::Conflict` when the employee ID or email is taken.
    async fn create_account(&self, account: NewAccount) -> Result<Account, AppError>;

    async fn find_account_by_id(&self, id: Uuid) -> Result<Option<Account>, AppError>;

    async fn find_accounts_by_department(&self, department_id: i32) -> Result<Vec<Account>, AppError>;

    async fn has_account_with_role(&self, role: Role) -> Result<bool, AppError>;

    /// No-op when the user has no refresh token.
    async fn delete_refresh_token(&self, user_id: Uuid) -> Result<(), AppError>;

    async fn store_refresh_token(&self, user_id: Uuid, token_hash: &str) -> Result<(), AppError>;

    /// Replace the user's refresh token. Must stay correct when two logins for
    /// the same user overlap; database adapters do it in one statement.
    async fn rotate_refresh_token(&self, user_id: Uuid, token_hash: &str) -> Result<(), AppError> {
        self.delete_refresh_token(user_id).await?;
        self.store_refresh_token(user_id, token_hash).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_password_hash() {
        let account = Account {
            id: Uuid::new_v4(),
            employee_id: "EMP001".to_string(),
            email: "emp@company.com".to_string(),
            password_hash: Some("$2b$04$secretsecretsecret".to_string()),
            role: Role::Employee,
            department_id: Some(1),
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let rendered = format!("{:?}", account);
        assert!(!rendered.contains("secretsecret"));
        assert!(rendered.contains("<redacted>"));
        assert!(account.without_password().password_hash.is_none());
    }
}
