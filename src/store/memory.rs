/// In-memory credential store
///
/// Backs tests and local runs without Postgres. Uniqueness rules match the
/// database schema.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

use super::{Account, CredentialStore, NewAccount, RefreshTokenRecord};
use crate::auth::Role;
use crate::error::{AppError, AuthError};

#[derive(Default)]
struct Tables {
    accounts: HashMap<Uuid, Account>,
    // keyed by user id: one live token per user
    refresh_tokens: HashMap<Uuid, RefreshTokenRecord>,
}

#[derive(Default)]
pub struct InMemoryCredentialStore {
    tables: Mutex<Tables>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>, AppError> {
        self.tables
            .lock()
            .map_err(|_| AppError::Internal("credential store lock poisoned".to_string()))
    }

    /// Current refresh-token record of a user
    pub fn refresh_token_for(&self, user_id: Uuid) -> Option<RefreshTokenRecord> {
        self.lock().ok()?.refresh_tokens.get(&user_id).cloned()
    }

    pub fn refresh_token_count(&self) -> usize {
        self.lock().map(|t| t.refresh_tokens.len()).unwrap_or(0)
    }

    /// Flip an account's active flag, standing in for the admin tooling that
    /// owns deactivation.
    pub fn set_active(&self, user_id: Uuid, is_active: bool) -> Result<(), AppError> {
        let mut tables = self.lock()?;
        let account = tables
            .accounts
            .get_mut(&user_id)
            .ok_or_else(|| AppError::Internal(format!("no account {}", user_id)))?;
        account.is_active = is_active;
        account.updated_at = Utc::now();
        Ok(())
    }
}

fn project(account: &Account, include_password_hash: bool) -> Account {
    if include_password_hash {
        account.clone()
    } else {
        account.clone().without_password()
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn find_account_by_employee_id(
        &self,
        employee_id: &str,
        include_password_hash: bool,
    ) -> Result<Option<Account>, AppError> {
        let tables = self.lock()?;
        Ok(tables
            .accounts
            .values()
            .find(|a| a.employee_id == employee_id)
            .map(|a| project(a, include_password_hash)))
    }

    async fn create_account(&self, account: NewAccount) -> Result<Account, AppError> {
        let mut tables = self.lock()?;

        if tables.accounts.values().any(|a| a.employee_id == account.employee_id) {
            return Err(AuthError::Conflict("Employee ID already exists".to_string()).into());
        }
        if tables.accounts.values().any(|a| a.email == account.email) {
            return Err(AuthError::Conflict("Email already exists".to_string()).into());
        }

        let now = Utc::now();
        let created = Account {
            id: Uuid::new_v4(),
            employee_id: account.employee_id,
            email: account.email,
            password_hash: Some(account.password_hash),
            role: account.role,
            department_id: account.department_id,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        tables.accounts.insert(created.id, created.clone());

        Ok(created.without_password())
    }

    async fn find_account_by_id(&self, id: Uuid) -> Result<Option<Account>, AppError> {
        let tables = self.lock()?;
        Ok(tables.accounts.get(&id).map(|a| project(a, false)))
    }

    async fn find_accounts_by_department(&self, department_id: i32) -> Result<Vec<Account>, AppError> {
        let tables = self.lock()?;
        let mut accounts: Vec<Account> = tables
            .accounts
            .values()
            .filter(|a| a.department_id == Some(department_id))
            .map(|a| project(a, false))
            .collect();
        accounts.sort_by(|a, b| a.employee_id.cmp(&b.employee_id));
        Ok(accounts)
    }

    async fn has_account_with_role(&self, role: Role) -> Result<bool, AppError> {
        let tables = self.lock()?;
        Ok(tables.accounts.values().any(|a| a.role == role))
    }

    async fn delete_refresh_token(&self, user_id: Uuid) -> Result<(), AppError> {
        self.lock()?.refresh_tokens.remove(&user_id);
        Ok(())
    }

    async fn store_refresh_token(&self, user_id: Uuid, token_hash: &str) -> Result<(), AppError> {
        let mut tables = self.lock()?;
        if tables.refresh_tokens.contains_key(&user_id) {
            return Err(AuthError::Conflict("Refresh token already stored for user".to_string()).into());
        }
        tables.refresh_tokens.insert(
            user_id,
            RefreshTokenRecord {
                id: Uuid::new_v4(),
                user_id,
                token_hash: token_hash.to_string(),
                created_at: Utc::now(),
            },
        );
        Ok(())
    }

    async fn rotate_refresh_token(&self, user_id: Uuid, token_hash: &str) -> Result<(), AppError> {
        // single lock for delete + insert
        let mut tables = self.lock()?;
        tables.refresh_tokens.remove(&user_id);
        tables.refresh_tokens.insert(
            user_id,
            RefreshTokenRecord {
                id: Uuid::new_v4(),
                user_id,
                token_hash: token_hash.to_string(),
                created_at: Utc::now(),
            },
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_account(employee_id: &str, email: &str) -> NewAccount {
        NewAccount {
            employee_id: employee_id.to_string(),
            email: email.to_string(),
            password_hash: "$2b$04$hash".to_string(),
            role: Role::Employee,
            department_id: Some(2),
        }
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let store = InMemoryCredentialStore::new();
        let created = store.create_account(new_account("EMP1", "a@x.com")).await.unwrap();

        assert!(created.password_hash.is_none());
        assert!(created.is_active);

        let with_hash = store.find_account_by_employee_id("EMP1", true).await.unwrap().unwrap();
        assert_eq!(with_hash.password_hash.as_deref(), Some("$2b$04$hash"));

        let without = store.find_account_by_employee_id("EMP1", false).await.unwrap().unwrap();
        assert!(without.password_hash.is_none());

        let by_id = store.find_account_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(by_id.employee_id, "EMP1");

        assert!(store.find_account_by_employee_id("EMP2", true).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_employee_id_and_email() {
        let store = InMemoryCredentialStore::new();
        store.create_account(new_account("EMP1", "a@x.com")).await.unwrap();

        let err = store.create_account(new_account("EMP1", "b@x.com")).await.unwrap_err();
        assert!(matches!(err.as_auth(), Some(AuthError::Conflict(_))));

        let err = store.create_account(new_account("EMP2", "a@x.com")).await.unwrap_err();
        assert!(matches!(err.as_auth(), Some(AuthError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_refresh_token_rotation() {
        let store = InMemoryCredentialStore::new();
        let user_id = Uuid::new_v4();

        store.delete_refresh_token(user_id).await.unwrap();
        store.store_refresh_token(user_id, "first").await.unwrap();
        assert!(store.store_refresh_token(user_id, "second").await.is_err());

        store.rotate_refresh_token(user_id, "second").await.unwrap();
        assert_eq!(store.refresh_token_count(), 1);
        assert_eq!(store.refresh_token_for(user_id).unwrap().token_hash, "second");
    }

    #[tokio::test]
    async fn test_department_and_role_queries() {
        let store = InMemoryCredentialStore::new();
        store.create_account(new_account("EMP2", "b@x.com")).await.unwrap();
        store.create_account(new_account("EMP1", "a@x.com")).await.unwrap();

        let roster = store.find_accounts_by_department(2).await.unwrap();
        assert_eq!(
            roster.iter().map(|a| a.employee_id.as_str()).collect::<Vec<_>>(),
            vec!["EMP1", "EMP2"]
        );
        assert!(store.find_accounts_by_department(9).await.unwrap().is_empty());

        assert!(store.has_account_with_role(Role::Employee).await.unwrap());
        assert!(!store.has_account_with_role(Role::Hr).await.unwrap());
    }
}
