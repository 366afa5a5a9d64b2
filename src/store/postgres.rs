/// PostgreSQL credential store
///
/// Tables are created by the migrations in `migrations/`. Unique constraints
/// on `accounts.employee_id`, `accounts.email` and `refresh_tokens.user_id`
/// back the store's invariants.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::{Account, CredentialStore, NewAccount};
use crate::auth::Role;
use crate::error::{AppError, DatabaseError};

const ACCOUNT_COLUMNS: &str =
    "id, employee_id, email, NULL::TEXT AS password_hash, role, department_id, is_active, created_at, updated_at";
const ACCOUNT_COLUMNS_WITH_HASH: &str =
    "id, employee_id, email, password_hash, role, department_id, is_active, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct AccountRow {
    id: Uuid,
    employee_id: String,
    email: String,
    password_hash: Option<String>,
    role: String,
    department_id: Option<i32>,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<AccountRow> for Account {
    type Error = AppError;

    fn try_from(row: AccountRow) -> Result<Self, Self::Error> {
        let role = row
            .role
            .parse::<Role>()
            .map_err(|e| AppError::Database(DatabaseError::UnexpectedError(e)))?;

        Ok(Account {
            id: row.id,
            employee_id: row.employee_id,
            email: row.email,
            password_hash: row.password_hash,
            role,
            department_id: row.department_id,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Clone)]
pub struct PgCredentialStore {
    pool: PgPool,
}

impl PgCredentialStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn find_account_by_employee_id(
        &self,
        employee_id: &str,
        include_password_hash: bool,
    ) -> Result<Option<Account>, AppError> {
        let columns = if include_password_hash {
            ACCOUNT_COLUMNS_WITH_HASH
        } else {
            ACCOUNT_COLUMNS
        };

        let row = sqlx::query_as::<_, AccountRow>(&format!(
            "SELECT {} FROM accounts WHERE employee_id = $1",
            columns
        ))
        .bind(employee_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Account::try_from).transpose()
    }

    async fn create_account(&self, account: NewAccount) -> Result<Account, AppError> {
        let now = Utc::now();

        let row = sqlx::query_as::<_, AccountRow>(&format!(
            r#"
            INSERT INTO accounts (id, employee_id, email, password_hash, role, department_id, is_active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, true, $7, $7)
            RETURNING {}
            "#,
            ACCOUNT_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(&account.employee_id)
        .bind(&account.email)
        .bind(&account.password_hash)
        .bind(account.role.as_str())
        .bind(account.department_id)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Account::try_from(row)
    }

    async fn find_account_by_id(&self, id: Uuid) -> Result<Option<Account>, AppError> {
        let row = sqlx::query_as::<_, AccountRow>(&format!(
            "SELECT {} FROM accounts WHERE id = $1",
            ACCOUNT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Account::try_from).transpose()
    }

    async fn find_accounts_by_department(&self, department_id: i32) -> Result<Vec<Account>, AppError> {
        let rows = sqlx::query_as::<_, AccountRow>(&format!(
            "SELECT {} FROM accounts WHERE department_id = $1 ORDER BY employee_id",
            ACCOUNT_COLUMNS
        ))
        .bind(department_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Account::try_from).collect()
    }

    async fn has_account_with_role(&self, role: Role) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM accounts WHERE role = $1)",
        )
        .bind(role.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn delete_refresh_token(&self, user_id: Uuid) -> Result<(), AppError> {
        sqlx::query("DELETE FROM refresh_tokens WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn store_refresh_token(&self, user_id: Uuid, token_hash: &str) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO refresh_tokens (id, user_id, token_hash, created_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(token_hash)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn rotate_refresh_token(&self, user_id: Uuid, token_hash: &str) -> Result<(), AppError> {
        // Single upsert: overlapping logins for one user serialize on the
        // user_id unique index instead of racing a delete against an insert.
        sqlx::query(
            r#"
            INSERT INTO refresh_tokens (id, user_id, token_hash, created_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id) DO UPDATE
            SET id = EXCLUDED.id,
                token_hash = EXCLUDED.token_hash,
                created_at = EXCLUDED.created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(token_hash)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        tracing::debug!(user_id = %user_id, "Refresh token rotated");
        Ok(())
    }
}
