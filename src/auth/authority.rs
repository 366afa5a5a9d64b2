/// Credential & Token Authority
///
/// Login, HR-gated registration, token issuance with refresh-token rotation,
/// and token validation against the current account state.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::claims::{IdentityClaims, Principal, TokenKind};
use crate::auth::jwt::TokenCodec;
use crate::auth::password::{hash_password, hash_password_blocking, verify_password_blocking};
use crate::auth::refresh_token::hash_refresh_token;
use crate::auth::role::Role;
use crate::configuration::{JwtSettings, PasswordSettings};
use crate::error::{AppError, AuthError, DatabaseError};
use crate::store::{Account, CredentialStore, NewAccount};

// Only ever compared against when no account matched; never a real password.
const DUMMY_PASSWORD: &str = "timing-equalizer-not-a-password";

/// Access and refresh token issued together
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    /// Access token lifetime in seconds
    pub expires_in: i64,
}

/// A new account as requested by HR
#[derive(Clone)]
pub struct RegisterAccount {
    pub employee_id: String,
    pub email: String,
    pub password: String,
    pub role: Role,
    pub department_id: Option<i32>,
}

/// Outcome of a token validation request
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct TokenValidation {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<Principal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl TokenValidation {
    pub fn valid(user: Principal) -> Self {
        Self {
            valid: true,
            user: Some(user),
            reason: None,
        }
    }

    pub fn invalid(reason: impl Into<String>) -> Self {
        Self {
            valid: false,
            user: None,
            reason: Some(reason.into()),
        }
    }
}

/// Public view of an account
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct AccountSummary {
    pub id: Uuid,
    pub employee_id: String,
    pub email: String,
    pub role: Role,
    pub department_id: Option<i32>,
    pub is_active: bool,
    pub created_at: String,
}

impl From<Account> for AccountSummary {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            employee_id: account.employee_id,
            email: account.email,
            role: account.role,
            department_id: account.department_id,
            is_active: account.is_active,
            created_at: account.created_at.to_rfc3339(),
        }
    }
}

impl From<&Account> for Principal {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id,
            employee_id: account.employee_id.clone(),
            email: account.email.clone(),
            role: account.role,
            department_id: account.department_id,
        }
    }
}

impl From<&Account> for IdentityClaims {
    fn from(account: &Account) -> Self {
        Self {
            sub: account.id.to_string(),
            employee_id: account.employee_id.clone(),
            email: account.email.clone(),
            role: account.role,
            department_id: account.department_id,
            is_active: account.is_active,
        }
    }
}

pub struct Authority {
    store: Arc<dyn CredentialStore>,
    codec: TokenCodec,
    access_token_expiry: i64,
    refresh_token_expiry: i64,
    hash_cost: u32,
    dummy_hash: String,
}

impl Authority {
    /// Build the authority from its collaborators.
    ///
    /// # Errors
    /// Returns a config error for an empty signing secret or an unusable
    /// bcrypt cost.
    pub fn new(
        store: Arc<dyn CredentialStore>,
        jwt: &JwtSettings,
        password: &PasswordSettings,
    ) -> Result<Self, AppError> {
        jwt.validate()?;
        password.validate()?;
        let codec = TokenCodec::new(jwt)?;
        // same cost as real hashes so a miss costs as much as a mismatch
        let dummy_hash = hash_password(DUMMY_PASSWORD, password.hash_cost)?;

        Ok(Self {
            store,
            codec,
            access_token_expiry: jwt.access_token_expiry,
            refresh_token_expiry: jwt.refresh_token_expiry,
            hash_cost: password.hash_cost,
            dummy_hash,
        })
    }

    /// Authenticate an employee and issue a fresh token pair.
    ///
    /// The password is always checked against some bcrypt hash, and the
    /// active flag is only consulted once the password matched.
    ///
    /// # Errors
    /// - `InvalidCredentials`: unknown employee ID or wrong password
    /// - `AccountDeactivated`: correct password, inactive account
    pub async fn login(&self, employee_id: &str, password: &str) -> Result<TokenPair, AppError> {
        let account = self
            .store
            .find_account_by_employee_id(employee_id, true)
            .await?;

        let hash = account
            .as_ref()
            .and_then(|a| a.password_hash.clone())
            .unwrap_or_else(|| self.dummy_hash.clone());
        let password_matches = verify_password_blocking(password.to_string(), hash).await?;

        let account = match account {
            Some(account) if password_matches => account,
            _ => {
                tracing::info!(employee_id = %employee_id, "Login rejected");
                return Err(AuthError::InvalidCredentials.into());
            }
        };

        if !account.is_active {
            tracing::info!(user_id = %account.id, "Login attempt on deactivated account");
            return Err(AuthError::AccountDeactivated.into());
        }

        let tokens = self.issue_tokens(&account).await?;

        tracing::info!(
            user_id = %account.id,
            employee_id = %account.employee_id,
            "User logged in successfully"
        );
        Ok(tokens)
    }

    /// Provision a new account on behalf of `acting` and issue its tokens.
    ///
    /// # Errors
    /// - `Forbidden`: acting principal is not HR, or a HOD/Employee account
    ///   has no department
    /// - `Conflict`: employee ID or email already taken
    pub async fn register(
        &self,
        new_account: RegisterAccount,
        acting: &Principal,
    ) -> Result<TokenPair, AppError> {
        if !acting.role.can_register_accounts() {
            tracing::warn!(user_id = %acting.id, role = %acting.role, "Registration attempt by non-HR principal");
            return Err(AuthError::Forbidden("Only HR can register users".to_string()).into());
        }

        match (new_account.role, new_account.department_id) {
            (Role::Hod, None) => {
                return Err(
                    AuthError::Forbidden("HOD must be assigned to a department".to_string()).into(),
                )
            }
            (Role::Employee, None) => {
                return Err(AuthError::Forbidden(
                    "Employee must be assigned to a department".to_string(),
                )
                .into())
            }
            _ => {}
        }

        if self
            .store
            .find_account_by_employee_id(&new_account.employee_id, false)
            .await?
            .is_some()
        {
            return Err(AuthError::Conflict("Employee ID already exists".to_string()).into());
        }

        let password_hash = hash_password_blocking(new_account.password, self.hash_cost).await?;
        let department_id = if new_account.role.requires_department() {
            new_account.department_id
        } else {
            None
        };

        let account = self
            .store
            .create_account(NewAccount {
                employee_id: new_account.employee_id,
                email: new_account.email,
                password_hash,
                role: new_account.role,
                department_id,
            })
            .await?;

        let tokens = self.issue_tokens(&account).await?;

        tracing::info!(
            user_id = %account.id,
            employee_id = %account.employee_id,
            role = %account.role,
            registered_by = %acting.id,
            "User registered successfully"
        );
        Ok(tokens)
    }

    /// Resolve an access token to the principal it belongs to.
    ///
    /// The account is re-read on every call, so a deactivation takes effect
    /// before the token expires.
    pub async fn authenticate(&self, token: &str) -> Result<Principal, AppError> {
        let claims = self.codec.verify(token)?;

        if claims.typ != TokenKind::Access {
            return Err(AuthError::InvalidToken("Refresh token cannot be used here".to_string()).into());
        }

        let user_id = claims.user_id()?;
        let account = self.store.find_account_by_id(user_id).await?;

        match account {
            Some(account) if account.is_active => Ok(Principal::from(&account)),
            _ => Err(AuthError::InvalidToken("Invalid or inactive user".to_string()).into()),
        }
    }

    /// Validate a token, reporting routine failures as `valid: false`.
    ///
    /// # Errors
    /// Only store failures are returned as errors.
    pub async fn validate_token(&self, token: &str) -> Result<TokenValidation, AppError> {
        match self.authenticate(token).await {
            Ok(principal) => Ok(TokenValidation::valid(principal)),
            Err(AppError::Auth(e)) => Ok(TokenValidation::invalid(e.to_string())),
            Err(e) => Err(e),
        }
    }

    /// Accounts in a department, visible to HR and HOD principals
    pub async fn accounts_in_department(
        &self,
        acting: &Principal,
        department_id: i32,
    ) -> Result<Vec<AccountSummary>, AppError> {
        if !acting.role.can_view_department_roster() {
            return Err(AuthError::Forbidden(
                "Only HR and HOD can view users by department".to_string(),
            )
            .into());
        }

        let accounts = self.store.find_accounts_by_department(department_id).await?;
        Ok(accounts.into_iter().map(AccountSummary::from).collect())
    }

    pub async fn account_by_employee_id(&self, employee_id: &str) -> Result<AccountSummary, AppError> {
        self.store
            .find_account_by_employee_id(employee_id, false)
            .await?
            .map(AccountSummary::from)
            .ok_or_else(|| {
                AppError::Database(DatabaseError::NotFound(format!(
                    "employee {}",
                    employee_id
                )))
            })
    }

    /// Mint both tokens and replace the stored refresh-token hash.
    async fn issue_tokens(&self, account: &Account) -> Result<TokenPair, AppError> {
        let identity = IdentityClaims::from(account);

        let access_token = self
            .codec
            .sign(&identity, TokenKind::Access, self.access_token_expiry)?;
        let refresh_token = self
            .codec
            .sign(&identity, TokenKind::Refresh, self.refresh_token_expiry)?;

        self.store
            .rotate_refresh_token(account.id, &hash_refresh_token(&refresh_token))
            .await?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            token_type: "Bearer".to_string(),
            expires_in: self.access_token_expiry,
        })
    }
}
