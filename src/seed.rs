/// First-boot seed of the default HR account
///
/// Without an HR account nobody can register users, so a fresh database
/// gets one with the configured credentials.

use crate::auth::{hash_password_blocking, Role};
use crate::configuration::SeedSettings;
use crate::error::{AppError, AuthError};
use crate::store::{CredentialStore, NewAccount};

/// Create the default HR account unless one already exists.
///
/// Returns whether an account was created.
pub async fn seed_default_hr(
    store: &dyn CredentialStore,
    seed: &SeedSettings,
    hash_cost: u32,
) -> Result<bool, AppError> {
    if !seed.enabled {
        tracing::debug!("HR seed disabled");
        return Ok(false);
    }

    if store.has_account_with_role(Role::Hr).await? {
        tracing::info!("HR user already exists, skipping seed");
        return Ok(false);
    }

    let password_hash = hash_password_blocking(seed.password.clone(), hash_cost).await?;
    let result = store
        .create_account(NewAccount {
            employee_id: seed.employee_id.clone(),
            email: seed.email.clone(),
            password_hash,
            role: Role::Hr,
            department_id: None,
        })
        .await;

    match result {
        Ok(account) => {
            tracing::warn!(
                user_id = %account.id,
                employee_id = %account.employee_id,
                "Seeded default HR user; change its password"
            );
            Ok(true)
        }
        Err(AppError::Auth(AuthError::Conflict(reason))) => {
            tracing::warn!(reason = %reason, "Could not seed default HR user");
            Ok(false)
        }
        Err(e) => Err(e),
    }
}
