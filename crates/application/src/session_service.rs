//! Password login and the caller profile.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::info;
use warden_core::{AppError, AppResult, UserIdentity};
use warden_domain::UserAccount;

use crate::{EffectiveRoleGrant, PasswordHasher, PermissionResolver, UserDirectoryRepository};

const INVALID_CREDENTIALS: &str = "invalid username or password";

/// Authenticated caller with resolved roles and permissions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerProfile {
    /// Caller account.
    pub account: UserAccount,
    /// Effective role grants, newest first.
    pub roles: Vec<EffectiveRoleGrant>,
    /// Qualified names of effectively granted permissions.
    pub permissions: BTreeSet<String>,
}

/// Application service for session login.
#[derive(Clone)]
pub struct SessionService {
    users: Arc<dyn UserDirectoryRepository>,
    password_hasher: Arc<dyn PasswordHasher>,
    resolver: PermissionResolver,
}

impl SessionService {
    /// Creates a session service.
    #[must_use]
    pub fn new(
        users: Arc<dyn UserDirectoryRepository>,
        password_hasher: Arc<dyn PasswordHasher>,
        resolver: PermissionResolver,
    ) -> Self {
        Self {
            users,
            password_hasher,
            resolver,
        }
    }

    /// Verifies a username and password.
    ///
    /// Unknown users, inactive accounts and wrong passwords all fail with the
    /// same message.
    pub async fn authenticate(&self, username: &str, password: &str) -> AppResult<UserIdentity> {
        let credentials = self.users.find_credentials(username.trim()).await?;

        let Some(credentials) = credentials else {
            let _ = self.password_hasher.hash_password(password);
            return Err(AppError::Unauthenticated(INVALID_CREDENTIALS.to_owned()));
        };

        let Some(stored_hash) = credentials.password_hash.as_deref() else {
            let _ = self.password_hasher.hash_password(password);
            return Err(AppError::Unauthenticated(INVALID_CREDENTIALS.to_owned()));
        };

        let password_valid = self.password_hasher.verify_password(password, stored_hash)?;
        if !password_valid || !credentials.account.is_active {
            return Err(AppError::Unauthenticated(INVALID_CREDENTIALS.to_owned()));
        }

        info!(user_id = %credentials.account.id, "user logged in");
        Ok(UserIdentity::new(
            credentials.account.id,
            credentials.account.username.as_str(),
        ))
    }

    /// Builds the profile of an authenticated caller.
    ///
    /// Accounts deactivated after login are treated as signed out.
    pub async fn profile(&self, identity: &UserIdentity) -> AppResult<CallerProfile> {
        let account = self
            .resolver
            .find_account(identity.user_id())
            .await?
            .filter(|account| account.is_active)
            .ok_or_else(|| AppError::Unauthenticated("session is no longer valid".to_owned()))?;

        let roles = self.resolver.roles_for_account(&account).await?;
        let permissions = self.resolver.permissions_for_account(&account).await?;

        Ok(CallerProfile {
            account,
            roles,
            permissions,
        })
    }
}

#[cfg(test)]
mod tests;
