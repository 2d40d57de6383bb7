//! Grant mutation operations.
//!
//! Each mutation persists through the repository ports first and then
//! updates the mirror. Mirror failures never undo or fail the primary
//! mutation; they are logged and reported through [`MirrorStatus`].

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};
use warden_core::{AppError, AppResult, UserId};
use warden_domain::{Role, RoleId, UserAccount};

use crate::{
    GrantRepository, MirrorStatus, MirrorSyncService, PasswordHasher, PermissionRepository,
    RbacPolicy, RoleRepository, UserDirectoryRepository,
};

mod permissions;
mod roles;
mod users;

/// Mutation result paired with the mirror outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationOutcome<T> {
    /// Primary mutation result.
    pub value: T,
    /// Best-effort mirror outcome.
    pub mirror: MirrorStatus,
}

/// Input payload for assigning a role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignRoleInput {
    /// Grantee.
    pub user_id: UserId,
    /// Role to assign.
    pub role_id: RoleId,
    /// Granting actor.
    pub assigned_by: Option<UserId>,
    /// Optional end of validity; must lie in the future.
    pub expires_at: Option<DateTime<Utc>>,
}

/// Input payload for creating a user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateUserInput {
    /// Login name.
    pub username: String,
    /// Optional contact email.
    pub email: Option<String>,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Optional employee number.
    pub employee_id: Option<String>,
    /// Job title.
    pub position: Option<String>,
    /// Organisational unit.
    pub department: Option<String>,
    /// Contact phone number.
    pub phone: Option<String>,
    /// Plaintext password.
    pub password: String,
    /// Staff override flag.
    pub is_staff: bool,
    /// Superuser override flag.
    pub is_superuser: bool,
    /// Requested initial role.
    pub role_id: Option<RoleId>,
}

/// Partial account update; `None` leaves a field unchanged.
///
/// For the optional text fields an empty string clears the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateUserInput {
    /// Login name.
    pub username: Option<String>,
    /// Contact email.
    pub email: Option<String>,
    /// Given name.
    pub first_name: Option<String>,
    /// Family name.
    pub last_name: Option<String>,
    /// Employee number.
    pub employee_id: Option<String>,
    /// Job title.
    pub position: Option<String>,
    /// Organisational unit.
    pub department: Option<String>,
    /// Contact phone number.
    pub phone: Option<String>,
    /// Whether the account may authenticate.
    pub is_active: Option<bool>,
    /// Staff override flag.
    pub is_staff: Option<bool>,
    /// Superuser override flag.
    pub is_superuser: Option<bool>,
}

/// Created account and the role it started with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedUser {
    /// New account.
    pub account: UserAccount,
    /// Initial role, if any active role could be assigned.
    pub role: Option<Role>,
}

/// Outcome of a role deletion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleDeletion {
    /// Deleted role.
    pub role_id: RoleId,
    /// Deleted role name.
    pub role_name: String,
    /// Role that received the holders, when any were reassigned.
    pub fallback_role_id: Option<RoleId>,
    /// Reassigned holders.
    pub reassigned_user_ids: Vec<UserId>,
}

/// Application service for grant mutations.
#[derive(Clone)]
pub struct GrantService {
    users: Arc<dyn UserDirectoryRepository>,
    roles: Arc<dyn RoleRepository>,
    permissions: Arc<dyn PermissionRepository>,
    grants: Arc<dyn GrantRepository>,
    password_hasher: Arc<dyn PasswordHasher>,
    mirror: MirrorSyncService,
    policy: RbacPolicy,
}

impl GrantService {
    /// Creates a grant service.
    #[must_use]
    pub fn new(
        users: Arc<dyn UserDirectoryRepository>,
        roles: Arc<dyn RoleRepository>,
        permissions: Arc<dyn PermissionRepository>,
        grants: Arc<dyn GrantRepository>,
        password_hasher: Arc<dyn PasswordHasher>,
        mirror: MirrorSyncService,
        policy: RbacPolicy,
    ) -> Self {
        Self {
            users,
            roles,
            permissions,
            grants,
            password_hasher,
            mirror,
            policy,
        }
    }

    /// Returns the role policy in use.
    #[must_use]
    pub fn policy(&self) -> &RbacPolicy {
        &self.policy
    }

    async fn require_role(&self, role_id: RoleId) -> AppResult<Role> {
        self.roles
            .find_role(role_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("role '{role_id}' does not exist")))
    }

    async fn require_active_role(&self, role_id: RoleId) -> AppResult<Role> {
        let role = self.require_role(role_id).await?;
        if !role.is_active {
            return Err(AppError::NotFound(format!(
                "role '{}' is not active",
                role.name.as_str()
            )));
        }

        Ok(role)
    }

    async fn require_user(&self, user_id: UserId) -> AppResult<UserAccount> {
        self.users
            .find_user(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user '{user_id}' does not exist")))
    }

    /// Loads a policy role, preferring the startup id and falling back to the name.
    ///
    /// Returns only active roles.
    async fn policy_role(
        &self,
        resolved: Option<RoleId>,
        role_name: &str,
    ) -> AppResult<Option<Role>> {
        let role = match resolved {
            Some(role_id) => self.roles.find_role(role_id).await?,
            None => None,
        };

        let role = match role {
            Some(role) => Some(role),
            None => self.roles.find_role_by_name(role_name).await?,
        };

        match role {
            Some(role) if role.is_active => Ok(Some(role)),
            Some(role) => {
                warn!(role = role.name.as_str(), "policy role is inactive");
                Ok(None)
            }
            None => Ok(None),
        }
    }

    fn log_mirror(operation: &str, status: &MirrorStatus) {
        if let MirrorStatus::Failed(reason) = status {
            warn!(operation, reason = reason.as_str(), "mirror update failed");
        } else {
            info!(operation, ?status, "mirror updated");
        }
    }
}

#[cfg(test)]
mod tests;
