use async_trait::async_trait;
use chrono::{DateTime, Utc};
use warden_core::{AppResult, UserId};
use warden_domain::{
    Permission, PermissionId, Role, RoleId, RolePermissionGrant, UserAccount, UserRoleGrant,
};

/// User→role grant joined with its role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRoleGrantView {
    /// Grant row.
    pub grant: UserRoleGrant,
    /// Granted role.
    pub role: Role,
}

/// Role→permission grant joined with its permission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RolePermissionGrantView {
    /// Grant row.
    pub grant: RolePermissionGrant,
    /// Granted permission.
    pub permission: Permission,
}

/// User→role grant joined with its grantee.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleHolderView {
    /// Grant row.
    pub grant: UserRoleGrant,
    /// Grantee account.
    pub user: UserAccount,
}

/// Insert-or-reactivate request for a user→role grant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpsertUserRoleGrant {
    /// Grantee.
    pub user_id: UserId,
    /// Granted role.
    pub role_id: RoleId,
    /// Granting actor.
    pub assigned_by: Option<UserId>,
    /// Optional end of validity.
    pub expires_at: Option<DateTime<Utc>>,
}

/// Repository port for grant rows.
///
/// Listing methods return rows regardless of activation or expiry; callers
/// decide effectiveness.
#[async_trait]
pub trait GrantRepository: Send + Sync {
    /// Lists every user→role grant of a user.
    async fn list_user_role_grants(&self, user_id: UserId) -> AppResult<Vec<UserRoleGrantView>>;

    /// Lists every user→role grant of a role.
    async fn list_role_holders(&self, role_id: RoleId) -> AppResult<Vec<RoleHolderView>>;

    /// Inserts or reactivates the (user, role) grant in one transaction.
    async fn upsert_user_role_grant(&self, input: UpsertUserRoleGrant) -> AppResult<UserRoleGrant>;

    /// Deactivates the (user, role) grant. Returns `false` when no active row existed.
    async fn deactivate_user_role_grant(&self, user_id: UserId, role_id: RoleId) -> AppResult<bool>;

    /// Lists every role→permission grant of a role.
    async fn list_role_permission_grants(
        &self,
        role_id: RoleId,
    ) -> AppResult<Vec<RolePermissionGrantView>>;

    /// Inserts or reactivates the (role, permission) grant in one transaction.
    async fn upsert_role_permission_grant(
        &self,
        role_id: RoleId,
        permission_id: PermissionId,
        granted_by: Option<UserId>,
    ) -> AppResult<RolePermissionGrant>;

    /// Deactivates the (role, permission) grant. Returns `false` when no active row existed.
    async fn deactivate_role_permission_grant(
        &self,
        role_id: RoleId,
        permission_id: PermissionId,
    ) -> AppResult<bool>;
}
