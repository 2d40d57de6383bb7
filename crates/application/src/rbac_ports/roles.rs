use async_trait::async_trait;
use warden_core::{AppResult, UserId};
use warden_domain::{LegacyGroupId, Role, RoleColor, RoleId, RoleName};

/// Input payload for creating roles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateRoleInput {
    /// Unique role name.
    pub name: RoleName,
    /// Optional description.
    pub description: Option<String>,
    /// Badge color.
    pub color: RoleColor,
    /// Activation flag.
    pub is_active: bool,
}

/// Partial update for a role; `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateRoleInput {
    /// New unique name.
    pub name: Option<RoleName>,
    /// New description; `Some(None)` clears it.
    pub description: Option<Option<String>>,
    /// New badge color.
    pub color: Option<RoleColor>,
    /// New activation flag.
    pub is_active: Option<bool>,
}

/// Fallback role receiving the holders of a deleted role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleReassignment {
    /// Role receiving the holders.
    pub fallback_role_id: RoleId,
    /// Actor recorded as `assigned_by` on the fallback grants.
    pub assigned_by: Option<UserId>,
}

/// Repository port for roles.
#[async_trait]
pub trait RoleRepository: Send + Sync {
    /// Finds a role by identifier.
    async fn find_role(&self, role_id: RoleId) -> AppResult<Option<Role>>;

    /// Finds a role by exact name.
    async fn find_role_by_name(&self, name: &str) -> AppResult<Option<Role>>;

    /// Lists all roles ordered by name.
    async fn list_roles(&self) -> AppResult<Vec<Role>>;

    /// Creates a role. Duplicate names are conflicts.
    async fn create_role(&self, input: CreateRoleInput) -> AppResult<Role>;

    /// Applies a partial update.
    async fn update_role(&self, role_id: RoleId, input: UpdateRoleInput) -> AppResult<Role>;

    /// Stores the link to the role's mirror group.
    async fn link_legacy_group(&self, role_id: RoleId, group_id: LegacyGroupId) -> AppResult<()>;

    /// Moves the effective holders onto the fallback role and deletes the
    /// role in one transaction, returning the reassigned users.
    ///
    /// Holders are read inside the transaction. When holders exist the
    /// fallback must be given and still active, otherwise nothing is
    /// written and the call fails with `Configuration`. Grants of the
    /// deleted role cascade away with it.
    async fn delete_role(
        &self,
        role_id: RoleId,
        reassignment: Option<RoleReassignment>,
    ) -> AppResult<Vec<UserId>>;
}
