use serde::{Deserialize, Serialize};

/// Capabilities the administrative services require from callers.
///
/// These are ordinary permission rows; the enum only pins their names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdminPermission {
    /// Create, edit and list user accounts.
    UserManagement,
    /// Manage roles, permissions and grants.
    RoleManagement,
    /// Create, edit, delete and staff projects.
    ProjectManagement,
}

impl AdminPermission {
    /// Returns the permission name checked by the resolver.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UserManagement => "user_management",
            Self::RoleManagement => "role_management",
            Self::ProjectManagement => "project_management",
        }
    }

    /// Returns all administrative permissions.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[AdminPermission] = &[
            AdminPermission::UserManagement,
            AdminPermission::RoleManagement,
            AdminPermission::ProjectManagement,
        ];

        ALL
    }
}

/// Stable audit actions emitted by application use-cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// Emitted when a user account is created.
    UserCreated,
    /// Emitted when user account attributes change.
    UserUpdated,
    /// Emitted when a user account is deleted.
    UserDeleted,
    /// Emitted when a role is created.
    RoleCreated,
    /// Emitted when role attributes change.
    RoleUpdated,
    /// Emitted when a role is deleted.
    RoleDeleted,
    /// Emitted when a role is assigned to a user.
    RoleAssigned,
    /// Emitted when a role is revoked from a user.
    RoleRevoked,
    /// Emitted when a permission is created.
    PermissionCreated,
    /// Emitted when a permission is granted to a role.
    PermissionGranted,
    /// Emitted when a permission is revoked from a role.
    PermissionRevoked,
    /// Emitted when the mirror is re-synced by an administrator.
    MirrorSynced,
    /// Emitted when the default catalog is seeded.
    CatalogSeeded,
    /// Emitted when a project is created.
    ProjectCreated,
    /// Emitted when a project is updated.
    ProjectUpdated,
    /// Emitted when a project is deleted.
    ProjectDeleted,
    /// Emitted when a user is assigned to a project.
    ProjectMemberAssigned,
    /// Emitted when a user is removed from a project.
    ProjectMemberRemoved,
}

impl AuditAction {
    /// Returns a stable storage value for this action.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UserCreated => "user.created",
            Self::UserUpdated => "user.updated",
            Self::UserDeleted => "user.deleted",
            Self::RoleCreated => "role.created",
            Self::RoleUpdated => "role.updated",
            Self::RoleDeleted => "role.deleted",
            Self::RoleAssigned => "role.assigned",
            Self::RoleRevoked => "role.revoked",
            Self::PermissionCreated => "permission.created",
            Self::PermissionGranted => "permission.granted",
            Self::PermissionRevoked => "permission.revoked",
            Self::MirrorSynced => "mirror.synced",
            Self::CatalogSeeded => "catalog.seeded",
            Self::ProjectCreated => "project.created",
            Self::ProjectUpdated => "project.updated",
            Self::ProjectDeleted => "project.deleted",
            Self::ProjectMemberAssigned => "project.member_assigned",
            Self::ProjectMemberRemoved => "project.member_removed",
        }
    }
}
