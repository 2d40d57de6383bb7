//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod grant;
mod mirror;
mod permission;
mod project;
mod role;
mod security;
mod user;

pub use grant::{GrantId, RolePermissionGrant, UserRoleGrant};
pub use mirror::{LegacyCapability, LegacyCapabilityId, LegacyGroup, LegacyGroupId};
pub use permission::{
    PERMISSION_CATEGORY_MAX_LENGTH, PERMISSION_NAME_MAX_LENGTH, Permission, PermissionCategory,
    PermissionId, PermissionName, PermissionRef,
};
pub use project::{
    PROJECT_NAME_MAX_LENGTH, Project, ProjectAssignment, ProjectId, validate_project_name,
};
pub use role::{
    DEFAULT_ROLE_COLOR, LEGACY_GROUP_PREFIX, ROLE_NAME_MAX_LENGTH, Role, RoleColor, RoleId,
    RoleName, legacy_group_name_for,
};
pub use security::{AdminPermission, AuditAction};
pub use user::{
    EMPLOYEE_ID_MAX_LENGTH, EmailAddress, EmployeeId, PASSWORD_MAX_LENGTH, PASSWORD_MIN_LENGTH,
    USERNAME_MAX_LENGTH, UserAccount, Username, validate_password,
};
