//! Application services and ports.

#![forbid(unsafe_code)]

mod access_gate;
mod bootstrap_service;
mod grant_service;
mod mirror_sync_service;
mod permission_resolver;
mod project_service;
mod rbac_policy;
mod rbac_ports;
mod security_admin_service;
mod session_service;
mod user_admin_service;

#[cfg(test)]
mod test_support;

pub use access_gate::{AccessGate, OwnedResource};
pub use bootstrap_service::{
    BootstrapReport, BootstrapService, DEFAULT_PERMISSIONS, DEFAULT_ROLES, PermissionSeed,
    RoleSeed,
};
pub use grant_service::{
    AssignRoleInput, CreateUserInput, CreatedUser, GrantService, MutationOutcome, RoleDeletion,
    UpdateUserInput,
};
pub use mirror_sync_service::{MirrorStatus, MirrorSyncService, RoleSyncReport, SyncSummary};
pub use permission_resolver::{EffectiveRoleGrant, PermissionResolver};
pub use project_service::ProjectService;
pub use rbac_policy::{
    DEFAULT_PROTECTED_ROLE_NAMES, DEFAULT_ROLE_NAME, RbacPolicy, RbacPolicySettings,
};
pub use rbac_ports::{
    AccountChanges, AuditEvent, AuditRepository, CreatePermissionInput, CreateRoleInput,
    GrantRepository, LegacyAuthRepository, NewUserAccount, PasswordHasher, PermissionRepository,
    ProjectRepository, RoleHolderView, RolePermissionGrantView, RoleReassignment, RoleRepository,
    SaveProjectInput, UpdateRoleInput, UpsertUserRoleGrant, UserCredentials,
    UserDirectoryRepository, UserRoleGrantView,
};
pub(crate) use rbac_ports::record_committed;
pub use security_admin_service::{RoleHolder, SecurityAdminService};
pub use session_service::{CallerProfile, SessionService};
pub use user_admin_service::UserAdminService;
