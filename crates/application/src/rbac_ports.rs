mod audit;
mod directory;
mod grants;
mod legacy;
mod permissions;
mod projects;
mod roles;

pub use audit::{AuditEvent, AuditRepository};
pub(crate) use audit::record_committed;
pub use directory::{
    AccountChanges, NewUserAccount, PasswordHasher, UserCredentials, UserDirectoryRepository,
};
pub use grants::{
    GrantRepository, RoleHolderView, RolePermissionGrantView, UpsertUserRoleGrant,
    UserRoleGrantView,
};
pub use legacy::LegacyAuthRepository;
pub use permissions::{CreatePermissionInput, PermissionRepository};
pub use projects::{ProjectRepository, SaveProjectInput};
pub use roles::{CreateRoleInput, RoleReassignment, RoleRepository, UpdateRoleInput};
