mod access;
mod auth;
mod common;
mod permissions;
mod projects;
mod roles;
mod users;

pub use access::{EffectivePermissionsResponse, PermissionDecisionResponse};
pub use auth::{AuthLoginRequest, CallerProfileResponse};
pub use common::{HealthResponse, MirrorStatusResponse, SyncSummaryResponse};
pub use permissions::{
    CapabilityResponse, CreatePermissionRequest, GrantPermissionRequest,
    GrantPermissionResponse, PermissionMutationResponse, PermissionResponse,
    RolePermissionGrantResponse,
};
pub use projects::{
    AssignProjectMemberRequest, ProjectAssignmentResponse, ProjectResponse, SaveProjectRequest,
};
pub use roles::{
    CreateRoleRequest, RoleDeletionResponse, RoleHolderResponse, RoleMutationResponse,
    RoleResponse, RoleSyncResponse, UpdateRoleRequest,
};
pub use users::{
    AssignRoleRequest, AssignRoleResponse, CreateUserRequest, CreateUserResponse,
    UpdateUserRequest, UpdateUserResponse, UserResponse, UserRoleGrantResponse, UserRoleResponse,
};

fn optional_timestamp(value: Option<chrono::DateTime<chrono::Utc>>) -> Option<String> {
    value.map(|timestamp| timestamp.to_rfc3339())
}
