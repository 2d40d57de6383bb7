use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;

use warden_application::{CreatePermissionInput, CreateRoleInput, UpdateRoleInput};
use warden_core::{AppResult, UserIdentity};
use warden_domain::{
    PermissionCategory, PermissionId, PermissionName, RoleColor, RoleId, RoleName,
};

use crate::dto::{
    CapabilityResponse, CreatePermissionRequest, CreateRoleRequest, GrantPermissionRequest,
    GrantPermissionResponse, MirrorStatusResponse, PermissionMutationResponse,
    PermissionResponse, RoleDeletionResponse, RoleHolderResponse, RoleMutationResponse,
    RoleResponse, RoleSyncResponse, SyncSummaryResponse, UpdateRoleRequest,
};
use crate::error::ApiResult;
use crate::state::AppState;

mod permissions;
mod roles;
mod sync;

pub use permissions::{
    create_permission_handler, grant_role_permission_handler, list_permission_categories_handler,
    list_permissions_handler, list_role_permissions_handler, revoke_role_permission_handler,
};
pub use roles::{
    create_role_handler, delete_role_handler, list_role_holders_handler, list_roles_handler,
    update_role_handler,
};
pub use sync::{sync_all_handler, sync_permission_handler, sync_role_handler};

fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

fn role_response(state: &AppState, role: warden_domain::Role) -> RoleResponse {
    let is_protected = state.grant_service.policy().is_protected(role.name.as_str());
    RoleResponse::new(role, is_protected)
}

fn create_role_input(payload: CreateRoleRequest) -> AppResult<CreateRoleInput> {
    Ok(CreateRoleInput {
        name: RoleName::new(payload.name)?,
        description: optional_text(payload.description),
        color: optional_text(payload.color)
            .map(RoleColor::new)
            .transpose()?
            .unwrap_or_default(),
        is_active: payload.is_active.unwrap_or(true),
    })
}

fn update_role_input(payload: UpdateRoleRequest) -> AppResult<UpdateRoleInput> {
    Ok(UpdateRoleInput {
        name: payload.name.map(RoleName::new).transpose()?,
        description: payload.description.map(optional_text),
        color: payload.color.map(RoleColor::new).transpose()?,
        is_active: payload.is_active,
    })
}

fn create_permission_input(payload: CreatePermissionRequest) -> AppResult<CreatePermissionInput> {
    Ok(CreatePermissionInput {
        name: PermissionName::new(payload.name)?,
        description: optional_text(payload.description),
        category: optional_text(payload.category)
            .map(PermissionCategory::new)
            .transpose()?,
        is_active: payload.is_active.unwrap_or(true),
    })
}
