use axum::Json;
use axum::extract::{Extension, Path, State};

use warden_core::UserIdentity;

use crate::dto::{EffectivePermissionsResponse, PermissionDecisionResponse};
use crate::error::ApiResult;
use crate::state::AppState;

/// GET /api/access/permissions/{permission_name} - Decide one permission for the caller.
///
/// Accepts a bare name or `category.name`.
pub async fn check_permission_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(permission_name): Path<String>,
) -> ApiResult<Json<PermissionDecisionResponse>> {
    let granted = state
        .access_gate
        .resolver()
        .resolve_permission(user.user_id(), &permission_name)
        .await?;

    Ok(Json(PermissionDecisionResponse {
        permission: permission_name,
        granted,
    }))
}

pub async fn effective_permissions_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
) -> ApiResult<Json<EffectivePermissionsResponse>> {
    let permissions = state
        .access_gate
        .resolver()
        .effective_permissions(user.user_id())
        .await?;

    Ok(Json(EffectivePermissionsResponse {
        permissions: permissions.into_iter().collect(),
    }))
}
