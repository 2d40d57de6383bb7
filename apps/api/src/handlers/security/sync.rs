use super::*;

pub async fn sync_role_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(role_id): Path<String>,
) -> ApiResult<Json<RoleSyncResponse>> {
    let report = state
        .security_admin_service
        .sync_role(&user, RoleId::parse(&role_id)?)
        .await?;

    Ok(Json(RoleSyncResponse::from(report)))
}

pub async fn sync_permission_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(permission_id): Path<String>,
) -> ApiResult<Json<CapabilityResponse>> {
    let capability = state
        .security_admin_service
        .sync_permission(&user, PermissionId::parse(&permission_id)?)
        .await?;

    Ok(Json(CapabilityResponse::from(capability)))
}

pub async fn sync_all_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
) -> ApiResult<Json<SyncSummaryResponse>> {
    let summary = state.security_admin_service.sync_all(&user).await?;

    Ok(Json(SyncSummaryResponse::from(summary)))
}
