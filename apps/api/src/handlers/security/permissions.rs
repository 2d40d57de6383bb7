use super::*;

pub async fn list_permissions_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
) -> ApiResult<Json<Vec<PermissionResponse>>> {
    let permissions = state
        .security_admin_service
        .list_permissions(&user)
        .await?
        .into_iter()
        .map(PermissionResponse::from)
        .collect();

    Ok(Json(permissions))
}

pub async fn list_permission_categories_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
) -> ApiResult<Json<Vec<String>>> {
    let categories = state
        .security_admin_service
        .list_permission_categories(&user)
        .await?;

    Ok(Json(categories))
}

pub async fn create_permission_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Json(payload): Json<CreatePermissionRequest>,
) -> ApiResult<(StatusCode, Json<PermissionMutationResponse>)> {
    let outcome = state
        .security_admin_service
        .create_permission(&user, create_permission_input(payload)?)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(PermissionMutationResponse::from(outcome)),
    ))
}

pub async fn list_role_permissions_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(role_id): Path<String>,
) -> ApiResult<Json<Vec<PermissionResponse>>> {
    let permissions = state
        .security_admin_service
        .list_role_permissions(&user, RoleId::parse(&role_id)?)
        .await?
        .into_iter()
        .map(PermissionResponse::from)
        .collect();

    Ok(Json(permissions))
}

pub async fn grant_role_permission_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(role_id): Path<String>,
    Json(payload): Json<GrantPermissionRequest>,
) -> ApiResult<(StatusCode, Json<GrantPermissionResponse>)> {
    let outcome = state
        .security_admin_service
        .grant_permission(
            &user,
            RoleId::parse(&role_id)?,
            PermissionId::parse(&payload.permission_id)?,
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(GrantPermissionResponse::from(outcome)),
    ))
}

pub async fn revoke_role_permission_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path((role_id, permission_id)): Path<(String, String)>,
) -> ApiResult<Json<MirrorStatusResponse>> {
    let outcome = state
        .security_admin_service
        .revoke_permission(
            &user,
            RoleId::parse(&role_id)?,
            PermissionId::parse(&permission_id)?,
        )
        .await?;

    Ok(Json(MirrorStatusResponse::from(outcome.mirror)))
}
