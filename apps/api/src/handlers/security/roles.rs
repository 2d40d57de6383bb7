use super::*;

pub async fn list_roles_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
) -> ApiResult<Json<Vec<RoleResponse>>> {
    let roles = state
        .security_admin_service
        .list_roles(&user)
        .await?
        .into_iter()
        .map(|role| role_response(&state, role))
        .collect();

    Ok(Json(roles))
}

pub async fn create_role_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Json(payload): Json<CreateRoleRequest>,
) -> ApiResult<(StatusCode, Json<RoleMutationResponse>)> {
    let outcome = state
        .security_admin_service
        .create_role(&user, create_role_input(payload)?)
        .await?;

    let is_protected = state
        .grant_service
        .policy()
        .is_protected(outcome.value.name.as_str());

    Ok((
        StatusCode::CREATED,
        Json(RoleMutationResponse::new(outcome, is_protected)),
    ))
}

pub async fn update_role_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(role_id): Path<String>,
    Json(payload): Json<UpdateRoleRequest>,
) -> ApiResult<Json<RoleMutationResponse>> {
    let outcome = state
        .security_admin_service
        .update_role(&user, RoleId::parse(&role_id)?, update_role_input(payload)?)
        .await?;

    let is_protected = state
        .grant_service
        .policy()
        .is_protected(outcome.value.name.as_str());

    Ok(Json(RoleMutationResponse::new(outcome, is_protected)))
}

pub async fn delete_role_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(role_id): Path<String>,
) -> ApiResult<Json<RoleDeletionResponse>> {
    let outcome = state
        .security_admin_service
        .delete_role(&user, RoleId::parse(&role_id)?)
        .await?;

    Ok(Json(RoleDeletionResponse::from(outcome)))
}

pub async fn list_role_holders_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(role_id): Path<String>,
) -> ApiResult<Json<Vec<RoleHolderResponse>>> {
    let holders = state
        .security_admin_service
        .list_role_holders(&user, RoleId::parse(&role_id)?)
        .await?
        .into_iter()
        .map(RoleHolderResponse::from)
        .collect();

    Ok(Json(holders))
}
