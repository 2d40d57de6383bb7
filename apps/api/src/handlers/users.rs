use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;

use warden_application::CreateUserInput;
use warden_core::{AppResult, UserId, UserIdentity};
use warden_domain::RoleId;

use crate::dto::{
    AssignRoleRequest, AssignRoleResponse, CreateUserRequest, CreateUserResponse,
    MirrorStatusResponse, UpdateUserRequest, UpdateUserResponse, UserResponse, UserRoleResponse,
};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn list_users_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
) -> ApiResult<Json<Vec<UserResponse>>> {
    let users = state
        .user_admin_service
        .list_users(&user)
        .await?
        .into_iter()
        .map(UserResponse::from)
        .collect();

    Ok(Json(users))
}

pub async fn create_user_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Json(payload): Json<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<CreateUserResponse>)> {
    let outcome = state
        .user_admin_service
        .create_user(&user, create_user_input(payload)?)
        .await?;

    let policy = state.grant_service.policy();
    Ok((
        StatusCode::CREATED,
        Json(CreateUserResponse::new(outcome, |name| {
            policy.is_protected(name)
        })),
    ))
}

pub async fn get_user_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<UserResponse>> {
    let account = state
        .user_admin_service
        .get_user(&user, UserId::parse(&user_id)?)
        .await?;

    Ok(Json(UserResponse::from(account)))
}

pub async fn update_user_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(user_id): Path<String>,
    Json(payload): Json<UpdateUserRequest>,
) -> ApiResult<Json<UpdateUserResponse>> {
    let outcome = state
        .user_admin_service
        .update_user(&user, UserId::parse(&user_id)?, payload.into())
        .await?;

    Ok(Json(UpdateUserResponse::from(outcome)))
}

pub async fn delete_user_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<MirrorStatusResponse>> {
    let outcome = state
        .user_admin_service
        .delete_user(&user, UserId::parse(&user_id)?)
        .await?;

    Ok(Json(MirrorStatusResponse::from(outcome.mirror)))
}

pub async fn list_user_roles_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<Vec<UserRoleResponse>>> {
    let roles = state
        .user_admin_service
        .user_roles(&user, UserId::parse(&user_id)?)
        .await?
        .into_iter()
        .map(UserRoleResponse::from)
        .collect();

    Ok(Json(roles))
}

pub async fn assign_user_role_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(user_id): Path<String>,
    Json(payload): Json<AssignRoleRequest>,
) -> ApiResult<(StatusCode, Json<AssignRoleResponse>)> {
    let outcome = state
        .security_admin_service
        .assign_role(
            &user,
            UserId::parse(&user_id)?,
            RoleId::parse(&payload.role_id)?,
            payload.expires_at,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(AssignRoleResponse::from(outcome))))
}

pub async fn revoke_user_role_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path((user_id, role_id)): Path<(String, String)>,
) -> ApiResult<Json<MirrorStatusResponse>> {
    let mirror = state
        .security_admin_service
        .revoke_role(&user, UserId::parse(&user_id)?, RoleId::parse(&role_id)?)
        .await?;

    Ok(Json(MirrorStatusResponse::from(mirror)))
}

fn create_user_input(payload: CreateUserRequest) -> AppResult<CreateUserInput> {
    Ok(CreateUserInput {
        role_id: payload
            .role_id
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(RoleId::parse)
            .transpose()?,
        username: payload.username,
        email: payload.email,
        first_name: payload.first_name,
        last_name: payload.last_name,
        employee_id: payload.employee_id,
        position: payload.position,
        department: payload.department,
        phone: payload.phone,
        password: payload.password,
        is_staff: payload.is_staff,
        is_superuser: payload.is_superuser,
    })
}
