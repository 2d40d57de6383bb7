use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;

use warden_core::{UserId, UserIdentity};
use warden_domain::ProjectId;

use crate::dto::{
    AssignProjectMemberRequest, ProjectAssignmentResponse, ProjectResponse, SaveProjectRequest,
};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn list_projects_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
) -> ApiResult<Json<Vec<ProjectResponse>>> {
    let projects = state
        .project_service
        .list_projects(&user)
        .await?
        .into_iter()
        .map(ProjectResponse::from)
        .collect();

    Ok(Json(projects))
}

pub async fn create_project_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Json(payload): Json<SaveProjectRequest>,
) -> ApiResult<(StatusCode, Json<ProjectResponse>)> {
    let project = state
        .project_service
        .create_project(&user, payload.into())
        .await?;

    Ok((StatusCode::CREATED, Json(ProjectResponse::from(project))))
}

pub async fn get_project_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(project_id): Path<String>,
) -> ApiResult<Json<ProjectResponse>> {
    let project = state
        .project_service
        .get_project(&user, ProjectId::parse(&project_id)?)
        .await?;

    Ok(Json(ProjectResponse::from(project)))
}

pub async fn update_project_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(project_id): Path<String>,
    Json(payload): Json<SaveProjectRequest>,
) -> ApiResult<Json<ProjectResponse>> {
    let project = state
        .project_service
        .update_project(&user, ProjectId::parse(&project_id)?, payload.into())
        .await?;

    Ok(Json(ProjectResponse::from(project)))
}

pub async fn delete_project_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(project_id): Path<String>,
) -> ApiResult<StatusCode> {
    state
        .project_service
        .delete_project(&user, ProjectId::parse(&project_id)?)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn assign_project_member_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(project_id): Path<String>,
    Json(payload): Json<AssignProjectMemberRequest>,
) -> ApiResult<(StatusCode, Json<ProjectAssignmentResponse>)> {
    let assignment = state
        .project_service
        .assign_member(
            &user,
            ProjectId::parse(&project_id)?,
            UserId::parse(&payload.user_id)?,
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ProjectAssignmentResponse::from(assignment)),
    ))
}

pub async fn remove_project_member_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path((project_id, user_id)): Path<(String, String)>,
) -> ApiResult<StatusCode> {
    state
        .project_service
        .remove_member(
            &user,
            ProjectId::parse(&project_id)?,
            UserId::parse(&user_id)?,
        )
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
