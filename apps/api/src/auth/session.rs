use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use tower_sessions::Session;
use tracing::info;
use warden_core::{AppError, UserIdentity};

use crate::dto::CallerProfileResponse;
use crate::error::ApiResult;
use crate::state::AppState;

use super::SESSION_USER_KEY;

pub async fn logout_handler(session: Session) -> ApiResult<StatusCode> {
    let identity = session
        .get::<UserIdentity>(SESSION_USER_KEY)
        .await
        .map_err(|error| AppError::Internal(format!("failed to read session identity: {error}")))?;

    session
        .delete()
        .await
        .map_err(|error| AppError::Internal(format!("failed to delete session: {error}")))?;

    if let Some(identity) = identity {
        info!(user_id = %identity.user_id(), "user logged out");
    }

    Ok(StatusCode::NO_CONTENT)
}

pub async fn me_handler(
    State(state): State<AppState>,
    session: Session,
) -> ApiResult<Json<CallerProfileResponse>> {
    let identity = session
        .get::<UserIdentity>(SESSION_USER_KEY)
        .await
        .map_err(|error| AppError::Internal(format!("failed to read session identity: {error}")))?
        .ok_or_else(|| AppError::Unauthenticated("authentication required".to_owned()))?;

    let profile = state.session_service.profile(&identity).await?;

    Ok(Json(CallerProfileResponse::from(profile)))
}
