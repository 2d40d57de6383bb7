use axum::Json;
use axum::extract::State;
use tower_sessions::Session;
use warden_core::AppError;

use crate::dto::{AuthLoginRequest, CallerProfileResponse};
use crate::error::ApiResult;
use crate::state::AppState;

use super::SESSION_USER_KEY;

/// POST /auth/login - Verify username and password and open a session.
pub async fn login_handler(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<AuthLoginRequest>,
) -> ApiResult<Json<CallerProfileResponse>> {
    let identity = state
        .session_service
        .authenticate(&payload.username, &payload.password)
        .await?;

    // A fresh session id on every login prevents fixation.
    session
        .cycle_id()
        .await
        .map_err(|error| AppError::Internal(format!("failed to cycle session id: {error}")))?;

    session
        .insert(SESSION_USER_KEY, &identity)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to persist session identity: {error}"))
        })?;

    let profile = state.session_service.profile(&identity).await?;

    Ok(Json(CallerProfileResponse::from(profile)))
}
