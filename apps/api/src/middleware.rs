use axum::extract::{Request, State};
use axum::http::{HeaderValue, Method, header};
use axum::middleware::Next;
use axum::response::Response;
use tower_sessions::Session;
use warden_application::AccessGate;
use warden_core::{AppError, UserIdentity};

use crate::auth::SESSION_USER_KEY;
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn require_auth(
    session: Session,
    mut request: Request,
    next: Next,
) -> ApiResult<Response> {
    let identity = session
        .get::<UserIdentity>(SESSION_USER_KEY)
        .await
        .map_err(|error| AppError::Internal(format!("failed to read session identity: {error}")))?;
    let identity = AccessGate::require_authenticated(identity.as_ref())?.clone();

    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}

pub async fn require_same_origin_for_mutations(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> ApiResult<Response> {
    if is_state_changing_method(request.method()) {
        let headers = request.headers();

        if let Some(fetch_site) = headers.get("sec-fetch-site")
            && fetch_site == HeaderValue::from_static("cross-site")
        {
            return Err(AppError::Forbidden("cross-site request blocked".to_owned()).into());
        }

        let origin = headers
            .get(header::ORIGIN)
            .and_then(|value| value.to_str().ok());
        let referer = headers
            .get(header::REFERER)
            .and_then(|value| value.to_str().ok());

        if !is_allowed_origin(origin, referer, state.frontend_url.as_str()) {
            return Err(AppError::Forbidden("origin validation failed".to_owned()).into());
        }
    }

    Ok(next.run(request).await)
}

/// Requests without browser origin headers come from non-browser clients and pass.
fn is_allowed_origin(origin: Option<&str>, referer: Option<&str>, allowed_origin: &str) -> bool {
    match (origin, referer) {
        (None, None) => true,
        (origin, referer) => {
            origin.is_some_and(|origin| origin == allowed_origin)
                || referer.is_some_and(|referer| referer.starts_with(allowed_origin))
        }
    }
}

fn is_state_changing_method(method: &Method) -> bool {
    matches!(
        *method,
        Method::POST | Method::PUT | Method::PATCH | Method::DELETE
    )
}

#[cfg(test)]
mod tests {
    use axum::http::Method;

    use super::{is_allowed_origin, is_state_changing_method};

    const FRONTEND: &str = "http://localhost:3000";

    #[test]
    fn only_mutating_methods_are_checked() {
        assert!(is_state_changing_method(&Method::POST));
        assert!(is_state_changing_method(&Method::DELETE));
        assert!(!is_state_changing_method(&Method::GET));
        assert!(!is_state_changing_method(&Method::OPTIONS));
    }

    #[test]
    fn frontend_origin_or_referer_is_allowed() {
        assert!(is_allowed_origin(Some(FRONTEND), None, FRONTEND));
        assert!(is_allowed_origin(
            None,
            Some("http://localhost:3000/admin/roles"),
            FRONTEND
        ));
        assert!(is_allowed_origin(None, None, FRONTEND));
    }

    #[test]
    fn foreign_origin_is_rejected() {
        assert!(!is_allowed_origin(
            Some("https://evil.example"),
            None,
            FRONTEND
        ));
        assert!(!is_allowed_origin(
            Some("https://evil.example"),
            Some("https://evil.example/"),
            FRONTEND
        ));
    }
}
