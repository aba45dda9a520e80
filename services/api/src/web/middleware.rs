//! services/api/src/web/middleware.rs
//!
//! Authentication middleware for protecting routes.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::error;
use uuid::Uuid;

use crate::web::state::AppState;

/// Pulls the session id out of the Cookie header, if any.
pub fn session_id_from_headers(headers: &HeaderMap) -> Option<&str> {
    let cookie_header = headers.get(header::COOKIE).and_then(|v| v.to_str().ok())?;
    cookie_header.split(';').find_map(|c| {
        let c = c.trim();
        c.strip_prefix("session=")
    })
}

/// Middleware that validates the auth session cookie and extracts the user_id.
///
/// If valid, inserts the user_id into request extensions for handlers to use.
/// If invalid or missing, returns 401 Unauthorized.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    // 1. Parse session ID from cookie
    let auth_session_id =
        session_id_from_headers(req.headers()).ok_or(StatusCode::UNAUTHORIZED)?;

    // 2. Validate auth session in database, get user_id
    let user_id = state
        .store
        .validate_auth_session(auth_session_id)
        .await
        .map_err(|e| {
            error!("Failed to validate auth session: {:?}", e);
            StatusCode::UNAUTHORIZED
        })?;

    // 3. Insert user_id into request extensions
    req.extensions_mut().insert(user_id);

    // 4. Continue to the handler
    Ok(next.run(req).await)
}

/// Best-effort authentication for public endpoints whose payloads carry
/// caller-specific flags (`is_favorited`, `is_subscribed`, ...). An anonymous
/// or expired session simply yields `None`.
pub async fn maybe_authenticated(state: &AppState, headers: &HeaderMap) -> Option<Uuid> {
    let session_id = session_id_from_headers(headers)?;
    state.store.validate_auth_session(session_id).await.ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn extracts_session_id_among_other_cookies() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; session=abc-123; lang=en"),
        );
        assert_eq!(session_id_from_headers(&headers), Some("abc-123"));
    }

    #[test]
    fn missing_cookie_header_yields_none() {
        assert_eq!(session_id_from_headers(&HeaderMap::new()), None);
    }
}
