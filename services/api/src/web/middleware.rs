//! services/api/src/web/middleware.rs
//!
//! Session cookie helpers and the authentication middleware for protected routes.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::error;

use crate::error::ApiError;
use crate::web::state::AppState;

pub const SESSION_COOKIE: &str = "session";

/// Extracts the session token from the `Cookie` header, if any.
pub fn session_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .find_map(|c| {
            c.trim()
                .strip_prefix(SESSION_COOKIE)
                .and_then(|rest| rest.strip_prefix('='))
        })
        .filter(|token| !token.is_empty())
}

pub fn session_cookie(token: &str, max_age: chrono::Duration) -> String {
    format!(
        "{}={}; HttpOnly; Secure; SameSite=Lax; Path=/; Max-Age={}",
        SESSION_COOKIE,
        token,
        max_age.num_seconds()
    )
}

pub fn cleared_session_cookie() -> String {
    format!("{}=; HttpOnly; Secure; SameSite=Lax; Path=/; Max-Age=0", SESSION_COOKIE)
}

/// Middleware that resolves the session cookie to a `User`.
///
/// If valid, inserts the user into request extensions for handlers to use.
/// If invalid or missing, returns 401 Unauthorized.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Response {
    let Some(token) = session_token(req.headers()).map(str::to_owned) else {
        return ApiError::Unauthenticated.into_response();
    };

    match state.auth.current_user(&token).await {
        Ok(Some(user)) => {
            req.extensions_mut().insert(user);
            next.run(req).await
        }
        Ok(None) => ApiError::Unauthenticated.into_response(),
        Err(e) => {
            error!("Failed to resolve session: {:?}", e);
            ApiError::Auth(e).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn finds_the_session_among_other_cookies() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; session=abc-123; sessionx=no"),
        );
        assert_eq!(session_token(&headers), Some("abc-123"));
    }

    #[test]
    fn ignores_lookalike_and_empty_cookies() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("sessionid=1; session="));
        assert_eq!(session_token(&headers), None);
        assert_eq!(session_token(&HeaderMap::new()), None);
    }
}
