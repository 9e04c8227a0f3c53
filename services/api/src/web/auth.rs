//! services/api/src/web/auth.rs
//!
//! Authentication endpoints for registration, login, Google sign-in, logout, and
//! the route guard consulted by the client before rendering a page.

use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Extension, Json,
};
use medilog_core::{AuthOutcome, Role, User};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::error::ApiError;
use crate::web::middleware::{cleared_session_cookie, session_cookie, session_token};
use crate::web::state::AppState;

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: String,
    pub email: String,
    pub password: String,
    #[schema(value_type = String, example = "patient")]
    pub role: Role,
}

#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    /// Ignored; the role stored at registration is used.
    #[schema(value_type = Option<String>)]
    pub role: Option<Role>,
}

#[derive(Deserialize, ToSchema)]
pub struct GoogleLoginRequest {
    pub id_token: String,
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq)]
pub struct UserView {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[schema(value_type = String, example = "caregiver")]
    pub role: Role,
}

impl From<User> for UserView {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema, Debug)]
pub struct AuthResponse {
    pub user: UserView,
    /// The dashboard the client should navigate to.
    pub redirect: String,
}

#[derive(Serialize, Deserialize, ToSchema, Debug)]
pub struct RedirectResponse {
    pub redirect: Option<String>,
}

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RouteGuardQuery {
    /// The path about to be rendered.
    pub path: String,
}

//=========================================================================================
// Handlers
//=========================================================================================

fn signed_in(state: &AppState, status: StatusCode, outcome: AuthOutcome) -> impl IntoResponse {
    let cookie = session_cookie(&outcome.session_token, state.config.session_ttl);
    let response = AuthResponse {
        user: outcome.user.into(),
        redirect: outcome.redirect,
    };
    (status, [(header::SET_COOKIE, cookie)], Json(response))
}

/// POST /auth/register - Create a new account with a role
#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created and signed in", body = AuthResponse),
        (status = 400, description = "Missing email or password"),
        (status = 409, description = "Email already registered"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn register_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let outcome = state
        .auth
        .register(&req.name, &req.email, &req.password, req.role)
        .await?;
    Ok(signed_in(&state, StatusCode::CREATED, outcome))
}

/// POST /auth/login - Login with an existing account
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid credentials"),
        (status = 404, description = "User profile not found"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let outcome = state
        .auth
        .login(&req.email, &req.password, req.role)
        .await?;
    Ok(signed_in(&state, StatusCode::OK, outcome))
}

/// POST /auth/google - Sign in with a Google ID token
#[utoipa::path(
    post,
    path = "/auth/google",
    request_body = GoogleLoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Token rejected"),
        (status = 503, description = "Google sign-in is not configured")
    )
)]
pub async fn google_login_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<GoogleLoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let outcome = state.auth.login_with_google(&req.id_token).await?;
    Ok(signed_in(&state, StatusCode::OK, outcome))
}

/// POST /auth/logout - End the session
#[utoipa::path(
    post,
    path = "/auth/logout",
    responses(
        (status = 200, description = "Logout successful", body = RedirectResponse)
    )
)]
pub async fn logout_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let redirect = state.auth.logout(session_token(&headers)).await?;
    info!("Session closed");
    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cleared_session_cookie())],
        Json(RedirectResponse {
            redirect: Some(redirect),
        }),
    ))
}

/// GET /api/me - The signed-in user
#[utoipa::path(
    get,
    path = "/api/me",
    responses(
        (status = 200, description = "Current user", body = UserView),
        (status = 401, description = "Not signed in")
    )
)]
pub async fn me_handler(Extension(user): Extension<User>) -> Json<UserView> {
    Json(user.into())
}

/// GET /api/route-guard - Where the client must go instead of `path`, if anywhere
#[utoipa::path(
    get,
    path = "/api/route-guard",
    params(RouteGuardQuery),
    responses(
        (status = 200, description = "Redirect target, or null to render the page", body = RedirectResponse)
    )
)]
pub async fn route_guard_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<RouteGuardQuery>,
) -> Result<Json<RedirectResponse>, ApiError> {
    let redirect = state
        .auth
        .guard(session_token(&headers), &query.path)
        .await?;
    Ok(Json(RedirectResponse { redirect }))
}
