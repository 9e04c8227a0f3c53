pub mod auth;
pub mod chat;
pub mod middleware;
pub mod protocol;
pub mod rest;
pub mod state;

pub use middleware::require_auth;

use crate::config::ConfigError;
use crate::error::ApiError;
use axum::{
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware as axum_middleware,
    routing::{delete, get, post},
    Router,
};
use state::AppState;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Builds the complete application: public and protected API routes, the
/// Swagger UI, CORS for the configured origin and request tracing.
pub fn router(state: Arc<AppState>) -> Result<Router, ApiError> {
    let origin = state
        .config
        .cors_origin
        .parse::<HeaderValue>()
        .map_err(|e| {
            ConfigError::InvalidValue("CORS_ORIGIN".to_string(), e.to_string())
        })?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT]);

    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/auth/register", post(auth::register_handler))
        .route("/auth/login", post(auth::login_handler))
        .route("/auth/google", post(auth::google_login_handler))
        .route("/auth/logout", post(auth::logout_handler))
        .route("/api/route-guard", get(auth::route_guard_handler))
        .route("/api/chat", post(chat::chat_handler));

    // Protected routes (auth required)
    let protected_routes = Router::new()
        .route("/api/me", get(auth::me_handler))
        .route("/api/shell", get(rest::shell_handler))
        .route(
            "/api/flashcards",
            get(rest::list_flashcards_handler).post(rest::create_flashcard_handler),
        )
        .route("/api/flashcards/batch", post(rest::create_flashcards_handler))
        .route("/api/flashcards/suggest", post(rest::suggest_flashcards_handler))
        .route(
            "/api/reminders",
            get(rest::list_reminders_handler).post(rest::create_reminder_handler),
        )
        .route("/api/reminders/{id}", delete(rest::delete_reminder_handler))
        .route("/api/record/summary", post(rest::summarize_transcript_handler))
        .route("/api/record/manual", post(rest::summarize_entry_handler))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            require_auth,
        ));

    let api_router = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    Ok(Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", rest::ApiDoc::openapi())))
}
