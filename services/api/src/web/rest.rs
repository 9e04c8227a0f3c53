//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the record endpoints (flashcards, reminders,
//! summaries, page shell) and the master definition for the OpenAPI specification.

use crate::error::ApiError;
use crate::web::auth::{
    AuthResponse, GoogleLoginRequest, LoginRequest, RedirectResponse, RegisterRequest, UserView,
};
use crate::web::protocol::ChatRequest;
use crate::web::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use chrono::{DateTime, Utc};
use medilog_core::assistant::{FlashcardDraft, ManualEntry};
use medilog_core::navigation::Shell;
use medilog_core::{Flashcard, NewFlashcard, NewReminder, Reminder, User};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use utoipa::{IntoParams, OpenApi, ToSchema};
use uuid::Uuid;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::web::auth::register_handler,
        crate::web::auth::login_handler,
        crate::web::auth::google_login_handler,
        crate::web::auth::logout_handler,
        crate::web::auth::me_handler,
        crate::web::auth::route_guard_handler,
        crate::web::chat::chat_handler,
        shell_handler,
        list_flashcards_handler,
        create_flashcard_handler,
        create_flashcards_handler,
        suggest_flashcards_handler,
        list_reminders_handler,
        create_reminder_handler,
        delete_reminder_handler,
        summarize_transcript_handler,
        summarize_entry_handler,
    ),
    components(
        schemas(
            RegisterRequest, LoginRequest, GoogleLoginRequest, AuthResponse, UserView,
            RedirectResponse, ChatRequest, ShellView, ShellItemView, FlashcardView,
            CreateFlashcardRequest, BatchFlashcardsRequest, SuggestRequest, DraftView,
            ReminderView, CreateReminderRequest, SummaryRequest, ManualEntryRequest,
            SummaryResponse
        )
    ),
    tags(
        (name = "MediLog API", description = "Accounts, medical records and the chat assistant.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

#[derive(Serialize, Deserialize, ToSchema, Debug)]
pub struct ShellItemView {
    pub title: String,
    pub href: String,
    pub active: bool,
}

/// Header and sidebar contents for the page at `path`.
#[derive(Serialize, Deserialize, ToSchema, Debug)]
pub struct ShellView {
    pub user: UserView,
    pub menu: Vec<ShellItemView>,
}

impl From<Shell> for ShellView {
    fn from(shell: Shell) -> Self {
        Self {
            user: shell.user.into(),
            menu: shell
                .menu
                .into_iter()
                .map(|entry| ShellItemView {
                    title: entry.item.title.to_string(),
                    href: entry.item.href.to_string(),
                    active: entry.active,
                })
                .collect(),
        }
    }
}

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ShellQuery {
    pub path: String,
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone)]
pub struct FlashcardView {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub category: String,
    pub date: DateTime<Utc>,
}

impl From<Flashcard> for FlashcardView {
    fn from(card: Flashcard) -> Self {
        Self {
            id: card.id,
            title: card.title,
            content: card.content,
            category: card.category,
            date: card.date,
        }
    }
}

/// Missing or blank fields fall back to "Untitled", "No content available"
/// and "Uncategorized".
#[derive(Deserialize, ToSchema, Default)]
pub struct CreateFlashcardRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub category: String,
}

impl From<CreateFlashcardRequest> for NewFlashcard {
    fn from(req: CreateFlashcardRequest) -> Self {
        NewFlashcard {
            title: req.title,
            content: req.content,
            category: req.category,
        }
    }
}

#[derive(Deserialize, ToSchema)]
pub struct BatchFlashcardsRequest {
    pub flashcards: Vec<CreateFlashcardRequest>,
}

#[derive(Deserialize, ToSchema)]
pub struct SuggestRequest {
    #[serde(default)]
    pub content: String,
}

#[derive(Serialize, Deserialize, ToSchema, Debug)]
pub struct DraftView {
    pub title: String,
    pub content: String,
}

impl From<FlashcardDraft> for DraftView {
    fn from(draft: FlashcardDraft) -> Self {
        Self {
            title: draft.title,
            content: draft.content,
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone)]
pub struct ReminderView {
    pub id: Uuid,
    pub medicine: String,
    pub dosage: String,
    pub frequency: String,
    pub time: String,
    pub days: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl From<Reminder> for ReminderView {
    fn from(r: Reminder) -> Self {
        Self {
            id: r.id,
            medicine: r.medicine,
            dosage: r.dosage,
            frequency: r.frequency,
            time: r.time,
            days: r.days,
            notes: r.notes,
        }
    }
}

#[derive(Deserialize, ToSchema)]
pub struct CreateReminderRequest {
    pub medicine: String,
    pub dosage: String,
    pub frequency: String,
    pub time: String,
    #[serde(default)]
    pub days: Vec<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl From<CreateReminderRequest> for NewReminder {
    fn from(req: CreateReminderRequest) -> Self {
        NewReminder {
            medicine: req.medicine,
            dosage: req.dosage,
            frequency: req.frequency,
            time: req.time,
            days: req.days,
            notes: req.notes,
        }
    }
}

#[derive(Deserialize, ToSchema)]
pub struct SummaryRequest {
    #[serde(default)]
    pub transcript: String,
}

#[derive(Deserialize, ToSchema, Default)]
pub struct ManualEntryRequest {
    #[serde(default)]
    pub symptoms: Option<String>,
    #[serde(default)]
    pub diagnosis: Option<String>,
    #[serde(default)]
    pub medications: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    /// Caregivers only.
    #[serde(default)]
    pub patient_name: Option<String>,
    #[serde(default)]
    pub patient_age: Option<u32>,
}

impl From<ManualEntryRequest> for ManualEntry {
    fn from(req: ManualEntryRequest) -> Self {
        ManualEntry {
            symptoms: req.symptoms,
            diagnosis: req.diagnosis,
            medications: req.medications,
            notes: req.notes,
            patient_name: req.patient_name,
            patient_age: req.patient_age,
        }
    }
}

/// A generated summary together with the flashcard it was saved as.
#[derive(Serialize, Deserialize, ToSchema, Debug)]
pub struct SummaryResponse {
    pub summary: String,
    pub flashcard: FlashcardView,
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// Header and sidebar for the signed-in user's page.
#[utoipa::path(
    get,
    path = "/api/shell",
    params(ShellQuery),
    responses(
        (status = 200, description = "Menu for the user's role", body = ShellView),
        (status = 401, description = "Not signed in")
    )
)]
pub async fn shell_handler(
    Extension(user): Extension<User>,
    Query(query): Query<ShellQuery>,
) -> Json<ShellView> {
    Json(Shell::new(user, &query.path).into())
}

/// List the user's flashcards, newest first.
#[utoipa::path(
    get,
    path = "/api/flashcards",
    responses(
        (status = 200, description = "The user's flashcards", body = [FlashcardView]),
        (status = 401, description = "Not signed in")
    )
)]
pub async fn list_flashcards_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
) -> Result<Json<Vec<FlashcardView>>, ApiError> {
    let cards = state.records.list_flashcards(user.id).await?;
    Ok(Json(cards.into_iter().map(FlashcardView::from).collect()))
}

#[utoipa::path(
    post,
    path = "/api/flashcards",
    request_body = CreateFlashcardRequest,
    responses(
        (status = 201, description = "Flashcard saved", body = FlashcardView),
        (status = 401, description = "Not signed in")
    )
)]
pub async fn create_flashcard_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Json(req): Json<CreateFlashcardRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let card = state.records.create_flashcard(user.id, req.into()).await?;
    info!("Saved flashcard {} for {}", card.id, user.id);
    Ok((StatusCode::CREATED, Json(FlashcardView::from(card))))
}

/// Save several flashcards at once, such as accepted suggestions.
#[utoipa::path(
    post,
    path = "/api/flashcards/batch",
    request_body = BatchFlashcardsRequest,
    responses(
        (status = 201, description = "All flashcards saved", body = [FlashcardView]),
        (status = 400, description = "Empty batch"),
        (status = 401, description = "Not signed in")
    )
)]
pub async fn create_flashcards_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Json(req): Json<BatchFlashcardsRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let batch = req.flashcards.into_iter().map(NewFlashcard::from).collect();
    let cards = state.records.create_flashcards(user.id, batch).await?;
    info!("Saved {} flashcards for {}", cards.len(), user.id);
    let views: Vec<FlashcardView> = cards.into_iter().map(FlashcardView::from).collect();
    Ok((StatusCode::CREATED, Json(views)))
}

/// Propose flashcards for a piece of content. Nothing is saved.
#[utoipa::path(
    post,
    path = "/api/flashcards/suggest",
    request_body = SuggestRequest,
    responses(
        (status = 200, description = "Suggested drafts", body = [DraftView]),
        (status = 400, description = "No content"),
        (status = 401, description = "Not signed in")
    )
)]
pub async fn suggest_flashcards_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SuggestRequest>,
) -> Result<Json<Vec<DraftView>>, ApiError> {
    let drafts = state.suggester.suggest(&req.content).await?;
    Ok(Json(drafts.into_iter().map(DraftView::from).collect()))
}

#[utoipa::path(
    get,
    path = "/api/reminders",
    responses(
        (status = 200, description = "The user's reminders", body = [ReminderView]),
        (status = 401, description = "Not signed in")
    )
)]
pub async fn list_reminders_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
) -> Result<Json<Vec<ReminderView>>, ApiError> {
    let reminders = state.records.list_reminders(user.id).await?;
    Ok(Json(reminders.into_iter().map(ReminderView::from).collect()))
}

#[utoipa::path(
    post,
    path = "/api/reminders",
    request_body = CreateReminderRequest,
    responses(
        (status = 201, description = "Reminder saved", body = ReminderView),
        (status = 401, description = "Not signed in")
    )
)]
pub async fn create_reminder_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Json(req): Json<CreateReminderRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let reminder = state.records.create_reminder(user.id, req.into()).await?;
    info!("Saved reminder {} for {}", reminder.id, user.id);
    Ok((StatusCode::CREATED, Json(ReminderView::from(reminder))))
}

#[utoipa::path(
    delete,
    path = "/api/reminders/{id}",
    params(
        ("id" = Uuid, Path, description = "The reminder to delete.")
    ),
    responses(
        (status = 204, description = "Reminder deleted"),
        (status = 404, description = "No such reminder"),
        (status = 401, description = "Not signed in")
    )
)]
pub async fn delete_reminder_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.records.delete_reminder(user.id, id).await?;
    info!("Deleted reminder {} for {}", id, user.id);
    Ok(StatusCode::NO_CONTENT)
}

/// Summarize a recorded transcript and save it under "Summaries".
#[utoipa::path(
    post,
    path = "/api/record/summary",
    request_body = SummaryRequest,
    responses(
        (status = 201, description = "Summary generated and saved", body = SummaryResponse),
        (status = 400, description = "Empty transcript"),
        (status = 401, description = "Not signed in")
    )
)]
pub async fn summarize_transcript_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Json(req): Json<SummaryRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let saved = state
        .summary_flow()
        .generate_summary(user.id, &req.transcript)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(SummaryResponse {
            summary: saved.summary,
            flashcard: saved.flashcard.into(),
        }),
    ))
}

/// Render a manually typed visit and save it under "Summaries".
#[utoipa::path(
    post,
    path = "/api/record/manual",
    request_body = ManualEntryRequest,
    responses(
        (status = 201, description = "Summary generated and saved", body = SummaryResponse),
        (status = 400, description = "Every field is empty"),
        (status = 401, description = "Not signed in")
    )
)]
pub async fn summarize_entry_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Json(req): Json<ManualEntryRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let entry = ManualEntry::from(req);
    let saved = state
        .summary_flow()
        .generate_from_entry(user.id, user.role, &entry)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(SummaryResponse {
            summary: saved.summary,
            flashcard: saved.flashcard.into(),
        }),
    ))
}
