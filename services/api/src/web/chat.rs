//! services/api/src/web/chat.rs
//!
//! The assistant endpoint. Replies are streamed back as data-stream frames.

use crate::web::protocol::{ChatRequest, FinishReason, StreamFrame};
use crate::web::state::AppState;
use axum::{
    body::Body,
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use tracing::{error, info};

/// POST /api/chat - Answer the latest chat message
#[utoipa::path(
    post,
    path = "/api/chat",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Streamed reply frames", content_type = "text/plain")
    )
)]
pub async fn chat_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ChatRequest>,
) -> Response {
    info!("Chat request with {} message(s)", req.messages.len());
    let responder = state.chat.clone();

    let frames = async_stream::stream! {
        match responder.respond(&req.messages).await {
            Ok(reply) => {
                yield Ok::<_, std::io::Error>(StreamFrame::Text(reply).encode());
                yield Ok(StreamFrame::Finish(FinishReason::Stop).encode());
            }
            Err(e) => {
                error!("Chat responder failed: {:?}", e);
                yield Ok(StreamFrame::Error("Failed to get a response. Please try again.".to_string()).encode());
                yield Ok(StreamFrame::Finish(FinishReason::Error).encode());
            }
        }
    };

    (
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8"),
            (header::HeaderName::from_static("x-vercel-ai-data-stream"), "v1"),
        ],
        Body::from_stream(frames),
    )
        .into_response()
}
