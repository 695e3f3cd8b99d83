//! Axum route handlers for the chatbot API.
//!
//! Handlers are thin: extract, call the `ConversationManager`, and re-label
//! internal failures with the operation's error code.

use axum::{
    extract::{FromRequest, FromRequestParts, Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::chat::manager::UserSummary;
use crate::context::prompts::TUTOR_GUIDELINES;
use crate::errors::AppError;
use crate::models::conversation::ConversationTurn;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Extractors
// ────────────────────────────────────────────────────────────────────────────

/// `Json` whose rejections use the standard error body.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// `Query` whose rejections use the standard error body.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct AppQuery<T>(pub T);

/// Every successful body carries `"success": true` next to its fields.
#[derive(Debug, Serialize)]
pub struct Success<T> {
    pub success: bool,
    #[serde(flatten)]
    pub data: T,
}

impl<T> Success<T> {
    pub fn new(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data,
        })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartRequest {
    pub user_id: Option<i32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartResponse {
    pub conversation_id: String,
    pub welcome_message: String,
    pub user_summary: UserSummary,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageRequest {
    pub message: Option<String>,
    pub user_id: Option<i32>,
    pub conversation_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ReplyContext {
    pub career: String,
    pub school: String,
    pub skills: Vec<String>,
    pub guidelines: &'static str,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: ConversationTurn,
    pub context: ReplyContext,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserIdParam {
    pub user_id: Option<i32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryResponse {
    pub conversation_id: String,
    pub turns: Vec<ConversationTurn>,
    pub start_time: DateTime<Utc>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /chatbot/start
pub async fn handle_start(
    State(state): State<AppState>,
    AppJson(req): AppJson<StartRequest>,
) -> Result<(StatusCode, Json<Success<StartResponse>>), AppError> {
    let started = state
        .chat
        .start_session(req.user_id)
        .await
        .map_err(|e| e.fail_as("START_CONVERSATION_ERROR", "Error al iniciar la conversación"))?;

    Ok((
        StatusCode::CREATED,
        Success::new(StartResponse {
            conversation_id: started.conversation_id,
            welcome_message: started.welcome_message,
            user_summary: started.user_summary,
        }),
    ))
}

/// POST /chatbot/message
pub async fn handle_message(
    State(state): State<AppState>,
    AppJson(req): AppJson<MessageRequest>,
) -> Result<(StatusCode, Json<Success<MessageResponse>>), AppError> {
    let conversation_id = req.conversation_id.unwrap_or_default();
    let message = req.message.unwrap_or_default();

    let posted = state
        .chat
        .post_message(&conversation_id, req.user_id, &message)
        .await
        .map_err(|e| e.fail_as("MESSAGE_PROCESSING_ERROR", "Error al procesar el mensaje"))?;

    Ok((
        StatusCode::CREATED,
        Success::new(MessageResponse {
            message: posted.turn,
            context: ReplyContext {
                career: posted.student.career,
                school: posted.student.school,
                skills: posted.student.skills,
                guidelines: TUTOR_GUIDELINES,
            },
        }),
    ))
}

/// GET /chatbot/history/:conversation_id?userId=
pub async fn handle_history(
    State(state): State<AppState>,
    Path(conversation_id): Path<String>,
    AppQuery(params): AppQuery<UserIdParam>,
) -> Result<Json<Success<HistoryResponse>>, AppError> {
    let history = state
        .chat
        .get_history(&conversation_id, params.user_id)
        .await
        .map_err(|e| {
            e.fail_as(
                "GET_CONVERSATION_HISTORY_ERROR",
                "Error al obtener el historial de conversación",
            )
        })?;

    Ok(Success::new(HistoryResponse {
        conversation_id,
        turns: history.turns,
        start_time: history.start_time,
    }))
}

/// DELETE /chatbot/conversations/:conversation_id
pub async fn handle_delete(
    State(state): State<AppState>,
    Path(conversation_id): Path<String>,
    AppJson(req): AppJson<UserIdParam>,
) -> Result<StatusCode, AppError> {
    state
        .chat
        .delete_session(&conversation_id, req.user_id)
        .await
        .map_err(|e| {
            e.fail_as(
                "CONVERSATION_DELETION_ERROR",
                "Error al eliminar la conversación",
            )
        })?;

    Ok(StatusCode::NO_CONTENT)
}
