//! Conversation Manager: session lifecycle and the per-message pipeline.
//!
//! Flow per message: validate → verify_access → user lookup →
//!       student context + system context → recent history →
//!       build_prompt → completion → persist turn.
//!
//! Validation always runs before the store is touched. Nothing here retries.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::chat::ids::{generate_conversation_id, is_valid_conversation_id};
use crate::context::aggregator::{get_student_context, get_system_context};
use crate::context::composer::build_prompt;
use crate::context::models::StudentContext;
use crate::context::prompts::{SESSION_START_MARKER, WELCOME_MESSAGE};
use crate::errors::AppError;
use crate::llm_client::CompletionClient;
use crate::models::conversation::{ConversationSession, ConversationTurn, NewSession, NewTurn};
use crate::store::ChatStore;

/// How many past turns are replayed into each prompt.
pub const HISTORY_WINDOW: i64 = 10;

#[derive(Debug, Clone, Serialize)]
pub struct UserSummary {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct StartedSession {
    pub conversation_id: String,
    pub welcome_message: String,
    pub user_summary: UserSummary,
}

#[derive(Debug, Clone)]
pub struct PostedMessage {
    pub turn: ConversationTurn,
    pub student: StudentContext,
}

#[derive(Debug, Clone)]
pub struct History {
    pub turns: Vec<ConversationTurn>,
    pub start_time: DateTime<Utc>,
}

/// Owns session lifecycle and orchestrates each inbound message.
/// Holds no per-request state; clones share the same store and client.
#[derive(Clone)]
pub struct ConversationManager {
    store: Arc<dyn ChatStore>,
    completion: Arc<dyn CompletionClient>,
}

impl ConversationManager {
    pub fn new(store: Arc<dyn ChatStore>, completion: Arc<dyn CompletionClient>) -> Self {
        Self { store, completion }
    }

    pub async fn start_session(&self, user_id: Option<i32>) -> Result<StartedSession, AppError> {
        let user_id = require_user_id(user_id)?;

        let user = self
            .store
            .find_user(user_id)
            .await?
            .ok_or_else(|| AppError::user_not_found(user_id))?;

        let conversation_id = generate_conversation_id();
        let now = Utc::now();
        let session = NewSession {
            conversation_id: conversation_id.clone(),
            user_id,
            start_time: now,
        };
        let seed = NewTurn {
            conversation_id: conversation_id.clone(),
            user_message: SESSION_START_MARKER.to_string(),
            bot_response: WELCOME_MESSAGE.to_string(),
            timestamp: now,
        };
        self.store.create_session(session, seed).await?;

        info!("Started conversation {conversation_id} for user {user_id}");

        Ok(StartedSession {
            conversation_id,
            welcome_message: WELCOME_MESSAGE.to_string(),
            user_summary: UserSummary {
                id: user.id,
                name: user.full_name(),
            },
        })
    }

    /// Fails with `Forbidden` unless `user_id` owns `conversation_id`.
    pub async fn verify_access(
        &self,
        conversation_id: &str,
        user_id: i32,
    ) -> Result<ConversationSession, AppError> {
        self.owned_session(
            conversation_id,
            user_id,
            "UNAUTHORIZED_CONVERSATION_ACCESS",
            "No tienes permiso para acceder a esta conversación",
        )
        .await
    }

    pub async fn post_message(
        &self,
        conversation_id: &str,
        user_id: Option<i32>,
        message: &str,
    ) -> Result<PostedMessage, AppError> {
        require_conversation_id(conversation_id)?;
        if !is_valid_conversation_id(conversation_id) {
            return Err(AppError::validation(
                "INVALID_CONVERSATION_ID",
                "El ID de conversación no tiene un formato válido",
            ));
        }
        if message.trim().is_empty() {
            return Err(AppError::validation("EMPTY_MESSAGE", "El mensaje no puede estar vacío"));
        }
        let user_id = require_user_id(user_id)?;

        self.verify_access(conversation_id, user_id).await?;

        if self.store.find_user(user_id).await?.is_none() {
            return Err(AppError::user_not_found(user_id));
        }

        let student = get_student_context(self.store.as_ref(), user_id).await?;
        let system = get_system_context(self.store.as_ref()).await?;
        let history = self.prompt_history(conversation_id).await?;

        let prompt = build_prompt(message, Some(&student), &history, &system);
        debug!(
            "Built prompt for {conversation_id}: {} chars, {} history turns",
            prompt.len(),
            history.len()
        );

        let bot_response = self.completion.generate(&prompt).await.map_err(|e| {
            warn!("Completion failed for conversation {conversation_id}: {e}");
            AppError::Provider(e)
        })?;

        let turn = self
            .store
            .insert_turn(NewTurn::now(conversation_id, message, bot_response))
            .await?;

        info!("Persisted turn {} in conversation {conversation_id}", turn.id);

        Ok(PostedMessage { turn, student })
    }

    /// The last `HISTORY_WINDOW` turns, oldest first, as fed to the prompt.
    pub async fn prompt_history(
        &self,
        conversation_id: &str,
    ) -> Result<Vec<ConversationTurn>, AppError> {
        let mut turns = self
            .store
            .recent_turns(conversation_id, HISTORY_WINDOW)
            .await?;
        turns.reverse();
        Ok(turns)
    }

    /// Full transcript, oldest first. Requires ownership.
    pub async fn get_history(
        &self,
        conversation_id: &str,
        user_id: Option<i32>,
    ) -> Result<History, AppError> {
        require_conversation_id(conversation_id)?;
        let user_id = require_user_id(user_id)?;

        let session = self.verify_access(conversation_id, user_id).await?;
        let turns = self.store.list_turns(conversation_id).await?;

        Ok(History {
            turns,
            start_time: session.start_time,
        })
    }

    /// Deletes every turn and the session row, atomically.
    pub async fn delete_session(
        &self,
        conversation_id: &str,
        user_id: Option<i32>,
    ) -> Result<(), AppError> {
        require_conversation_id(conversation_id)?;
        let user_id = require_user_id(user_id)?;

        self.owned_session(
            conversation_id,
            user_id,
            "UNAUTHORIZED_CONVERSATION_DELETION",
            "No tienes permiso para eliminar esta conversación",
        )
        .await?;

        self.store.delete_session(conversation_id).await?;
        info!("User {user_id} deleted conversation {conversation_id}");
        Ok(())
    }

    async fn owned_session(
        &self,
        conversation_id: &str,
        user_id: i32,
        code: &'static str,
        message: &'static str,
    ) -> Result<ConversationSession, AppError> {
        match self.store.find_owned_session(conversation_id, user_id).await? {
            Some(session) => Ok(session),
            None => {
                warn!("User {user_id} denied access to conversation {conversation_id}");
                Err(AppError::forbidden(code, message))
            }
        }
    }
}

fn require_user_id(user_id: Option<i32>) -> Result<i32, AppError> {
    match user_id {
        None => Err(AppError::validation("MISSING_USER_ID", "Se requiere el ID de usuario")),
        Some(id) if id < 1 => Err(AppError::validation(
            "INVALID_USER_ID",
            "El ID de usuario debe ser un entero positivo",
        )),
        Some(id) => Ok(id),
    }
}

fn require_conversation_id(conversation_id: &str) -> Result<(), AppError> {
    if conversation_id.trim().is_empty() {
        return Err(AppError::validation(
            "MISSING_CONVERSATION_ID",
            "Se requiere el ID de conversación",
        ));
    }
    Ok(())
}
