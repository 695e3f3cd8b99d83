//! Persistence seam for conversations and the student/catalog graph.
//!
//! `AppState` carries an `Arc<dyn ChatStore>`; production uses [`postgres::PgChatStore`].

use async_trait::async_trait;
use thiserror::Error;

use crate::models::catalog::Catalog;
use crate::models::conversation::{ConversationSession, ConversationTurn, NewSession, NewTurn};
use crate::models::user::{StudentGraph, User};

#[cfg(test)]
pub mod memory;
pub mod postgres;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),

    /// The pool could not hand out a connection.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
                StoreError::Unavailable(err.to_string())
            }
            other => StoreError::Database(other),
        }
    }
}

#[async_trait]
pub trait ChatStore: Send + Sync {
    async fn find_user(&self, user_id: i32) -> Result<Option<User>, StoreError>;

    /// Creates the session row and its seed turn atomically.
    async fn create_session(
        &self,
        session: NewSession,
        seed: NewTurn,
    ) -> Result<ConversationSession, StoreError>;

    async fn find_owned_session(
        &self,
        conversation_id: &str,
        user_id: i32,
    ) -> Result<Option<ConversationSession>, StoreError>;

    async fn insert_turn(&self, turn: NewTurn) -> Result<ConversationTurn, StoreError>;

    /// All turns, oldest first.
    async fn list_turns(&self, conversation_id: &str)
        -> Result<Vec<ConversationTurn>, StoreError>;

    /// At most `limit` turns, newest first.
    async fn recent_turns(
        &self,
        conversation_id: &str,
        limit: i64,
    ) -> Result<Vec<ConversationTurn>, StoreError>;

    /// Removes every turn and the session row in one transaction.
    async fn delete_session(&self, conversation_id: &str) -> Result<(), StoreError>;

    /// `None` when the user does not exist.
    async fn student_graph(&self, user_id: i32) -> Result<Option<StudentGraph>, StoreError>;

    async fn catalog(&self) -> Result<Catalog, StoreError>;
}
