pub mod health;

use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::chat::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/chatbot/start", post(handlers::handle_start))
        .route("/chatbot/message", post(handlers::handle_message))
        .route(
            "/chatbot/history/:conversation_id",
            get(handlers::handle_history),
        )
        .route(
            "/chatbot/conversations/:conversation_id",
            delete(handlers::handle_delete),
        )
        .with_state(state)
}
