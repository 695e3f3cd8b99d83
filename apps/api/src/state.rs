use crate::chat::manager::ConversationManager;

/// Shared application state injected into all route handlers via Axum extractors.
/// The store and the completion client live inside the manager.
#[derive(Clone)]
pub struct AppState {
    pub chat: ConversationManager,
}
