// Chatbot conversations: session lifecycle, message pipeline, HTTP handlers.
// All completion calls go through the injected `CompletionClient`.

pub mod handlers;
pub mod ids;
pub mod manager;
