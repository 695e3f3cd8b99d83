mod chat;
mod config;
mod context;
mod errors;
mod llm_client;
mod models;
mod routes;
mod state;
mod store;

use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::chat::manager::ConversationManager;
use crate::config::Config;
use crate::context::prompts::SYSTEM_INSTRUCTION;
use crate::llm_client::GeminiClient;
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::postgres::PgChatStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Fails fast on missing DATABASE_URL / GOOGLE_AI_API_KEY
    let config = Config::from_env()?;
    errors::init_error_details(config.environment.exposes_error_details());

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={},tower_http=info",
                env!("CARGO_CRATE_NAME"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting chatbot API v{} ({:?})",
        env!("CARGO_PKG_VERSION"),
        config.environment
    );

    let store = PgChatStore::connect(&config.database_url, config.database_max_connections).await?;
    info!("PostgreSQL pool ready");

    let gemini = GeminiClient::new(
        config.google_ai_api_key.clone(),
        config.gemini_model.clone(),
        config.gemini_base_url.clone(),
        SYSTEM_INSTRUCTION,
    )?;
    info!("Completion client initialized (model: {})", gemini.model());

    let state = AppState {
        chat: ConversationManager::new(Arc::new(store), Arc::new(gemini)),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port)).await?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for ctrl-c: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, draining connections");
}
