use std::sync::OnceLock;

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Map, Value};
use thiserror::Error;

use crate::llm_client::CompletionError;
use crate::store::StoreError;

static EXPOSE_DETAILS: OnceLock<bool> = OnceLock::new();

/// Installs the error-detail switch once at startup. Until called, error
/// bodies never carry `details` or `stack`.
pub fn init_error_details(expose: bool) {
    let _ = EXPOSE_DETAILS.set(expose);
}

fn details_exposed() -> bool {
    EXPOSE_DETAILS.get().copied().unwrap_or(false)
}

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{message}")]
    Validation { code: &'static str, message: String },

    #[error("{message}")]
    Forbidden { code: &'static str, message: String },

    #[error("{message}")]
    NotFound { code: &'static str, message: String },

    #[error("Completion provider error: {0}")]
    Provider(#[from] CompletionError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// A 5xx re-labelled with the operation that failed.
    #[error("{message}")]
    Failed {
        code: &'static str,
        message: &'static str,
        #[source]
        source: Box<AppError>,
    },
}

impl AppError {
    pub fn validation(code: &'static str, message: impl Into<String>) -> Self {
        AppError::Validation {
            code,
            message: message.into(),
        }
    }

    pub fn forbidden(code: &'static str, message: impl Into<String>) -> Self {
        AppError::Forbidden {
            code,
            message: message.into(),
        }
    }

    pub fn user_not_found(user_id: i32) -> Self {
        AppError::NotFound {
            code: "USER_NOT_FOUND",
            message: format!("Usuario {user_id} no encontrado"),
        }
    }

    /// Re-labels internal failures with an operation-level code and message.
    /// Client errors pass through unchanged.
    pub fn fail_as(self, code: &'static str, message: &'static str) -> Self {
        match self {
            AppError::Provider(_) | AppError::Store(_) => AppError::Failed {
                code,
                message,
                source: Box::new(self),
            },
            other => other,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::Forbidden { .. } => StatusCode::FORBIDDEN,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Provider(_) | AppError::Store(_) | AppError::Failed { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation { code, .. }
            | AppError::Forbidden { code, .. }
            | AppError::NotFound { code, .. }
            | AppError::Failed { code, .. } => code,
            AppError::Provider(_) => "PROVIDER_ERROR",
            AppError::Store(_) => "STORE_ERROR",
        }
    }

    fn public_message(&self) -> String {
        match self {
            AppError::Provider(_) => "Ocurrió un error al generar la respuesta".to_string(),
            AppError::Store(_) => "Ocurrió un error de base de datos".to_string(),
            other => other.to_string(),
        }
    }

    /// Renders the standard error body. `details` and `stack` are only
    /// included when `expose_details` is set.
    pub fn to_body(&self, expose_details: bool) -> Value {
        let mut error = Map::new();
        error.insert("code".into(), json!(self.code()));
        error.insert("message".into(), json!(self.public_message()));

        if expose_details {
            let root: &AppError = match self {
                AppError::Failed { source, .. } => source.as_ref(),
                other => other,
            };
            error.insert("details".into(), json!(root.to_string()));
            error.insert("stack".into(), json!(format!("{root:?}")));
        }

        json!({
            "success": false,
            "error": Value::Object(error),
        })
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::validation("INVALID_REQUEST_BODY", rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::validation("INVALID_REQUEST_BODY", rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("{} ({}): {:?}", self.code(), self, self);
        }
        (status, Json(self.to_body(details_exposed()))).into_response()
    }
}
