use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use ledger_core::LedgerError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error("invalid request body: {0}")]
    Body(#[from] JsonRejection),
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::Ledger(LedgerError::MalformedInput(msg.into()))
    }

    fn status(&self) -> StatusCode {
        match self {
            ApiError::Ledger(LedgerError::MalformedInput(_)) | ApiError::Body(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Ledger(LedgerError::EmptyChain) | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(e: tokio::task::JoinError) -> Self {
        ApiError::Internal(e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
