use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::error;
use warble_store::StoreError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("no account named {0}")]
    UnknownLogin(String),

    #[error("user not found: {0}")]
    UnknownUser(String),

    #[error("background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Store(StoreError::NotAuthenticated) => {
                return Redirect::to("/login").into_response();
            }
            AppError::Store(StoreError::DuplicateUsername(_)) => StatusCode::CONFLICT,
            AppError::Store(StoreError::PostNotFound(_) | StoreError::UserNotFound(_)) => {
                StatusCode::NOT_FOUND
            }
            AppError::Store(StoreError::Unauthorized { .. }) => StatusCode::FORBIDDEN,
            AppError::Store(StoreError::InvalidPost(_) | StoreError::InvalidUsername) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Store(StoreError::GuestAllocationExhausted(_)) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            AppError::UnknownLogin(_) => StatusCode::UNAUTHORIZED,
            AppError::UnknownUser(_) => StatusCode::NOT_FOUND,
            AppError::Store(_) | AppError::Join(_) => {
                error!("Request failed: {}", self);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
