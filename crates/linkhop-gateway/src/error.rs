use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use linkhop_redirector::RedirectorError;
use linkhop_shortener::ShortenerError;
use thiserror::Error;
use tracing::error;

use crate::model::ErrorResponse;

pub type Result<T> = std::result::Result<T, AppError>;

pub const LONG_URL_REQUIRED: &str = "long_url is required";
pub const CAPACITY_EXHAUSTED: &str = "Failed to generate unique short code after multiple attempts";
pub const INTERNAL_SERVER_ERROR: &str = "Internal Server Error";

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Shortener(#[from] ShortenerError),
    #[error(transparent)]
    Redirector(#[from] RedirectorError),
    #[error("long_url is required")]
    LongUrlRequired,
}

impl AppError {
    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            AppError::LongUrlRequired => (StatusCode::BAD_REQUEST, LONG_URL_REQUIRED.to_string()),
            AppError::Shortener(ShortenerError::InvalidInput(message)) => {
                (StatusCode::BAD_REQUEST, message.clone())
            }
            AppError::Shortener(ShortenerError::CapacityExhausted { .. }) => (
                StatusCode::SERVICE_UNAVAILABLE,
                CAPACITY_EXHAUSTED.to_string(),
            ),
            AppError::Redirector(RedirectorError::NotFound(_)) => {
                (StatusCode::NOT_FOUND, "Not Found".to_string())
            }
            AppError::Shortener(ShortenerError::Storage(_))
            | AppError::Redirector(RedirectorError::Storage(_)) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                INTERNAL_SERVER_ERROR.to_string(),
            ),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();
        if status.is_server_error() {
            error!(error = %self, status = status.as_u16(), "request failed");
        }
        (status, Json(ErrorResponse { error: message })).into_response()
    }
}
