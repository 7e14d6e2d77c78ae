use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::http::pages;
use crate::order_actor::OrderError;
use crate::product_actor::ProductError;

/// Errors surfaced by HTTP handlers.
#[derive(Debug, Error)]
pub enum AppError {
    /// Rendered exactly like an unknown route.
    #[error("not found")]
    NotFound,
    /// A `{success: false, error}` JSON body with the given status.
    #[error("{message}")]
    Rejected { status: StatusCode, message: String },
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        AppError::Rejected { status: StatusCode::BAD_REQUEST, message: message.into() }
    }

    /// Missing records are reported in-band with a 200.
    pub fn missing(message: impl Into<String>) -> Self {
        AppError::Rejected { status: StatusCode::OK, message: message.into() }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::NotFound => pages::not_found(),
            AppError::Rejected { status, message } => {
                (status, Json(json!({ "success": false, "error": message }))).into_response()
            }
            AppError::Internal(reason) => {
                error!(%reason, "Request failed");
                pages::server_error()
            }
        }
    }
}

impl From<ProductError> for AppError {
    fn from(e: ProductError) -> Self {
        match e {
            ProductError::NotFound(_) => AppError::missing("Product not found"),
            ProductError::ValidationError(reason) => AppError::bad_request(reason),
            ProductError::DatabaseError(_) | ProductError::ActorCommunicationError(_) => {
                AppError::Internal(e.to_string())
            }
        }
    }
}

impl From<OrderError> for AppError {
    fn from(e: OrderError) -> Self {
        match e {
            OrderError::NotFound(_) => AppError::missing("Order not found"),
            OrderError::ValidationError(reason) => AppError::bad_request(reason),
            OrderError::DatabaseError(_) | OrderError::ActorCommunicationError(_) => {
                AppError::Internal(e.to_string())
            }
        }
    }
}

impl From<MultipartError> for AppError {
    fn from(e: MultipartError) -> Self {
        AppError::Rejected { status: e.status(), message: e.body_text() }
    }
}

impl From<std::io::Error> for AppError {
    fn from(e: std::io::Error) -> Self {
        AppError::Internal(e.to_string())
    }
}
