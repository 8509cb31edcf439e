use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use crate::models::order::OrderStatus;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("access denied: {0}")]
    Forbidden(String),

    #[error("invalid status transition. Current status: {from}, cannot transition to: {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    #[error("order already assigned to another delivery partner")]
    AlreadyAssigned,

    #[error("order is not ready for pickup. Current status: {current}")]
    NotReady { current: OrderStatus },

    #[error("wallet operation failed: {0}")]
    WalletOperationFailed(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::InvalidTransition { .. }
            | AppError::AlreadyAssigned
            | AppError::NotReady { .. } => StatusCode::CONFLICT,
            AppError::WalletOperationFailed(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}
