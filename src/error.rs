//! Service-wide error taxonomy and its HTTP mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::order::OrderStatus;

pub type Result<T> = std::result::Result<T, StoreError>;

/// Every failure a caller can observe. A failed commit surfaces exactly one
/// of these with no partial side effects left behind.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0}")]
    Validation(String),

    #[error("invalid quantity for product {name}")]
    InvalidQuantity { product_id: Uuid, name: String },

    #[error("product {0} not found")]
    ProductNotFound(Uuid),

    #[error("order {0} not found")]
    OrderNotFound(Uuid),

    #[error("item {0} not in cart")]
    CartItemNotFound(Uuid),

    #[error("insufficient stock for {name}")]
    InsufficientStock { product_id: Uuid, name: String },

    #[error("cart is empty")]
    EmptyOrder,

    #[error("authentication required")]
    Unauthorized,

    #[error("access denied")]
    Forbidden,

    #[error("order cannot move from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    #[error("storage error: {0}")]
    Storage(String),
}

impl StoreError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_)
            | Self::InvalidQuantity { .. }
            | Self::InsufficientStock { .. }
            | Self::EmptyOrder
            | Self::InvalidTransition { .. } => StatusCode::BAD_REQUEST,
            Self::ProductNotFound(_) | Self::OrderNotFound(_) | Self::CartItemNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        Self::Storage(err.to_string())
    }
}

impl IntoResponse for StoreError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "request failed");
        }
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}
