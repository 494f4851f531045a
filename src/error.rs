use sea_orm::DbErr;
use thiserror::Error;
use uuid::Uuid;

use crate::models::payment::PaymentStatus;

pub type Result<T> = std::result::Result<T, PaymentError>;

#[derive(Error, Debug)]
pub enum PaymentError {
    /// Rejected input; nothing was persisted
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Payment {id} cannot move from {from} to {to}")]
    InvalidTransition {
        id: Uuid,
        from: PaymentStatus,
        to: PaymentStatus,
    },

    /// Persistence unavailable or rejected the operation; safe for the caller to retry
    #[error("Storage error: {0}")]
    Storage(#[from] DbErr),
}

impl PaymentError {
    pub fn validation(msg: impl Into<String>) -> Self {
        PaymentError::Validation(msg.into())
    }
}

impl PaymentError {
    /// HTTP status the API answers with for this error
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;

        match self {
            PaymentError::Validation(_) => StatusCode::BAD_REQUEST,
            PaymentError::InvalidTransition { .. } => StatusCode::CONFLICT,
            PaymentError::Storage(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}
