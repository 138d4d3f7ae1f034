use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::payments::{BookingsResponse, RawPayment};

/// The booking portal could not supply a batch.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("{class} error from booking portal ({status}): {body}")]
    Status {
        status: u16,
        class: &'static str,
        body: String,
    },
    #[error("failed to reach booking portal: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("failed to decode booking portal response: {0}")]
    Decode(#[source] serde_json::Error),
}

impl UpstreamError {
    pub fn status(status: u16, body: impl Into<String>) -> Self {
        let class = match status {
            400..=499 => "client",
            500..=599 => "server",
            _ => "unexpected",
        };
        UpstreamError::Status {
            status,
            class,
            body: body.into(),
        }
    }
}

/// A payment carries a value that cannot be classified.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("payment `{reference}` has unusable field `{field}`: {reason}")]
pub struct InvalidRecordError {
    pub reference: String,
    pub field: &'static str,
    pub reason: &'static str,
}

impl InvalidRecordError {
    pub fn missing(payment: &RawPayment, field: &'static str) -> Self {
        Self::new(payment, field, "value is missing")
    }

    pub fn overflow(payment: &RawPayment, field: &'static str) -> Self {
        Self::new(payment, field, "fee computation overflows")
    }

    fn new(payment: &RawPayment, field: &'static str, reason: &'static str) -> Self {
        Self {
            reference: payment.reference_or_placeholder().to_string(),
            field,
            reason,
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("failed to retrieve booking portal data: {0}")]
    Upstream(#[from] UpstreamError),
    #[error("invalid booking record: {0}")]
    InvalidRecord(#[from] InvalidRecordError),
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Upstream(_) => StatusCode::FAILED_DEPENDENCY,
            AppError::InvalidRecord(_) | AppError::Unexpected(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        tracing::error!(?self, status = status.as_u16(), "bookings request failed");
        (
            status,
            Json(BookingsResponse::failure(status, self.to_string())),
        )
            .into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
