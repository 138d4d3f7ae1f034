use axum::http::StatusCode;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::quality::QualityFindings;

/// Reference used in logs and errors when the portal omits one.
pub const UNREFERENCED: &str = "<unreferenced>";

/// Payment record as delivered by the booking portal.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct RawPayment {
    #[serde(default)]
    pub reference: Option<String>,
    /// Principal owed before fees.
    #[serde(default)]
    pub amount: Option<Decimal>,
    #[serde(default)]
    pub amount_received: Option<Decimal>,
    #[serde(default)]
    pub country_from: Option<String>,
    #[serde(default)]
    pub sender_full_name: Option<String>,
    #[serde(default)]
    pub sender_address: Option<String>,
    #[serde(default)]
    pub school: Option<String>,
    #[serde(default)]
    pub currency_from: Option<String>,
    #[serde(default)]
    pub student_id: Option<i32>,
    /// Contact address; expected to look like an email.
    #[serde(default)]
    pub email: Option<String>,
}

impl RawPayment {
    pub fn reference_or_placeholder(&self) -> &str {
        self.reference.as_deref().unwrap_or(UNREFERENCED)
    }
}

/// Envelope returned by `GET /api/bookings` on the portal.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct PortalBookings {
    #[serde(default)]
    pub bookings: Option<Vec<RawPayment>>,
}

/// One annotated record, in the same position as its [`RawPayment`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotatedPayment {
    pub reference: Option<String>,
    #[serde(with = "rust_decimal::serde::arbitrary_precision_option")]
    pub amount: Option<Decimal>,
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub amount_with_fees: Decimal,
    #[serde(with = "rust_decimal::serde::arbitrary_precision_option")]
    pub amount_received: Option<Decimal>,
    pub quality_check: QualityFindings,
    pub over_payment: bool,
    pub under_payment: bool,
}

/// Body of every `/payments_with_quality_check` response, success or failure.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingsResponse {
    pub status: u16,
    pub http_status: String,
    pub message: String,
    pub bookings: Option<Vec<AnnotatedPayment>>,
}

impl BookingsResponse {
    pub fn success(bookings: Vec<AnnotatedPayment>) -> Self {
        Self::with_status(StatusCode::OK, "SUCCESS", Some(bookings))
    }

    pub fn failure(status: StatusCode, message: impl Into<String>) -> Self {
        Self::with_status(status, message, None)
    }

    fn with_status(
        status: StatusCode,
        message: impl Into<String>,
        bookings: Option<Vec<AnnotatedPayment>>,
    ) -> Self {
        Self {
            status: status.as_u16(),
            http_status: status_constant(status),
            message: message.into(),
            bookings,
        }
    }
}

/// `424 Failed Dependency` -> `FAILED_DEPENDENCY`.
fn status_constant(status: StatusCode) -> String {
    status
        .canonical_reason()
        .unwrap_or("UNKNOWN")
        .to_ascii_uppercase()
        .replace(|c: char| c == ' ' || c == '-', "_")
}
