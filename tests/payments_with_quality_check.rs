use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use bookings_quality::error::UpstreamError;
use bookings_quality::payments::RawPayment;
use bookings_quality::portal::BookingSource;
use bookings_quality::quality::QualityAnnotator;
use bookings_quality::routes;
use bookings_quality::service::BookingsService;
use rust_decimal_macros::dec;
use serde_json::{json, Value};
use tower::ServiceExt;

struct StaticSource(Vec<RawPayment>);

#[async_trait]
impl BookingSource for StaticSource {
    async fn fetch_batch(&self) -> Result<Vec<RawPayment>, UpstreamError> {
        Ok(self.0.clone())
    }
}

struct FailingSource;

#[async_trait]
impl BookingSource for FailingSource {
    async fn fetch_batch(&self) -> Result<Vec<RawPayment>, UpstreamError> {
        Err(UpstreamError::status(500, "portal exploded"))
    }
}

fn app(source: impl BookingSource + 'static) -> Router {
    let service = BookingsService::new(Arc::new(source), QualityAnnotator::default());
    routes::app(Arc::new(service))
}

async fn get_payments(app: Router) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .uri("/payments_with_quality_check")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let body = hyper::body::to_bytes(response.into_body()).await.unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

fn payment(reference: &str, student_id: i32, amount: i64, received: i64) -> RawPayment {
    RawPayment {
        reference: Some(reference.into()),
        amount: Some(amount.into()),
        amount_received: Some(received.into()),
        school: Some("UTA".into()),
        student_id: Some(student_id),
        email: Some("joe@self.com".into()),
        ..Default::default()
    }
}

#[tokio::test]
async fn single_settled_payment_has_no_findings() {
    let (status, body) = get_payments(app(StaticSource(vec![payment("ref-1", 1, 100, 105)]))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], json!(200));
    assert_eq!(body["httpStatus"], json!("OK"));
    assert_eq!(body["message"], json!("SUCCESS"));
    let booking = &body["bookings"][0];
    assert_eq!(booking["reference"], json!("ref-1"));
    assert_eq!(booking["amount"], json!(100));
    assert_eq!(booking["amountWithFees"], json!(105));
    assert_eq!(booking["amountReceived"], json!(105));
    assert!(booking["qualityCheck"].is_null());
    assert_eq!(booking["overPayment"], json!(false));
    assert_eq!(booking["underPayment"], json!(false));
}

#[tokio::test]
async fn fee_tiers_and_balances_are_reported_in_order() {
    let batch = vec![
        payment("low", 1, 100, 100),
        payment("middle", 2, 1100, 1133),
        payment("upper", 3, 11100, 12000),
    ];
    let (status, body) = get_payments(app(StaticSource(batch))).await;

    assert_eq!(status, StatusCode::OK);
    let bookings = body["bookings"].as_array().unwrap();
    assert_eq!(bookings.len(), 3);

    assert_eq!(bookings[0]["reference"], json!("low"));
    assert_eq!(bookings[0]["amountWithFees"], json!(105));
    assert_eq!(bookings[0]["underPayment"], json!(true));
    assert_eq!(bookings[0]["overPayment"], json!(false));

    assert_eq!(bookings[1]["reference"], json!("middle"));
    assert_eq!(bookings[1]["amountWithFees"], json!(1133));
    assert_eq!(bookings[1]["underPayment"], json!(false));
    assert_eq!(bookings[1]["overPayment"], json!(false));

    assert_eq!(bookings[2]["reference"], json!("upper"));
    assert_eq!(bookings[2]["amountWithFees"], json!(11322));
    assert_eq!(bookings[2]["overPayment"], json!(true));
}

#[tokio::test]
async fn all_findings_are_joined_in_fixed_order() {
    let mut flagged = payment("flagged", 123, 100, 0);
    flagged.amount_received = Some(dec!(110000000));
    flagged.email = Some("not-an-address".into());
    let mut twin = flagged.clone();
    twin.reference = Some("twin".into());
    twin.school = Some("uta".into());

    let (status, body) = get_payments(app(StaticSource(vec![flagged, twin]))).await;

    assert_eq!(status, StatusCode::OK);
    for booking in body["bookings"].as_array().unwrap() {
        assert_eq!(
            booking["qualityCheck"],
            json!("InvalidEmail,DuplicatedPayment,AmountThreshold")
        );
    }
}

#[tokio::test]
async fn empty_batch_returns_empty_list() {
    let (status, body) = get_payments(app(StaticSource(vec![]))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["bookings"], json!([]));
}

#[tokio::test]
async fn upstream_failure_maps_to_failed_dependency() {
    let (status, body) = get_payments(app(FailingSource)).await;

    assert_eq!(status, StatusCode::FAILED_DEPENDENCY);
    assert_eq!(body["status"], json!(424));
    assert_eq!(body["httpStatus"], json!("FAILED_DEPENDENCY"));
    assert!(body["message"].as_str().unwrap().contains("portal exploded"));
    assert!(body["bookings"].is_null());
}

#[tokio::test]
async fn unclassifiable_record_maps_to_internal_error() {
    let mut broken = payment("broken", 9, 100, 0);
    broken.amount_received = None;
    let (status, body) = get_payments(app(StaticSource(vec![broken]))).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["httpStatus"], json!("INTERNAL_SERVER_ERROR"));
    assert!(body["message"].as_str().unwrap().contains("broken"));
}
