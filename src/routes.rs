use std::sync::Arc;

use axum::{extract::Extension, routing::get, Json, Router};

use crate::error::AppResult;
use crate::payments::BookingsResponse;
use crate::service::BookingsService;

pub async fn root() -> &'static str {
    "Bookings Quality API"
}

pub fn api_routes() -> Router {
    Router::new().route(
        "/payments_with_quality_check",
        get(payments_with_quality_check),
    )
}

/// Router with every endpoint except `/metrics`, which `main` attaches
/// together with the Prometheus layer.
pub fn app(service: Arc<BookingsService>) -> Router {
    Router::new()
        .route("/", get(root))
        .merge(api_routes())
        .layer(Extension(service))
}

pub async fn payments_with_quality_check(
    Extension(service): Extension<Arc<BookingsService>>,
) -> AppResult<Json<BookingsResponse>> {
    let response = service.retrieve_bookings_with_quality_check().await?;
    Ok(Json(response))
}
