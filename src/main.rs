use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::routing::get;
use axum_prometheus::PrometheusMetricLayer;
use bookings_quality::config::{self, QualityRules};
use bookings_quality::portal::PortalClient;
use bookings_quality::quality::QualityAnnotator;
use bookings_quality::routes;
use bookings_quality::service::BookingsService;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    let portal = PortalClient::from_env()?;
    let rules = QualityRules::from_env();
    tracing::info!(
        portal = config::BOOKING_PORTAL_BASE_URL.as_str(),
        timeout_ms = *config::BOOKING_PORTAL_TIMEOUT_MS,
        amount_threshold = %rules.amount_threshold,
        "booking portal client configured"
    );
    let service = Arc::new(BookingsService::new(
        Arc::new(portal),
        QualityAnnotator::new(rules),
    ));

    let (prometheus_layer, metrics_handle) = PrometheusMetricLayer::pair();
    let app = routes::app(service)
        .route(
            "/metrics",
            get(move || async move { metrics_handle.render() }),
        )
        .layer(prometheus_layer);

    let addr: SocketAddr = format!("{}:{}", config::BIND_ADDRESS.as_str(), *config::BIND_PORT)
        .parse()
        .context("invalid bind address")?;
    tracing::info!(%addr, "Listening for incoming connections");
    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .await?;

    Ok(())
}
