use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::ACCEPT;
use tracing::{debug, warn};
use url::Url;

use crate::config;
use crate::error::UpstreamError;
use crate::payments::{PortalBookings, RawPayment};

pub const BOOKINGS_PATH: &str = "api/bookings";

/// Supplies the batch of payments to annotate.
#[async_trait]
pub trait BookingSource: Send + Sync {
    async fn fetch_batch(&self) -> Result<Vec<RawPayment>, UpstreamError>;
}

/// HTTP client for the booking portal. Failed calls are reported, never
/// retried.
#[derive(Clone)]
pub struct PortalClient {
    client: reqwest::Client,
    base_url: Url,
}

impl PortalClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .with_context(|| format!("invalid booking portal url `{base_url}`"))?;
        let client = reqwest::Client::builder()
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()
            .context("failed to build booking portal client")?;
        Ok(Self { client, base_url })
    }

    pub fn from_env() -> Result<Self> {
        Self::new(
            config::BOOKING_PORTAL_BASE_URL.as_str(),
            config::booking_portal_timeout(),
        )
    }

    fn endpoint(&self, path: &str) -> String {
        let path = path.trim_start_matches('/');
        format!("{}/{}", self.base_url.as_str().trim_end_matches('/'), path)
    }

    pub async fn fetch_portal_bookings(&self) -> Result<PortalBookings, UpstreamError> {
        let url = self.endpoint(BOOKINGS_PATH);
        let response = self
            .client
            .get(&url)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(UpstreamError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(%url, status = status.as_u16(), %body, "booking portal rejected request");
            return Err(UpstreamError::status(status.as_u16(), body));
        }

        let body = response.bytes().await.map_err(UpstreamError::Transport)?;
        // An empty 200 is treated as an empty batch.
        if body.iter().all(u8::is_ascii_whitespace) {
            debug!(%url, "booking portal returned an empty body");
            return Ok(PortalBookings::default());
        }
        serde_json::from_slice(&body).map_err(UpstreamError::Decode)
    }
}

#[async_trait]
impl BookingSource for PortalClient {
    async fn fetch_batch(&self) -> Result<Vec<RawPayment>, UpstreamError> {
        let bookings = self.fetch_portal_bookings().await?;
        Ok(bookings.bookings.unwrap_or_default())
    }
}
