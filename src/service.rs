use std::sync::Arc;

use anyhow::Context;
use tracing::{error, info};

use crate::error::{AppError, AppResult};
use crate::payments::BookingsResponse;
use crate::portal::BookingSource;
use crate::quality::QualityAnnotator;

/// Pulls the current batch from the booking source and annotates it.
pub struct BookingsService {
    source: Arc<dyn BookingSource>,
    annotator: QualityAnnotator,
}

impl BookingsService {
    pub fn new(source: Arc<dyn BookingSource>, annotator: QualityAnnotator) -> Self {
        Self { source, annotator }
    }

    pub async fn retrieve_bookings_with_quality_check(&self) -> AppResult<BookingsResponse> {
        let batch = self.source.fetch_batch().await.map_err(|err| {
            error!(?err, "failed to retrieve booking portal data");
            AppError::from(err)
        })?;
        let batch_size = batch.len();
        info!(batch_size, "retrieved booking portal batch");

        // Duplicate detection is quadratic in the batch size.
        let annotator = self.annotator.clone();
        let bookings = tokio::task::spawn_blocking(move || annotator.annotate(&batch))
            .await
            .context("booking annotation task failed")?
            .map_err(|err| {
                error!(%err, "booking batch contains an unclassifiable record");
                AppError::from(err)
            })?;

        let flagged = bookings
            .iter()
            .filter(|booking| !booking.quality_check.is_empty())
            .count();
        info!(batch_size, flagged, "annotated booking batch");
        Ok(BookingsResponse::success(bookings))
    }
}
