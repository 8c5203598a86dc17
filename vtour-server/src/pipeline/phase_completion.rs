//! Stage 4: COMPLETED
//!
//! Terminal success. One atomic update flips status, step, the processed
//! counter and `completedAt` together so pollers never observe a
//! half-completed tour.

use super::{processed_after, PipelineOrchestrator};
use anyhow::{anyhow, Result};
use chrono::Utc;
use tokio_util::sync::CancellationToken;
use vtour_common::events::TourEvent;
use vtour_common::models::{ProcessingStep, TourPatch, TourStatus};

impl PipelineOrchestrator {
    pub(super) async fn phase_completion(
        &self,
        tour_id: i64,
        cancel: &CancellationToken,
    ) -> Result<()> {
        self.pace(self.schedule().completion, cancel).await?;

        let total = self
            .store()
            .tour(tour_id)
            .await
            .ok_or_else(|| anyhow!("tour {tour_id} disappeared mid-run"))?
            .total_photos;
        let processed = processed_after(ProcessingStep::Completed, total);

        self.store()
            .update_tour(
                tour_id,
                TourPatch {
                    status: Some(TourStatus::Completed),
                    processing_step: Some(ProcessingStep::Completed),
                    processed_photos: Some(processed),
                    completed_at: Some(Utc::now()),
                    ..Default::default()
                },
            )
            .await
            .ok_or_else(|| anyhow!("tour {tour_id} disappeared mid-run"))?;

        tracing::info!(tour_id, processed, "Stage 4: COMPLETED");
        self.event_bus().emit_lossy(TourEvent::StageReached {
            tour_id,
            step: ProcessingStep::Completed,
            processed_photos: processed,
            timestamp: Utc::now(),
        });
        self.event_bus().emit_lossy(TourEvent::TourCompleted {
            tour_id,
            timestamp: Utc::now(),
        });

        Ok(())
    }
}
