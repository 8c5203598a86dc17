//! Stage 1: ANALYSIS
//!
//! Room detection over the uploaded photos. The detector is called exactly
//! once per run; its drafts become Room records owned by the tour.

use super::PipelineOrchestrator;
use anyhow::Result;
use chrono::Utc;
use tokio_util::sync::CancellationToken;
use vtour_common::events::TourEvent;
use vtour_common::models::{NewRoom, ProcessingStep};

impl PipelineOrchestrator {
    pub(super) async fn phase_analysis(
        &self,
        tour_id: i64,
        cancel: &CancellationToken,
    ) -> Result<()> {
        self.pace(self.schedule().analysis, cancel).await?;

        let processed = self.mark_stage(tour_id, ProcessingStep::Analysis).await?;
        tracing::info!(tour_id, processed, "Stage 1: ANALYSIS - room detection");

        let photos = self.store().photos_by_tour(tour_id).await;
        let drafts = self.detector().detect(&photos)?;
        let detected = drafts.len();

        for draft in drafts {
            self.store()
                .create_room(NewRoom {
                    tour_id,
                    name: draft.name,
                    room_type: draft.room_type,
                    confidence: draft.confidence,
                    photo_count: draft.photo_count,
                    thumbnail_url: draft.thumbnail_url,
                })
                .await;
        }

        tracing::info!(tour_id, detected, "Room detection complete");
        self.event_bus().emit_lossy(TourEvent::RoomsDetected {
            tour_id,
            count: detected,
            timestamp: Utc::now(),
        });

        Ok(())
    }
}
