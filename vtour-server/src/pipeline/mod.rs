//! Tour processing pipeline
//!
//! **[TPS-WF-010]** Coordinates the simulated processing workflow through all
//! stages:
//!
//! ANALYSIS → DEPTH → ASSEMBLY → COMPLETED
//!
//! Each stage is handled by a dedicated `phase_*` method in its own module.
//! A stage waits its fixed simulated duration, then applies exactly one
//! atomic update to the tour record. The analysis stage additionally runs the
//! [`RoomDetector`] once and bulk-creates the detected rooms.
//!
//! Any error at any stage is terminal for the run: the supervisor converts it
//! into `status = failed, processingStep = failed` and never retries.
//! Updates to a single tour are strictly sequential because each stage is
//! awaited in sequence within one run; across tours no ordering exists.

pub mod detector;
pub mod supervisor;

mod phase_analysis;
mod phase_assembly;
mod phase_completion;
mod phase_depth;

pub use detector::{RoomDetector, RoomDraft, SimulatedRoomDetector};
pub use supervisor::{PipelineSupervisor, StartError};

use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use chrono::Utc;
use tokio_util::sync::CancellationToken;
use vtour_common::events::{EventBus, TourEvent};
use vtour_common::models::ProcessingStep;

use crate::store::TourStore;

/// Fixed per-stage timing for the simulated workflow
///
/// The defaults reproduce the production pacing; tests construct faster
/// schedules. `stage_timeout` bounds each stage wall-clock (simulated wait
/// plus stage work) so a wedged detector cannot hang a run forever.
#[derive(Debug, Clone)]
pub struct StageSchedule {
    pub analysis: Duration,
    pub depth: Duration,
    pub assembly: Duration,
    pub completion: Duration,
    pub stage_timeout: Duration,
}

impl Default for StageSchedule {
    fn default() -> Self {
        Self {
            analysis: Duration::from_secs(2),
            depth: Duration::from_secs(3),
            assembly: Duration::from_secs(2),
            completion: Duration::from_secs(1),
            stage_timeout: Duration::from_secs(30),
        }
    }
}

impl StageSchedule {
    /// Zero simulated waits; used by tests that only care about sequencing
    pub fn immediate() -> Self {
        Self {
            analysis: Duration::ZERO,
            depth: Duration::ZERO,
            assembly: Duration::ZERO,
            completion: Duration::ZERO,
            stage_timeout: Duration::from_secs(5),
        }
    }
}

/// Processed-photo target after a stage, scaled by the tour's actual total
///
/// Analysis covers the first third, depth the second, assembly and completion
/// the full set. Rounding up keeps the counter monotonic and the scaled
/// values never exceed the total.
pub(crate) fn processed_after(step: ProcessingStep, total_photos: u32) -> u32 {
    match step {
        ProcessingStep::Analysis => (total_photos + 2) / 3,
        ProcessingStep::Depth => (2 * total_photos + 2) / 3,
        _ => total_photos,
    }
}

/// One pipeline run per tour, executing the staged workflow
pub struct PipelineOrchestrator {
    store: Arc<TourStore>,
    event_bus: EventBus,
    detector: Arc<dyn RoomDetector>,
    schedule: StageSchedule,
}

impl PipelineOrchestrator {
    pub fn new(
        store: Arc<TourStore>,
        event_bus: EventBus,
        detector: Arc<dyn RoomDetector>,
        schedule: StageSchedule,
    ) -> Self {
        Self {
            store,
            event_bus,
            detector,
            schedule,
        }
    }

    /// Execute the complete workflow for `tour_id`
    ///
    /// **[TPS-WF-010]** Progress through all stages in order
    /// **[TPS-WF-030]** Respects the cancellation token between and during
    /// stage waits; cancellation surfaces as an error and therefore ends in
    /// the terminal failed state like any other stage error.
    pub async fn execute(&self, tour_id: i64, cancel: CancellationToken) -> Result<()> {
        let tour = self
            .store
            .tour(tour_id)
            .await
            .ok_or_else(|| anyhow!("tour {tour_id} not found at pipeline start"))?;

        tracing::info!(
            tour_id,
            total_photos = tour.total_photos,
            "Starting processing pipeline"
        );
        self.event_bus.emit_lossy(TourEvent::ProcessingStarted {
            tour_id,
            total_photos: tour.total_photos,
            timestamp: Utc::now(),
        });

        self.run_bounded("analysis", self.phase_analysis(tour_id, &cancel))
            .await?;
        self.run_bounded("depth", self.phase_depth(tour_id, &cancel))
            .await?;
        self.run_bounded("assembly", self.phase_assembly(tour_id, &cancel))
            .await?;
        self.run_bounded("completion", self.phase_completion(tour_id, &cancel))
            .await?;

        tracing::info!(tour_id, "Processing pipeline completed");
        Ok(())
    }

    /// Convert a run error into the terminal failed state
    ///
    /// **[TPS-WF-020]** Pipeline errors never propagate to the request that
    /// triggered the run; the tour record is the only failure surface.
    pub async fn handle_failure(&self, tour_id: i64, reason: &str) {
        use vtour_common::models::{TourPatch, TourStatus};

        let patch = TourPatch {
            status: Some(TourStatus::Failed),
            processing_step: Some(ProcessingStep::Failed),
            ..Default::default()
        };
        if self.store.update_tour(tour_id, patch).await.is_none() {
            tracing::error!(tour_id, "Cannot mark unknown tour as failed");
        }

        self.event_bus.emit_lossy(TourEvent::TourFailed {
            tour_id,
            reason: reason.to_string(),
            timestamp: Utc::now(),
        });
    }

    /// Enforce the per-stage wall-clock bound
    async fn run_bounded<F>(&self, stage: &'static str, fut: F) -> Result<()>
    where
        F: std::future::Future<Output = Result<()>>,
    {
        tokio::time::timeout(self.schedule.stage_timeout, fut)
            .await
            .map_err(|_| {
                anyhow!(
                    "{stage} stage exceeded the {:?} wall-clock bound",
                    self.schedule.stage_timeout
                )
            })?
    }

    /// Wait the stage's simulated duration, aborting promptly on cancel
    pub(crate) async fn pace(
        &self,
        duration: Duration,
        cancel: &CancellationToken,
    ) -> Result<()> {
        tokio::select! {
            _ = tokio::time::sleep(duration) => Ok(()),
            _ = cancel.cancelled() => Err(anyhow!("run cancelled")),
        }
    }

    /// Apply the single atomic tour update for a reached stage
    pub(crate) async fn mark_stage(&self, tour_id: i64, step: ProcessingStep) -> Result<u32> {
        use vtour_common::models::TourPatch;

        let total = self
            .store
            .tour(tour_id)
            .await
            .ok_or_else(|| anyhow!("tour {tour_id} disappeared mid-run"))?
            .total_photos;
        let processed = processed_after(step, total);

        self.store
            .update_tour(
                tour_id,
                TourPatch {
                    processing_step: Some(step),
                    processed_photos: Some(processed),
                    ..Default::default()
                },
            )
            .await
            .ok_or_else(|| anyhow!("tour {tour_id} disappeared mid-run"))?;

        self.event_bus.emit_lossy(TourEvent::StageReached {
            tour_id,
            step,
            processed_photos: processed,
            timestamp: Utc::now(),
        });

        Ok(processed)
    }

    pub(crate) fn store(&self) -> &TourStore {
        &self.store
    }

    pub(crate) fn detector(&self) -> &dyn RoomDetector {
        self.detector.as_ref()
    }

    pub(crate) fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    pub(crate) fn schedule(&self) -> &StageSchedule {
        &self.schedule
    }
}
