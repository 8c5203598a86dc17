//! Stage 3: ASSEMBLY
//!
//! Simulated tour assembly and navigation setup.

use super::PipelineOrchestrator;
use anyhow::Result;
use tokio_util::sync::CancellationToken;
use vtour_common::models::ProcessingStep;

impl PipelineOrchestrator {
    pub(super) async fn phase_assembly(
        &self,
        tour_id: i64,
        cancel: &CancellationToken,
    ) -> Result<()> {
        self.pace(self.schedule().assembly, cancel).await?;

        let processed = self.mark_stage(tour_id, ProcessingStep::Assembly).await?;
        tracing::info!(tour_id, processed, "Stage 3: ASSEMBLY - tour assembly");
        Ok(())
    }
}
