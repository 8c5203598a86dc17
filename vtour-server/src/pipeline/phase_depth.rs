//! Stage 2: DEPTH
//!
//! Simulated depth estimation. The stage only advances the tour record.

use super::PipelineOrchestrator;
use anyhow::Result;
use tokio_util::sync::CancellationToken;
use vtour_common::models::ProcessingStep;

impl PipelineOrchestrator {
    pub(super) async fn phase_depth(
        &self,
        tour_id: i64,
        cancel: &CancellationToken,
    ) -> Result<()> {
        self.pace(self.schedule().depth, cancel).await?;

        let processed = self.mark_stage(tour_id, ProcessingStep::Depth).await?;
        tracing::info!(tour_id, processed, "Stage 2: DEPTH - depth estimation");
        Ok(())
    }
}
