//! Derived processing-progress computations
//!
//! Pure functions over the polled tour record; the UI never recomputes these
//! inline. Step ordering mirrors the pipeline's visible stages.

use vtour_common::models::{ProcessingStep, Tour, TourStatus};

/// The stages shown to the user while a tour is processing, in order
pub const PIPELINE_STEPS: [ProcessingStep; 3] = [
    ProcessingStep::Analysis,
    ProcessingStep::Depth,
    ProcessingStep::Assembly,
];

/// Display status of one pipeline step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    Completed,
    Active,
    Pending,
}

fn step_ordinal(step: ProcessingStep) -> Option<usize> {
    PIPELINE_STEPS.iter().position(|candidate| *candidate == step)
}

/// Status of `step` for the given tour
pub fn step_status(tour: &Tour, step: ProcessingStep) -> StepStatus {
    if tour.status == TourStatus::Completed {
        return StepStatus::Completed;
    }
    if tour.processing_step == step {
        return StepStatus::Active;
    }

    match (step_ordinal(step), step_ordinal(tour.processing_step)) {
        (Some(this), Some(current)) if this < current => StepStatus::Completed,
        _ => StepStatus::Pending,
    }
}

/// Progress percentage of `step` for the given tour
///
/// The active step scales with the processed-photo counter but is pinned
/// below 100 until the pipeline actually moves on; a tour with no photos
/// reports zero rather than dividing by zero.
pub fn step_progress_percent(tour: &Tour, step: ProcessingStep) -> u8 {
    match step_status(tour, step) {
        StepStatus::Completed => 100,
        StepStatus::Pending => 0,
        StepStatus::Active => {
            if tour.total_photos == 0 {
                return 0;
            }
            let percent =
                (u64::from(tour.processed_photos) * 100) / u64::from(tour.total_photos);
            percent.min(95) as u8
        }
    }
}
