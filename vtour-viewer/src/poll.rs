//! Polling driver for the processing screen
//!
//! **[VWR-PL-010]** While a tour is not terminal the client polls the tour
//! record at a fixed interval, and the room list at a second interval once
//! processing starts. On completion the room list is adopted, a short
//! perceived-completion delay passes, and the section switches to the
//! viewer. A failed tour is terminal immediately: polling stops and no
//! automatic section change happens.

use std::time::Duration;

use vtour_common::models::TourStatus;

use crate::client::{ClientError, TourClient};
use crate::state::{Section, ViewerAction, ViewerState};

/// Fixed polling cadence
#[derive(Debug, Clone)]
pub struct PollSchedule {
    /// Tour record poll interval
    pub tour_interval: Duration,
    /// Room list poll interval while processing
    pub rooms_interval: Duration,
    /// Pause between completion and the switch to the viewer; purely for
    /// perceived-completion UX, not a correctness requirement
    pub viewer_delay: Duration,
}

impl Default for PollSchedule {
    fn default() -> Self {
        Self {
            tour_interval: Duration::from_secs(2),
            rooms_interval: Duration::from_secs(3),
            viewer_delay: Duration::from_secs(1),
        }
    }
}

/// Drives a [`ViewerState`] through the processing screen until the tour is
/// terminal
pub struct TourPoller {
    client: TourClient,
    schedule: PollSchedule,
}

impl TourPoller {
    pub fn new(client: TourClient) -> Self {
        Self {
            client,
            schedule: PollSchedule::default(),
        }
    }

    pub fn with_schedule(mut self, schedule: PollSchedule) -> Self {
        self.schedule = schedule;
        self
    }

    /// Poll until `tour_id` reaches a terminal status
    ///
    /// Returns once the tour completed (after switching the section to the
    /// viewer) or failed (leaving the section untouched so the UI can show
    /// the terminal failure).
    pub async fn run(
        &self,
        state: &mut ViewerState,
        tour_id: i64,
    ) -> Result<TourStatus, ClientError> {
        let mut tour_tick = tokio::time::interval(self.schedule.tour_interval);
        let mut rooms_tick = tokio::time::interval(self.schedule.rooms_interval);

        loop {
            let processing = matches!(
                state.tour.as_ref().map(|tour| tour.status),
                Some(TourStatus::Processing)
            );

            tokio::select! {
                _ = tour_tick.tick() => {
                    let tour = self.client.tour(tour_id).await?;
                    let status = tour.status;
                    state.apply(ViewerAction::TourUpdated(tour));

                    match status {
                        TourStatus::Completed => {
                            let rooms = self.client.rooms(tour_id).await?;
                            state.apply(ViewerAction::RoomsLoaded(rooms));

                            tokio::time::sleep(self.schedule.viewer_delay).await;
                            state.apply(ViewerAction::Navigate(Section::Viewer));
                            return Ok(TourStatus::Completed);
                        }
                        TourStatus::Failed => {
                            tracing::warn!(tour_id, "Tour processing failed; polling stopped");
                            return Ok(TourStatus::Failed);
                        }
                        _ => {}
                    }
                }
                _ = rooms_tick.tick(), if processing => {
                    let rooms = self.client.rooms(tour_id).await?;
                    state.apply(ViewerAction::RoomsLoaded(rooms));
                }
            }
        }
    }
}
