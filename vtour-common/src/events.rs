//! Event types for the VTour event system
//!
//! Provides shared event definitions and the EventBus used by the processing
//! pipeline to publish progress. Polling the HTTP API remains the primary
//! progress contract; the event stream is an observability channel on top.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::models::ProcessingStep;

/// VTour event types
///
/// Events are broadcast via EventBus and can be serialized for SSE
/// transmission. All events carry the owning tour id and a timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
#[serde(rename_all_fields = "camelCase")]
pub enum TourEvent {
    /// A tour record was created
    TourCreated {
        tour_id: i64,
        timestamp: DateTime<Utc>,
    },

    /// A batch of photos was accepted for a tour
    PhotosUploaded {
        tour_id: i64,
        count: usize,
        timestamp: DateTime<Utc>,
    },

    /// The processing pipeline started for a tour
    ProcessingStarted {
        tour_id: i64,
        total_photos: u32,
        timestamp: DateTime<Utc>,
    },

    /// The pipeline reached a stage and applied its tour update
    StageReached {
        tour_id: i64,
        step: ProcessingStep,
        processed_photos: u32,
        timestamp: DateTime<Utc>,
    },

    /// The analysis stage fabricated room records
    RoomsDetected {
        tour_id: i64,
        count: usize,
        timestamp: DateTime<Utc>,
    },

    /// The pipeline finished successfully (terminal)
    TourCompleted {
        tour_id: i64,
        timestamp: DateTime<Utc>,
    },

    /// The pipeline aborted (terminal); `reason` is a diagnostic string
    TourFailed {
        tour_id: i64,
        reason: String,
        timestamp: DateTime<Utc>,
    },
}

impl TourEvent {
    /// Tour id the event belongs to
    pub fn tour_id(&self) -> i64 {
        match self {
            TourEvent::TourCreated { tour_id, .. }
            | TourEvent::PhotosUploaded { tour_id, .. }
            | TourEvent::ProcessingStarted { tour_id, .. }
            | TourEvent::StageReached { tour_id, .. }
            | TourEvent::RoomsDetected { tour_id, .. }
            | TourEvent::TourCompleted { tour_id, .. }
            | TourEvent::TourFailed { tour_id, .. } => *tour_id,
        }
    }

    /// Event name used as the SSE event type
    pub fn name(&self) -> &'static str {
        match self {
            TourEvent::TourCreated { .. } => "TourCreated",
            TourEvent::PhotosUploaded { .. } => "PhotosUploaded",
            TourEvent::ProcessingStarted { .. } => "ProcessingStarted",
            TourEvent::StageReached { .. } => "StageReached",
            TourEvent::RoomsDetected { .. } => "RoomsDetected",
            TourEvent::TourCompleted { .. } => "TourCompleted",
            TourEvent::TourFailed { .. } => "TourFailed",
        }
    }
}

/// Broadcast bus for [`TourEvent`]s
///
/// Clone-cheap handle over a tokio broadcast channel. Subscribers receive
/// events emitted after subscription; slow subscribers lose the oldest
/// buffered events rather than blocking emitters.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<TourEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus with the specified channel capacity
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    pub fn subscribe(&self) -> broadcast::Receiver<TourEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Ok(subscriber_count)` if at least one subscriber exists.
    #[allow(clippy::result_large_err)]
    pub fn emit(
        &self,
        event: TourEvent,
    ) -> Result<usize, broadcast::error::SendError<TourEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring if no subscribers are listening
    ///
    /// Pipeline progress events are non-critical; it is acceptable if no
    /// component is currently listening.
    pub fn emit_lossy(&self, event: TourEvent) {
        let _ = self.tx.send(event);
    }

    /// Get the current number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Get the configured channel capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
