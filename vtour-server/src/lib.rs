//! vtour-server library interface
//!
//! Exposes the application state and router for integration testing.

pub mod api;
pub mod error;
pub mod pipeline;
pub mod store;
pub mod upload;

pub use crate::error::{ApiError, ApiResult};

use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::Router;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tower_http::{services::ServeDir, trace::TraceLayer};
use vtour_common::events::EventBus;

use crate::pipeline::{
    PipelineOrchestrator, PipelineSupervisor, RoomDetector, SimulatedRoomDetector, StageSchedule,
};
use crate::store::TourStore;

/// Whole-request body cap for photo uploads: 50 files x 10 MB plus multipart
/// framing overhead.
const UPLOAD_BODY_LIMIT: usize = 50 * 10 * 1024 * 1024 + 1024 * 1024;

/// Application state shared across handlers
///
/// The store and supervisor are explicit objects injected here rather than
/// module-level singletons, so every test can build an isolated instance.
#[derive(Clone)]
pub struct AppState {
    /// In-memory entity store **[TPS-ST-010]**
    pub store: Arc<TourStore>,
    /// Event bus for SSE broadcasting
    pub event_bus: EventBus,
    /// Tracked pipeline runs **[TPS-WF-040]**
    pub supervisor: Arc<PipelineSupervisor>,
    /// Room detection backend used by pipeline runs **[TPS-RD-010]**
    pub detector: Arc<dyn RoomDetector>,
    /// Stage pacing for pipeline runs
    pub schedule: StageSchedule,
    /// Flat directory uploaded originals are written to
    pub uploads_dir: PathBuf,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
    /// Last pipeline failure for diagnostics
    pub last_error: Arc<RwLock<Option<String>>>,
}

impl AppState {
    pub fn new(uploads_dir: PathBuf, event_bus: EventBus) -> Self {
        let last_error = Arc::new(RwLock::new(None));
        Self {
            store: Arc::new(TourStore::new()),
            event_bus,
            supervisor: Arc::new(PipelineSupervisor::new(Arc::clone(&last_error))),
            detector: Arc::new(SimulatedRoomDetector),
            schedule: StageSchedule::default(),
            uploads_dir,
            startup_time: Utc::now(),
            last_error,
        }
    }

    /// Substitute the room detection backend (tests, future CV integration)
    pub fn with_detector(mut self, detector: Arc<dyn RoomDetector>) -> Self {
        self.detector = detector;
        self
    }

    /// Substitute the stage pacing (tests)
    pub fn with_schedule(mut self, schedule: StageSchedule) -> Self {
        self.schedule = schedule;
        self
    }

    /// Build an orchestrator for one pipeline run over this state
    pub fn orchestrator(&self) -> PipelineOrchestrator {
        PipelineOrchestrator::new(
            Arc::clone(&self.store),
            self.event_bus.clone(),
            Arc::clone(&self.detector),
            self.schedule.clone(),
        )
    }
}

/// Build the application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::get;

    let uploads = ServeDir::new(&state.uploads_dir);

    Router::new()
        .merge(api::tour_routes())
        .merge(api::photo_routes())
        .merge(api::room_routes())
        .route("/api/events", get(api::event_stream))
        .merge(api::health_routes())
        .nest_service("/uploads", uploads)
        .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
