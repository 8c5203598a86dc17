//! # VTour Viewer Client
//!
//! Client-held state for the tour viewer: which screen is shown, which tour
//! is active, which room is in view, and the local upload queue. All state
//! mutation goes through a reducer-style transition function so the UI layer
//! stays a pure projection of [`state::ViewerState`].
//!
//! The crate also ships the HTTP client and the polling driver that follow
//! the tour processing service's polling contract.

pub mod client;
pub mod poll;
pub mod progress;
pub mod state;

pub use client::{ClientError, TourClient};
pub use poll::{PollSchedule, TourPoller};
pub use progress::{step_progress_percent, step_status, StepStatus, PIPELINE_STEPS};
pub use state::{PendingFile, Section, ViewerAction, ViewerState};
