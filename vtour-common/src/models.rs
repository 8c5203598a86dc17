//! Entity models for the tour processing lifecycle
//!
//! **[TPS-DM-010]** Tour is the aggregate root; Room and Photo are owned by
//! Tour. Wire format is camelCase JSON with lowercase status/step strings so
//! existing clients of the HTTP API keep working unchanged.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// **[TPS-DM-020]** Tour lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TourStatus {
    /// Created, waiting for photos
    Uploading,
    /// Photos received, pipeline running
    Processing,
    /// Pipeline finished successfully (terminal)
    Completed,
    /// Pipeline aborted (terminal)
    Failed,
}

/// **[TPS-DM-030]** Pipeline stage marker stored on the tour record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessingStep {
    /// Initial step before any pipeline run
    Upload,
    /// Room detection over the uploaded photos
    Analysis,
    /// Depth estimation
    Depth,
    /// Tour assembly and navigation setup
    Assembly,
    /// Terminal success marker
    Completed,
    /// Terminal failure marker
    Failed,
}

impl TourStatus {
    /// Terminal states never transition again
    pub fn is_terminal(&self) -> bool {
        matches!(self, TourStatus::Completed | TourStatus::Failed)
    }
}

/// One virtual-tour generation job (aggregate root)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tour {
    pub id: i64,
    pub title: String,
    pub status: TourStatus,
    pub total_photos: u32,
    pub processed_photos: u32,
    pub processing_step: ProcessingStep,
    /// Set once at creation, immutable afterwards
    pub created_at: DateTime<Utc>,
    /// None until terminal success
    pub completed_at: Option<DateTime<Utc>>,
}

/// A detected sub-space of a Tour, carrying a navigation identity in the viewer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: i64,
    pub tour_id: i64,
    pub name: String,
    /// Enum-like free text: living_room, kitchen, bedroom, bathroom, ...
    #[serde(rename = "type")]
    pub room_type: String,
    /// Detection confidence, 0-100
    pub confidence: u8,
    pub photo_count: u32,
    pub thumbnail_url: Option<String>,
}

/// One uploaded source image belonging to a Tour and optionally a Room
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Photo {
    pub id: i64,
    pub tour_id: i64,
    /// Never assigned by the pipeline; reserved for a future assignment policy
    pub room_id: Option<i64>,
    pub filename: String,
    pub original_name: String,
    pub url: String,
    pub thumbnail_url: Option<String>,
    /// None until measured
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub processed: bool,
    /// Stamped by the store at creation, immutable afterwards
    pub uploaded_at: DateTime<Utc>,
}

/// Creation payload for a Tour (id/createdAt/completedAt are store-assigned)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTour {
    pub title: String,
    #[serde(default = "default_tour_status")]
    pub status: TourStatus,
    #[serde(default)]
    pub total_photos: u32,
    #[serde(default)]
    pub processed_photos: u32,
    #[serde(default = "default_processing_step")]
    pub processing_step: ProcessingStep,
}

fn default_tour_status() -> TourStatus {
    TourStatus::Uploading
}

fn default_processing_step() -> ProcessingStep {
    ProcessingStep::Upload
}

/// Creation payload for a Room (id is store-assigned)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRoom {
    pub tour_id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub room_type: String,
    pub confidence: u8,
    pub photo_count: u32,
    pub thumbnail_url: Option<String>,
}

/// Creation payload for a Photo (id/uploadedAt are store-assigned)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPhoto {
    pub tour_id: i64,
    pub room_id: Option<i64>,
    pub filename: String,
    pub original_name: String,
    pub url: String,
    pub thumbnail_url: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub processed: bool,
}

/// **[TPS-DM-040]** Shallow partial update for a Tour
///
/// `None` fields are left unchanged. The store applies patches verbatim and
/// does NOT validate status transitions; transition discipline belongs to the
/// pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TourPatch {
    pub title: Option<String>,
    pub status: Option<TourStatus>,
    pub total_photos: Option<u32>,
    pub processed_photos: Option<u32>,
    pub processing_step: Option<ProcessingStep>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl TourPatch {
    /// Merge the present fields into `tour`
    pub fn apply_to(&self, tour: &mut Tour) {
        if let Some(title) = &self.title {
            tour.title = title.clone();
        }
        if let Some(status) = self.status {
            tour.status = status;
        }
        if let Some(total) = self.total_photos {
            tour.total_photos = total;
        }
        if let Some(processed) = self.processed_photos {
            tour.processed_photos = processed;
        }
        if let Some(step) = self.processing_step {
            tour.processing_step = step;
        }
        if let Some(completed_at) = self.completed_at {
            tour.completed_at = Some(completed_at);
        }
    }
}

/// Shallow partial update for a Room
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RoomPatch {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub room_type: Option<String>,
    pub confidence: Option<u8>,
    pub photo_count: Option<u32>,
    pub thumbnail_url: Option<String>,
}

impl RoomPatch {
    pub fn apply_to(&self, room: &mut Room) {
        if let Some(name) = &self.name {
            room.name = name.clone();
        }
        if let Some(room_type) = &self.room_type {
            room.room_type = room_type.clone();
        }
        if let Some(confidence) = self.confidence {
            room.confidence = confidence;
        }
        if let Some(photo_count) = self.photo_count {
            room.photo_count = photo_count;
        }
        if let Some(thumbnail_url) = &self.thumbnail_url {
            room.thumbnail_url = Some(thumbnail_url.clone());
        }
    }
}

/// Shallow partial update for a Photo
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PhotoPatch {
    pub room_id: Option<i64>,
    pub thumbnail_url: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub processed: Option<bool>,
}

impl PhotoPatch {
    pub fn apply_to(&self, photo: &mut Photo) {
        if let Some(room_id) = self.room_id {
            photo.room_id = Some(room_id);
        }
        if let Some(thumbnail_url) = &self.thumbnail_url {
            photo.thumbnail_url = Some(thumbnail_url.clone());
        }
        if let Some(width) = self.width {
            photo.width = Some(width);
        }
        if let Some(height) = self.height {
            photo.height = Some(height);
        }
        if let Some(processed) = self.processed {
            photo.processed = processed;
        }
    }
}
