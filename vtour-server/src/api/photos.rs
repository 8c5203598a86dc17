//! Photo upload and listing handlers
//!
//! **[TPS-UP-020]** POST /api/tours/:id/photos accepts up to 50 JPEG/PNG
//! files of at most 10 MB each under the multipart field `photos`. The whole
//! request is validated before anything is persisted, so a rejected upload
//! leaves zero Photo records and zero files behind.
//!
//! A successful upload flips the tour to `processing`/`analysis` and
//! schedules the pipeline exactly once through the supervisor; the response
//! never waits for the run.

use axum::{
    extract::{Multipart, Path, State},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::Serialize;
use vtour_common::events::TourEvent;
use vtour_common::models::{NewPhoto, Photo, TourPatch, TourStatus};

use crate::pipeline::StartError;
use crate::upload::{self, IncomingPhoto, UploadError, MAX_FILES_PER_UPLOAD};
use crate::{
    error::{ApiError, ApiResult},
    AppState,
};

/// POST /api/tours/:id/photos response
#[derive(Debug, Serialize)]
pub struct UploadPhotosResponse {
    pub photos: Vec<Photo>,
    pub message: String,
}

/// POST /api/tours/:id/photos
pub async fn upload_photos(
    State(state): State<AppState>,
    Path(tour_id): Path<i64>,
    mut multipart: Multipart,
) -> ApiResult<Json<UploadPhotosResponse>> {
    let tour = state
        .store
        .tour(tour_id)
        .await
        .ok_or_else(|| ApiError::NotFound(format!("Tour not found: {tour_id}")))?;

    // Collect and validate every part before touching disk or store
    let mut incoming: Vec<IncomingPhoto> = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Malformed multipart body: {e}")))?
    {
        if field.name() != Some("photos") {
            continue;
        }

        if incoming.len() == MAX_FILES_PER_UPLOAD {
            return Err(UploadError::TooManyFiles {
                count: incoming.len() + 1,
            }
            .into());
        }

        let original_name = field.file_name().unwrap_or("photo").to_string();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Failed to read upload: {e}")))?
            .to_vec();

        let photo = IncomingPhoto {
            original_name,
            content_type,
            bytes,
        };
        photo.validate()?;
        incoming.push(photo);
    }

    if incoming.is_empty() {
        return Err(UploadError::NoFiles.into());
    }

    let count = incoming.len();
    let mut photos = Vec::with_capacity(count);
    for photo in incoming {
        let filename = upload::unique_filename(&photo.original_name);
        upload::persist(&state.uploads_dir, &filename, &photo.bytes)
            .await
            .map_err(|e| ApiError::Internal(format!("Failed to store upload: {e}")))?;

        let record = state
            .store
            .create_photo(NewPhoto {
                tour_id,
                room_id: None,
                filename: filename.clone(),
                original_name: photo.original_name,
                url: format!("/uploads/{filename}"),
                thumbnail_url: None,
                width: None,
                height: None,
                processed: false,
            })
            .await;
        photos.push(record);
    }

    // Photo-upload completion drives the tour into processing
    state
        .store
        .update_tour(
            tour_id,
            TourPatch {
                total_photos: Some(tour.total_photos + count as u32),
                status: Some(TourStatus::Processing),
                processing_step: Some(vtour_common::models::ProcessingStep::Analysis),
                ..Default::default()
            },
        )
        .await
        .ok_or_else(|| ApiError::NotFound(format!("Tour not found: {tour_id}")))?;

    state.event_bus.emit_lossy(TourEvent::PhotosUploaded {
        tour_id,
        count,
        timestamp: Utc::now(),
    });

    // Fire-and-forget with respect to this response; the supervisor keeps
    // the run joinable and refuses overlapping runs for the same tour.
    match state.supervisor.start(tour_id, state.orchestrator()).await {
        Ok(()) => tracing::info!(tour_id, count, "Processing pipeline scheduled"),
        Err(StartError::AlreadyRunning(_)) => {
            tracing::warn!(tour_id, "Pipeline already running; upload recorded without re-trigger");
        }
    }

    Ok(Json(UploadPhotosResponse {
        photos,
        message: format!("{count} photos uploaded successfully"),
    }))
}

/// GET /api/tours/:id/photos
///
/// Empty array when the tour has no photos (or does not exist).
pub async fn list_photos(
    State(state): State<AppState>,
    Path(tour_id): Path<i64>,
) -> ApiResult<Json<Vec<Photo>>> {
    Ok(Json(state.store.photos_by_tour(tour_id).await))
}

/// Build photo routes
pub fn photo_routes() -> Router<AppState> {
    Router::new().route(
        "/api/tours/:id/photos",
        post(upload_photos).get(list_photos),
    )
}
