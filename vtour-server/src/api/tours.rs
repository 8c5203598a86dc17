//! Tour API handlers
//!
//! POST /api/tours, GET /api/tours/:id, PATCH /api/tours/:id

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use vtour_common::events::TourEvent;
use vtour_common::models::{NewTour, Tour, TourPatch};

use crate::{
    error::{ApiError, ApiResult},
    AppState,
};

/// POST /api/tours
///
/// Create a tour in the `uploading` state. Ids are store-assigned and
/// strictly increasing.
pub async fn create_tour(
    State(state): State<AppState>,
    Json(new_tour): Json<NewTour>,
) -> ApiResult<Json<Tour>> {
    let tour = state.store.create_tour(new_tour).await;

    tracing::info!(tour_id = tour.id, title = %tour.title, "Tour created");
    state.event_bus.emit_lossy(TourEvent::TourCreated {
        tour_id: tour.id,
        timestamp: Utc::now(),
    });

    Ok(Json(tour))
}

/// GET /api/tours/:id
///
/// The polling contract: clients poll this while the tour is not terminal.
pub async fn get_tour(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Tour>> {
    let tour = state
        .store
        .tour(id)
        .await
        .ok_or_else(|| ApiError::NotFound(format!("Tour not found: {id}")))?;
    Ok(Json(tour))
}

/// PATCH /api/tours/:id
///
/// Partial-update passthrough to the store. The store merges whatever fields
/// are present without validating transitions.
pub async fn patch_tour(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(patch): Json<TourPatch>,
) -> ApiResult<Json<Tour>> {
    let tour = state
        .store
        .update_tour(id, patch)
        .await
        .ok_or_else(|| ApiError::NotFound(format!("Tour not found: {id}")))?;
    Ok(Json(tour))
}

/// Build tour routes
pub fn tour_routes() -> Router<AppState> {
    Router::new()
        .route("/api/tours", post(create_tour))
        .route("/api/tours/:id", get(get_tour).patch(patch_tour))
}
