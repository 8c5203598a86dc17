//! Room listing handler
//!
//! GET /api/tours/:id/rooms. Clients poll this once the tour is processing
//! and adopt the list into the viewer when the tour completes.

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use vtour_common::models::Room;

use crate::{error::ApiResult, AppState};

/// GET /api/tours/:id/rooms
///
/// Empty array when the pipeline has not fabricated rooms yet (or the tour
/// does not exist).
pub async fn list_rooms(
    State(state): State<AppState>,
    Path(tour_id): Path<i64>,
) -> ApiResult<Json<Vec<Room>>> {
    Ok(Json(state.store.rooms_by_tour(tour_id).await))
}

/// Build room routes
pub fn room_routes() -> Router<AppState> {
    Router::new().route("/api/tours/:id/rooms", get(list_rooms))
}
