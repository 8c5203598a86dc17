//! In-memory entity store for Tours, Rooms and Photos
//!
//! **[TPS-ST-010]** Keyed storage with create/read/update operations per
//! entity kind, alive for the process lifetime. No transactions; every
//! mutation is a single replace-by-id under the map lock, so no
//! partial-update races are possible.
//!
//! The store is an explicit object constructed once at process start and
//! handed to every handler through application state; tests get isolation by
//! constructing fresh instances.
//!
//! **[TPS-ST-020]** Id counters are per entity kind, start at 1, are strictly
//! increasing, and are never reset or reused after any operation (including
//! failures). Because ids are monotonic, `BTreeMap` iteration order equals
//! insertion order, which keeps the "by foreign key" scans deterministic.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;
use tokio::sync::RwLock;
use vtour_common::models::{
    NewPhoto, NewRoom, NewTour, Photo, PhotoPatch, Room, RoomPatch, Tour, TourPatch,
};

/// In-memory keyed collections with monotonic id assignment
#[derive(Debug)]
pub struct TourStore {
    tours: RwLock<BTreeMap<i64, Tour>>,
    rooms: RwLock<BTreeMap<i64, Room>>,
    photos: RwLock<BTreeMap<i64, Photo>>,
    next_tour_id: AtomicI64,
    next_room_id: AtomicI64,
    next_photo_id: AtomicI64,
}

impl Default for TourStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TourStore {
    pub fn new() -> Self {
        Self {
            tours: RwLock::new(BTreeMap::new()),
            rooms: RwLock::new(BTreeMap::new()),
            photos: RwLock::new(BTreeMap::new()),
            next_tour_id: AtomicI64::new(1),
            next_room_id: AtomicI64::new(1),
            next_photo_id: AtomicI64::new(1),
        }
    }

    // ------------------------------------------------------------------
    // Tours
    // ------------------------------------------------------------------

    /// Create a tour, assigning the next id and stamping `created_at`
    ///
    /// Creation never fails; validation belongs to the HTTP layer.
    pub async fn create_tour(&self, new_tour: NewTour) -> Tour {
        let id = self.next_tour_id.fetch_add(1, Ordering::SeqCst);
        let tour = Tour {
            id,
            title: new_tour.title,
            status: new_tour.status,
            total_photos: new_tour.total_photos,
            processed_photos: new_tour.processed_photos,
            processing_step: new_tour.processing_step,
            created_at: Utc::now(),
            completed_at: None,
        };
        self.tours.write().await.insert(id, tour.clone());
        tour
    }

    pub async fn tour(&self, id: i64) -> Option<Tour> {
        self.tours.read().await.get(&id).cloned()
    }

    /// Shallow-merge `patch` into the tour, returning the updated record
    ///
    /// Returns `None` for an unknown id. Does NOT validate status or step
    /// transitions; transition discipline is the pipeline's responsibility.
    pub async fn update_tour(&self, id: i64, patch: TourPatch) -> Option<Tour> {
        let mut tours = self.tours.write().await;
        let tour = tours.get_mut(&id)?;
        patch.apply_to(tour);
        Some(tour.clone())
    }

    pub async fn tour_count(&self) -> usize {
        self.tours.read().await.len()
    }

    // ------------------------------------------------------------------
    // Rooms
    // ------------------------------------------------------------------

    pub async fn create_room(&self, new_room: NewRoom) -> Room {
        let id = self.next_room_id.fetch_add(1, Ordering::SeqCst);
        let room = Room {
            id,
            tour_id: new_room.tour_id,
            name: new_room.name,
            room_type: new_room.room_type,
            confidence: new_room.confidence,
            photo_count: new_room.photo_count,
            thumbnail_url: new_room.thumbnail_url,
        };
        self.rooms.write().await.insert(id, room.clone());
        room
    }

    /// All rooms belonging to `tour_id`, in insertion order
    pub async fn rooms_by_tour(&self, tour_id: i64) -> Vec<Room> {
        self.rooms
            .read()
            .await
            .values()
            .filter(|room| room.tour_id == tour_id)
            .cloned()
            .collect()
    }

    pub async fn update_room(&self, id: i64, patch: RoomPatch) -> Option<Room> {
        let mut rooms = self.rooms.write().await;
        let room = rooms.get_mut(&id)?;
        patch.apply_to(room);
        Some(room.clone())
    }

    pub async fn room_count(&self) -> usize {
        self.rooms.read().await.len()
    }

    // ------------------------------------------------------------------
    // Photos
    // ------------------------------------------------------------------

    /// Create a photo record, stamping `uploaded_at`
    pub async fn create_photo(&self, new_photo: NewPhoto) -> Photo {
        let id = self.next_photo_id.fetch_add(1, Ordering::SeqCst);
        let photo = Photo {
            id,
            tour_id: new_photo.tour_id,
            room_id: new_photo.room_id,
            filename: new_photo.filename,
            original_name: new_photo.original_name,
            url: new_photo.url,
            thumbnail_url: new_photo.thumbnail_url,
            width: new_photo.width,
            height: new_photo.height,
            processed: new_photo.processed,
            uploaded_at: Utc::now(),
        };
        self.photos.write().await.insert(id, photo.clone());
        photo
    }

    /// All photos belonging to `tour_id`, in insertion order
    pub async fn photos_by_tour(&self, tour_id: i64) -> Vec<Photo> {
        self.photos
            .read()
            .await
            .values()
            .filter(|photo| photo.tour_id == tour_id)
            .cloned()
            .collect()
    }

    /// All photos assigned to `room_id`, in insertion order
    pub async fn photos_by_room(&self, room_id: i64) -> Vec<Photo> {
        self.photos
            .read()
            .await
            .values()
            .filter(|photo| photo.room_id == Some(room_id))
            .cloned()
            .collect()
    }

    pub async fn update_photo(&self, id: i64, patch: PhotoPatch) -> Option<Photo> {
        let mut photos = self.photos.write().await;
        let photo = photos.get_mut(&id)?;
        patch.apply_to(photo);
        Some(photo.clone())
    }

    pub async fn photo_count(&self) -> usize {
        self.photos.read().await.len()
    }
}
