//! Room detection capability
//!
//! **[TPS-RD-010]** The pipeline never fabricates rooms itself; it calls a
//! `RoomDetector` exactly once per tour during the analysis stage. The
//! simulated detector below stands in for a real computer-vision classifier
//! and can be swapped without touching pipeline sequencing.

use anyhow::Result;
use rand::Rng;
use vtour_common::models::Photo;

/// A detected room before the store assigns it an id
#[derive(Debug, Clone)]
pub struct RoomDraft {
    pub name: String,
    pub room_type: String,
    /// Detection confidence, 0-100
    pub confidence: u8,
    pub photo_count: u32,
    pub thumbnail_url: Option<String>,
}

/// Classifies uploaded photos into rooms
///
/// Implementations must be cheap to call or internally bounded; the pipeline
/// wraps every stage (detection included) in a wall-clock timeout.
pub trait RoomDetector: Send + Sync {
    fn detect(&self, photos: &[Photo]) -> Result<Vec<RoomDraft>>;
}

/// Simulated detector returning a fixed four-room layout
///
/// Confidences are fixed; per-room photo counts are pseudo-random in [3, 8].
#[derive(Debug, Default)]
pub struct SimulatedRoomDetector;

impl SimulatedRoomDetector {
    const LAYOUT: [(&'static str, &'static str, u8); 4] = [
        ("Living Room", "living_room", 96),
        ("Kitchen", "kitchen", 94),
        ("Master Bedroom", "bedroom", 97),
        ("Bathroom", "bathroom", 91),
    ];
}

impl RoomDetector for SimulatedRoomDetector {
    fn detect(&self, _photos: &[Photo]) -> Result<Vec<RoomDraft>> {
        let mut rng = rand::thread_rng();
        Ok(Self::LAYOUT
            .iter()
            .map(|(name, room_type, confidence)| RoomDraft {
                name: name.to_string(),
                room_type: room_type.to_string(),
                confidence: *confidence,
                photo_count: rng.gen_range(3..=8),
                thumbnail_url: None,
            })
            .collect())
    }
}
