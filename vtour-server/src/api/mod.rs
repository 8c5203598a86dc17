//! HTTP API handlers for vtour-server

pub mod events;
pub mod health;
pub mod photos;
pub mod rooms;
pub mod tours;

pub use events::event_stream;
pub use health::health_routes;
pub use photos::photo_routes;
pub use rooms::room_routes;
pub use tours::tour_routes;
