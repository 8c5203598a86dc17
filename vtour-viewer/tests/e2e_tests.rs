//! End-to-end tests: viewer client against a real vtour-server instance
//!
//! Spins the actual router on an ephemeral port and drives the full
//! create → upload → poll → view flow over HTTP.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;
use vtour_common::events::EventBus;
use vtour_common::models::TourStatus;
use vtour_server::pipeline::{RoomDetector, RoomDraft, StageSchedule};
use vtour_server::{build_router, AppState};
use vtour_viewer::{
    PendingFile, PollSchedule, Section, TourClient, TourPoller, ViewerAction, ViewerState,
};

struct FailingDetector;

impl RoomDetector for FailingDetector {
    fn detect(&self, _photos: &[vtour_common::models::Photo]) -> anyhow::Result<Vec<RoomDraft>> {
        Err(anyhow::anyhow!("classifier backend unavailable"))
    }
}

/// Serve `state` on an ephemeral port, returning its address
async fn spawn_server(state: AppState) -> SocketAddr {
    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn fast_poll() -> PollSchedule {
    PollSchedule {
        tour_interval: Duration::from_millis(25),
        rooms_interval: Duration::from_millis(40),
        viewer_delay: Duration::from_millis(10),
    }
}

fn jpeg(name: &str) -> PendingFile {
    PendingFile {
        name: name.to_string(),
        mime: "image/jpeg".to_string(),
        bytes: format!("fake jpeg bytes for {name}").into_bytes(),
    }
}

#[tokio::test]
async fn upload_poll_and_view_flow_reaches_the_viewer_section() {
    let uploads = TempDir::new().unwrap();
    // Short real stage waits: long enough that the tour is observably
    // `processing` right after the upload, short enough to poll to
    // completion quickly.
    let schedule = StageSchedule {
        analysis: Duration::from_millis(100),
        depth: Duration::from_millis(50),
        assembly: Duration::from_millis(50),
        completion: Duration::from_millis(25),
        stage_timeout: Duration::from_secs(5),
    };
    let server_state =
        AppState::new(uploads.path().to_path_buf(), EventBus::new(100)).with_schedule(schedule);
    let addr = spawn_server(server_state).await;

    let client = TourClient::new(format!("http://{addr}"));
    let mut viewer = ViewerState::default();

    // User walks Home -> Upload and queues three photos
    viewer.apply(ViewerAction::Navigate(Section::Upload));
    viewer.apply(ViewerAction::QueueFiles(vec![
        jpeg("one.jpg"),
        jpeg("two.jpg"),
        jpeg("three.jpg"),
    ]));

    let tour = client.create_tour("Lakeside House").await.unwrap();
    assert_eq!(tour.status, TourStatus::Uploading);
    viewer.apply(ViewerAction::TourUpdated(tour.clone()));

    viewer.apply(ViewerAction::UploadStarted);
    let photos = client
        .upload_photos(tour.id, viewer.queued_files.clone())
        .await
        .unwrap();
    assert_eq!(photos.len(), 3);
    viewer.apply(ViewerAction::UploadFinished);
    viewer.apply(ViewerAction::Navigate(Section::Processing));

    // Immediately after the upload response the tour is processing with the
    // full photo count recorded
    let polled = client.tour(tour.id).await.unwrap();
    assert_eq!(polled.total_photos, 3);
    assert_eq!(polled.status, TourStatus::Processing);

    // Poll to terminal; completion adopts the rooms and lands in the viewer
    let poller = TourPoller::new(client.clone()).with_schedule(fast_poll());
    let status = poller.run(&mut viewer, tour.id).await.unwrap();

    assert_eq!(status, TourStatus::Completed);
    assert_eq!(viewer.section, Section::Viewer);
    let names: Vec<&str> = viewer.rooms.iter().map(|room| room.name.as_str()).collect();
    assert_eq!(
        names,
        ["Living Room", "Kitchen", "Master Bedroom", "Bathroom"]
    );
    assert!(viewer.tour.as_ref().unwrap().completed_at.is_some());

    // Cyclic navigation over the adopted rooms
    viewer.apply(ViewerAction::NextRoom);
    assert_eq!(viewer.current_room().unwrap().name, "Kitchen");
    viewer.apply(ViewerAction::PreviousRoom);
    viewer.apply(ViewerAction::PreviousRoom);
    assert_eq!(viewer.current_room().unwrap().name, "Bathroom");
}

#[tokio::test]
async fn failed_processing_stops_polling_without_entering_the_viewer() {
    let uploads = TempDir::new().unwrap();
    let server_state = AppState::new(uploads.path().to_path_buf(), EventBus::new(100))
        .with_schedule(StageSchedule::immediate())
        .with_detector(Arc::new(FailingDetector));
    let addr = spawn_server(server_state).await;

    let client = TourClient::new(format!("http://{addr}"));
    let mut viewer = ViewerState::default();

    let tour = client.create_tour("Doomed").await.unwrap();
    client
        .upload_photos(tour.id, vec![jpeg("only.jpg")])
        .await
        .unwrap();
    viewer.apply(ViewerAction::Navigate(Section::Processing));

    let poller = TourPoller::new(client.clone()).with_schedule(fast_poll());
    let status = poller.run(&mut viewer, tour.id).await.unwrap();

    assert_eq!(status, TourStatus::Failed);
    assert_eq!(viewer.section, Section::Processing, "no automatic switch on failure");
    assert!(viewer.rooms.is_empty());

    let polled = client.tour(tour.id).await.unwrap();
    assert_eq!(polled.status, TourStatus::Failed);
    assert!(polled.completed_at.is_none());
}

#[tokio::test]
async fn unknown_tour_poll_surfaces_not_found() {
    let uploads = TempDir::new().unwrap();
    let server_state = AppState::new(uploads.path().to_path_buf(), EventBus::new(100));
    let addr = spawn_server(server_state).await;

    let client = TourClient::new(format!("http://{addr}"));
    let err = client.tour(999).await.unwrap_err();
    assert!(matches!(err, vtour_viewer::ClientError::NotFound(_)));
}
