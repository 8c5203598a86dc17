//! HTTP API integration tests
//!
//! Exercises the router with in-process requests (no TCP) via
//! `tower::ServiceExt::oneshot`, one fresh state per test.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;
use vtour_common::events::EventBus;
use vtour_server::pipeline::StageSchedule;
use vtour_server::{build_router, AppState};

/// Create test app state backed by a temporary uploads directory
fn test_app_state(uploads: &TempDir) -> AppState {
    AppState::new(uploads.path().to_path_buf(), EventBus::new(100))
        .with_schedule(StageSchedule::immediate())
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

/// Build a multipart/form-data body with one `photos` part per file
fn multipart_request(uri: &str, files: &[(&str, &str, &[u8])]) -> Request<Body> {
    const BOUNDARY: &str = "vtour-test-boundary";

    let mut body: Vec<u8> = Vec::new();
    for (filename, mime, bytes) in files {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        body.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"photos\"; filename=\"{filename}\"\r\n")
                .as_bytes(),
        );
        body.extend_from_slice(format!("Content-Type: {mime}\r\n\r\n").as_bytes());
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn create_tour_assigns_strictly_increasing_ids() {
    let uploads = TempDir::new().unwrap();
    let app = build_router(test_app_state(&uploads));

    let mut last_id = 0;
    for i in 0..3 {
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/tours",
                json!({"title": format!("Tour {i}"), "status": "uploading"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let tour = body_json(response).await;
        let id = tour["id"].as_i64().unwrap();
        assert!(id > last_id, "ids must be strictly increasing");
        last_id = id;

        assert_eq!(tour["status"], "uploading");
        assert_eq!(tour["processingStep"], "upload");
        assert_eq!(tour["totalPhotos"], 0);
        assert!(tour["completedAt"].is_null());
    }
}

#[tokio::test]
async fn get_tour_roundtrips_and_unknown_id_is_404() {
    let uploads = TempDir::new().unwrap();
    let app = build_router(test_app_state(&uploads));

    let created = body_json(
        app.clone()
            .oneshot(json_request(
                "POST",
                "/api/tours",
                json!({"title": "Lakeside House"}),
            ))
            .await
            .unwrap(),
    )
    .await;
    let id = created["id"].as_i64().unwrap();

    let response = app
        .clone()
        .oneshot(get_request(&format!("/api/tours/{id}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["title"], "Lakeside House");

    let missing = app
        .oneshot(get_request("/api/tours/999"))
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(missing).await["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn patch_tour_is_a_partial_update_passthrough() {
    let uploads = TempDir::new().unwrap();
    let app = build_router(test_app_state(&uploads));

    let created = body_json(
        app.clone()
            .oneshot(json_request("POST", "/api/tours", json!({"title": "Patch"})))
            .await
            .unwrap(),
    )
    .await;
    let id = created["id"].as_i64().unwrap();

    let response = app
        .clone()
        .oneshot(json_request(
            "PATCH",
            &format!("/api/tours/{id}"),
            json!({"status": "processing", "processedPhotos": 5}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let tour = body_json(response).await;
    assert_eq!(tour["status"], "processing");
    assert_eq!(tour["processedPhotos"], 5);
    assert_eq!(tour["title"], "Patch");

    let missing = app
        .oneshot(json_request(
            "PATCH",
            "/api/tours/999",
            json!({"status": "completed"}),
        ))
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn list_endpoints_return_empty_arrays_when_nothing_exists() {
    let uploads = TempDir::new().unwrap();
    let app = build_router(test_app_state(&uploads));

    for uri in ["/api/tours/1/photos", "/api/tours/1/rooms"] {
        let response = app.clone().oneshot(get_request(uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!([]));
    }
}

#[tokio::test]
async fn upload_to_unknown_tour_is_404() {
    let uploads = TempDir::new().unwrap();
    let app = build_router(test_app_state(&uploads));

    let response = app
        .oneshot(multipart_request(
            "/api/tours/42/photos",
            &[("a.jpg", "image/jpeg", b"fake jpeg")],
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn upload_with_no_files_is_rejected() {
    let uploads = TempDir::new().unwrap();
    let state = test_app_state(&uploads);
    let app = build_router(state);

    let created = body_json(
        app.clone()
            .oneshot(json_request("POST", "/api/tours", json!({"title": "Empty"})))
            .await
            .unwrap(),
    )
    .await;
    let id = created["id"].as_i64().unwrap();

    let response = app
        .oneshot(multipart_request(&format!("/api/tours/{id}/photos"), &[]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"]["code"], "UPLOAD_EMPTY");
}

#[tokio::test]
async fn non_image_upload_is_rejected_and_creates_no_photos() {
    let uploads = TempDir::new().unwrap();
    let state = test_app_state(&uploads);
    let app = build_router(state.clone());

    let created = body_json(
        app.clone()
            .oneshot(json_request("POST", "/api/tours", json!({"title": "Mixed"})))
            .await
            .unwrap(),
    )
    .await;
    let id = created["id"].as_i64().unwrap();

    // One valid file plus one rejected file: the whole request must fail
    let response = app
        .clone()
        .oneshot(multipart_request(
            &format!("/api/tours/{id}/photos"),
            &[
                ("ok.jpg", "image/jpeg", b"fake jpeg"),
                ("doc.pdf", "application/pdf", b"%PDF-1.4"),
            ],
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"]["code"], "UPLOAD_BAD_TYPE");

    assert_eq!(state.store.photos_by_tour(id).await.len(), 0);
    let tour = state.store.tour(id).await.unwrap();
    assert_eq!(tour.total_photos, 0);
}

#[tokio::test]
async fn upload_of_51_files_is_rejected_at_the_count_limit() {
    let uploads = TempDir::new().unwrap();
    let state = test_app_state(&uploads);
    let app = build_router(state.clone());

    let created = body_json(
        app.clone()
            .oneshot(json_request("POST", "/api/tours", json!({"title": "Bulk"})))
            .await
            .unwrap(),
    )
    .await;
    let id = created["id"].as_i64().unwrap();

    let files: Vec<(String, &str, &[u8])> = (0..51)
        .map(|i| (format!("photo-{i}.jpg"), "image/jpeg", b"x".as_slice()))
        .collect();
    let borrowed: Vec<(&str, &str, &[u8])> = files
        .iter()
        .map(|(name, mime, bytes)| (name.as_str(), *mime, *bytes))
        .collect();

    let response = app
        .oneshot(multipart_request(&format!("/api/tours/{id}/photos"), &borrowed))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"]["code"], "UPLOAD_TOO_MANY");
    assert_eq!(state.store.photos_by_tour(id).await.len(), 0);
}

#[tokio::test]
async fn oversized_file_is_rejected_at_the_size_limit() {
    let uploads = TempDir::new().unwrap();
    let state = test_app_state(&uploads);
    let app = build_router(state.clone());

    let created = body_json(
        app.clone()
            .oneshot(json_request("POST", "/api/tours", json!({"title": "Big"})))
            .await
            .unwrap(),
    )
    .await;
    let id = created["id"].as_i64().unwrap();

    let oversized = vec![0u8; 10 * 1024 * 1024 + 1];
    let response = app
        .oneshot(multipart_request(
            &format!("/api/tours/{id}/photos"),
            &[("huge.jpg", "image/jpeg", oversized.as_slice())],
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"]["code"], "UPLOAD_TOO_LARGE");
    assert_eq!(state.store.photos_by_tour(id).await.len(), 0);
}

#[tokio::test]
async fn valid_upload_creates_photos_and_flips_the_tour_to_processing() {
    let uploads = TempDir::new().unwrap();
    // A real (if short) analysis wait keeps the tour observably in
    // `processing` between the upload response and the completion check.
    let schedule = StageSchedule {
        analysis: std::time::Duration::from_millis(200),
        ..StageSchedule::immediate()
    };
    let state = AppState::new(uploads.path().to_path_buf(), EventBus::new(100))
        .with_schedule(schedule);
    let app = build_router(state.clone());

    let created = body_json(
        app.clone()
            .oneshot(json_request("POST", "/api/tours", json!({"title": "E2E"})))
            .await
            .unwrap(),
    )
    .await;
    let id = created["id"].as_i64().unwrap();

    let response = app
        .clone()
        .oneshot(multipart_request(
            &format!("/api/tours/{id}/photos"),
            &[
                ("one.jpg", "image/jpeg", b"jpeg one"),
                ("two.jpg", "image/jpeg", b"jpeg two"),
                ("three.jpg", "image/jpeg", b"jpeg three"),
            ],
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let upload = body_json(response).await;
    assert_eq!(upload["message"], "3 photos uploaded successfully");
    assert_eq!(upload["photos"].as_array().unwrap().len(), 3);
    assert_eq!(upload["photos"][0]["originalName"], "one.jpg");
    assert!(upload["photos"][0]["url"]
        .as_str()
        .unwrap()
        .starts_with("/uploads/"));

    // Tour flipped before the upload response returned
    let tour = state.store.tour(id).await.unwrap();
    assert_eq!(tour.total_photos, 3);
    assert_eq!(tour.status, vtour_common::models::TourStatus::Processing);

    // Stored filenames preserve the original extension and exist on disk
    for photo in state.store.photos_by_tour(id).await {
        assert!(photo.filename.ends_with(".jpg"));
        assert!(uploads.path().join(&photo.filename).exists());
        assert!(photo.room_id.is_none());
        assert!(!photo.processed);
    }

    // After the (immediate-schedule) pipeline drains, the fixed four rooms
    // exist and the tour is terminal-complete.
    state.supervisor.wait(id).await;
    let tour = state.store.tour(id).await.unwrap();
    assert_eq!(tour.status, vtour_common::models::TourStatus::Completed);
    assert!(tour.completed_at.is_some());
    assert_eq!(tour.processed_photos, 3);

    let rooms = state.store.rooms_by_tour(id).await;
    let names: Vec<&str> = rooms.iter().map(|room| room.name.as_str()).collect();
    assert_eq!(
        names,
        ["Living Room", "Kitchen", "Master Bedroom", "Bathroom"]
    );
}

#[tokio::test]
async fn health_endpoint_reports_module_and_uptime() {
    let uploads = TempDir::new().unwrap();
    let app = build_router(test_app_state(&uploads));

    let response = app.oneshot(get_request("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let health = body_json(response).await;
    assert_eq!(health["status"], "ok");
    assert_eq!(health["module"], "vtour-server");
    assert!(health["uptime_seconds"].is_number());
}
