//! HTTP client for the tour processing service

use serde::Deserialize;
use thiserror::Error;
use vtour_common::models::{Photo, Room, Tour, TourPatch};

use crate::state::PendingFile;

/// Client-side request failures
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport-level failure
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server does not know the requested resource
    #[error("not found: {0}")]
    NotFound(String),

    /// The server rejected the request (validation, upload limits, ...)
    #[error("server rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

#[derive(Debug, Deserialize)]
struct UploadPhotosResponse {
    photos: Vec<Photo>,
}

/// Thin typed wrapper over the service's HTTP surface
#[derive(Debug, Clone)]
pub struct TourClient {
    http: reqwest::Client,
    base_url: String,
}

impl TourClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    /// POST /api/tours
    pub async fn create_tour(&self, title: &str) -> Result<Tour, ClientError> {
        let response = self
            .http
            .post(format!("{}/api/tours", self.base_url))
            .json(&serde_json::json!({ "title": title, "status": "uploading" }))
            .send()
            .await?;
        Self::parse(response).await
    }

    /// GET /api/tours/:id
    pub async fn tour(&self, id: i64) -> Result<Tour, ClientError> {
        let response = self
            .http
            .get(format!("{}/api/tours/{id}", self.base_url))
            .send()
            .await?;
        Self::parse(response).await
    }

    /// GET /api/tours/:id/rooms
    pub async fn rooms(&self, id: i64) -> Result<Vec<Room>, ClientError> {
        let response = self
            .http
            .get(format!("{}/api/tours/{id}/rooms", self.base_url))
            .send()
            .await?;
        Self::parse(response).await
    }

    /// GET /api/tours/:id/photos
    pub async fn photos(&self, id: i64) -> Result<Vec<Photo>, ClientError> {
        let response = self
            .http
            .get(format!("{}/api/tours/{id}/photos", self.base_url))
            .send()
            .await?;
        Self::parse(response).await
    }

    /// PATCH /api/tours/:id
    pub async fn patch_tour(&self, id: i64, patch: &TourPatch) -> Result<Tour, ClientError> {
        let response = self
            .http
            .patch(format!("{}/api/tours/{id}", self.base_url))
            .json(patch)
            .send()
            .await?;
        Self::parse(response).await
    }

    /// POST /api/tours/:id/photos
    ///
    /// Uploads the queued files as one multipart request under the `photos`
    /// field and returns the created photo records.
    pub async fn upload_photos(
        &self,
        id: i64,
        files: Vec<PendingFile>,
    ) -> Result<Vec<Photo>, ClientError> {
        let mut form = reqwest::multipart::Form::new();
        for file in files {
            let part = reqwest::multipart::Part::bytes(file.bytes)
                .file_name(file.name)
                .mime_str(&file.mime)?;
            form = form.part("photos", part);
        }

        let response = self
            .http
            .post(format!("{}/api/tours/{id}/photos", self.base_url))
            .multipart(form)
            .send()
            .await?;
        let body: UploadPhotosResponse = Self::parse(response).await?;
        Ok(body.photos)
    }

    /// Map error statuses to typed failures, decode success bodies
    async fn parse<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        let message = response
            .json::<ErrorBody>()
            .await
            .map(|body| body.error.message)
            .unwrap_or_else(|_| status.to_string());

        if status == reqwest::StatusCode::NOT_FOUND {
            Err(ClientError::NotFound(message))
        } else {
            Err(ClientError::Rejected {
                status: status.as_u16(),
                message,
            })
        }
    }
}
