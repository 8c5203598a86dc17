//! Upload validation and on-disk persistence of photo originals
//!
//! **[TPS-UP-010]** Uploads are written to a single flat directory under a
//! generated unique filename that preserves the original extension. No
//! thumbnail generation exists; `thumbnailUrl` fields stay unset.

use std::path::{Path, PathBuf};

use thiserror::Error;
use uuid::Uuid;

/// Maximum number of files accepted per upload request
pub const MAX_FILES_PER_UPLOAD: usize = 50;

/// Per-file size cap in bytes (10 MB)
pub const MAX_FILE_BYTES: usize = 10 * 1024 * 1024;

/// Accepted photo MIME types. `image/jpg` is a non-standard alias some
/// clients still send.
pub const ALLOWED_MIME_TYPES: [&str; 3] = ["image/jpeg", "image/png", "image/jpg"];

/// Upload rejection reasons, all mapped to 400 responses
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("No files uploaded")]
    NoFiles,

    #[error("Too many files: {count} exceeds the limit of {MAX_FILES_PER_UPLOAD}")]
    TooManyFiles { count: usize },

    #[error("File {name} is too large: {size} bytes exceeds the 10MB limit")]
    FileTooLarge { name: String, size: usize },

    #[error("Only JPEG and PNG files are allowed (got {mime} for {name})")]
    UnsupportedType { name: String, mime: String },
}

impl UploadError {
    /// Stable machine-readable code for the error body
    pub fn error_code(&self) -> &'static str {
        match self {
            UploadError::NoFiles => "UPLOAD_EMPTY",
            UploadError::TooManyFiles { .. } => "UPLOAD_TOO_MANY",
            UploadError::FileTooLarge { .. } => "UPLOAD_TOO_LARGE",
            UploadError::UnsupportedType { .. } => "UPLOAD_BAD_TYPE",
        }
    }
}

/// One validated part of a photo upload, held in memory until the whole
/// request has passed validation (a rejected request must leave no partial
/// state behind).
#[derive(Debug)]
pub struct IncomingPhoto {
    pub original_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl IncomingPhoto {
    /// Validate MIME type and size against the upload limits
    pub fn validate(&self) -> Result<(), UploadError> {
        if !ALLOWED_MIME_TYPES.contains(&self.content_type.as_str()) {
            return Err(UploadError::UnsupportedType {
                name: self.original_name.clone(),
                mime: self.content_type.clone(),
            });
        }
        if self.bytes.len() > MAX_FILE_BYTES {
            return Err(UploadError::FileTooLarge {
                name: self.original_name.clone(),
                size: self.bytes.len(),
            });
        }
        Ok(())
    }
}

/// Generate a unique stored filename preserving the original extension
pub fn unique_filename(original_name: &str) -> String {
    let extension = Path::new(original_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{ext}"))
        .unwrap_or_default();
    format!("{}{extension}", Uuid::new_v4())
}

/// Write the photo bytes to the uploads directory under `filename`
pub async fn persist(uploads_dir: &Path, filename: &str, bytes: &[u8]) -> std::io::Result<PathBuf> {
    let path = uploads_dir.join(filename);
    tokio::fs::write(&path, bytes).await?;
    Ok(path)
}
