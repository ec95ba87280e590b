//! Error types for every stage of the scan pipeline.
//!
//! Only capture and recognition errors ever reach the user. Preprocessing
//! errors degrade to "input unchanged", remote classification errors
//! degrade to the local scorer, and history errors are logged.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Failure to obtain image bytes from the image source.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("image not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read image {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read image from stdin: {0}")]
    Stdin(#[source] std::io::Error),

    #[error("invalid data URL: {0}")]
    InvalidDataUrl(String),

    #[error("image source is empty")]
    Empty,
}

/// Failure inside the image preprocessor.
#[derive(Debug, Error)]
pub enum PreprocessError {
    #[error("failed to decode image: {0}")]
    Decode(#[source] image::ImageError),

    #[error("failed to encode image: {0}")]
    Encode(#[source] image::ImageError),

    #[error("image has zero width or height")]
    EmptyImage,
}

/// Failure of the OCR engine.
#[derive(Debug, Error)]
pub enum OcrError {
    #[error("OCR engine unavailable: {0}")]
    Unavailable(String),

    #[error("OCR engine did not initialize within {}s", .0.as_secs())]
    InitTimeout(Duration),

    #[error("text recognition did not finish within {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("text recognition failed: {0}")]
    Recognition(String),

    #[error("OCR worker failed: {0}")]
    Worker(String),
}

/// Failure of the remote classification call.
///
/// Never surfaces to callers of the analyzer; every variant triggers the
/// local fallback.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("no API key configured")]
    MissingApiKey,

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("API response has no completion content")]
    MissingContent,
}

/// Failure reading or writing the history file.
#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("history I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("history serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// User-facing failure of a full scan.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Capture(#[from] CaptureError),

    #[error(transparent)]
    Recognition(#[from] OcrError),

    #[error("no text detected in the image")]
    NoTextDetected,
}
