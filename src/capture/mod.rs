//! Image source domain — where captured photos come from.
//!
//! The CLI's stand-in for the camera: a file path, a `data:` URL (what a
//! browser webcam hands over), or raw bytes on stdin.

use crate::error::CaptureError;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::io::Read;
use std::path::PathBuf;

/// A place to read one captured image from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    File(PathBuf),
    DataUrl(String),
    Stdin,
}

impl ImageSource {
    /// Interpret a CLI argument: `-` is stdin, `data:` is a data URL,
    /// anything else is a path.
    pub fn from_arg(arg: &str) -> Self {
        if arg == "-" {
            ImageSource::Stdin
        } else if arg.starts_with("data:") {
            ImageSource::DataUrl(arg.to_string())
        } else {
            ImageSource::File(PathBuf::from(arg))
        }
    }

    /// Read the encoded image bytes.
    pub fn read(&self) -> Result<Vec<u8>, CaptureError> {
        let bytes = match self {
            ImageSource::File(path) => {
                if !path.exists() {
                    return Err(CaptureError::NotFound(path.clone()));
                }
                std::fs::read(path).map_err(|source| CaptureError::Read {
                    path: path.clone(),
                    source,
                })?
            }
            ImageSource::DataUrl(url) => {
                decode_data_url(url).map_err(CaptureError::InvalidDataUrl)?
            }
            ImageSource::Stdin => {
                let mut buf = Vec::new();
                std::io::stdin()
                    .read_to_end(&mut buf)
                    .map_err(CaptureError::Stdin)?;
                buf
            }
        };

        if bytes.is_empty() {
            return Err(CaptureError::Empty);
        }
        log::info!("[CAPTURE] Read {} bytes from {}", bytes.len(), self.describe());
        Ok(bytes)
    }

    fn describe(&self) -> String {
        match self {
            ImageSource::File(path) => path.display().to_string(),
            ImageSource::DataUrl(_) => "data URL".to_string(),
            ImageSource::Stdin => "stdin".to_string(),
        }
    }
}

/// Decode a base64 `data:<mime>;base64,<payload>` URL.
pub fn decode_data_url(url: &str) -> Result<Vec<u8>, String> {
    let rest = url
        .strip_prefix("data:")
        .ok_or_else(|| "missing 'data:' prefix".to_string())?;
    let (meta, payload) = rest
        .split_once(',')
        .ok_or_else(|| "missing ',' separator".to_string())?;
    if !meta.ends_with(";base64") {
        return Err("only base64 data URLs are supported".to_string());
    }
    let payload: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
    STANDARD
        .decode(payload)
        .map_err(|e| format!("bad base64 payload: {}", e))
}

/// Encode bytes as a base64 data URL.
pub fn encode_data_url(mime: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime, STANDARD.encode(bytes))
}
