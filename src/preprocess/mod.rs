//! Image preprocessing domain — prepares captured photos for OCR.
//!
//! Resize within bounds, flatten onto white, apply one pixel transform,
//! re-encode as JPEG. Best effort: [`preprocess`] hands back the original
//! bytes when anything goes wrong so OCR still gets a chance.

pub mod filters;

use crate::capture;
use crate::error::PreprocessError;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, GrayImage};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Which pixel transform to apply before OCR.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProcessingMode {
    /// Luma grayscale + contrast stretch.
    TextEnhance,
    /// Average grayscale + global threshold.
    Binarize,
    /// Local-mean threshold, robust to shadows and glare.
    #[default]
    Adaptive,
    /// Average grayscale + mild contrast + global threshold.
    Default,
}

impl ProcessingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessingMode::TextEnhance => "text-enhance",
            ProcessingMode::Binarize => "binarize",
            ProcessingMode::Adaptive => "adaptive",
            ProcessingMode::Default => "default",
        }
    }
}

impl FromStr for ProcessingMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "text-enhance" | "text_enhance" => Ok(ProcessingMode::TextEnhance),
            "binarize" => Ok(ProcessingMode::Binarize),
            "adaptive" => Ok(ProcessingMode::Adaptive),
            "default" => Ok(ProcessingMode::Default),
            other => Err(format!(
                "unknown processing mode '{}' (expected text-enhance, binarize, adaptive or default)",
                other
            )),
        }
    }
}

impl std::fmt::Display for ProcessingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Preprocessing bounds and transform settings.
#[derive(Debug, Clone, PartialEq)]
pub struct PreprocessConfig {
    pub max_width: u32,
    pub max_height: u32,
    /// Downscaling never shrinks a side below this (or below its original
    /// length, whichever is smaller). `None` disables the floor.
    pub min_side: Option<u32>,
    /// JPEG quality in 0.0..=1.0.
    pub jpeg_quality: f32,
    /// Global threshold used by `binarize` and `default`.
    pub contrast_threshold: u8,
    pub mode: ProcessingMode,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            max_width: 1280,
            max_height: 720,
            min_side: None,
            jpeg_quality: 0.95,
            contrast_threshold: 120,
            mode: ProcessingMode::Adaptive,
        }
    }
}

impl PreprocessConfig {
    fn jpeg_quality_percent(&self) -> u8 {
        (self.jpeg_quality * 100.0).round().clamp(1.0, 100.0) as u8
    }
}

/// Output dimensions for a `width`×`height` source.
///
/// Never upscales. When a side is over its max, one uniform factor brings
/// both within bounds, so the binding axis lands exactly on its max.
pub fn target_dimensions(width: u32, height: u32, config: &PreprocessConfig) -> (u32, u32) {
    let max_w = config.max_width.max(1);
    let max_h = config.max_height.max(1);
    if width <= max_w && height <= max_h {
        return (width, height);
    }

    let scale = f64::min(max_w as f64 / width as f64, max_h as f64 / height as f64);
    let mut w = ((width as f64 * scale).round() as u32).clamp(1, max_w);
    let mut h = ((height as f64 * scale).round() as u32).clamp(1, max_h);

    if let Some(floor) = config.min_side {
        w = w.max(floor.min(width)).min(max_w);
        h = h.max(floor.min(height)).min(max_h);
    }
    (w, h)
}

/// Preprocess encoded image bytes, returning the original on any failure.
pub fn preprocess(bytes: &[u8], config: &PreprocessConfig) -> Vec<u8> {
    match try_preprocess(bytes, config) {
        Ok(out) => out,
        Err(e) => {
            log::warn!("[PREPROCESS] {} — using original image", e);
            bytes.to_vec()
        }
    }
}

/// Preprocess encoded image bytes into a JPEG.
pub fn try_preprocess(bytes: &[u8], config: &PreprocessConfig) -> Result<Vec<u8>, PreprocessError> {
    let start = std::time::Instant::now();
    let source = image::load_from_memory(bytes).map_err(PreprocessError::Decode)?;
    let (width, height) = source.dimensions();
    if width == 0 || height == 0 {
        return Err(PreprocessError::EmptyImage);
    }

    let (target_w, target_h) = target_dimensions(width, height, config);
    let resized = if (target_w, target_h) == (width, height) {
        source
    } else {
        source.resize_exact(target_w, target_h, FilterType::Triangle)
    };

    let opaque = filters::composite_on_white(&resized.to_rgba8());
    let processed = apply_mode(&opaque, config);

    let mut out = Vec::new();
    DynamicImage::ImageLuma8(processed)
        .write_with_encoder(JpegEncoder::new_with_quality(&mut out, config.jpeg_quality_percent()))
        .map_err(PreprocessError::Encode)?;

    log::info!(
        "[PREPROCESS] {}x{} -> {}x{} ({}) in {}ms, {} bytes",
        width,
        height,
        target_w,
        target_h,
        config.mode,
        start.elapsed().as_millis(),
        out.len()
    );
    Ok(out)
}

fn apply_mode(image: &image::RgbImage, config: &PreprocessConfig) -> GrayImage {
    match config.mode {
        ProcessingMode::TextEnhance => filters::text_enhance(image),
        ProcessingMode::Binarize => filters::binarize(image, config.contrast_threshold),
        ProcessingMode::Adaptive => {
            filters::adaptive_threshold(image, filters::ADAPTIVE_RADIUS, filters::ADAPTIVE_OFFSET)
        }
        ProcessingMode::Default => filters::default_process(image, config.contrast_threshold),
    }
}

/// Preprocess a `data:image/...;base64,` URL into a JPEG data URL.
///
/// Returns the input unchanged when it cannot be decoded or processed.
pub fn preprocess_data_url(data_url: &str, config: &PreprocessConfig) -> String {
    let bytes = match capture::decode_data_url(data_url) {
        Ok(bytes) => bytes,
        Err(e) => {
            log::warn!("[PREPROCESS] {} — using original image", e);
            return data_url.to_string();
        }
    };
    match try_preprocess(&bytes, config) {
        Ok(jpeg) => capture::encode_data_url("image/jpeg", &jpeg),
        Err(e) => {
            log::warn!("[PREPROCESS] {} — using original image", e);
            data_url.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_images_keep_their_size() {
        let config = PreprocessConfig::default();
        assert_eq!(target_dimensions(640, 480, &config), (640, 480));
        assert_eq!(target_dimensions(1280, 720, &config), (1280, 720));
    }

    #[test]
    fn landscape_binds_on_width() {
        let config = PreprocessConfig::default();
        assert_eq!(target_dimensions(2560, 1440, &config), (1280, 720));
        assert_eq!(target_dimensions(2000, 1000, &config), (1280, 640));
    }

    #[test]
    fn portrait_binds_on_height() {
        let config = PreprocessConfig::default();
        assert_eq!(target_dimensions(1440, 2560, &config), (405, 720));
    }

    #[test]
    fn nearly_square_never_exceeds_either_max() {
        let config = PreprocessConfig::default();
        let (w, h) = target_dimensions(1300, 1200, &config);
        assert!(w <= 1280 && h <= 720, "{}x{}", w, h);
        assert_eq!(h, 720);
    }

    #[test]
    fn floor_limits_downscale_of_thin_images() {
        let config = PreprocessConfig {
            min_side: Some(64),
            ..PreprocessConfig::default()
        };
        assert_eq!(target_dimensions(4000, 100, &config), (1280, 64));
        // Floor never grows a side past its original length.
        assert_eq!(target_dimensions(4000, 40, &config), (1280, 40));
    }

    #[test]
    fn modes_parse_from_config_strings() {
        assert_eq!("text-enhance".parse::<ProcessingMode>().unwrap(), ProcessingMode::TextEnhance);
        assert_eq!("ADAPTIVE".parse::<ProcessingMode>().unwrap(), ProcessingMode::Adaptive);
        assert!("sharpen".parse::<ProcessingMode>().is_err());
    }

    #[test]
    fn quality_maps_to_percent() {
        let mut config = PreprocessConfig::default();
        assert_eq!(config.jpeg_quality_percent(), 95);
        config.jpeg_quality = 0.0;
        assert_eq!(config.jpeg_quality_percent(), 1);
        config.jpeg_quality = 3.0;
        assert_eq!(config.jpeg_quality_percent(), 100);
    }
}
