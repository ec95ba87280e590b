//! Tesseract backend via rusty-tesseract.
//!
//! rusty-tesseract drives the system `tesseract` binary, so initialization
//! only checks that the binary exists and which language packs are
//! installed.

use super::{OcrSettings, TextRecognizer};
use crate::error::OcrError;
use rusty_tesseract::{Args, Image};
use std::collections::HashMap;

/// Recognizer that shells out to the system tesseract binary.
#[derive(Debug)]
pub struct TesseractRecognizer {
    installed_languages: Vec<String>,
}

impl TesseractRecognizer {
    /// Verify tesseract is installed and report missing language packs.
    pub fn initialize(settings: &OcrSettings) -> Result<Self, OcrError> {
        let binary = which::which("tesseract").map_err(|_| {
            OcrError::Unavailable("the `tesseract` binary was not found on PATH".to_string())
        })?;
        log::info!("[OCR] Using tesseract at {}", binary.display());

        let installed_languages = rusty_tesseract::get_tesseract_langs()
            .map_err(|e| OcrError::Unavailable(format!("cannot list tesseract languages: {}", e)))?;

        let missing: Vec<&String> = settings
            .languages
            .iter()
            .filter(|l| !installed_languages.contains(l))
            .collect();
        if !missing.is_empty() {
            log::warn!(
                "[OCR] Language packs not installed: {:?} (installed: {:?})",
                missing,
                installed_languages
            );
        }

        Ok(Self { installed_languages })
    }

    /// Requested languages that are actually installed, falling back to
    /// `eng` when none are.
    fn usable_language_spec(&self, settings: &OcrSettings) -> String {
        let usable: Vec<&str> = settings
            .languages
            .iter()
            .filter(|l| self.installed_languages.contains(l))
            .map(String::as_str)
            .collect();
        if usable.is_empty() {
            "eng".to_string()
        } else {
            usable.join("+")
        }
    }
}

impl TextRecognizer for TesseractRecognizer {
    fn recognize(&self, image: &[u8], settings: &OcrSettings) -> Result<String, OcrError> {
        let decoded = image::load_from_memory(image)
            .map_err(|e| OcrError::Recognition(format!("cannot decode image: {}", e)))?;
        let tess_image = Image::from_dynamic_image(&decoded)
            .map_err(|e| OcrError::Recognition(format!("cannot prepare image: {}", e)))?;

        let mut config_variables = HashMap::new();
        config_variables.insert("preserve_interword_spaces".to_string(), "1".to_string());

        let args = Args {
            lang: self.usable_language_spec(settings),
            config_variables,
            dpi: Some(150),
            psm: Some(settings.psm),
            oem: Some(settings.oem),
        };

        rusty_tesseract::image_to_string(&tess_image, &args)
            .map_err(|e| OcrError::Recognition(e.to_string()))
    }
}
