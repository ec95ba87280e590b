//! CLI command handlers.
//!
//! Thin wrappers that bridge parsed arguments to the domains. Each handler
//! does one thing and returns `Err(message)` for anything the user should
//! see; `lib::run` prints it and exits with status 1.
//!
//! Multi-step work lives in pipeline.rs / pipeline_text.rs instead.

use crate::analysis::AnalysisResult;
use crate::capture::ImageSource;
use crate::config::AppConfig;
use crate::history::HistoryStore;
use crate::ocr::OcrHandle;
use crate::pipeline::Pipeline;
use crate::preprocess::{self, ProcessingMode};
use crate::{pipeline_text, report, settings};
use serde::Serialize;
use std::io::Read;
use std::path::Path;

fn print_json<T: Serialize>(value: &T) -> Result<(), String> {
    let json = serde_json::to_string_pretty(value).map_err(|e| e.to_string())?;
    println!("{}", json);
    Ok(())
}

fn apply_mode(config: &mut AppConfig, mode: Option<&str>) -> Result<(), String> {
    if let Some(mode) = mode {
        config.preprocess.mode = mode.parse::<ProcessingMode>()?;
    }
    Ok(())
}

/// `cyberlens scan`: preprocess → OCR → classify one image.
pub async fn scan(
    mut config: AppConfig,
    image: &str,
    mode: Option<&str>,
    local: bool,
    no_history: bool,
    json: bool,
) -> Result<(), String> {
    apply_mode(&mut config, mode)?;
    let source = ImageSource::from_arg(image);

    let analyzer = settings::build_analyzer(&config, local);
    let ocr = OcrHandle::tesseract(config.ocr.clone());
    let mut pipeline = Pipeline::new(config.preprocess.clone(), ocr, analyzer, config.retry);
    if !no_history {
        pipeline = pipeline.with_history(HistoryStore::open(&config.history_path));
    }

    let outcome = pipeline.scan_source(&source).await;
    pipeline.shutdown().await;
    let scan = outcome.map_err(|e| e.to_string())?;

    if json {
        print_json(&scan)
    } else {
        print!("{}", report::format_scan(&scan, config.language));
        Ok(())
    }
}

/// `cyberlens analyze`: classify text from the argument or stdin.
pub async fn analyze(
    config: AppConfig,
    text: Option<String>,
    local: bool,
    no_history: bool,
    json: bool,
) -> Result<(), String> {
    let text = match text {
        Some(text) => text,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .map_err(|e| format!("Failed to read stdin: {}", e))?;
            buf
        }
    };

    let analyzer = settings::build_analyzer(&config, local);
    let mut history = (!no_history).then(|| HistoryStore::open(&config.history_path));
    let result = pipeline_text::analyze_text(&analyzer, history.as_mut(), &text).await;

    if json {
        print_json(&result)
    } else {
        print!("{}", report::format_result(&result, config.language));
        Ok(())
    }
}

/// `cyberlens preprocess`: write the preprocessed image.
///
/// A data URL input is written back as a data URL; anything else as JPEG.
pub fn preprocess_image(
    mut config: AppConfig,
    input: &str,
    output: &Path,
    mode: Option<&str>,
) -> Result<(), String> {
    apply_mode(&mut config, mode)?;
    let source = ImageSource::from_arg(input);

    let encoded: Vec<u8> = match &source {
        ImageSource::DataUrl(url) => {
            preprocess::preprocess_data_url(url, &config.preprocess).into_bytes()
        }
        _ => {
            let bytes = source.read().map_err(|e| e.to_string())?;
            preprocess::try_preprocess(&bytes, &config.preprocess).map_err(|e| e.to_string())?
        }
    };

    std::fs::write(output, &encoded)
        .map_err(|e| format!("Failed to write {}: {}", output.display(), e))?;
    log::info!("[PREPROCESS] Wrote {} ({} bytes)", output.display(), encoded.len());
    println!("{}", output.display());
    Ok(())
}

/// `cyberlens history`: list or clear past results.
pub fn history(
    config: AppConfig,
    limit: Option<usize>,
    clear: bool,
    json: bool,
) -> Result<(), String> {
    let mut store = HistoryStore::open(&config.history_path);
    if clear {
        store.clear().map_err(|e| e.to_string())?;
        println!("{}", report::labels(config.language).history_cleared);
        return Ok(());
    }

    let entries = store.entries();
    let shown: &[AnalysisResult] = match limit {
        Some(n) => &entries[..n.min(entries.len())],
        None => entries,
    };
    if json {
        print_json(&shown)
    } else {
        print!("{}", report::format_history(shown, config.language));
        Ok(())
    }
}

/// `cyberlens set-key`.
pub fn set_key(key: &str) -> Result<(), String> {
    settings::save_api_key(key)?;
    println!("API key saved.");
    Ok(())
}

/// `cyberlens test-remote`.
pub async fn test_remote(config: AppConfig) -> Result<(), String> {
    if settings::test_remote(&config).await? {
        println!("Remote API OK ({})", config.model);
        Ok(())
    } else {
        Err(format!("Remote API at {} rejected the request", config.api_url))
    }
}

/// `cyberlens status`.
pub fn status(config: AppConfig) -> Result<(), String> {
    print_json(&settings::provider_status(&config))
}
