//! Core scan pipeline.
//!
//! preprocess → OCR (with retries) → classify → record in history.
//!
//! Only capture and recognition failures surface to the caller.
//! Preprocessing falls back to the original bytes, classification always
//! yields a verdict, and a failed history write is logged.

use crate::analysis::{AnalysisResult, ThreatAnalyzer};
use crate::capture::ImageSource;
use crate::config::RetryPolicy;
use crate::error::{OcrError, PipelineError};
use crate::history::HistoryStore;
use crate::ocr::OcrHandle;
use crate::preprocess::{self, PreprocessConfig};
use serde::Serialize;
use std::time::Instant;

/// Per-stage wall-clock timings of one scan.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanTimings {
    pub preprocess_ms: u128,
    pub ocr_ms: u128,
    pub classify_ms: u128,
    pub total_ms: u128,
}

/// Outcome of a successful scan.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanReport {
    pub result: AnalysisResult,
    /// OCR attempts used, including the successful one.
    pub ocr_attempts: u32,
    pub timings: ScanTimings,
}

/// Owns every stage a scan runs through.
pub struct Pipeline {
    preprocess: PreprocessConfig,
    ocr: OcrHandle,
    analyzer: ThreatAnalyzer,
    history: Option<HistoryStore>,
    retry: RetryPolicy,
}

impl Pipeline {
    pub fn new(
        preprocess: PreprocessConfig,
        ocr: OcrHandle,
        analyzer: ThreatAnalyzer,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            preprocess,
            ocr,
            analyzer,
            history: None,
            retry,
        }
    }

    /// Record every successful scan in `history`.
    pub fn with_history(mut self, history: HistoryStore) -> Self {
        self.history = Some(history);
        self
    }

    pub fn history(&self) -> Option<&HistoryStore> {
        self.history.as_ref()
    }

    pub fn ocr(&self) -> &OcrHandle {
        &self.ocr
    }

    pub fn analyzer(&self) -> &ThreatAnalyzer {
        &self.analyzer
    }

    /// Read an image from `source` and scan it.
    pub async fn scan_source(&mut self, source: &ImageSource) -> Result<ScanReport, PipelineError> {
        let bytes = source.read()?;
        self.scan(&bytes).await
    }

    /// Run one captured image through the whole pipeline.
    pub async fn scan(&mut self, image: &[u8]) -> Result<ScanReport, PipelineError> {
        let scan_start = Instant::now();
        let mut timings = ScanTimings::default();
        log::info!("[PIPELINE] Scan started ({} bytes)", image.len());

        // Stage 1: preprocess off the async threads
        let stage = Instant::now();
        let prepared = {
            let bytes = image.to_vec();
            let config = self.preprocess.clone();
            let task = tokio::task::spawn_blocking(move || preprocess::preprocess(&bytes, &config));
            match task.await {
                Ok(prepared) => prepared,
                Err(e) => {
                    log::warn!("[PIPELINE] Preprocess task failed ({}), using original image", e);
                    image.to_vec()
                }
            }
        };
        timings.preprocess_ms = stage.elapsed().as_millis();

        // Stage 2: OCR
        let stage = Instant::now();
        let (text, ocr_attempts) = self.recognize_with_retry(prepared).await?;
        timings.ocr_ms = stage.elapsed().as_millis();
        if text.trim().is_empty() {
            log::warn!("[PIPELINE] OCR returned no text");
            return Err(PipelineError::NoTextDetected);
        }

        // Stage 3: classify
        let stage = Instant::now();
        let result = self.analyzer.analyze(text.trim()).await;
        timings.classify_ms = stage.elapsed().as_millis();

        // Stage 4: history
        record_in_history(self.history.as_mut(), &result);

        timings.total_ms = scan_start.elapsed().as_millis();
        log::info!(
            "[PIPELINE] Total: {}ms (preprocess={} + ocr={} + classify={}), verdict={}",
            timings.total_ms,
            timings.preprocess_ms,
            timings.ocr_ms,
            timings.classify_ms,
            result.threat_level()
        );

        Ok(ScanReport {
            result,
            ocr_attempts,
            timings,
        })
    }

    /// Release the OCR engine. The pipeline stays usable; the next scan
    /// builds a new engine.
    pub async fn shutdown(&self) {
        self.ocr.release().await;
    }

    /// OCR with up to `retry.attempts` tries. Empty text is a result, not
    /// a failure, so it is never retried.
    async fn recognize_with_retry(&self, image: Vec<u8>) -> Result<(String, u32), OcrError> {
        let attempts = self.retry.attempts.max(1);
        let mut attempt = 1;
        loop {
            match self.ocr.recognize(image.clone()).await {
                Ok(text) => return Ok((text, attempt)),
                Err(e) if attempt < attempts => {
                    log::warn!(
                        "[PIPELINE] OCR attempt {}/{} failed: {}. Retrying in {}ms",
                        attempt,
                        attempts,
                        e,
                        self.retry.delay.as_millis()
                    );
                    tokio::time::sleep(self.retry.delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    log::error!("[PIPELINE] OCR failed after {} attempts: {}", attempts, e);
                    return Err(e);
                }
            }
        }
    }
}

/// Append `result` to `history` if there is one. Write failures are logged
/// and never fail the scan.
pub(crate) fn record_in_history(history: Option<&mut HistoryStore>, result: &AnalysisResult) {
    if let Some(history) = history {
        if let Err(e) = history.push(result.clone()) {
            log::error!("[HISTORY] Failed to save result: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{Language, ThreatLevel};
    use crate::ocr::{OcrSettings, TextRecognizer};
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    /// Fails `failures` times, then returns `text`.
    struct Flaky {
        failures: u32,
        calls: Arc<AtomicU32>,
        text: &'static str,
    }

    impl TextRecognizer for Flaky {
        fn recognize(&self, _: &[u8], _: &OcrSettings) -> Result<String, OcrError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                Err(OcrError::Recognition("engine hiccup".to_string()))
            } else {
                Ok(self.text.to_string())
            }
        }
    }

    fn pipeline(failures: u32, text: &'static str, calls: Arc<AtomicU32>) -> Pipeline {
        let ocr = OcrHandle::with_factory(OcrSettings::default(), move |_| {
            Ok(Arc::new(Flaky {
                failures,
                calls: calls.clone(),
                text,
            }) as Arc<dyn TextRecognizer>)
        });
        let retry = RetryPolicy {
            attempts: 3,
            delay: Duration::from_millis(1),
        };
        Pipeline::new(
            PreprocessConfig::default(),
            ocr,
            ThreatAnalyzer::local(Language::English),
            retry,
        )
    }

    #[tokio::test]
    async fn retries_recognition_failures() {
        let calls = Arc::new(AtomicU32::new(0));
        let mut pipeline = pipeline(2, "please verify your bank account now", calls.clone());

        let report = pipeline.scan(b"not really an image").await.unwrap();
        assert_eq!(report.ocr_attempts, 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(report.result.threat_level(), ThreatLevel::High);
    }

    #[tokio::test]
    async fn gives_up_after_last_attempt() {
        let calls = Arc::new(AtomicU32::new(0));
        let mut pipeline = pipeline(10, "unused", calls.clone());

        let err = pipeline.scan(b"x").await.unwrap_err();
        assert!(matches!(err, PipelineError::Recognition(_)));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn empty_text_is_not_retried() {
        let calls = Arc::new(AtomicU32::new(0));
        let mut pipeline = pipeline(0, "  \n ", calls.clone());

        let err = pipeline.scan(b"x").await.unwrap_err();
        assert!(matches!(err, PipelineError::NoTextDetected));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn missing_image_is_a_capture_error() {
        let mut pipeline = pipeline(0, "unused", Arc::default());
        let source = ImageSource::from_arg("/no/such/photo.jpg");
        let err = pipeline.scan_source(&source).await.unwrap_err();
        assert!(matches!(err, PipelineError::Capture(_)));
    }

    #[tokio::test]
    async fn successful_scans_are_recorded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        let mut pipeline = pipeline(0, "see you at the meeting tomorrow", Arc::default())
            .with_history(HistoryStore::open(&path));

        pipeline.scan(b"x").await.unwrap();
        pipeline.scan(b"y").await.unwrap();

        let history = pipeline.history().unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history.entries()[0].text(), "see you at the meeting tomorrow");
        assert_eq!(HistoryStore::open(&path).len(), 2);
    }
}
