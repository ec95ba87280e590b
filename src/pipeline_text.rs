//! Text pipeline — classifies text the user already has.
//!
//! A separate pipeline from the scan pipeline (pipeline.rs): no
//! preprocessing and no OCR, so it needs no engine handle. Used by
//! `cyberlens analyze` for pasted or piped text.

use crate::analysis::{AnalysisResult, ThreatAnalyzer};
use crate::history::HistoryStore;
use crate::pipeline::record_in_history;

/// Classify `text` and record the result in `history` if given.
pub async fn analyze_text(
    analyzer: &ThreatAnalyzer,
    history: Option<&mut HistoryStore>,
    text: &str,
) -> AnalysisResult {
    log::info!("[PIPELINE] Text input: {} chars", text.chars().count());
    let start = std::time::Instant::now();

    let result = analyzer.analyze(text.trim()).await;
    log::info!(
        "[PIPELINE] Text classified as {} ({}%) in {}ms",
        result.threat_level(),
        result.confidence(),
        start.elapsed().as_millis()
    );

    // Nothing was analyzed, so there is nothing worth keeping.
    if !text.trim().is_empty() {
        record_in_history(history, &result);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{Language, ThreatLevel};

    #[tokio::test]
    async fn records_non_empty_text() {
        let dir = tempfile::tempdir().unwrap();
        let mut history = HistoryStore::open(dir.path().join("h.json"));
        let analyzer = ThreatAnalyzer::local(Language::Indonesian);

        let result = analyze_text(
            &analyzer,
            Some(&mut history),
            "Selamat! Anda menang hadiah, klaim sekarang dan transfer biaya admin",
        )
        .await;
        assert_ne!(result.threat_level(), ThreatLevel::Safe);
        assert_eq!(history.len(), 1);

        analyze_text(&analyzer, Some(&mut history), "   ").await;
        assert_eq!(history.len(), 1);
    }
}
