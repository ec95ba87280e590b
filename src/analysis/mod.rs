//! Analysis domain — text threat classification.
//!
//! Public API for turning recognized text into a verdict.
//! External code should only use the items exported here.
//!
//! Paths:
//!   - remote.rs     — remote chat-completions classifier (preferred when configured)
//!   - heuristics.rs — local keyword/pattern scorer (always available)
//!
//! Shared:
//!   - lexicon.rs — bilingual keyword, pattern and template tables
//!   - parse.rs   — tagged parsing of remote output
//!   - types.rs   — ThreatLevel, ThreatVerdict, AnalysisResult

pub mod heuristics;
pub mod lexicon;
pub mod parse;
pub mod prompts;
pub mod remote;
pub mod types;

pub use lexicon::Language;
pub use parse::RemoteParse;
pub use remote::{RemoteClassifier, RemoteConfig};
pub use types::{AnalysisResult, ThreatLevel, ThreatVerdict};

use std::panic::{self, AssertUnwindSafe};

/// Safe-tier confidence when the local scorer is the chosen analyzer.
pub const LOCAL_SAFE_CONFIDENCE: u8 = 95;
/// Safe-tier confidence when the local scorer stands in for a failed remote call.
pub const FALLBACK_SAFE_CONFIDENCE: u8 = 75;

/// Classifies text, remotely when configured, locally otherwise.
///
/// Never fails: every path ends in a schema-valid verdict.
#[derive(Debug, Clone)]
pub struct ThreatAnalyzer {
    remote: Option<RemoteClassifier>,
    default_language: Language,
}

impl ThreatAnalyzer {
    /// Analyzer that only uses the local scorer.
    pub fn local(default_language: Language) -> Self {
        Self {
            remote: None,
            default_language,
        }
    }

    /// Analyzer that prefers `remote` and falls back to the local scorer.
    pub fn with_remote(remote: RemoteClassifier, default_language: Language) -> Self {
        Self {
            remote: Some(remote),
            default_language,
        }
    }

    pub fn is_remote(&self) -> bool {
        self.remote.is_some()
    }

    pub fn default_language(&self) -> Language {
        self.default_language
    }

    /// Classify `text` into a verdict.
    pub async fn classify(&self, text: &str) -> ThreatVerdict {
        if text.trim().is_empty() {
            log::warn!("[ANALYZE] Empty text — returning default safe verdict");
            return ThreatVerdict::empty_input(self.default_language);
        }

        let Some(remote) = &self.remote else {
            return self.classify_local(text, LOCAL_SAFE_CONFIDENCE);
        };

        match remote.classify(text, self.default_language).await {
            Ok(RemoteParse::Parsed(verdict)) => {
                log::info!(
                    "[ANALYZE] Remote verdict: {} ({}%)",
                    verdict.threat_level,
                    verdict.confidence
                );
                verdict
            }
            Ok(RemoteParse::Malformed(raw)) => {
                log::warn!(
                    "[ANALYZE] Remote output malformed, using local fallback — raw: {}",
                    &raw.chars().take(200).collect::<String>()
                );
                self.classify_local(text, FALLBACK_SAFE_CONFIDENCE)
            }
            Err(e) => {
                log::warn!("[ANALYZE] Remote classification failed ({}), using local fallback", e);
                self.classify_local(text, FALLBACK_SAFE_CONFIDENCE)
            }
        }
    }

    /// Classify `text` and attach it, with a timestamp, to the verdict.
    pub async fn analyze(&self, text: &str) -> AnalysisResult {
        let verdict = self.classify(text).await;
        AnalysisResult::new(text, verdict)
    }

    /// Local scoring behind an unwind guard.
    ///
    /// The scorer has no error paths; a panic inside it still must not
    /// reach the caller, so it becomes the degraded verdict.
    fn classify_local(&self, text: &str, safe_confidence: u8) -> ThreatVerdict {
        let default_language = self.default_language;
        panic::catch_unwind(AssertUnwindSafe(|| {
            heuristics::classify_locally(text, default_language, safe_confidence)
        }))
        .unwrap_or_else(|_| {
            log::error!("[ANALYZE] Local scorer panicked — returning degraded verdict");
            ThreatVerdict::degraded(default_language)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn whitespace_short_circuits() {
        let analyzer = ThreatAnalyzer::local(Language::English);
        let verdict = analyzer.classify(" \n\t ").await;
        assert_eq!(verdict.threat_level, ThreatLevel::Safe);
        assert_eq!(verdict.confidence, 95);
        assert_eq!(verdict.recommendations.len(), 2);
    }

    #[tokio::test]
    async fn analyze_attaches_text() {
        let analyzer = ThreatAnalyzer::local(Language::Indonesian);
        let result = analyzer.analyze("Rapat besok jam sembilan di kantor").await;
        assert_eq!(result.text(), "Rapat besok jam sembilan di kantor");
        assert_eq!(result.threat_level(), ThreatLevel::Safe);
        assert_eq!(result.confidence(), LOCAL_SAFE_CONFIDENCE);
    }
}
