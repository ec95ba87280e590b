//! Analysis result types — ThreatLevel, ThreatVerdict and AnalysisResult.
//!
//! Serialized with camelCase names so history files and `--json` output
//! match the JSON shape the remote classifier is asked to return.

use super::lexicon::{lines, Language};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Ordinal risk tier assigned to analyzed text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThreatLevel {
    Safe,
    Medium,
    High,
}

impl ThreatLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThreatLevel::Safe => "safe",
            ThreatLevel::Medium => "medium",
            ThreatLevel::High => "high",
        }
    }
}

impl std::fmt::Display for ThreatLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The classifier's verdict, before the caller attaches text and timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreatVerdict {
    pub threat_level: ThreatLevel,
    pub confidence: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threat_type: Option<String>,
    pub recommendations: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<String>,
}

impl ThreatVerdict {
    /// Verdict for empty or whitespace-only input. No scoring happens.
    pub fn empty_input(language: Language) -> Self {
        let templates = language.lexicon().templates;
        Self {
            threat_level: ThreatLevel::Safe,
            confidence: 95,
            threat_type: None,
            recommendations: lines(templates.safe),
            analysis: None,
        }
    }

    /// Degraded verdict for when analysis itself broke.
    ///
    /// Safe-ish but explicit: the threat type says the text could not be
    /// analyzed, and the recommendations stay cautious.
    pub fn degraded(language: Language) -> Self {
        let templates = language.lexicon().templates;
        Self {
            threat_level: ThreatLevel::Safe,
            confidence: 0,
            threat_type: Some(templates.degraded_type.to_string()),
            recommendations: lines(templates.degraded),
            analysis: None,
        }
    }

    /// Clamp a verdict from an untrusted source into a schema-valid one.
    ///
    /// Empty recommendations are replaced with the language defaults and a
    /// safe verdict never carries a threat type.
    pub fn normalized(mut self, language: Language) -> Self {
        let templates = language.lexicon().templates;
        self.confidence = self.confidence.min(100);
        self.recommendations.retain(|r| !r.trim().is_empty());
        if self.recommendations.is_empty() {
            self.recommendations = match self.threat_level {
                ThreatLevel::Safe => lines(templates.safe),
                _ => lines(templates.medium),
            };
        }
        if self.threat_level == ThreatLevel::Safe {
            self.threat_type = None;
        } else if self.threat_type.as_deref().map_or(false, |t| t.trim().is_empty()) {
            self.threat_type = None;
        }
        if self.analysis.as_deref().map_or(false, |a| a.trim().is_empty()) {
            self.analysis = None;
        }
        self
    }
}

/// A classified capture. The unit stored in history.
///
/// Built once by [`AnalysisResult::new`] and never mutated afterwards;
/// fields are only readable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    text: String,
    #[serde(flatten)]
    verdict: ThreatVerdict,
    timestamp: DateTime<Utc>,
}

impl AnalysisResult {
    pub fn new(text: impl Into<String>, verdict: ThreatVerdict) -> Self {
        Self {
            text: text.into(),
            verdict,
            timestamp: Utc::now(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn verdict(&self) -> &ThreatVerdict {
        &self.verdict
    }

    pub fn threat_level(&self) -> ThreatLevel {
        self.verdict.threat_level
    }

    pub fn confidence(&self) -> u8 {
        self.verdict.confidence
    }

    pub fn threat_type(&self) -> Option<&str> {
        self.verdict.threat_type.as_deref()
    }

    pub fn recommendations(&self) -> &[String] {
        &self.verdict.recommendations
    }

    pub fn analysis(&self) -> Option<&str> {
        self.verdict.analysis.as_deref()
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}
