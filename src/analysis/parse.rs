//! Parsing of remote classifier output.
//!
//! Models return the verdict JSON either bare or wrapped in a markdown code
//! fence, sometimes with chatter around it. The parse result is tagged so the
//! caller's fallback is an explicit branch.

use super::lexicon::Language;
use super::types::{ThreatLevel, ThreatVerdict};
use serde::Deserialize;

/// Outcome of parsing a remote completion.
#[derive(Debug, Clone, PartialEq)]
pub enum RemoteParse {
    Parsed(ThreatVerdict),
    Malformed(String),
}

/// Verdict shape as the model writes it. Confidence may be fractional.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawVerdict {
    threat_level: ThreatLevel,
    confidence: f64,
    #[serde(default)]
    threat_type: Option<String>,
    #[serde(default)]
    recommendations: Vec<String>,
    #[serde(default)]
    analysis: Option<String>,
}

/// Remove a surrounding ```json ... ``` fence, if present.
///
/// Text before the opening fence and after the closing fence is dropped.
/// Unfenced input is returned trimmed.
pub fn strip_code_fences(content: &str) -> String {
    let trimmed = content.trim();
    let Some(start) = trimmed.find("```") else {
        return trimmed.to_string();
    };
    // Only an alphabetic info string ("json") may follow the opening fence;
    // the body can start on the same line.
    let body = trimmed[start + 3..].trim_start_matches(|c: char| c.is_ascii_alphabetic());
    match body.rfind("```") {
        Some(end) => body[..end].trim().to_string(),
        None => body.trim().to_string(),
    }
}

/// Parse a completion into a normalized verdict.
///
/// `language` picks the default strings used when the model leaves
/// recommendations empty.
pub fn parse_verdict(content: &str, language: Language) -> RemoteParse {
    let json = strip_code_fences(content);
    match serde_json::from_str::<RawVerdict>(&json) {
        Ok(raw) => {
            if !raw.confidence.is_finite() {
                return RemoteParse::Malformed(content.to_string());
            }
            let verdict = ThreatVerdict {
                threat_level: raw.threat_level,
                confidence: raw.confidence.round().clamp(0.0, 100.0) as u8,
                threat_type: raw.threat_type,
                recommendations: raw.recommendations,
                analysis: raw.analysis,
            };
            RemoteParse::Parsed(verdict.normalized(language))
        }
        Err(e) => {
            log::warn!("[REMOTE] Failed to parse verdict: {}", e);
            RemoteParse::Malformed(content.to_string())
        }
    }
}
