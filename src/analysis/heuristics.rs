//! Local threat scoring — keyword and proximity-pattern heuristics.
//!
//! Deterministic and infallible: the same text always produces the same
//! verdict, and every verdict is schema-valid. Used directly when no
//! remote classifier is configured and as the fallback when one fails.

use super::lexicon::{lines, Canned, Language, Lexicon};
use super::types::{ThreatLevel, ThreatVerdict};

/// Points per matched high-risk keyword.
pub const HIGH_KEYWORD_POINTS: u32 = 15;
/// Points per matched medium-risk keyword.
pub const MEDIUM_KEYWORD_POINTS: u32 = 5;
/// Points per matched suspicious pattern.
pub const PATTERN_POINTS: u32 = 20;

pub const HIGH_THRESHOLD: u32 = 50;
pub const MEDIUM_THRESHOLD: u32 = 20;

/// Minimum share of tokens that must be function words of a language
/// before that language is trusted.
const LANGUAGE_MIN_RATIO: f64 = 0.05;

/// Everything the scorer matched, plus the total.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScoreBreakdown {
    pub score: u32,
    pub high_keywords: Vec<&'static str>,
    pub medium_keywords: Vec<&'static str>,
    pub patterns: Vec<&'static str>,
}

/// Pick the keyword table for `text`.
///
/// Counts tokens that are function words of each language. A language wins
/// when at least 5% of tokens are its function words and it has at least
/// as many hits as the other one; otherwise `fallback` is used.
pub fn detect_language(text: &str, fallback: Language) -> Language {
    detected_language(text).unwrap_or(fallback)
}

/// `None` when neither language reaches the minimum function-word share.
fn detected_language(text: &str) -> Option<Language> {
    let tokens: Vec<String> = text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
        .collect();
    if tokens.is_empty() {
        return None;
    }

    let hits = |lang: Language| {
        let words = lang.lexicon().function_words;
        tokens.iter().filter(|t| words.contains(&t.as_str())).count()
    };
    let id_hits = hits(Language::Indonesian);
    let en_hits = hits(Language::English);
    let total = tokens.len() as f64;

    if id_hits as f64 / total >= LANGUAGE_MIN_RATIO && id_hits >= en_hits {
        Some(Language::Indonesian)
    } else if en_hits as f64 / total >= LANGUAGE_MIN_RATIO {
        Some(Language::English)
    } else {
        None
    }
}

/// Text without a language signal (shouted OCR lines, bare keyword lists)
/// is scored against both tables and the higher score is kept. The default
/// language wins ties.
fn score_undetected(text: &str, default_language: Language) -> (Language, ScoreBreakdown) {
    let other = match default_language {
        Language::English => Language::Indonesian,
        Language::Indonesian => Language::English,
    };
    let preferred = score_text(text, default_language.lexicon());
    let alternative = score_text(text, other.lexicon());
    if alternative.score > preferred.score {
        (other, alternative)
    } else {
        (default_language, preferred)
    }
}

/// Score `text` against one lexicon.
///
/// Each keyword and pattern counts at most once, so the score only grows
/// as more distinct indicators appear.
pub fn score_text(text: &str, lexicon: &Lexicon) -> ScoreBreakdown {
    let mut breakdown = ScoreBreakdown::default();

    for keyword in &lexicon.high {
        if keyword.is_match(text) {
            breakdown.score += HIGH_KEYWORD_POINTS;
            breakdown.high_keywords.push(keyword.term);
        }
    }
    for keyword in &lexicon.medium {
        if keyword.is_match(text) {
            breakdown.score += MEDIUM_KEYWORD_POINTS;
            breakdown.medium_keywords.push(keyword.term);
        }
    }
    for pattern in &lexicon.patterns {
        if pattern.is_match(text) {
            breakdown.score += PATTERN_POINTS;
            breakdown.patterns.push(pattern.name);
        }
    }

    breakdown
}

/// Map a score to its tier and confidence.
///
/// high: min(95, 75 + score/5); medium: min(90, 60 + score/3);
/// safe: `safe_confidence`.
pub fn tier_for_score(score: u32, safe_confidence: u8) -> (ThreatLevel, u8) {
    let score = score as f64;
    if score >= HIGH_THRESHOLD as f64 {
        let confidence = (75.0 + score / 5.0).min(95.0);
        (ThreatLevel::High, confidence.round() as u8)
    } else if score >= MEDIUM_THRESHOLD as f64 {
        let confidence = (60.0 + score / 3.0).min(90.0);
        (ThreatLevel::Medium, confidence.round() as u8)
    } else {
        (ThreatLevel::Safe, safe_confidence.min(100))
    }
}

/// Full local classification of non-empty text.
pub fn classify_locally(
    text: &str,
    default_language: Language,
    safe_confidence: u8,
) -> ThreatVerdict {
    let (language, breakdown) = match detected_language(text) {
        Some(language) => (language, score_text(text, language.lexicon())),
        None => score_undetected(text, default_language),
    };
    let lexicon = language.lexicon();
    let (threat_level, confidence) = tier_for_score(breakdown.score, safe_confidence);

    log::info!(
        "[ANALYZE] Local score {} (lang={}, high={:?}, medium={:?}, patterns={:?}) -> {}",
        breakdown.score,
        language.code(),
        breakdown.high_keywords,
        breakdown.medium_keywords,
        breakdown.patterns,
        threat_level
    );

    let templates = lexicon.templates;
    match threat_level {
        ThreatLevel::High => {
            let canned = high_category(text, lexicon);
            ThreatVerdict {
                threat_level,
                confidence,
                threat_type: Some(canned.threat_type.to_string()),
                recommendations: lines(canned.recommendations),
                analysis: Some(canned.analysis.to_string()),
            }
        }
        ThreatLevel::Medium => ThreatVerdict {
            threat_level,
            confidence,
            threat_type: Some(templates.medium_type.to_string()),
            recommendations: lines(templates.medium),
            analysis: Some(templates.medium_analysis.to_string()),
        },
        ThreatLevel::Safe => ThreatVerdict {
            threat_level,
            confidence,
            threat_type: None,
            recommendations: lines(templates.safe),
            analysis: Some(templates.safe_analysis.to_string()),
        },
    }
}

/// Financial terms take precedence over prize terms.
fn high_category<'a>(text: &str, lexicon: &'a Lexicon) -> &'a Canned {
    let templates = lexicon.templates;
    if lexicon.financial_terms.is_match(text) {
        &templates.financial
    } else if lexicon.prize_terms.is_match(text) {
        &templates.prize
    } else {
        &templates.general
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_english_and_indonesian() {
        assert_eq!(
            detect_language("Please call me when you get to the office", Language::Indonesian),
            Language::English
        );
        assert_eq!(
            detect_language("Saya akan datang ke kantor untuk rapat", Language::English),
            Language::Indonesian
        );
    }

    #[test]
    fn undetermined_language_uses_fallback() {
        assert_eq!(detect_language("URGENT PASSWORD RESET", Language::English), Language::English);
        assert_eq!(detect_language("12345 !!!", Language::Indonesian), Language::Indonesian);
        assert_eq!(detect_language("", Language::English), Language::English);
    }

    #[test]
    fn shouted_text_is_scored_against_both_tables() {
        let text = "URGENT: VERIFY BANK ACCOUNT NOW. CLICK LINK";
        assert_eq!(detected_language(text), None);

        let verdict = classify_locally(text, Language::Indonesian, 95);
        assert_eq!(verdict.threat_level, ThreatLevel::High);
        assert_eq!(verdict.threat_type.as_deref(), Some("financial phishing"));
    }

    #[test]
    fn undetected_ties_keep_the_default_language() {
        let verdict = classify_locally("12345 !!!", Language::Indonesian, 95);
        assert_eq!(verdict.threat_level, ThreatLevel::Safe);
        assert_eq!(
            verdict.analysis.as_deref(),
            Some(Language::Indonesian.lexicon().templates.safe_analysis)
        );
    }

    #[test]
    fn tier_boundaries() {
        assert_eq!(tier_for_score(0, 95), (ThreatLevel::Safe, 95));
        assert_eq!(tier_for_score(19, 75), (ThreatLevel::Safe, 75));
        assert_eq!(tier_for_score(20, 95), (ThreatLevel::Medium, 67));
        assert_eq!(tier_for_score(49, 95), (ThreatLevel::Medium, 76));
        assert_eq!(tier_for_score(50, 95), (ThreatLevel::High, 85));
        assert_eq!(tier_for_score(500, 95), (ThreatLevel::High, 95));
    }

    #[test]
    fn medium_confidence_caps_at_ninety() {
        // 60 + 49/3 stays under the cap; the cap only matters for custom tables.
        let (_, confidence) = tier_for_score(49, 95);
        assert!(confidence <= 90);
    }

    #[test]
    fn indonesian_financial_phishing() {
        let text = "Segera verifikasi rekening bank anda, kirim password sekarang juga";
        let verdict = classify_locally(text, Language::English, 95);
        assert_eq!(verdict.threat_level, ThreatLevel::High);
        assert_eq!(verdict.threat_type.as_deref(), Some("phishing keuangan"));
        assert_eq!(verdict.recommendations.len(), 3);
    }

    #[test]
    fn indonesian_prize_scam() {
        let text = "Selamat! Anda menang undian hadiah mobil, segera klaim dengan transfer biaya";
        let verdict = classify_locally(text, Language::Indonesian, 95);
        assert_eq!(verdict.threat_level, ThreatLevel::High);
        assert_eq!(verdict.threat_type.as_deref(), Some("penipuan hadiah"));
    }

    #[test]
    fn english_general_scam() {
        let text = "URGENT: click this link and login to your wallet immediately";
        let verdict = classify_locally(text, Language::English, 95);
        assert_eq!(verdict.threat_level, ThreatLevel::High);
        assert_eq!(verdict.threat_type.as_deref(), Some("general scam"));
    }

    #[test]
    fn keywords_count_once() {
        let lexicon = Language::English.lexicon();
        let once = score_text("password", lexicon);
        let twice = score_text("password password password", lexicon);
        assert_eq!(once.score, twice.score);
        assert_eq!(once.high_keywords, vec!["password"]);
    }

    #[test]
    fn safe_verdict_has_no_threat_type() {
        let verdict = classify_locally("Lunch is at noon with the team", Language::English, 75);
        assert_eq!(verdict.threat_level, ThreatLevel::Safe);
        assert_eq!(verdict.confidence, 75);
        assert!(verdict.threat_type.is_none());
        assert_eq!(verdict.recommendations.len(), 2);
    }
}
