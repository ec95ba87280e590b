//! Human-readable terminal reports in English or Indonesian.

use crate::analysis::{AnalysisResult, Language, ThreatLevel};
use crate::pipeline::ScanReport;

/// Fixed UI strings for one language.
pub struct Labels {
    pub safe: &'static str,
    pub warning: &'static str,
    pub danger: &'static str,
    pub confidence: &'static str,
    pub threat_type: &'static str,
    pub recommendations: &'static str,
    pub analysis: &'static str,
    pub text: &'static str,
    pub no_text: &'static str,
    pub history: &'static str,
    pub no_history: &'static str,
    pub history_cleared: &'static str,
    pub timings: &'static str,
}

static EN: Labels = Labels {
    safe: "SAFE",
    warning: "WARNING",
    danger: "DANGER",
    confidence: "confidence",
    threat_type: "Threat type",
    recommendations: "Recommendations",
    analysis: "Analysis",
    text: "Text",
    no_text: "(no text)",
    history: "Scan history",
    no_history: "No scans yet.",
    history_cleared: "History cleared.",
    timings: "Timings",
};

static ID: Labels = Labels {
    safe: "AMAN",
    warning: "WASPADA",
    danger: "BAHAYA",
    confidence: "keyakinan",
    threat_type: "Jenis ancaman",
    recommendations: "Rekomendasi",
    analysis: "Analisis",
    text: "Teks",
    no_text: "(tidak ada teks)",
    history: "Riwayat pemindaian",
    no_history: "Belum ada pemindaian.",
    history_cleared: "Riwayat dihapus.",
    timings: "Waktu",
};

pub fn labels(language: Language) -> &'static Labels {
    match language {
        Language::English => &EN,
        Language::Indonesian => &ID,
    }
}

pub fn level_label(level: ThreatLevel, language: Language) -> &'static str {
    let l = labels(language);
    match level {
        ThreatLevel::Safe => l.safe,
        ThreatLevel::Medium => l.warning,
        ThreatLevel::High => l.danger,
    }
}

/// Shorten `text` to `max` chars on one line.
fn excerpt(text: &str, max: usize) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= max {
        flat
    } else {
        let cut: String = flat.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", cut)
    }
}

/// Full report for one result.
pub fn format_result(result: &AnalysisResult, language: Language) -> String {
    let l = labels(language);
    let mut out = format!(
        "[{}] {}% {}\n",
        level_label(result.threat_level(), language),
        result.confidence(),
        l.confidence
    );
    if let Some(kind) = result.threat_type() {
        out.push_str(&format!("{}: {}\n", l.threat_type, kind));
    }
    if let Some(analysis) = result.analysis() {
        out.push_str(&format!("{}: {}\n", l.analysis, analysis));
    }
    out.push_str(&format!("{}:\n", l.recommendations));
    for rec in result.recommendations() {
        out.push_str(&format!("  - {}\n", rec));
    }
    let text = if result.text().trim().is_empty() {
        l.no_text.to_string()
    } else {
        excerpt(result.text(), 200)
    };
    out.push_str(&format!("{}: {}\n", l.text, text));
    out
}

/// Scan report: the result plus stage timings.
pub fn format_scan(report: &ScanReport, language: Language) -> String {
    let t = &report.timings;
    format!(
        "{}{}: preprocess {}ms, ocr {}ms ({}x), classify {}ms, total {}ms\n",
        format_result(&report.result, language),
        labels(language).timings,
        t.preprocess_ms,
        t.ocr_ms,
        report.ocr_attempts,
        t.classify_ms,
        t.total_ms
    )
}

/// One line per history entry, newest first.
pub fn format_history(entries: &[AnalysisResult], language: Language) -> String {
    let l = labels(language);
    if entries.is_empty() {
        return format!("{}\n", l.no_history);
    }
    let mut out = format!("{} ({})\n", l.history, entries.len());
    for entry in entries {
        let text = if entry.text().trim().is_empty() {
            l.no_text.to_string()
        } else {
            excerpt(entry.text(), 60)
        };
        out.push_str(&format!(
            "{}  {:<8} {:>3}%  {}\n",
            entry.timestamp().format("%Y-%m-%d %H:%M"),
            level_label(entry.threat_level(), language),
            entry.confidence(),
            text
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::ThreatVerdict;

    #[test]
    fn labels_follow_language() {
        assert_eq!(level_label(ThreatLevel::High, Language::English), "DANGER");
        assert_eq!(level_label(ThreatLevel::Medium, Language::Indonesian), "WASPADA");
    }

    #[test]
    fn result_report_lists_recommendations() {
        let result = AnalysisResult::new("", ThreatVerdict::empty_input(Language::English));
        let report = format_result(&result, Language::English);
        assert!(report.starts_with("[SAFE] 95% confidence"));
        assert!(report.contains("(no text)"));
        assert_eq!(report.matches("  - ").count(), 2);
    }

    #[test]
    fn long_text_is_shortened() {
        let long = "word ".repeat(100);
        let shortened = excerpt(&long, 20);
        assert_eq!(shortened.chars().count(), 20);
        assert!(shortened.ends_with('…'));
    }

    #[test]
    fn empty_history_message() {
        assert_eq!(format_history(&[], Language::Indonesian), "Belum ada pemindaian.\n");
    }
}
