//! Runtime configuration from environment variables.
//!
//! `.env.local` / `.env` are applied by `lib::run` before this is read.
//! Every value has a default; an unparsable value logs a warning and
//! keeps the default instead of failing startup.

use crate::analysis::prompts::{DEFAULT_API_URL, DEFAULT_MODEL};
use crate::analysis::Language;
use crate::history::default_history_path;
use crate::ocr::OcrSettings;
use crate::preprocess::{PreprocessConfig, ProcessingMode};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Which classifier the user asked for, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalyzerChoice {
    Remote,
    Local,
}

impl FromStr for AnalyzerChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "remote" | "deepseek" | "api" => Ok(AnalyzerChoice::Remote),
            "local" | "offline" => Ok(AnalyzerChoice::Local),
            other => Err(format!("unknown analyzer '{}' (use remote or local)", other)),
        }
    }
}

/// OCR retry policy for a single scan.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            delay: Duration::from_millis(1000),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// `None` means "remote if a key is available".
    pub analyzer: Option<AnalyzerChoice>,
    pub api_url: String,
    pub model: String,
    pub remote_timeout: Duration,
    pub language: Language,
    pub preprocess: PreprocessConfig,
    pub ocr: OcrSettings,
    pub retry: RetryPolicy,
    pub history_path: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            analyzer: None,
            api_url: DEFAULT_API_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            remote_timeout: crate::analysis::remote::DEFAULT_TIMEOUT,
            language: Language::default(),
            preprocess: PreprocessConfig::default(),
            ocr: OcrSettings::default(),
            retry: RetryPolicy::default(),
            history_path: default_history_path(),
        }
    }
}

impl AppConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`, which maps a variable name to
    /// its value.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = AppConfig::default();

        config.analyzer = get("CYBERLENS_ANALYZER")
            .and_then(|v| parse_or_warn::<AnalyzerChoice>("CYBERLENS_ANALYZER", &v));
        if let Some(url) = get("DEEPSEEK_API_URL") {
            config.api_url = url;
        }
        if let Some(model) = get("DEEPSEEK_MODEL") {
            config.model = model;
        }
        if let Some(secs) = get("CYBERLENS_REMOTE_TIMEOUT_SECS")
            .and_then(|v| parse_or_warn::<u64>("CYBERLENS_REMOTE_TIMEOUT_SECS", &v))
        {
            config.remote_timeout = Duration::from_secs(secs.max(1));
        }
        if let Some(lang) = get("CYBERLENS_LANGUAGE")
            .and_then(|v| parse_or_warn::<Language>("CYBERLENS_LANGUAGE", &v))
        {
            config.language = lang;
        }

        // ── Preprocessing ──
        let pre = &mut config.preprocess;
        if let Some(mode) = get("CYBERLENS_PROCESSING_MODE")
            .and_then(|v| parse_or_warn::<ProcessingMode>("CYBERLENS_PROCESSING_MODE", &v))
        {
            pre.mode = mode;
        }
        if let Some(w) = get("CYBERLENS_MAX_WIDTH")
            .and_then(|v| parse_positive::<u32>("CYBERLENS_MAX_WIDTH", &v))
        {
            pre.max_width = w;
        }
        if let Some(h) = get("CYBERLENS_MAX_HEIGHT")
            .and_then(|v| parse_positive::<u32>("CYBERLENS_MAX_HEIGHT", &v))
        {
            pre.max_height = h;
        }
        if let Some(q) = get("CYBERLENS_JPEG_QUALITY")
            .and_then(|v| parse_or_warn::<f32>("CYBERLENS_JPEG_QUALITY", &v))
        {
            if (0.0..=1.0).contains(&q) && q > 0.0 {
                pre.jpeg_quality = q;
            } else {
                log::warn!("[CONFIG] CYBERLENS_JPEG_QUALITY must be in (0, 1], got {}", q);
            }
        }
        if let Some(t) = get("CYBERLENS_CONTRAST_THRESHOLD")
            .and_then(|v| parse_or_warn::<u8>("CYBERLENS_CONTRAST_THRESHOLD", &v))
        {
            pre.contrast_threshold = t;
        }

        // ── OCR ──
        let ocr = &mut config.ocr;
        if let Some(langs) = get("OCR_LANGUAGES") {
            let parsed: Vec<String> = langs
                .split(['+', ',', ' '])
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(str::to_string)
                .collect();
            if !parsed.is_empty() {
                ocr.languages = parsed;
            }
        }
        if let Some(psm) = get("OCR_PSM")
            .and_then(|v| parse_or_warn::<i32>("OCR_PSM", &v))
        {
            ocr.psm = psm;
        }
        if let Some(oem) = get("OCR_OEM")
            .and_then(|v| parse_or_warn::<i32>("OCR_OEM", &v))
        {
            ocr.oem = oem;
        }
        if let Some(secs) = get("OCR_INIT_TIMEOUT_SECS")
            .and_then(|v| parse_positive::<u64>("OCR_INIT_TIMEOUT_SECS", &v))
        {
            ocr.init_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = get("OCR_RECOGNIZE_TIMEOUT_SECS")
            .and_then(|v| parse_positive::<u64>("OCR_RECOGNIZE_TIMEOUT_SECS", &v))
        {
            ocr.recognize_timeout = Duration::from_secs(secs);
        }

        // ── Retry / history ──
        if let Some(n) = get("OCR_RETRY_ATTEMPTS")
            .and_then(|v| parse_positive::<u32>("OCR_RETRY_ATTEMPTS", &v))
        {
            config.retry.attempts = n;
        }
        if let Some(ms) = get("OCR_RETRY_DELAY_MS")
            .and_then(|v| parse_or_warn::<u64>("OCR_RETRY_DELAY_MS", &v))
        {
            config.retry.delay = Duration::from_millis(ms);
        }
        if let Some(path) = get("CYBERLENS_HISTORY_PATH") {
            config.history_path = PathBuf::from(path);
        }

        config
    }
}

fn parse_or_warn<T>(key: &str, value: &str) -> Option<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match value.trim().parse::<T>() {
        Ok(v) => Some(v),
        Err(e) => {
            log::warn!("[CONFIG] Ignoring {}={:?}: {}", key, value, e);
            None
        }
    }
}

fn parse_positive<T>(key: &str, value: &str) -> Option<T>
where
    T: FromStr + PartialOrd + Default + std::fmt::Display,
    T::Err: std::fmt::Display,
{
    let parsed = parse_or_warn::<T>(key, value)?;
    if parsed > T::default() {
        Some(parsed)
    } else {
        log::warn!("[CONFIG] Ignoring {}={}: must be positive", key, parsed);
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> AppConfig {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_without_env() {
        let config = config_from(&[]);
        assert_eq!(config.analyzer, None);
        assert_eq!(config.language, Language::Indonesian);
        assert_eq!(config.preprocess, PreprocessConfig::default());
        assert_eq!(config.ocr.language_spec(), "eng+ind");
        assert_eq!(config.retry, RetryPolicy::default());
        assert!(config.history_path.ends_with("cyberlens/cyberlens_history.json"));
    }

    #[test]
    fn reads_overrides() {
        let config = config_from(&[
            ("CYBERLENS_ANALYZER", "local"),
            ("CYBERLENS_LANGUAGE", "en"),
            ("CYBERLENS_PROCESSING_MODE", "binarize"),
            ("CYBERLENS_MAX_WIDTH", "640"),
            ("CYBERLENS_JPEG_QUALITY", "0.8"),
            ("OCR_LANGUAGES", "eng"),
            ("OCR_PSM", "11"),
            ("OCR_RETRY_ATTEMPTS", "5"),
            ("OCR_RETRY_DELAY_MS", "0"),
            ("CYBERLENS_HISTORY_PATH", "/tmp/h.json"),
        ]);
        assert_eq!(config.analyzer, Some(AnalyzerChoice::Local));
        assert_eq!(config.language, Language::English);
        assert_eq!(config.preprocess.mode, ProcessingMode::Binarize);
        assert_eq!(config.preprocess.max_width, 640);
        assert_eq!(config.preprocess.jpeg_quality, 0.8);
        assert_eq!(config.ocr.languages, vec!["eng".to_string()]);
        assert_eq!(config.ocr.psm, 11);
        assert_eq!(config.retry.attempts, 5);
        assert_eq!(config.retry.delay, Duration::ZERO);
        assert_eq!(config.history_path, PathBuf::from("/tmp/h.json"));
    }

    #[test]
    fn invalid_values_keep_defaults() {
        let config = config_from(&[
            ("CYBERLENS_ANALYZER", "quantum"),
            ("CYBERLENS_MAX_HEIGHT", "-3"),
            ("CYBERLENS_JPEG_QUALITY", "7"),
            ("OCR_RETRY_ATTEMPTS", "0"),
            ("CYBERLENS_PROCESSING_MODE", ""),
        ]);
        assert_eq!(config.analyzer, None);
        assert_eq!(config.preprocess.max_height, 720);
        assert_eq!(config.preprocess.jpeg_quality, 0.95);
        assert_eq!(config.retry.attempts, 3);
        assert_eq!(config.preprocess.mode, ProcessingMode::Adaptive);
    }
}
