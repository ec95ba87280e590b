//! Analyzer resolution and API key management.
//!
//! Handles:
//! - Choosing remote vs local classification
//! - API key storage (OS keychain via keyring crate + env var)
//! - Remote connection testing
//! - A status summary for `cyberlens status`

use crate::analysis::{RemoteClassifier, RemoteConfig, ThreatAnalyzer};
use crate::config::{AnalyzerChoice, AppConfig};

/// Env var holding the remote API key.
pub const API_KEY_ENV: &str = "DEEPSEEK_API_KEY";
const KEYRING_SERVICE: &str = "cyberlens";
const KEYRING_USER: &str = "deepseek";

// ── Analyzer resolution ──────────────────────────────────────────────

/// Decide which analyzer to use.
///
/// Priority:
/// 1. `CYBERLENS_ANALYZER` (explicit "remote" or "local")
/// 2. Remote when an API key is available (env var or keychain)
/// 3. Local
pub fn resolve_analyzer(config: &AppConfig) -> AnalyzerChoice {
    if let Some(choice) = config.analyzer {
        log::info!("[SETTINGS] Analyzer override: {:?}", choice);
        return choice;
    }
    if has_api_key() {
        AnalyzerChoice::Remote
    } else {
        AnalyzerChoice::Local
    }
}

/// Build the analyzer for this run. `force_local` comes from `--local`.
///
/// A remote choice without a usable key degrades to local with a warning.
pub fn build_analyzer(config: &AppConfig, force_local: bool) -> ThreatAnalyzer {
    let language = config.language;
    if force_local || resolve_analyzer(config) == AnalyzerChoice::Local {
        log::info!("[SETTINGS] Using local analyzer");
        return ThreatAnalyzer::local(language);
    }

    match remote_classifier(config) {
        Ok(remote) => {
            log::info!("[SETTINGS] Using remote analyzer ({})", remote.model());
            ThreatAnalyzer::with_remote(remote, language)
        }
        Err(e) => {
            log::warn!("[SETTINGS] Remote analyzer unavailable ({}), using local", e);
            ThreatAnalyzer::local(language)
        }
    }
}

fn remote_classifier(config: &AppConfig) -> Result<RemoteClassifier, String> {
    let key = api_key().ok_or_else(|| format!("no {} set", API_KEY_ENV))?;
    let remote_config = RemoteConfig {
        api_url: config.api_url.clone(),
        api_key: key,
        model: config.model.clone(),
        timeout: config.remote_timeout,
    };
    RemoteClassifier::new(remote_config).map_err(|e| e.to_string())
}

// ── API key ──────────────────────────────────────────────────────────

/// Check whether an API key is available (env var or keychain).
pub fn has_api_key() -> bool {
    api_key().is_some()
}

/// The API key from the env var, else from the OS keychain.
///
/// A keychain hit is loaded into the env so later lookups skip the keychain.
pub fn api_key() -> Option<String> {
    if let Ok(key) = std::env::var(API_KEY_ENV) {
        if !key.trim().is_empty() {
            return Some(key);
        }
    }

    let entry = keyring::Entry::new(KEYRING_SERVICE, KEYRING_USER).ok()?;
    match entry.get_password() {
        Ok(key) if !key.trim().is_empty() => {
            std::env::set_var(API_KEY_ENV, &key);
            log::info!("[SETTINGS] Loaded API key from OS keychain");
            Some(key)
        }
        Ok(_) => None,
        Err(keyring::Error::NoEntry) => None,
        Err(e) => {
            log::debug!("[SETTINGS] Keychain lookup failed: {}", e);
            None
        }
    }
}

/// Save an API key to the OS keychain and the current process env.
pub fn save_api_key(api_key: &str) -> Result<(), String> {
    let api_key = api_key.trim();
    if api_key.is_empty() {
        return Err("API key is empty".to_string());
    }
    let entry = keyring::Entry::new(KEYRING_SERVICE, KEYRING_USER)
        .map_err(|e| format!("Keyring error: {}", e))?;
    entry
        .set_password(api_key)
        .map_err(|e| format!("Failed to save key: {}", e))?;

    std::env::set_var(API_KEY_ENV, api_key);
    log::info!("[SETTINGS] API key saved to OS keychain");
    Ok(())
}

// ── Status / connection test ─────────────────────────────────────────

/// Summary of the effective configuration.
pub fn provider_status(config: &AppConfig) -> serde_json::Value {
    let analyzer = match resolve_analyzer(config) {
        AnalyzerChoice::Remote => "remote",
        AnalyzerChoice::Local => "local",
    };
    serde_json::json!({
        "analyzer": analyzer,
        "apiKeyConfigured": has_api_key(),
        "apiUrl": config.api_url,
        "model": config.model,
        "language": config.language.code(),
        "processingMode": config.preprocess.mode.as_str(),
        "ocrLanguages": config.ocr.language_spec(),
        "tesseractInstalled": which::which("tesseract").is_ok(),
        "historyPath": config.history_path.display().to_string(),
    })
}

/// Send a minimal request to the remote API.
///
/// Returns `Ok(false)` when the API answered with an error status.
pub async fn test_remote(config: &AppConfig) -> Result<bool, String> {
    let remote = remote_classifier(config)?;
    match remote.ping().await {
        Ok(()) => Ok(true),
        Err(crate::error::RemoteError::Status { status, .. }) => {
            log::warn!("[SETTINGS] Remote test failed with status {}", status);
            Ok(false)
        }
        Err(e) => Err(e.to_string()),
    }
}
