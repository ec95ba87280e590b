//! Scan history persistence.
//!
//! Results are stored newest first as a JSON array in
//! `~/.local/share/cyberlens/cyberlens_history.json` (platform data dir).
//! The file is read once on open and rewritten on every change. A missing
//! or corrupt file is treated as empty history.

use crate::analysis::AnalysisResult;
use crate::error::HistoryError;
use std::path::{Path, PathBuf};

/// File name of the history store inside the data directory.
pub const HISTORY_FILE: &str = "cyberlens_history.json";

/// Default location of the history file.
pub fn default_history_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("cyberlens")
        .join(HISTORY_FILE)
}

/// Append-only, newest-first list of past results backed by a JSON file.
#[derive(Debug)]
pub struct HistoryStore {
    path: PathBuf,
    entries: Vec<AnalysisResult>,
}

impl HistoryStore {
    /// Open the store at `path`, loading whatever is readable.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = load_entries(&path);
        log::info!("[HISTORY] Loaded {} entries from {}", entries.len(), path.display());
        Self { path, entries }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All entries, most recent first.
    pub fn entries(&self) -> &[AnalysisResult] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Record a result as the newest entry and persist.
    ///
    /// The entry stays in memory even if writing fails.
    pub fn push(&mut self, result: AnalysisResult) -> Result<(), HistoryError> {
        self.entries.insert(0, result);
        self.save()
    }

    /// Drop all entries and remove the file.
    pub fn clear(&mut self) -> Result<(), HistoryError> {
        self.entries.clear();
        match std::fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        log::info!("[HISTORY] Cleared");
        Ok(())
    }

    fn save(&self) -> Result<(), HistoryError> {
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let json = serde_json::to_string_pretty(&self.entries)?;
        std::fs::write(&self.path, json)?;
        log::info!("[HISTORY] Saved {} entries", self.entries.len());
        Ok(())
    }
}

fn load_entries(path: &Path) -> Vec<AnalysisResult> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
        Err(e) => {
            log::warn!("[HISTORY] Cannot read {}: {}, starting empty", path.display(), e);
            return Vec::new();
        }
    };
    serde_json::from_str(&raw).unwrap_or_else(|e| {
        log::warn!("[HISTORY] Corrupt history in {}: {}, starting empty", path.display(), e);
        Vec::new()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{Language, ThreatVerdict};

    fn result(text: &str) -> AnalysisResult {
        AnalysisResult::new(text, ThreatVerdict::empty_input(Language::English))
    }

    #[test]
    fn missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = HistoryStore::open(dir.path().join("nope.json"));
        assert!(store.is_empty());
    }

    #[test]
    fn newest_first_and_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(HISTORY_FILE);

        let mut store = HistoryStore::open(&path);
        store.push(result("first")).unwrap();
        store.push(result("second")).unwrap();
        assert_eq!(store.entries()[0].text(), "second");

        let reopened = HistoryStore::open(&path);
        assert_eq!(reopened.len(), 2);
        assert_eq!(reopened.entries()[0].text(), "second");
        assert_eq!(reopened.entries()[1].text(), "first");
    }

    #[test]
    fn corrupt_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(HISTORY_FILE);
        std::fs::write(&path, "{ this is not json").unwrap();

        let mut store = HistoryStore::open(&path);
        assert!(store.is_empty());

        // Writing over the corrupt file recovers it.
        store.push(result("after")).unwrap();
        assert_eq!(HistoryStore::open(&path).len(), 1);
    }

    #[test]
    fn clear_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(HISTORY_FILE);
        let mut store = HistoryStore::open(&path);
        store.push(result("x")).unwrap();
        assert!(path.exists());

        store.clear().unwrap();
        assert!(store.is_empty());
        assert!(!path.exists());
        store.clear().unwrap();
    }
}
