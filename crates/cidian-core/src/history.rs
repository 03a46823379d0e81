use std::fs;
use std::path::{Path, PathBuf};

use cidian_types::HistoryItem;

/// Maximum number of remembered lookups
pub const HISTORY_CAPACITY: usize = 50;

#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Recency-ordered, deduplicated lookup history backed by a JSON file.
///
/// Every mutation rewrites the whole file before returning. The store has a
/// single owner (the event loop), so no write reconciliation is attempted.
#[derive(Debug)]
pub struct HistoryStore {
    path: Option<PathBuf>,
    items: Vec<HistoryItem>,
}

impl HistoryStore {
    /// Store that never touches disk
    pub fn in_memory() -> Self {
        Self {
            path: None,
            items: Vec::new(),
        }
    }

    /// Load history from `path`. A missing file is an empty history; an
    /// unreadable one is logged and treated the same way.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();

        let items = match read_items(&path) {
            Ok(Some(items)) => {
                tracing::debug!("Loaded {} history entries from {}", items.len(), path.display());
                normalize(items)
            }
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!("Ignoring unreadable history at {}: {}", path.display(), e);
                Vec::new()
            }
        };

        Self {
            path: Some(path),
            items,
        }
    }

    pub fn items(&self) -> &[HistoryItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Record a lookup of `word` now
    pub fn record(&mut self, word: &str) -> &[HistoryItem] {
        self.record_at(word, chrono::Utc::now().timestamp_millis())
    }

    /// Move `word` to the front with the given timestamp, evicting past the cap
    pub fn record_at(&mut self, word: &str, timestamp: i64) -> &[HistoryItem] {
        self.items.retain(|item| item.word != word);
        self.items.insert(
            0,
            HistoryItem {
                word: word.to_string(),
                timestamp,
            },
        );
        self.items.truncate(HISTORY_CAPACITY);

        self.persist_logged();
        &self.items
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.persist_logged();
    }

    /// Write the full list to disk (temp file, then rename)
    pub fn persist(&self) -> Result<(), HistoryError> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let data = serde_json::to_string(&self.items)?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, data)?;
        fs::rename(&tmp, path)?;

        Ok(())
    }

    fn persist_logged(&self) {
        if let Err(e) = self.persist() {
            tracing::error!("Failed to persist history: {}", e);
        }
    }
}

fn read_items(path: &Path) -> Result<Option<Vec<HistoryItem>>, HistoryError> {
    if !path.exists() {
        return Ok(None);
    }

    let data = fs::read_to_string(path)?;
    if data.trim().is_empty() {
        return Ok(None);
    }

    Ok(Some(serde_json::from_str(&data)?))
}

/// Re-establish the invariants on data written by someone else
fn normalize(items: Vec<HistoryItem>) -> Vec<HistoryItem> {
    let mut seen = Vec::with_capacity(items.len());
    for item in items {
        if !seen.iter().any(|kept: &HistoryItem| kept.word == item.word) {
            seen.push(item);
        }
    }
    seen.truncate(HISTORY_CAPACITY);
    seen
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(dir: &tempfile::TempDir) -> PathBuf {
        dir.path().join("cidian").join("history.json")
    }

    fn words(store: &HistoryStore) -> Vec<&str> {
        store.items().iter().map(|i| i.word.as_str()).collect()
    }

    #[test]
    fn duplicate_moves_to_front() {
        let mut store = HistoryStore::in_memory();
        for (ts, word) in ["a", "b", "a", "c"].iter().enumerate() {
            store.record_at(word, ts as i64);
        }

        assert_eq!(words(&store), vec!["c", "a", "b"]);
        assert_eq!(store.items()[1].timestamp, 2);
    }

    #[test]
    fn match_is_case_sensitive() {
        let mut store = HistoryStore::in_memory();
        store.record_at("Run", 1);
        store.record_at("run", 2);

        assert_eq!(words(&store), vec!["run", "Run"]);
    }

    #[test]
    fn capped_at_fifty_most_recent() {
        let mut store = HistoryStore::in_memory();
        for i in 0..55 {
            store.record_at(&format!("w{i}"), i);
        }

        assert_eq!(store.len(), HISTORY_CAPACITY);
        assert_eq!(store.items()[0].word, "w54");
        assert_eq!(store.items()[49].word, "w5");
        assert!(store.items().iter().all(|i| i.word != "w4"));
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = HistoryStore::load(temp_path(&dir));
        assert!(store.is_empty());
    }

    #[test]
    fn corrupt_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = temp_path(&dir);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "{not json").unwrap();

        let store = HistoryStore::load(&path);
        assert!(store.is_empty());
    }

    #[test]
    fn record_persists_and_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let path = temp_path(&dir);
        {
            let mut store = HistoryStore::load(&path);
            store.record_at("run", 10);
            store.record_at("walk", 20);
        }

        let raw = fs::read_to_string(&path).unwrap();
        assert_eq!(
            raw,
            r#"[{"word":"walk","timestamp":20},{"word":"run","timestamp":10}]"#
        );

        let reloaded = HistoryStore::load(&path);
        assert_eq!(words(&reloaded), vec!["walk", "run"]);
    }

    #[test]
    fn load_repairs_duplicates() {
        let dir = tempfile::tempdir().unwrap();
        let path = temp_path(&dir);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(
            &path,
            r#"[{"word":"a","timestamp":3},{"word":"b","timestamp":2},{"word":"a","timestamp":1}]"#,
        )
        .unwrap();

        let store = HistoryStore::load(&path);
        assert_eq!(words(&store), vec!["a", "b"]);
    }

    #[test]
    fn clear_persists_empty_list() {
        let dir = tempfile::tempdir().unwrap();
        let path = temp_path(&dir);
        let mut store = HistoryStore::load(&path);
        store.record_at("run", 1);
        store.clear();

        assert!(store.is_empty());
        assert_eq!(fs::read_to_string(&path).unwrap(), "[]");
    }
}
