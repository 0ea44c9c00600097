use crate::error::Result;
use crate::export::SessionRecord;
use hashbrown::HashMap;
use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// Receives the latest session record after every logged click.
///
/// Callers treat failures as best-effort: an `Err` is logged and dropped.
pub trait SummarySink {
    fn persist(&mut self, key: &str, record: &SessionRecord) -> Result<()>;
}

impl<S: SummarySink + ?Sized> SummarySink for Box<S> {
    fn persist(&mut self, key: &str, record: &SessionRecord) -> Result<()> {
        (**self).persist(key, record)
    }
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullStore;

impl SummarySink for NullStore {
    fn persist(&mut self, _key: &str, _record: &SessionRecord) -> Result<()> {
        Ok(())
    }
}

/// In-process key/value store holding serialized records.
///
/// Clones share the same map, so a handle kept outside a session sees what
/// the session wrote.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_string(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    pub fn load(&self, key: &str) -> Option<SessionRecord> {
        self.get_string(key)
            .and_then(|s| SessionRecord::from_json_str(&s).ok())
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl SummarySink for MemoryStore {
    fn persist(&mut self, key: &str, record: &SessionRecord) -> Result<()> {
        let json = serde_json::to_string(record)?;
        self.entries.borrow_mut().insert(key.to_string(), json);
        Ok(())
    }
}

/// One JSON file per key under a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    pub fn load(&self, key: &str) -> Result<SessionRecord> {
        SessionRecord::load(&self.path_for(key))
    }
}

impl SummarySink for FileStore {
    fn persist(&mut self, key: &str, record: &SessionRecord) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let json = serde_json::to_vec(record)?;

        // Write-then-rename so a reader never sees a half-written file.
        let final_path = self.path_for(key);
        let tmp_path = final_path.with_extension("json.tmp");
        fs::write(&tmp_path, json)?;
        fs::rename(&tmp_path, &final_path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> SessionRecord {
        SessionRecord::new("k", 0, Vec::new())
    }

    #[test]
    fn memory_store_clones_share_entries() {
        let store = MemoryStore::new();
        let mut writer = store.clone();
        writer.persist("treasure_boxes_k", &record()).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.load("treasure_boxes_k").unwrap().session_id, "k");
        assert!(store.load("missing").is_none());
    }

    #[test]
    fn file_store_overwrites_the_same_key() {
        let dir = std::env::temp_dir().join(format!("treasure_boxes_store_{}", std::process::id()));
        let mut store = FileStore::new(&dir);
        store.persist("treasure_boxes_k", &record()).unwrap();
        store.persist("treasure_boxes_k", &record()).unwrap();

        let loaded = store.load("treasure_boxes_k").unwrap();
        assert_eq!(loaded.total_events, 0);
        assert!(!store.path_for("treasure_boxes_k").with_extension("json.tmp").exists());
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn file_store_reports_unwritable_dirs() {
        // A regular file where the directory should be.
        let blocker = std::env::temp_dir().join(format!("treasure_boxes_blocker_{}", std::process::id()));
        fs::write(&blocker, b"x").unwrap();
        let mut store = FileStore::new(&blocker);
        assert!(store.persist("k", &record()).is_err());
        let _ = fs::remove_file(&blocker);
    }
}
