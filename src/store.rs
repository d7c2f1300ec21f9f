use crate::app_dirs::AppDirs;
use crate::error::StoreError;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// Keeps the personal-best WPM across runs
pub trait ResultStore {
    fn best(&self) -> u32;
    fn set_best(&mut self, wpm: u32) -> Result<(), StoreError>;
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct BestRecord {
    personal_best: u32,
}

/// JSON file under the state directory
#[derive(Debug, Clone)]
pub struct FileResultStore {
    path: PathBuf,
}

impl FileResultStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = AppDirs::best_path().unwrap_or_else(|| PathBuf::from("tapt_best.json"));
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }
}

impl Default for FileResultStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultStore for FileResultStore {
    fn best(&self) -> u32 {
        fs::read(&self.path)
            .ok()
            .and_then(|bytes| serde_json::from_slice::<BestRecord>(&bytes).ok())
            .map_or(0, |record| record.personal_best)
    }

    fn set_best(&mut self, wpm: u32) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(&BestRecord { personal_best: wpm })?;
        fs::write(&self.path, data)?;
        Ok(())
    }
}

/// In-memory store; clones share state and every write is recorded
#[derive(Debug, Clone, Default)]
pub struct MemoryResultStore {
    inner: Rc<RefCell<MemoryInner>>,
}

#[derive(Debug, Default)]
struct MemoryInner {
    best: u32,
    writes: Vec<u32>,
    fail_writes: bool,
}

impl MemoryResultStore {
    pub fn with_best(best: u32) -> Self {
        let store = Self::default();
        store.inner.borrow_mut().best = best;
        store
    }

    pub fn writes(&self) -> Vec<u32> {
        self.inner.borrow().writes.clone()
    }

    /// Every later `set_best` fails with an io error and stores nothing.
    pub fn fail_writes(&self) {
        self.inner.borrow_mut().fail_writes = true;
    }
}

impl ResultStore for MemoryResultStore {
    fn best(&self) -> u32 {
        self.inner.borrow().best
    }

    fn set_best(&mut self, wpm: u32) -> Result<(), StoreError> {
        let mut inner = self.inner.borrow_mut();
        if inner.fail_writes {
            return Err(StoreError::Io(std::io::Error::other("store is read-only")));
        }
        inner.best = wpm;
        inner.writes.push(wpm);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn file_store_defaults_to_zero() {
        let dir = tempdir().unwrap();
        let store = FileResultStore::with_path(dir.path().join("best.json"));
        assert_eq!(store.best(), 0);
    }

    #[test]
    fn file_store_persists_across_instances() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state").join("best.json");

        let mut store = FileResultStore::with_path(&path);
        store.set_best(72).unwrap();

        let reopened = FileResultStore::with_path(&path);
        assert_eq!(reopened.best(), 72);
    }

    #[test]
    fn file_store_ignores_corrupt_contents() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("best.json");
        fs::write(&path, b"seventy").unwrap();
        assert_eq!(FileResultStore::with_path(&path).best(), 0);
    }

    #[test]
    fn memory_store_records_writes() {
        let store = MemoryResultStore::with_best(10);
        let mut handle = store.clone();
        handle.set_best(40).unwrap();

        assert_eq!(store.best(), 40);
        assert_eq!(store.writes(), vec![40]);
    }

    #[test]
    fn memory_store_can_refuse_writes() {
        let store = MemoryResultStore::with_best(10);
        store.fail_writes();
        let mut handle = store.clone();

        assert!(matches!(handle.set_best(40), Err(StoreError::Io(_))));
        assert_eq!(store.best(), 10);
        assert!(store.writes().is_empty());
    }
}
