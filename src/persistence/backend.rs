//! String-keyed storage backends.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::error::{StoreError, StoreResult};

pub trait StorageBackend {
    /// `Ok(None)` when nothing is stored under `key`.
    fn read(&self, key: &str) -> StoreResult<Option<String>>;
    fn write(&mut self, key: &str, value: &str) -> StoreResult<()>;
}

#[derive(Debug, Default)]
struct MemoryInner {
    entries: BTreeMap<String, String>,
    writes: BTreeMap<String, usize>,
}

/// In-process backend. Clones share the same entries, so a test can keep a
/// handle while the store owns another.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    inner: Arc<Mutex<MemoryInner>>,
    total_writes: Arc<AtomicUsize>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.inner
            .lock()
            .ok()
            .and_then(|inner| inner.entries.get(key).cloned())
    }

    /// Store a raw value without counting it as a write.
    pub fn seed(&self, key: &str, value: impl Into<String>) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.entries.insert(key.to_string(), value.into());
        }
    }

    pub fn writes_for(&self, key: &str) -> usize {
        self.inner
            .lock()
            .ok()
            .and_then(|inner| inner.writes.get(key).copied())
            .unwrap_or(0)
    }

    pub fn total_writes(&self) -> usize {
        self.total_writes.load(Ordering::SeqCst)
    }
}

impl StorageBackend for MemoryBackend {
    fn read(&self, key: &str) -> StoreResult<Option<String>> {
        let inner = self
            .inner
            .lock()
            .map_err(|_| StoreError::Unavailable("memory backend poisoned".into()))?;
        Ok(inner.entries.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> StoreResult<()> {
        let mut inner = self
            .inner
            .lock()
            .map_err(|_| StoreError::Unavailable("memory backend poisoned".into()))?;
        inner.entries.insert(key.to_string(), value.to_string());
        *inner.writes.entry(key.to_string()).or_default() += 1;
        self.total_writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// One `<key>.json` file per key under `root`.
#[derive(Debug, Clone)]
pub struct FileBackend {
    root: PathBuf,
}

impl FileBackend {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let file: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '_' || c == '-' { c } else { '_' })
            .collect();
        self.root.join(format!("{file}.json"))
    }
}

impl StorageBackend for FileBackend {
    fn read(&self, key: &str) -> StoreResult<Option<String>> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(raw) => Ok(Some(raw)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(StoreError::io(key, err)),
        }
    }

    fn write(&mut self, key: &str, value: &str) -> StoreResult<()> {
        fs::create_dir_all(&self.root).map_err(|err| StoreError::io(key, err))?;
        let path = self.path_for(key);
        // write-then-rename so a crash never leaves a truncated snapshot
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value).map_err(|err| StoreError::io(key, err))?;
        fs::rename(&tmp, &path).map_err(|err| StoreError::io(key, err))
    }
}
