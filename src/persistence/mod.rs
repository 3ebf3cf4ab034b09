//! Snapshot persistence with trailing-edge debounced writes.
//!
//! There is no timer thread. A debounced save records the latest snapshot
//! and a deadline; the host calls [`PersistenceStore::poll`] from its event
//! loop and the write happens on the first poll past the deadline. Cancelling
//! the deadline is only ever done together with a synchronous save
//! ([`PersistenceStore::flush_pending`]).

pub mod backend;

use std::time::{Duration, Instant};

use serde::Serialize;
use serde::de::DeserializeOwned;

pub use backend::{FileBackend, MemoryBackend, StorageBackend};

use crate::constants::{FOLDERS_STORAGE_KEY, SAVE_DEBOUNCE, WINDOWS_STORAGE_KEY};
use crate::error::{StoreError, StoreResult};
use crate::window::stacking::next_z;
use crate::window::{FolderRegistry, WindowRecord, WindowRegistry};

/// Everything that survives a restart.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub windows: WindowRegistry,
    pub folders: FolderRegistry,
}

pub struct PersistenceStore {
    backend: Box<dyn StorageBackend>,
    delay: Duration,
    pending: Option<Snapshot>,
    deadline: Option<Instant>,
}

impl PersistenceStore {
    pub fn new(backend: Box<dyn StorageBackend>) -> Self {
        Self::with_delay(backend, SAVE_DEBOUNCE)
    }

    pub fn with_delay(backend: Box<dyn StorageBackend>, delay: Duration) -> Self {
        Self {
            backend,
            delay,
            pending: None,
            deadline: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Serialize and write immediately.
    pub fn save(&mut self, snapshot: &Snapshot) -> StoreResult<()> {
        self.write_json(WINDOWS_STORAGE_KEY, &snapshot.windows)?;
        self.write_json(FOLDERS_STORAGE_KEY, &snapshot.folders)
    }

    /// Replace any pending snapshot and push the deadline to `now + delay`.
    pub fn debounced_save(&mut self, snapshot: Snapshot, now: Instant) {
        self.pending = Some(snapshot);
        self.deadline = Some(now + self.delay);
    }

    /// Write the pending snapshot if its deadline has passed. Returns `true`
    /// when a write was attempted.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.flush_pending();
                true
            }
            _ => false,
        }
    }

    /// Cancel the timer and save the pending snapshot synchronously. A failed
    /// write keeps the snapshot pending and re-arms the deadline.
    pub fn flush_pending(&mut self) {
        self.deadline = None;
        let Some(snapshot) = self.pending.take() else {
            return;
        };
        match self.save(&snapshot) {
            Ok(()) => tracing::debug!(windows = snapshot.windows.len(), "snapshot saved"),
            Err(err) => {
                tracing::warn!(error = %err, "failed to save snapshot; will retry");
                self.pending = Some(snapshot);
                self.deadline = Some(Instant::now() + self.delay);
            }
        }
    }

    /// Last saved snapshot. Any read or parse failure yields `None`. A
    /// missing or malformed folder blob degrades to no folders.
    pub fn load(&self) -> Option<Snapshot> {
        let windows = match self.read_json::<WindowRegistry>(WINDOWS_STORAGE_KEY) {
            Ok(Some(windows)) => windows,
            Ok(None) => return None,
            Err(err) => {
                tracing::warn!(error = %err, "discarding persisted windows");
                return None;
            }
        };
        let folders = match self.read_json::<FolderRegistry>(FOLDERS_STORAGE_KEY) {
            Ok(folders) => folders.unwrap_or_default(),
            Err(err) => {
                tracing::warn!(error = %err, "discarding persisted folders");
                FolderRegistry::default()
            }
        };
        Some(Snapshot { windows, folders })
    }

    pub fn read_json<T: DeserializeOwned>(&self, key: &str) -> StoreResult<Option<T>> {
        let Some(raw) = self.backend.read(key)? else {
            return Ok(None);
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|err| StoreError::json(key, err))
    }

    pub fn write_json<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> StoreResult<()> {
        let raw = serde_json::to_string(value).map_err(|err| StoreError::json(key, err))?;
        self.backend.write(key, &raw)
    }
}

impl std::fmt::Debug for PersistenceStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistenceStore")
            .field("delay", &self.delay)
            .field("pending", &self.pending.is_some())
            .field("deadline", &self.deadline)
            .finish()
    }
}

/// Append every default window missing from `loaded`. Existing records keep
/// their content and order; appended ones get fresh stacking values.
pub fn merge_defaults(
    mut loaded: WindowRegistry,
    folders: &FolderRegistry,
    defaults: &[WindowRecord],
) -> WindowRegistry {
    for default in defaults {
        if loaded.contains(&default.id) {
            continue;
        }
        let mut record = default.clone();
        record.z_index = next_z(&loaded, folders);
        tracing::info!(window_id = %record.id, "adding new default window");
        loaded.upsert(record);
    }
    loaded
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{Point, Size};
    use crate::window::WindowId;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    fn record(id: &str, z: u64) -> WindowRecord {
        let mut rec = WindowRecord::new(id, id, Point::new(1.5, 2.25), Size::new(400.0, 300.0));
        rec.z_index = z;
        rec
    }

    fn store() -> (PersistenceStore, MemoryBackend) {
        let backend = MemoryBackend::new();
        (PersistenceStore::new(Box::new(backend.clone())), backend)
    }

    fn snapshot() -> Snapshot {
        Snapshot {
            windows: WindowRegistry::from_records([record("a", 1), record("b", 2)]),
            folders: FolderRegistry::default(),
        }
    }

    /// Memory backend whose writes can be switched off.
    struct FlakyBackend {
        inner: MemoryBackend,
        broken: Arc<AtomicBool>,
    }

    impl StorageBackend for FlakyBackend {
        fn read(&self, key: &str) -> StoreResult<Option<String>> {
            self.inner.read(key)
        }

        fn write(&mut self, key: &str, value: &str) -> StoreResult<()> {
            if self.broken.load(Ordering::SeqCst) {
                return Err(StoreError::Unavailable("disk full".into()));
            }
            self.inner.write(key, value)
        }
    }

    #[test]
    fn failed_flush_keeps_snapshot_for_retry() {
        let inner = MemoryBackend::new();
        let broken = Arc::new(AtomicBool::new(true));
        let mut store = PersistenceStore::new(Box::new(FlakyBackend {
            inner: inner.clone(),
            broken: broken.clone(),
        }));
        let start = Instant::now();
        store.debounced_save(snapshot(), start);
        store.flush_pending();
        assert!(store.has_pending());
        assert!(store.deadline().is_some());
        assert_eq!(inner.total_writes(), 0);

        broken.store(false, Ordering::SeqCst);
        assert!(store.poll(Instant::now() + Duration::from_secs(5)));
        assert!(!store.has_pending());
        assert_eq!(store.load(), Some(snapshot()));
    }

    #[test]
    fn load_of_empty_store_is_none() {
        let (store, _) = store();
        assert!(store.load().is_none());
    }

    #[test]
    fn save_then_load_round_trips() {
        let (mut store, _) = store();
        let snap = snapshot();
        store.save(&snap).unwrap();
        assert_eq!(store.load(), Some(snap));
    }

    #[test]
    fn corrupt_windows_blob_loads_as_none() {
        let (store, backend) = store();
        backend.seed(WINDOWS_STORAGE_KEY, "{not json");
        assert!(store.load().is_none());
    }

    #[test]
    fn corrupt_folder_blob_keeps_windows() {
        let (mut store, backend) = store();
        store.save(&snapshot()).unwrap();
        backend.seed(FOLDERS_STORAGE_KEY, "[{\"id\": 7}]");
        let loaded = store.load().unwrap();
        assert_eq!(loaded.windows.len(), 2);
        assert!(loaded.folders.is_empty());
    }

    #[test]
    fn debounce_coalesces_until_deadline() {
        let (mut store, backend) = store();
        let start = Instant::now();
        for i in 0..10u64 {
            let mut snap = snapshot();
            snap.windows.upsert(record("a", 100 + i));
            store.debounced_save(snap, start + Duration::from_millis(i * 40));
        }
        assert!(!store.poll(start + Duration::from_millis(500)));
        assert_eq!(backend.writes_for(WINDOWS_STORAGE_KEY), 0);
        assert!(store.poll(start + Duration::from_millis(860)));
        assert_eq!(backend.writes_for(WINDOWS_STORAGE_KEY), 1);
        let saved = store.load().unwrap();
        assert_eq!(saved.windows.get(&WindowId::new("a")).unwrap().z_index, 109);
        assert!(!store.poll(start + Duration::from_secs(5)));
    }

    #[test]
    fn flush_pending_writes_synchronously() {
        let (mut store, backend) = store();
        store.debounced_save(snapshot(), Instant::now());
        store.flush_pending();
        assert_eq!(backend.writes_for(WINDOWS_STORAGE_KEY), 1);
        assert!(!store.has_pending());
        assert!(store.deadline().is_none());
        store.flush_pending();
        assert_eq!(backend.writes_for(WINDOWS_STORAGE_KEY), 1);
    }

    #[test]
    fn merge_defaults_appends_without_touching_existing() {
        let mut saved_a = record("a", 7);
        saved_a.position = Point::new(999.0, 999.0);
        let loaded = WindowRegistry::from_records([saved_a.clone()]);
        let defaults = [record("b", 0), record("a", 0)];
        let merged = merge_defaults(loaded, &FolderRegistry::default(), &defaults);
        let ids: Vec<_> = merged.ids().map(|id| id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(merged.get(&WindowId::new("a")), Some(&saved_a));
        assert_eq!(merged.get(&WindowId::new("b")).unwrap().z_index, 8);
    }

    #[test]
    fn merge_defaults_is_idempotent() {
        let loaded = WindowRegistry::from_records([record("a", 3)]);
        let defaults = [record("b", 0), record("c", 0)];
        let folders = FolderRegistry::default();
        let once = merge_defaults(loaded, &folders, &defaults);
        let twice = merge_defaults(once.clone(), &folders, &defaults);
        assert_eq!(once, twice);
    }
}
