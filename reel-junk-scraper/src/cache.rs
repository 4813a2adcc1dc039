//! Persistent resolution cache with debounced write-back.
//!
//! Two independent namespaces share one store: best artwork per title and
//! the resolved detail-page URL per title. Every value is an
//! `Option<String>`; a stored `None` is a confirmed negative and is distinct
//! from a key that was never looked up.
//!
//! Writes mark the cache dirty and schedule a single flush task. Further
//! writes while a flush is pending ride along with it instead of pushing it
//! back, so the staleness window is bounded by [`DEBOUNCE`].

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tokio::time::Duration;

use crate::error::ScrapeError;

/// Delay between the first unsaved write and the flush that persists it.
pub const DEBOUNCE: Duration = Duration::from_millis(400);

/// Upper bound on the final flush performed by [`ArtCache::shutdown`].
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

/// Cache key for a title: trimmed and lowercased.
pub fn cache_key(title: &str) -> String {
    title.trim().to_lowercase()
}

/// The two key spaces held by the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    /// Title -> best artwork URL.
    Poster,
    /// Title -> canonical detail-page URL.
    Resolve,
}

impl std::fmt::Display for Namespace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Namespace::Poster => write!(f, "posters"),
            Namespace::Resolve => write!(f, "resolved"),
        }
    }
}

/// On-disk snapshot of both namespaces.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheSnapshot {
    #[serde(default)]
    pub posters: BTreeMap<String, Option<String>>,
    #[serde(default)]
    pub resolved: BTreeMap<String, Option<String>>,
}

impl CacheSnapshot {
    fn map(&self, ns: Namespace) -> &BTreeMap<String, Option<String>> {
        match ns {
            Namespace::Poster => &self.posters,
            Namespace::Resolve => &self.resolved,
        }
    }

    fn map_mut(&mut self, ns: Namespace) -> &mut BTreeMap<String, Option<String>> {
        match ns {
            Namespace::Poster => &mut self.posters,
            Namespace::Resolve => &mut self.resolved,
        }
    }
}

/// Persistence port for the cache.
pub trait CacheStore: Send + Sync {
    /// Load the last saved snapshot. A store with nothing saved yet returns
    /// an empty snapshot.
    fn load(&self) -> Result<CacheSnapshot, ScrapeError>;

    fn save(&self, snapshot: &CacheSnapshot) -> Result<(), ScrapeError>;

    /// Human-readable location, for logs.
    fn describe(&self) -> String;
}

/// Stores the snapshot as pretty-printed JSON, written atomically.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CacheStore for JsonFileStore {
    fn load(&self) -> Result<CacheSnapshot, ScrapeError> {
        if !self.path.exists() {
            return Ok(CacheSnapshot::default());
        }
        let contents = std::fs::read_to_string(&self.path).map_err(|e| {
            ScrapeError::cache_io(format!("Failed to read {}: {}", self.path.display(), e))
        })?;
        serde_json::from_str(&contents).map_err(|e| {
            ScrapeError::cache_io(format!("Failed to parse {}: {}", self.path.display(), e))
        })
    }

    fn save(&self, snapshot: &CacheSnapshot) -> Result<(), ScrapeError> {
        let io_err = |e: std::io::Error| {
            ScrapeError::cache_io(format!("Failed to write {}: {}", self.path.display(), e))
        };
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(io_err)?;
            }
        }
        let contents = serde_json::to_string_pretty(snapshot)
            .map_err(|e| ScrapeError::cache_io(format!("Failed to serialize cache: {e}")))?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, contents).map_err(io_err)?;
        std::fs::rename(&tmp, &self.path).map_err(io_err)?;
        Ok(())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Entry counts per namespace.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub posters: usize,
    pub poster_negatives: usize,
    pub resolved: usize,
    pub resolved_negatives: usize,
}

#[derive(Default)]
struct CacheState {
    data: CacheSnapshot,
    dirty: bool,
}

struct Shared {
    state: Mutex<CacheState>,
    pending: Mutex<Option<JoinHandle<()>>>,
    store: Arc<dyn CacheStore>,
    debounce: Duration,
}

/// Process-wide resolution cache. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct ArtCache {
    shared: Arc<Shared>,
}

impl std::fmt::Debug for ArtCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArtCache")
            .field("store", &self.shared.store.describe())
            .field("stats", &self.stats())
            .finish()
    }
}

impl ArtCache {
    /// Load the cache from `store`. A missing or unreadable snapshot is
    /// logged and the cache starts empty.
    pub fn load(store: Arc<dyn CacheStore>) -> Self {
        let data = match store.load() {
            Ok(data) => {
                log::debug!(
                    "Loaded art cache from {} ({} posters, {} resolved)",
                    store.describe(),
                    data.posters.len(),
                    data.resolved.len()
                );
                data
            }
            Err(e) => {
                log::warn!("{e}; starting with an empty cache");
                CacheSnapshot::default()
            }
        };
        Self::with_data(store, data)
    }

    /// Cache that holds `data` without reading the store.
    pub fn with_data(store: Arc<dyn CacheStore>, data: CacheSnapshot) -> Self {
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(CacheState { data, dirty: false }),
                pending: Mutex::new(None),
                store,
                debounce: DEBOUNCE,
            }),
        }
    }

    /// Look up a key. The outer `Option` is the hit flag; the inner one is
    /// the stored value, where `None` is a cached negative.
    pub fn get(&self, ns: Namespace, key: &str) -> Option<Option<String>> {
        self.state().data.map(ns).get(key).cloned()
    }

    /// Store a value (or a negative) and schedule a debounced flush.
    pub fn put(&self, ns: Namespace, key: &str, value: Option<String>) {
        {
            let mut state = self.state();
            state.data.map_mut(ns).insert(key.to_string(), value);
            state.dirty = true;
        }
        self.schedule_flush();
    }

    pub fn len(&self, ns: Namespace) -> usize {
        self.state().data.map(ns).len()
    }

    pub fn is_empty(&self) -> bool {
        let state = self.state();
        state.data.posters.is_empty() && state.data.resolved.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        let state = self.state();
        let negatives =
            |map: &BTreeMap<String, Option<String>>| map.values().filter(|v| v.is_none()).count();
        CacheStats {
            posters: state.data.posters.len(),
            poster_negatives: negatives(&state.data.posters),
            resolved: state.data.resolved.len(),
            resolved_negatives: negatives(&state.data.resolved),
        }
    }

    /// Copy of both namespaces.
    pub fn snapshot(&self) -> CacheSnapshot {
        self.state().data.clone()
    }

    /// Drop every entry in both namespaces and persist the empty cache.
    pub fn clear(&self) -> Result<(), ScrapeError> {
        self.cancel_pending();
        {
            let mut state = self.state();
            state.data = CacheSnapshot::default();
            state.dirty = true;
        }
        self.flush()
    }

    /// Write the cache to its store now if anything changed since the last
    /// successful save. On failure the cache stays dirty so the next flush
    /// retries.
    pub fn flush(&self) -> Result<(), ScrapeError> {
        flush_shared(&self.shared)
    }

    /// Cancel any pending debounced flush and flush immediately, waiting at
    /// most [`SHUTDOWN_GRACE`] for the write to finish.
    pub async fn shutdown(&self) {
        self.cancel_pending();
        let shared = self.shared.clone();
        let flush = tokio::task::spawn_blocking(move || flush_shared(&shared));
        match tokio::time::timeout(SHUTDOWN_GRACE, flush).await {
            Ok(Ok(Ok(()))) => {}
            Ok(Ok(Err(e))) => log::warn!("Final cache flush failed: {e}"),
            Ok(Err(e)) => log::warn!("Final cache flush task failed: {e}"),
            Err(_) => log::warn!(
                "Final cache flush did not finish within {}s",
                SHUTDOWN_GRACE.as_secs()
            ),
        }
    }

    fn schedule_flush(&self) {
        let mut pending = lock(&self.shared.pending);
        if pending.as_ref().is_some_and(|h| !h.is_finished()) {
            return;
        }

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            // No runtime to debounce on; write through.
            drop(pending);
            if let Err(e) = self.flush() {
                log::warn!("{e}");
            }
            return;
        };

        let shared = self.shared.clone();
        *pending = Some(runtime.spawn(async move {
            tokio::time::sleep(shared.debounce).await;
            // Clear the slot first so writes landing during the save
            // schedule their own flush.
            lock(&shared.pending).take();
            if let Err(e) = flush_shared(&shared) {
                log::warn!("{e}; keeping in-memory cache");
            }
        }));
    }

    fn cancel_pending(&self) {
        if let Some(handle) = lock(&self.shared.pending).take() {
            handle.abort();
        }
    }

    fn state(&self) -> MutexGuard<'_, CacheState> {
        lock(&self.shared.state)
    }

    #[cfg(test)]
    fn with_debounce(self, debounce: Duration) -> Self {
        let shared = Arc::try_unwrap(self.shared)
            .unwrap_or_else(|_| panic!("with_debounce called on a shared cache"));
        Self {
            shared: Arc::new(Shared { debounce, ..shared }),
        }
    }
}

fn flush_shared(shared: &Shared) -> Result<(), ScrapeError> {
    let snapshot = {
        let mut state = lock(&shared.state);
        if !state.dirty {
            return Ok(());
        }
        state.dirty = false;
        state.data.clone()
    };

    match shared.store.save(&snapshot) {
        Ok(()) => {
            log::debug!(
                "Saved art cache to {} ({} posters, {} resolved)",
                shared.store.describe(),
                snapshot.posters.len(),
                snapshot.resolved.len()
            );
            Ok(())
        }
        Err(e) => {
            lock(&shared.state).dirty = true;
            Err(e)
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    /// In-memory store that counts saves and can be told to fail.
    #[derive(Default)]
    struct MemoryStore {
        saved: Mutex<Option<CacheSnapshot>>,
        saves: AtomicUsize,
        fail: AtomicBool,
    }

    impl CacheStore for MemoryStore {
        fn load(&self) -> Result<CacheSnapshot, ScrapeError> {
            Ok(self.saved.lock().unwrap().clone().unwrap_or_default())
        }

        fn save(&self, snapshot: &CacheSnapshot) -> Result<(), ScrapeError> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(ScrapeError::cache_io("disk full"));
            }
            self.saves.fetch_add(1, Ordering::SeqCst);
            *self.saved.lock().unwrap() = Some(snapshot.clone());
            Ok(())
        }

        fn describe(&self) -> String {
            "memory".to_string()
        }
    }

    #[test]
    fn test_cache_key_trims_and_lowercases() {
        assert_eq!(cache_key("  O Dia Seguinte \n"), "o dia seguinte");
    }

    #[test]
    fn test_absent_key_differs_from_negative() {
        let store = Arc::new(MemoryStore::default());
        let cache = ArtCache::load(store);
        cache.put(Namespace::Poster, "found", Some("https://img/p.jpg".into()));
        cache.put(Namespace::Poster, "missing", None);

        assert_eq!(
            cache.get(Namespace::Poster, "found"),
            Some(Some("https://img/p.jpg".to_string()))
        );
        assert_eq!(cache.get(Namespace::Poster, "missing"), Some(None));
        assert_eq!(cache.get(Namespace::Poster, "never"), None);
        // Namespaces are disjoint.
        assert_eq!(cache.get(Namespace::Resolve, "found"), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_puts_coalesce_into_one_save() {
        let store = Arc::new(MemoryStore::default());
        let cache = ArtCache::load(store.clone());

        cache.put(Namespace::Poster, "a", Some("1".into()));
        tokio::time::sleep(Duration::from_millis(100)).await;
        cache.put(Namespace::Poster, "b", None);
        cache.put(Namespace::Resolve, "a", Some("https://www.imdb.com/title/tt1/".into()));
        assert_eq!(store.saves.load(Ordering::SeqCst), 0);

        // Pending flush is not pushed back by later puts: it fires 400ms
        // after the first one.
        tokio::time::sleep(Duration::from_millis(310)).await;
        assert_eq!(store.saves.load(Ordering::SeqCst), 1);

        let saved = store.saved.lock().unwrap().clone().unwrap();
        assert_eq!(saved.posters.len(), 2);
        assert_eq!(saved.resolved.len(), 1);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(store.saves.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_save_keeps_memory_and_retries() {
        let store = Arc::new(MemoryStore::default());
        let cache = ArtCache::load(store.clone()).with_debounce(Duration::from_millis(50));
        store.fail.store(true, Ordering::SeqCst);

        cache.put(Namespace::Poster, "a", Some("1".into()));
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(store.saves.load(Ordering::SeqCst), 0);
        assert_eq!(cache.get(Namespace::Poster, "a"), Some(Some("1".to_string())));

        store.fail.store(false, Ordering::SeqCst);
        cache.put(Namespace::Poster, "b", None);
        tokio::time::sleep(Duration::from_millis(100)).await;

        let saved = store.saved.lock().unwrap().clone().unwrap();
        assert_eq!(saved.posters.len(), 2);
    }

    #[tokio::test]
    async fn test_shutdown_flushes_pending_writes() {
        let store = Arc::new(MemoryStore::default());
        let cache = ArtCache::load(store.clone());
        cache.put(Namespace::Poster, "a", Some("1".into()));

        cache.shutdown().await;
        assert_eq!(store.saves.load(Ordering::SeqCst), 1);

        // The cancelled debounce task must not save again.
        tokio::time::sleep(DEBOUNCE + Duration::from_millis(50)).await;
        assert_eq!(store.saves.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_put_without_runtime_writes_through() {
        let store = Arc::new(MemoryStore::default());
        let cache = ArtCache::load(store.clone());
        cache.put(Namespace::Resolve, "x", None);
        assert_eq!(store.saves.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_json_file_round_trip_with_negatives() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("art-cache.json");
        let store: Arc<dyn CacheStore> = Arc::new(JsonFileStore::new(&path));

        let cache = ArtCache::load(store.clone());
        cache.put(Namespace::Poster, "o dia seguinte", Some("https://img/a.jpg".into()));
        cache.put(Namespace::Poster, "nada", None);
        cache.put(Namespace::Resolve, "o dia seguinte", Some("https://www.imdb.com/title/tt0085404/".into()));
        cache.put(Namespace::Resolve, "nada", None);
        cache.flush().unwrap();

        let reloaded = ArtCache::load(store);
        assert_eq!(
            reloaded.get(Namespace::Poster, "o dia seguinte"),
            Some(Some("https://img/a.jpg".to_string()))
        );
        assert_eq!(reloaded.get(Namespace::Poster, "nada"), Some(None));
        assert_eq!(
            reloaded.get(Namespace::Resolve, "o dia seguinte"),
            Some(Some("https://www.imdb.com/title/tt0085404/".to_string()))
        );
        assert_eq!(reloaded.get(Namespace::Resolve, "nada"), Some(None));
        assert_eq!(reloaded.snapshot(), cache.snapshot());

        let raw = std::fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert!(value["posters"]["nada"].is_null());
    }

    #[test]
    fn test_malformed_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("art-cache.json");
        std::fs::write(&path, "{ not json").unwrap();

        let cache = ArtCache::load(Arc::new(JsonFileStore::new(&path)));
        assert!(cache.is_empty());

        let missing = ArtCache::load(Arc::new(JsonFileStore::new(dir.path().join("none.json"))));
        assert!(missing.is_empty());
    }

    #[test]
    fn test_stats_and_clear() {
        let store = Arc::new(MemoryStore::default());
        let cache = ArtCache::load(store.clone());
        cache.put(Namespace::Poster, "a", Some("1".into()));
        cache.put(Namespace::Poster, "b", None);
        cache.put(Namespace::Resolve, "a", None);

        assert_eq!(
            cache.stats(),
            CacheStats {
                posters: 2,
                poster_negatives: 1,
                resolved: 1,
                resolved_negatives: 1,
            }
        );

        cache.clear().unwrap();
        assert!(cache.is_empty());
        let saved = store.saved.lock().unwrap().clone().unwrap();
        assert_eq!(saved, CacheSnapshot::default());
    }
}
