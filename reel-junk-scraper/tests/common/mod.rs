#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use reel_junk_scraper::{
    ArtCache, ArtLookup, ArtResult, ArtSource, CacheSnapshot, CacheStore, Fetcher, ScrapeError,
    SourceKind, cache_key,
};

/// Serves canned bodies by exact URL and records every request.
#[derive(Default)]
pub struct ScriptedFetcher {
    bodies: HashMap<String, String>,
    requests: Mutex<Vec<String>>,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, url: &str, body: &str) -> Self {
        self.bodies.insert(url.to_string(), body.to_string());
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub fn count(&self, url: &str) -> usize {
        self.requests().iter().filter(|u| u.as_str() == url).count()
    }
}

#[async_trait]
impl Fetcher for ScriptedFetcher {
    async fn fetch_text(
        &self,
        url: &str,
        _referer: Option<&str>,
        _accept: Option<&str>,
    ) -> Result<String, ScrapeError> {
        self.requests.lock().unwrap().push(url.to_string());
        self.bodies.get(url).cloned().ok_or_else(|| ScrapeError::Remote {
            status: 404,
            url: url.to_string(),
        })
    }
}

/// Source with a fixed answer per cache key and a call counter.
pub struct CountingSource {
    name: &'static str,
    kind: SourceKind,
    answers: HashMap<String, ArtResult>,
    pub calls: AtomicUsize,
}

impl CountingSource {
    pub fn new(name: &'static str, kind: SourceKind) -> Self {
        Self {
            name,
            kind,
            answers: HashMap::new(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn answer(mut self, title: &str, poster: &str) -> Self {
        self.answers.insert(cache_key(title), ArtResult::new(poster));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ArtSource for CountingSource {
    fn name(&self) -> &'static str {
        self.name
    }

    fn kind(&self) -> SourceKind {
        self.kind
    }

    async fn resolve(&self, title: &str) -> ArtLookup {
        self.calls.fetch_add(1, Ordering::SeqCst);
        ArtLookup::from_result(self.answers.get(&cache_key(title)).cloned())
    }
}

/// In-memory store that counts saves.
#[derive(Default)]
pub struct MemoryStore {
    pub saved: Mutex<Option<CacheSnapshot>>,
    pub saves: AtomicUsize,
}

impl CacheStore for MemoryStore {
    fn load(&self) -> Result<CacheSnapshot, ScrapeError> {
        Ok(self.saved.lock().unwrap().clone().unwrap_or_default())
    }

    fn save(&self, snapshot: &CacheSnapshot) -> Result<(), ScrapeError> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        *self.saved.lock().unwrap() = Some(snapshot.clone());
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

pub fn memory_cache() -> (Arc<MemoryStore>, ArtCache) {
    let store = Arc::new(MemoryStore::default());
    let cache = ArtCache::load(store.clone());
    (store, cache)
}
