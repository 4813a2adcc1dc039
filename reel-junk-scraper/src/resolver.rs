use std::convert::Infallible;
use std::sync::Arc;

use reel_junk_lib::Settings;
use reel_junk_lib::worker_pool::map_limit;

use crate::cache::{ArtCache, CacheStore, JsonFileStore, Namespace, cache_key};
use crate::client::{Fetcher, HttpClient};
use crate::credentials::TmdbCredentials;
use crate::error::ScrapeError;
use crate::imdb::ImdbSource;
use crate::rate_gate::RateGate;
use crate::source::{ArtLookup, ArtSource, SourceKind};
use crate::tmdb::TmdbSource;
use crate::types::ArtResult;

/// Result of resolving a title, with where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Artwork, or `None` when every source missed (or a negative was cached).
    /// Cache hits only carry the poster.
    pub art: Option<ArtResult>,
    pub from_cache: bool,
}

impl Resolution {
    pub fn poster(&self) -> Option<String> {
        self.art.as_ref().and_then(|a| a.poster.clone())
    }
}

/// Finds the best artwork for a title: cache first, then each source in a
/// fixed priority order, writing whatever was learned back to the cache.
pub struct ArtResolver {
    sources: Vec<Arc<dyn ArtSource>>,
    cache: ArtCache,
    concurrency: usize,
}

impl ArtResolver {
    /// `sources` are tried in the order given.
    pub fn new(sources: Vec<Arc<dyn ArtSource>>, cache: ArtCache, concurrency: usize) -> Self {
        Self {
            sources,
            cache,
            concurrency: concurrency.max(1),
        }
    }

    pub fn cache(&self) -> &ArtCache {
        &self.cache
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Name and kind of each configured source, in priority order.
    pub fn source_names(&self) -> Vec<(&'static str, SourceKind)> {
        self.sources.iter().map(|s| (s.name(), s.kind())).collect()
    }

    /// Resolve a title. Never fails: every source error has already been
    /// turned into a miss.
    pub async fn resolve(&self, title: &str) -> Resolution {
        let key = cache_key(title);
        if key.is_empty() {
            return Resolution {
                art: None,
                from_cache: false,
            };
        }

        if let Some(cached) = self.cache.get(Namespace::Poster, &key) {
            log::debug!("art cache hit for '{}'", key);
            return Resolution {
                art: cached.map(ArtResult::new),
                from_cache: true,
            };
        }

        let art = self.walk_sources(title).await;
        if art.is_none() {
            log::debug!("no artwork for '{}', caching negative", key);
        }
        self.cache
            .put(Namespace::Poster, &key, art.as_ref().and_then(|a| a.poster.clone()));
        Resolution {
            art,
            from_cache: false,
        }
    }

    /// Walk every source for the full result (backdrop and description
    /// included) without reading or writing the poster cache.
    pub async fn lookup_detail(&self, title: &str) -> Option<ArtResult> {
        if cache_key(title).is_empty() {
            return None;
        }
        self.walk_sources(title).await
    }

    async fn walk_sources(&self, title: &str) -> Option<ArtResult> {
        for source in &self.sources {
            if let ArtLookup::Found(art) = source.resolve(title).await {
                log::debug!("'{}' resolved by {} ({})", title.trim(), source.name(), source.kind());
                return Some(art);
            }
        }
        None
    }

    /// Best poster URL for a title, or `None`.
    pub async fn best_art(&self, title: &str) -> Option<String> {
        self.resolve(title).await.poster()
    }

    /// Resolve many titles with at most `concurrency` in flight. The result
    /// has one slot per title, in input order.
    pub async fn best_art_batch(self: &Arc<Self>, titles: Vec<String>) -> Vec<Option<String>> {
        let resolver = self.clone();
        map_limit(titles, self.concurrency, move |title| {
            let resolver = resolver.clone();
            async move { Ok::<_, Infallible>(resolver.best_art(&title).await) }
        })
        .await
        .into_iter()
        .map(Option::flatten)
        .collect()
    }

    /// Flush the cache before the process exits.
    pub async fn shutdown(&self) {
        self.cache.shutdown().await;
    }
}

/// Build the production resolver: HTTP client, rate gate, file-backed cache,
/// TMDB (when a key is configured) followed by IMDb.
pub fn create_resolver(
    settings: &Settings,
    creds: &TmdbCredentials,
) -> Result<Arc<ArtResolver>, ScrapeError> {
    let fetcher: Arc<dyn Fetcher> = Arc::new(HttpClient::new()?);
    let store: Arc<dyn CacheStore> = Arc::new(JsonFileStore::new(&settings.cache_path));
    let cache = ArtCache::load(store);
    let gate = Arc::new(RateGate::new(settings.rate_limit));
    match gate.max_per_window() {
        0 => log::debug!("IMDb rate gate disabled"),
        n => log::debug!("IMDb rate gate: {} request(s) per second", n),
    }

    let mut sources: Vec<Arc<dyn ArtSource>> = Vec::new();
    if let Some(key) = creds.api_key.as_deref() {
        sources.push(Arc::new(TmdbSource::new(
            fetcher.clone(),
            key,
            settings.language.clone(),
        )));
    } else {
        log::debug!("No TMDB API key configured; structured source disabled");
    }
    sources.push(Arc::new(ImdbSource::new(fetcher, gate, cache.clone())));

    Ok(Arc::new(ArtResolver::new(
        sources,
        cache,
        settings.concurrency,
    )))
}
