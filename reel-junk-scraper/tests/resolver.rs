mod common;

use std::sync::Arc;

use common::{CountingSource, ScriptedFetcher, memory_cache};
use reel_junk_scraper::{
    ArtCache, ArtResolver, ArtSource, ImdbSource, JsonFileStore, Namespace, RateGate, SourceKind,
};

fn resolver(sources: Vec<Arc<dyn ArtSource>>, cache: ArtCache) -> Arc<ArtResolver> {
    Arc::new(ArtResolver::new(sources, cache, 4))
}

#[tokio::test]
async fn structured_source_wins_when_both_have_art() {
    let tmdb = Arc::new(
        CountingSource::new("tmdb", SourceKind::Structured).answer("Alien", "https://tmdb/alien.jpg"),
    );
    let imdb = Arc::new(
        CountingSource::new("imdb", SourceKind::ScrapedSite).answer("Alien", "https://imdb/alien.jpg"),
    );
    let (_, cache) = memory_cache();
    let resolver = resolver(vec![tmdb.clone(), imdb.clone()], cache);

    assert_eq!(
        resolver.best_art("Alien").await.as_deref(),
        Some("https://tmdb/alien.jpg")
    );
    assert_eq!(tmdb.calls(), 1);
    assert_eq!(imdb.calls(), 0);
}

#[tokio::test]
async fn falls_through_to_scraped_site() {
    let tmdb = Arc::new(CountingSource::new("tmdb", SourceKind::Structured));
    let imdb = Arc::new(
        CountingSource::new("imdb", SourceKind::ScrapedSite).answer("Alien", "https://imdb/alien.jpg"),
    );
    let (_, cache) = memory_cache();
    let resolver = resolver(vec![tmdb.clone(), imdb.clone()], cache.clone());

    assert_eq!(
        resolver.best_art("Alien").await.as_deref(),
        Some("https://imdb/alien.jpg")
    );
    assert_eq!((tmdb.calls(), imdb.calls()), (1, 1));
    assert_eq!(
        cache.get(Namespace::Poster, "alien"),
        Some(Some("https://imdb/alien.jpg".to_string()))
    );
}

#[tokio::test]
async fn warm_cache_answers_without_sources() {
    let tmdb = Arc::new(
        CountingSource::new("tmdb", SourceKind::Structured).answer("Alien", "https://tmdb/alien.jpg"),
    );
    let (_, cache) = memory_cache();
    let resolver = resolver(vec![tmdb.clone()], cache);

    let first = resolver.resolve("Alien").await;
    let second = resolver.resolve("  ALIEN ").await;
    assert!(!first.from_cache);
    assert!(second.from_cache);
    assert_eq!(first.poster(), second.poster());
    assert_eq!(tmdb.calls(), 1);
}

#[tokio::test]
async fn misses_are_cached_as_negatives() {
    let tmdb = Arc::new(CountingSource::new("tmdb", SourceKind::Structured));
    let imdb = Arc::new(CountingSource::new("imdb", SourceKind::ScrapedSite));
    let (_, cache) = memory_cache();
    let resolver = resolver(vec![tmdb.clone(), imdb.clone()], cache.clone());

    assert_eq!(resolver.best_art("Filme Perdido").await, None);
    assert_eq!(resolver.best_art("filme perdido").await, None);
    assert_eq!((tmdb.calls(), imdb.calls()), (1, 1));
    assert_eq!(cache.get(Namespace::Poster, "filme perdido"), Some(None));
}

#[tokio::test]
async fn blank_title_touches_nothing() {
    let tmdb = Arc::new(CountingSource::new("tmdb", SourceKind::Structured));
    let (_, cache) = memory_cache();
    let resolver = resolver(vec![tmdb.clone()], cache.clone());

    assert_eq!(resolver.best_art("   ").await, None);
    assert_eq!(tmdb.calls(), 0);
    assert!(cache.is_empty());
}

#[tokio::test]
async fn batch_keeps_input_order() {
    let tmdb = Arc::new(
        CountingSource::new("tmdb", SourceKind::Structured)
            .answer("A", "https://img/a.jpg")
            .answer("C", "https://img/c.jpg")
            .answer("E", "https://img/e.jpg"),
    );
    let (_, cache) = memory_cache();
    let resolver = Arc::new(ArtResolver::new(vec![tmdb], cache, 2));

    let titles = ["A", "B", "C", "D", "E"].map(String::from).to_vec();
    let posters = resolver.best_art_batch(titles).await;
    assert_eq!(
        posters,
        vec![
            Some("https://img/a.jpg".to_string()),
            None,
            Some("https://img/c.jpg".to_string()),
            None,
            Some("https://img/e.jpg".to_string()),
        ]
    );
}

#[tokio::test]
async fn shutdown_persists_to_file_and_reloads() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("art-cache.json");
    let tmdb = Arc::new(
        CountingSource::new("tmdb", SourceKind::Structured).answer("Alien", "https://tmdb/alien.jpg"),
    );

    let cache = ArtCache::load(Arc::new(JsonFileStore::new(&path)));
    let resolver = resolver(vec![tmdb.clone()], cache);
    resolver.best_art("Alien").await;
    resolver.best_art("Nada").await;
    resolver.shutdown().await;

    let raw = std::fs::read_to_string(&path).unwrap();
    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(json["posters"]["alien"], "https://tmdb/alien.jpg");
    assert!(json["posters"]["nada"].is_null());
    assert!(json["posters"].as_object().unwrap().contains_key("nada"));

    // A fresh process sees both answers without asking the source again.
    let reloaded = ArtCache::load(Arc::new(JsonFileStore::new(&path)));
    let resolver = self::resolver(vec![tmdb.clone()], reloaded);
    assert_eq!(
        resolver.best_art("alien").await.as_deref(),
        Some("https://tmdb/alien.jpg")
    );
    assert_eq!(resolver.best_art("NADA").await, None);
    assert_eq!(tmdb.calls(), 2);
}

#[tokio::test]
async fn suggestion_image_is_upscaled_and_persisted() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("art-cache.json");
    let fetcher = Arc::new(ScriptedFetcher::new().with(
        "https://v3.sg.media-imdb.com/suggestion/o/o%20dia%20seguinte.json",
        r#"{"d":[{"id":"tt0085404","l":"O Dia Seguinte","y":1983,
            "i":{"imageUrl":"https://m.media-amazon.com/images/M/MV5BYjM4._V1_UX182_.jpg","width":182,"height":268}}]}"#,
    ));
    let cache = ArtCache::load(Arc::new(JsonFileStore::new(&path)));
    let gate = Arc::new(RateGate::new(10));
    let imdb = Arc::new(ImdbSource::new(fetcher.clone(), gate.clone(), cache.clone()));
    let resolver = resolver(vec![imdb], cache);

    let poster = resolver.best_art("O Dia Seguinte").await;
    assert_eq!(
        poster.as_deref(),
        Some("https://m.media-amazon.com/images/M/MV5BYjM4._V1_.jpg")
    );
    assert_eq!(fetcher.requests().len(), 1);
    assert_eq!(gate.in_window("imdb.com"), 1);

    resolver.shutdown().await;
    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(
        json["posters"]["o dia seguinte"],
        "https://m.media-amazon.com/images/M/MV5BYjM4._V1_.jpg"
    );
}
