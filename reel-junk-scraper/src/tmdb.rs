use std::sync::Arc;

use async_trait::async_trait;

use crate::client::{Fetcher, fetch_json_as};
use crate::error::ScrapeError;
use crate::source::{ArtLookup, ArtSource, SourceKind};
use crate::types::{ArtResult, MovieResult, SearchResponse};

const SEARCH_URL: &str = "https://api.themoviedb.org/3/search/movie";
const POSTER_BASE: &str = "https://image.tmdb.org/t/p/w500";
const BACKDROP_BASE: &str = "https://image.tmdb.org/t/p/original";

/// Language tried when the localized search comes back empty.
pub const DEFAULT_LANGUAGE: &str = "en-US";

/// Structured source backed by the TMDB movie search API.
///
/// Not rate-gated. Only constructed when an API key is configured.
pub struct TmdbSource {
    fetcher: Arc<dyn Fetcher>,
    api_key: String,
    language: String,
}

impl TmdbSource {
    pub fn new(fetcher: Arc<dyn Fetcher>, api_key: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            fetcher,
            api_key: api_key.into(),
            language: language.into(),
        }
    }

    /// Languages to search, localized first. Skips the default when it is
    /// the same as the localized one.
    fn languages(&self) -> Vec<&str> {
        let mut langs = vec![self.language.as_str()];
        if !self.language.eq_ignore_ascii_case(DEFAULT_LANGUAGE) {
            langs.push(DEFAULT_LANGUAGE);
        }
        langs
    }

    async fn search(&self, title: &str, language: &str) -> Result<Vec<MovieResult>, ScrapeError> {
        let url = search_url(&self.api_key, title, language)?;
        let resp: SearchResponse = fetch_json_as(self.fetcher.as_ref(), &url).await?;
        Ok(resp.results)
    }

    async fn try_resolve(&self, title: &str) -> Result<Option<ArtResult>, ScrapeError> {
        for language in self.languages() {
            let results = self.search(title, language).await?;
            if let Some(first) = results.first() {
                return Ok(art_from_result(first));
            }
            log::debug!("tmdb: no results for '{}' ({})", title, language);
        }
        Ok(None)
    }
}

#[async_trait]
impl ArtSource for TmdbSource {
    fn name(&self) -> &'static str {
        "tmdb"
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Structured
    }

    async fn resolve(&self, title: &str) -> ArtLookup {
        match self.try_resolve(title).await {
            Ok(result) => ArtLookup::from_result(result),
            Err(e) => {
                log::debug!("tmdb: lookup for '{}' failed: {}", title, e);
                ArtLookup::Miss
            }
        }
    }
}

fn search_url(api_key: &str, title: &str, language: &str) -> Result<String, ScrapeError> {
    reqwest::Url::parse_with_params(
        SEARCH_URL,
        &[("api_key", api_key), ("query", title), ("language", language)],
    )
    .map(String::from)
    .map_err(|e| ScrapeError::config(format!("Invalid TMDB search URL: {e}")))
}

/// Compose full image URLs from the first search result. The backdrop falls
/// back to the poster path.
fn art_from_result(result: &MovieResult) -> Option<ArtResult> {
    let poster_path = non_empty(result.poster_path.as_deref());
    let backdrop_path = non_empty(result.backdrop_path.as_deref()).or(poster_path);

    let poster = poster_path.map(|p| format!("{POSTER_BASE}{p}"))?;
    let backdrop = backdrop_path.map(|p| format!("{BACKDROP_BASE}{p}"));
    Some(ArtResult::new(poster).with_backdrop(backdrop))
}

fn non_empty(path: Option<&str>) -> Option<&str> {
    path.filter(|p| !p.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_art_from_result_composes_sizes() {
        let result = MovieResult {
            poster_path: Some("/poster.jpg".into()),
            backdrop_path: Some("/backdrop.jpg".into()),
            ..Default::default()
        };
        let art = art_from_result(&result).unwrap();
        assert_eq!(art.poster.as_deref(), Some("https://image.tmdb.org/t/p/w500/poster.jpg"));
        assert_eq!(
            art.backdrop.as_deref(),
            Some("https://image.tmdb.org/t/p/original/backdrop.jpg")
        );
    }

    #[test]
    fn test_backdrop_falls_back_to_poster_path() {
        let result = MovieResult {
            poster_path: Some("/poster.jpg".into()),
            ..Default::default()
        };
        let art = art_from_result(&result).unwrap();
        assert_eq!(
            art.backdrop.as_deref(),
            Some("https://image.tmdb.org/t/p/original/poster.jpg")
        );
    }

    #[test]
    fn test_result_without_poster_is_a_miss() {
        let result = MovieResult {
            backdrop_path: Some("/backdrop.jpg".into()),
            ..Default::default()
        };
        assert_eq!(art_from_result(&result), None);
    }

    #[test]
    fn test_search_url_encodes_query() {
        let url = search_url("KEY", "O Dia Seguinte", "pt-BR").unwrap();
        assert!(url.starts_with("https://api.themoviedb.org/3/search/movie?"));
        assert!(url.contains("api_key=KEY"));
        assert!(url.contains("query=O+Dia+Seguinte"));
        assert!(url.contains("language=pt-BR"));
    }
}
