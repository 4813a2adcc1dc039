use serde::{Deserialize, Serialize};

/// Response from TMDB `search/movie`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub results: Vec<MovieResult>,
}

/// A single movie in a TMDB search response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MovieResult {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
}

/// Response from the IMDb suggestion endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SuggestionResponse {
    #[serde(default)]
    pub d: Vec<Suggestion>,
}

/// One suggestion entry: `id` is e.g. `tt0086034`, `l` the label, `y` the year.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Suggestion {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub l: Option<String>,
    #[serde(default)]
    pub y: Option<i32>,
    #[serde(default)]
    pub i: Option<SuggestionImage>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SuggestionImage {
    #[serde(rename = "imageUrl", default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
}

/// Artwork found by a source. Only produced when a poster is present.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArtResult {
    pub poster: Option<String>,
    pub backdrop: Option<String>,
    /// Description read alongside the artwork (detail-page lookups only).
    pub description: Option<String>,
}

impl ArtResult {
    pub fn new(poster: impl Into<String>) -> Self {
        Self {
            poster: Some(poster.into()),
            ..Default::default()
        }
    }

    pub fn with_backdrop(mut self, backdrop: Option<String>) -> Self {
        self.backdrop = backdrop;
        self
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }

    /// A result counts only when it carries a usable poster URL.
    pub fn is_usable(&self) -> bool {
        self.poster.as_deref().is_some_and(|p| !p.trim().is_empty())
    }
}

/// A catalog page entry handed over by the listing scraper.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Listing {
    pub title: String,
    pub slug: String,
}

/// A single item to enrich, with the page it was scraped from.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ListingRef {
    pub title: String,
    pub page_url: String,
}

/// A catalog entry with its resolved poster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogItem {
    pub title: String,
    pub slug: String,
    pub poster: Option<String>,
}

/// Full metadata for a single item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetaItem {
    pub title: String,
    pub poster: Option<String>,
    pub background: Option<String>,
    pub description: Option<String>,
}
