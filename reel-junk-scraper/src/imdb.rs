//! Scraped-site art source backed by IMDb.
//!
//! Two stages, each degrading to "no image" on any failure:
//!
//! 1. **Suggest**: query the lightweight suggestion endpoint with the
//!    normalized title and take the best item's image, upscaled to full size.
//!    No detail page is needed when this works.
//! 2. **Find + detail**: resolve the title to a detail-page URL (cached in
//!    the resolve namespace), fetch the page and read its `og:image` and
//!    `og:description` tags.
//!
//! Every request against IMDb passes through the rate gate first.

use std::sync::Arc;

use async_trait::async_trait;

use crate::cache::{ArtCache, Namespace, cache_key};
use crate::client::{Fetcher, fetch_json_as};
use crate::error::ScrapeError;
use crate::html;
use crate::rate_gate::RateGate;
use crate::source::{ArtLookup, ArtSource, SourceKind};
use crate::types::{ArtResult, Suggestion, SuggestionResponse};

/// Host class used for rate gating every IMDb request.
pub const HOST_CLASS: &str = "imdb.com";

const SUGGEST_BASE: &str = "https://v3.sg.media-imdb.com/suggestion";
const FIND_URL: &str = "https://www.imdb.com/find/";
const SITE_ROOT: &str = "https://www.imdb.com/";
const HTML_ACCEPT: &str = "text/html,application/xhtml+xml";

pub struct ImdbSource {
    fetcher: Arc<dyn Fetcher>,
    gate: Arc<RateGate>,
    cache: ArtCache,
}

impl ImdbSource {
    pub fn new(fetcher: Arc<dyn Fetcher>, gate: Arc<RateGate>, cache: ArtCache) -> Self {
        Self {
            fetcher,
            gate,
            cache,
        }
    }

    async fn get_text(&self, url: &str) -> Result<String, ScrapeError> {
        self.gate.acquire(HOST_CLASS).await;
        self.fetcher
            .fetch_text(url, Some(SITE_ROOT), Some(HTML_ACCEPT))
            .await
    }

    /// Stage A: image from the suggestion endpoint.
    async fn suggest(&self, title: &str) -> Result<Option<ArtResult>, ScrapeError> {
        let Some(url) = suggestion_url(title) else {
            return Ok(None);
        };
        self.gate.acquire(HOST_CLASS).await;
        let resp: SuggestionResponse = fetch_json_as(self.fetcher.as_ref(), &url).await?;

        let image = pick_suggestion(&resp.d)
            .and_then(|s| s.i.as_ref())
            .and_then(|i| i.image_url.as_deref())
            .filter(|u| !u.trim().is_empty())
            .map(html::upscale_image_url);
        Ok(image.map(ArtResult::new))
    }

    /// Resolve a title to its canonical detail-page URL, consulting the
    /// resolve namespace first. Confirmed no-match results are cached as
    /// negatives; fetch failures are not cached.
    pub async fn resolve_detail_url(&self, title: &str) -> Result<Option<String>, ScrapeError> {
        let key = cache_key(title);
        if let Some(cached) = self.cache.get(Namespace::Resolve, &key) {
            return Ok(cached);
        }

        let url = find_url(title)?;
        let page = self.get_text(&url).await?;
        let detail = html::first_detail_id(&page).map(|id| format!("{SITE_ROOT}title/{id}/"));
        self.cache.put(Namespace::Resolve, &key, detail.clone());
        Ok(detail)
    }

    /// Stage B: image and description from the detail page.
    async fn find_and_detail(&self, title: &str) -> Result<Option<ArtResult>, ScrapeError> {
        let Some(detail_url) = self.resolve_detail_url(title).await? else {
            return Ok(None);
        };
        let page = self.get_text(&detail_url).await?;
        let image = html::meta_content(&page, "og:image");
        let description = html::meta_content(&page, "og:description");
        Ok(image.map(|img| ArtResult::new(img).with_description(description)))
    }
}

#[async_trait]
impl ArtSource for ImdbSource {
    fn name(&self) -> &'static str {
        "imdb"
    }

    fn kind(&self) -> SourceKind {
        SourceKind::ScrapedSite
    }

    async fn resolve(&self, title: &str) -> ArtLookup {
        match self.suggest(title).await {
            Ok(Some(art)) if art.is_usable() => return ArtLookup::Found(art),
            Ok(_) => log::debug!("imdb: no suggestion image for '{}'", title),
            Err(e) => log::debug!("imdb: suggestion lookup for '{}' failed: {}", title, e),
        }

        match self.find_and_detail(title).await {
            Ok(result) => ArtLookup::from_result(result),
            Err(e) => {
                log::debug!("imdb: detail lookup for '{}' failed: {}", title, e);
                ArtLookup::Miss
            }
        }
    }
}

/// `https://v3.sg.media-imdb.com/suggestion/<first-char>/<normalized>.json`,
/// or `None` when nothing is left of the title after normalizing.
pub fn suggestion_url(title: &str) -> Option<String> {
    let normalized = html::normalize_title(title);
    let first = normalized.chars().next()?;
    Some(format!(
        "{SUGGEST_BASE}/{}/{}.json",
        first,
        urlencoding::encode(&normalized)
    ))
}

fn find_url(title: &str) -> Result<String, ScrapeError> {
    reqwest::Url::parse_with_params(FIND_URL, &[("q", title.trim()), ("s", "tt")])
        .map(String::from)
        .map_err(|e| ScrapeError::config(format!("Invalid IMDb find URL: {e}")))
}

/// First suggestion with a title id, or the first suggestion when none has one.
fn pick_suggestion(items: &[Suggestion]) -> Option<&Suggestion> {
    items
        .iter()
        .find(|s| html::is_title_id(&s.id))
        .or_else(|| items.first())
}
