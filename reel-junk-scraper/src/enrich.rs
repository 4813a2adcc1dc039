use std::sync::Arc;

use crate::client::Fetcher;
use crate::html;
use crate::resolver::ArtResolver;
use crate::types::{ArtResult, CatalogItem, Listing, ListingRef, MetaItem};

const HTML_ACCEPT: &str = "text/html,application/xhtml+xml";

/// Attaches artwork to catalog listings and builds per-item metadata.
///
/// Listing pages are fetched directly: they belong to the catalog site, not
/// a gated art host.
pub struct Enricher {
    resolver: Arc<ArtResolver>,
    fetcher: Arc<dyn Fetcher>,
}

impl Enricher {
    pub fn new(resolver: Arc<ArtResolver>, fetcher: Arc<dyn Fetcher>) -> Self {
        Self { resolver, fetcher }
    }

    pub fn resolver(&self) -> &Arc<ArtResolver> {
        &self.resolver
    }

    /// One catalog item per listing, in input order.
    pub async fn enrich_catalog(&self, listings: &[Listing]) -> Vec<CatalogItem> {
        let titles = listings.iter().map(|l| l.title.clone()).collect();
        let posters = self.resolver.best_art_batch(titles).await;

        listings
            .iter()
            .zip(posters)
            .map(|(listing, poster)| CatalogItem {
                title: listing.title.clone(),
                slug: listing.slug.clone(),
                poster,
            })
            .collect()
    }

    /// Metadata for one item. Missing pieces are left as `None`.
    pub async fn enrich_meta(&self, item: &ListingRef) -> MetaItem {
        let resolution = self.resolver.resolve(&item.title).await;

        // Cache hits only carry the poster; walk the sources again for the rest.
        let detail: Option<ArtResult> = match resolution.art {
            Some(art) if resolution.from_cache => {
                match self.resolver.lookup_detail(&item.title).await {
                    Some(full) => Some(ArtResult {
                        poster: art.poster,
                        ..full
                    }),
                    None => Some(art),
                }
            }
            other => other,
        };

        let poster = detail.as_ref().and_then(|a| a.poster.clone());
        let background = detail
            .as_ref()
            .and_then(|a| a.backdrop.clone())
            .or_else(|| poster.clone());
        let description = match self.page_synopsis(&item.page_url).await {
            Some(text) => Some(text),
            None => detail.and_then(|a| a.description),
        };

        MetaItem {
            title: item.title.clone(),
            poster,
            background,
            description,
        }
    }

    async fn page_synopsis(&self, page_url: &str) -> Option<String> {
        if page_url.trim().is_empty() {
            return None;
        }
        match self.fetcher.fetch_text(page_url, None, Some(HTML_ACCEPT)).await {
            Ok(page) => html::extract_synopsis(&page),
            Err(e) => {
                log::debug!("Could not read synopsis from {}: {}", page_url, e);
                None
            }
        }
    }
}
