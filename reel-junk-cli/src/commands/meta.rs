use reel_junk_scraper::{Enricher, HttpClient, ListingRef};

use super::Overrides;
use crate::error::CliError;

/// Print poster, background and description for one title as JSON.
pub(crate) fn run_meta(
    overrides: &Overrides,
    title: String,
    page_url: Option<String>,
) -> Result<(), CliError> {
    if title.trim().is_empty() {
        return Err(CliError::input("title must not be empty"));
    }
    let item = ListingRef {
        title,
        page_url: page_url.unwrap_or_default(),
    };

    let rt = super::build_runtime()?;
    let meta = rt.block_on(async {
        let resolver = super::build_resolver(overrides)?;
        let enricher = Enricher::new(resolver.clone(), std::sync::Arc::new(HttpClient::new()?));
        let pb = crate::spinner::start(format!("Looking up '{}'...", item.title), overrides.quiet);
        let meta = enricher.enrich_meta(&item).await;
        pb.finish_and_clear();
        resolver.shutdown().await;
        Ok::<_, CliError>(meta)
    })?;

    super::print_json(&meta)
}
