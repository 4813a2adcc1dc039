use std::path::Path;

use reel_junk_scraper::{Enricher, HttpClient, Listing};

use super::Overrides;
use crate::error::CliError;

/// Attach posters to every listing in a TSV file and print the catalog as JSON.
pub(crate) fn run_catalog(overrides: &Overrides, file: &Path) -> Result<(), CliError> {
    let contents = std::fs::read_to_string(file)?;
    let listings = parse_listings(&contents)?;
    if listings.is_empty() {
        log::warn!("No listings in {}", file.display());
        return super::print_json(&Vec::<Listing>::new());
    }

    let rt = super::build_runtime()?;
    let items = rt.block_on(async {
        let resolver = super::build_resolver(overrides)?;
        let enricher = Enricher::new(resolver.clone(), std::sync::Arc::new(HttpClient::new()?));
        let pb = crate::spinner::start(
            format!("Enriching {} listing(s)...", listings.len()),
            overrides.quiet,
        );
        let items = enricher.enrich_catalog(&listings).await;
        pb.finish_and_clear();
        resolver.shutdown().await;
        Ok::<_, CliError>(items)
    })?;

    let missing = items.iter().filter(|i| i.poster.is_none()).count();
    if missing > 0 {
        log::info!("{} of {} listing(s) have no artwork", missing, items.len());
    }
    super::print_json(&items)
}

/// Parse `title<TAB>slug` lines. Blank lines are skipped.
fn parse_listings(contents: &str) -> Result<Vec<Listing>, CliError> {
    let mut listings = Vec::new();
    for (idx, line) in contents.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let Some((title, slug)) = line.split_once('\t') else {
            return Err(CliError::input(format!(
                "line {}: expected title<TAB>slug",
                idx + 1
            )));
        };
        let (title, slug) = (title.trim(), slug.trim());
        if title.is_empty() || slug.is_empty() {
            return Err(CliError::input(format!(
                "line {}: title and slug must not be empty",
                idx + 1
            )));
        }
        listings.push(Listing {
            title: title.to_string(),
            slug: slug.to_string(),
        });
    }
    Ok(listings)
}
