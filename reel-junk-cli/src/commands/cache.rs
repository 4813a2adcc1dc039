use std::sync::Arc;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stderr;

use reel_junk_scraper::{ArtCache, JsonFileStore};

use super::Overrides;
use crate::error::CliError;

fn open_cache(overrides: &Overrides) -> Result<(ArtCache, std::path::PathBuf), CliError> {
    let settings = super::load_settings(overrides)?;
    let path = settings.cache_path;
    let cache = ArtCache::load(Arc::new(JsonFileStore::new(&path)));
    Ok((cache, path))
}

/// Show entry counts per namespace.
pub(crate) fn run_cache_stats(overrides: &Overrides) -> Result<(), CliError> {
    let (cache, path) = open_cache(overrides)?;

    log::info!(
        "{}",
        "Art cache".if_supports_color(Stderr, |t| t.bold()),
    );
    log::info!(
        "  File: {}{}",
        path.display().if_supports_color(Stderr, |t| t.cyan()),
        if path.exists() { "" } else { " (not created yet)" },
    );
    log::info!("");

    let stats = cache.stats();
    log::info!(
        "  Posters:  {} ({} without artwork)",
        stats.posters,
        stats.poster_negatives,
    );
    log::info!(
        "  Resolved: {} ({} without a match)",
        stats.resolved,
        stats.resolved_negatives,
    );
    Ok(())
}

/// Remove every cached answer.
pub(crate) fn run_cache_clear(overrides: &Overrides) -> Result<(), CliError> {
    let (cache, path) = open_cache(overrides)?;
    let stats = cache.stats();
    cache.clear()?;
    log::info!(
        "{} Cache cleared ({} entries removed from {})",
        "\u{2714}".if_supports_color(Stderr, |t| t.green()),
        stats.posters + stats.resolved,
        path.display(),
    );
    Ok(())
}

/// Print the cache file path.
pub(crate) fn run_cache_path(overrides: &Overrides) -> Result<(), CliError> {
    let settings = super::load_settings(overrides)?;
    println!("{}", settings.cache_path.display());
    Ok(())
}
