pub(crate) mod art;
pub(crate) mod cache;
pub(crate) mod catalog;
pub(crate) mod config;
pub(crate) mod meta;

use std::path::PathBuf;
use std::sync::Arc;

use reel_junk_lib::Settings;
use reel_junk_scraper::{ArtResolver, TmdbCredentials};

use crate::error::CliError;

/// Command-line values layered over env vars and the config file.
#[derive(Debug, Clone, Default)]
pub(crate) struct Overrides {
    pub(crate) cache_file: Option<PathBuf>,
    pub(crate) concurrency: Option<usize>,
    pub(crate) rate_limit: Option<u32>,
    pub(crate) quiet: bool,
}

pub(crate) fn load_settings(overrides: &Overrides) -> Result<Settings, CliError> {
    Ok(Settings::load()?.with_overrides(
        overrides.rate_limit,
        overrides.concurrency,
        overrides.cache_file.clone(),
    ))
}

pub(crate) fn build_runtime() -> Result<tokio::runtime::Runtime, CliError> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| CliError::runtime(format!("Failed to create tokio runtime: {}", e)))
}

/// Settings, credentials and a ready resolver. Must be called inside the
/// runtime so cache writes can be debounced.
pub(crate) fn build_resolver(overrides: &Overrides) -> Result<Arc<ArtResolver>, CliError> {
    let settings = load_settings(overrides)?;
    let creds = TmdbCredentials::load()?;
    log::debug!(
        "Cache: {}, concurrency {}, rate limit {}/s, TMDB key: {}",
        settings.cache_path.display(),
        settings.concurrency,
        settings.rate_limit,
        creds.source.as_ref().map(|s| s.to_string()).unwrap_or_default(),
    );
    Ok(reel_junk_scraper::create_resolver(&settings, &creds)?)
}

pub(crate) fn print_json<T: serde::Serialize>(value: &T) -> Result<(), CliError> {
    let out = serde_json::to_string_pretty(value)
        .map_err(|e| CliError::output(format!("Failed to serialize output: {}", e)))?;
    println!("{}", out);
    Ok(())
}
