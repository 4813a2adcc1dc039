use owo_colors::OwoColorize;
use owo_colors::Stream::Stderr;

use reel_junk_lib::settings::config_path;
use reel_junk_scraper::TmdbCredentials;

use super::Overrides;
use crate::error::CliError;

/// Show resolved settings and where each came from.
pub(crate) fn run_config_show(overrides: &Overrides) -> Result<(), CliError> {
    let path = config_path();
    let settings = super::load_settings(overrides)?;
    let creds = TmdbCredentials::load()?;

    log::info!(
        "{}",
        "reel-junk Configuration".if_supports_color(Stderr, |t| t.bold()),
    );
    log::info!("");

    if path.exists() {
        log::info!(
            "  Config file: {} {}",
            path.display().if_supports_color(Stderr, |t| t.cyan()),
            "(exists)".if_supports_color(Stderr, |t| t.green()),
        );
    } else {
        log::info!(
            "  Config file: {} {}",
            path.display().if_supports_color(Stderr, |t| t.cyan()),
            "(not found)".if_supports_color(Stderr, |t| t.dimmed()),
        );
    }
    log::info!("");

    let api_key_source = creds
        .source
        .as_ref()
        .map(|s| s.to_string())
        .unwrap_or_default();
    let rows = [
        (
            "tmdb_api_key",
            creds.masked_key(),
            api_key_source,
        ),
        (
            "language",
            Some(settings.language.clone()),
            settings.sources.language.to_string(),
        ),
        (
            "rate_limit",
            Some(settings.rate_limit.to_string()),
            settings.sources.rate_limit.to_string(),
        ),
        (
            "concurrency",
            Some(settings.concurrency.to_string()),
            settings.sources.concurrency.to_string(),
        ),
        (
            "cache_file",
            Some(settings.cache_path.display().to_string()),
            settings.sources.cache_path.to_string(),
        ),
    ];

    for (name, value, source) in rows {
        let source_str = format!("({})", source);
        match value {
            Some(v) => log::info!(
                "  {:<14} {} {}",
                name,
                v,
                source_str.if_supports_color(Stderr, |t| t.dimmed()),
            ),
            None => log::info!(
                "  {:<14} {} {}",
                name,
                "-".if_supports_color(Stderr, |t| t.dimmed()),
                source_str.if_supports_color(Stderr, |t| t.dimmed()),
            ),
        }
    }

    if !creds.is_configured() {
        log::info!("");
        log::info!(
            "  {} Set TMDB_API_KEY or [tmdb] api_key to enable the TMDB source.",
            "note:".if_supports_color(Stderr, |t| t.yellow()),
        );
    }
    Ok(())
}

/// Print the config file path.
pub(crate) fn run_config_path() {
    println!("{}", config_path().display());
}
