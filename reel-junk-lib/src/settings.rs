//! Shared application settings (rate ceiling, concurrency, language, cache file).
//!
//! Every value follows the same priority chain: environment variable, then
//! `~/.config/reel-junk/config.toml`, then a built-in default. The TMDB API
//! key lives in the same file but is loaded by the scraper's credentials
//! module.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::LibError;

pub const ENV_RATE_LIMIT: &str = "REEL_JUNK_RATE_LIMIT";
pub const ENV_CONCURRENCY: &str = "REEL_JUNK_CONCURRENCY";
pub const ENV_LANGUAGE: &str = "REEL_JUNK_LANGUAGE";
pub const ENV_CACHE_FILE: &str = "REEL_JUNK_CACHE_FILE";

/// Requests per second allowed against the rate-gated host.
pub const DEFAULT_RATE_LIMIT: u32 = 10;
/// Concurrent title resolutions in a batch.
pub const DEFAULT_CONCURRENCY: usize = 8;
/// Localized language tried first against the structured source.
pub const DEFAULT_LANGUAGE: &str = "pt-BR";

/// TOML config file format.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ConfigFile {
    pub tmdb: Option<TmdbSection>,
    pub imdb: Option<ImdbSection>,
    pub resolver: Option<ResolverSection>,
    pub cache: Option<CacheSection>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TmdbSection {
    pub api_key: Option<String>,
    pub language: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ImdbSection {
    pub rate_limit: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ResolverSection {
    pub concurrency: Option<usize>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CacheSection {
    pub path: Option<PathBuf>,
}

/// Where a setting's value came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingSource {
    /// Loaded from an environment variable.
    EnvVar(&'static str),
    /// Loaded from the config file.
    ConfigFile,
    /// Overridden on the command line.
    CommandLine,
    /// Built-in default value.
    Default,
}

impl std::fmt::Display for SettingSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EnvVar(var) => write!(f, "env ${}", var),
            Self::ConfigFile => write!(f, "config file"),
            Self::CommandLine => write!(f, "command line"),
            Self::Default => write!(f, "default"),
        }
    }
}

/// Provenance of each setting.
#[derive(Debug, Clone)]
pub struct SettingSources {
    pub rate_limit: SettingSource,
    pub concurrency: SettingSource,
    pub language: SettingSource,
    pub cache_path: SettingSource,
}

/// Resolved runtime settings for the enrichment pipeline.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Max requests per rolling second against the gated host (0 disables gating).
    pub rate_limit: u32,
    /// Max concurrent title resolutions in a batch.
    pub concurrency: usize,
    /// Localized language for the structured source.
    pub language: String,
    /// Location of the persisted resolution cache.
    pub cache_path: PathBuf,
    pub sources: SettingSources,
}

impl Settings {
    /// Load settings from environment variables and the config file.
    pub fn load() -> Result<Self, LibError> {
        let config = load_config_file()?;
        Self::resolve(|name| std::env::var(name).ok(), config.as_ref())
    }

    /// Resolve settings from an environment lookup and an optional parsed
    /// config file. Split out from [`load`](Self::load) so callers can supply
    /// their own environment.
    pub fn resolve(
        env: impl Fn(&str) -> Option<String>,
        config: Option<&ConfigFile>,
    ) -> Result<Self, LibError> {
        let (rate_limit, rate_source) = match env(ENV_RATE_LIMIT).filter(|v| !v.trim().is_empty()) {
            Some(raw) => (
                parse_number::<u32>(ENV_RATE_LIMIT, &raw)?,
                SettingSource::EnvVar(ENV_RATE_LIMIT),
            ),
            None => match config.and_then(|c| c.imdb.as_ref()).and_then(|s| s.rate_limit) {
                Some(v) => (v, SettingSource::ConfigFile),
                None => (DEFAULT_RATE_LIMIT, SettingSource::Default),
            },
        };

        let (concurrency, concurrency_source) = match env(ENV_CONCURRENCY).filter(|v| !v.trim().is_empty()) {
            Some(raw) => (
                parse_number::<usize>(ENV_CONCURRENCY, &raw)?,
                SettingSource::EnvVar(ENV_CONCURRENCY),
            ),
            None => match config
                .and_then(|c| c.resolver.as_ref())
                .and_then(|s| s.concurrency)
            {
                Some(v) => (v, SettingSource::ConfigFile),
                None => (DEFAULT_CONCURRENCY, SettingSource::Default),
            },
        };
        if concurrency == 0 {
            return Err(LibError::invalid_setting(
                "concurrency",
                "must be at least 1",
            ));
        }

        let (language, language_source) = match env(ENV_LANGUAGE).filter(|v| !v.trim().is_empty()) {
            Some(v) => (v.trim().to_string(), SettingSource::EnvVar(ENV_LANGUAGE)),
            None => match config
                .and_then(|c| c.tmdb.as_ref())
                .and_then(|s| s.language.clone())
            {
                Some(v) => (v, SettingSource::ConfigFile),
                None => (DEFAULT_LANGUAGE.to_string(), SettingSource::Default),
            },
        };

        let (cache_path, cache_source) = match env(ENV_CACHE_FILE).filter(|v| !v.trim().is_empty()) {
            Some(v) => (PathBuf::from(v), SettingSource::EnvVar(ENV_CACHE_FILE)),
            None => match config.and_then(|c| c.cache.as_ref()).and_then(|s| s.path.clone()) {
                Some(p) => (p, SettingSource::ConfigFile),
                None => (default_cache_path(), SettingSource::Default),
            },
        };

        Ok(Self {
            rate_limit,
            concurrency,
            language,
            cache_path,
            sources: SettingSources {
                rate_limit: rate_source,
                concurrency: concurrency_source,
                language: language_source,
                cache_path: cache_source,
            },
        })
    }

    /// Apply command-line overrides on top of loaded settings.
    pub fn with_overrides(
        mut self,
        rate_limit: Option<u32>,
        concurrency: Option<usize>,
        cache_path: Option<PathBuf>,
    ) -> Self {
        if let Some(v) = rate_limit {
            self.rate_limit = v;
            self.sources.rate_limit = SettingSource::CommandLine;
        }
        if let Some(v) = concurrency {
            self.concurrency = v.max(1);
            self.sources.concurrency = SettingSource::CommandLine;
        }
        if let Some(p) = cache_path {
            self.cache_path = p;
            self.sources.cache_path = SettingSource::CommandLine;
        }
        self
    }
}

/// Canonical path to the config file: `~/.config/reel-junk/config.toml`.
pub fn config_path() -> PathBuf {
    let config = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    config.join("reel-junk").join("config.toml")
}

/// Default cache file: `~/.cache/reel-junk/art-cache.json`.
pub fn default_cache_path() -> PathBuf {
    let cache = dirs::cache_dir().unwrap_or_else(|| PathBuf::from("."));
    cache.join("reel-junk").join("art-cache.json")
}

/// Read and parse the config file. A missing file is not an error.
pub fn load_config_file() -> Result<Option<ConfigFile>, LibError> {
    let path = config_path();
    if !path.exists() {
        return Ok(None);
    }
    let contents = std::fs::read_to_string(&path)?;
    parse_config(&contents).map(Some)
}

/// Parse config file contents.
pub fn parse_config(contents: &str) -> Result<ConfigFile, LibError> {
    toml::from_str(contents)
        .map_err(|e| LibError::config(format!("Failed to parse {}: {}", config_path().display(), e)))
}

fn parse_number<N: std::str::FromStr>(name: &'static str, raw: &str) -> Result<N, LibError>
where
    N::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<N>()
        .map_err(|e| LibError::invalid_setting(name, format!("'{}': {}", raw, e)))
}
