use reel_junk_lib::settings::{self, ConfigFile};

use crate::error::ScrapeError;

pub const ENV_API_KEY: &str = "TMDB_API_KEY";

/// Where a credential came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialSource {
    /// Loaded from an environment variable.
    EnvVar(&'static str),
    /// Loaded from the config file.
    ConfigFile,
    /// Not set anywhere.
    Missing,
}

impl std::fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EnvVar(var) => write!(f, "env ${}", var),
            Self::ConfigFile => write!(f, "config file"),
            Self::Missing => write!(f, "not set"),
        }
    }
}

/// Credentials for the structured (TMDB) source. Without an API key the
/// structured source is left out of the resolver.
#[derive(Debug, Clone, Default)]
pub struct TmdbCredentials {
    pub api_key: Option<String>,
    pub source: Option<CredentialSource>,
}

impl TmdbCredentials {
    /// Load the API key from the environment or the config file.
    ///
    /// Priority: env var > config file.
    pub fn load() -> Result<Self, ScrapeError> {
        let config = settings::load_config_file().map_err(|e| ScrapeError::config(e.to_string()))?;
        Ok(Self::resolve(
            |name| std::env::var(name).ok(),
            config.as_ref(),
        ))
    }

    pub fn resolve(env: impl Fn(&str) -> Option<String>, config: Option<&ConfigFile>) -> Self {
        if let Some(key) = env(ENV_API_KEY).filter(|k| !k.trim().is_empty()) {
            return Self {
                api_key: Some(key.trim().to_string()),
                source: Some(CredentialSource::EnvVar(ENV_API_KEY)),
            };
        }
        let from_file = config
            .and_then(|c| c.tmdb.as_ref())
            .and_then(|t| t.api_key.clone())
            .filter(|k| !k.trim().is_empty());
        match from_file {
            Some(key) => Self {
                api_key: Some(key.trim().to_string()),
                source: Some(CredentialSource::ConfigFile),
            },
            None => Self {
                api_key: None,
                source: Some(CredentialSource::Missing),
            },
        }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// The API key with everything after the first two characters hidden.
    pub fn masked_key(&self) -> Option<String> {
        self.api_key.as_deref().map(mask_value)
    }
}

fn mask_value(s: &str) -> String {
    match s.char_indices().nth(2) {
        Some((idx, _)) => format!("{}****", &s[..idx]),
        None => "****".to_string(),
    }
}
