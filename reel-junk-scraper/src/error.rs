/// Errors that can occur while resolving artwork and metadata.
///
/// None of these escape [`ArtResolver::best_art`](crate::resolver::ArtResolver::best_art):
/// each art source downgrades them to a miss at its own boundary.
#[derive(Debug, thiserror::Error)]
pub enum ScrapeError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Request to {url} timed out after {secs}s")]
    Timeout { url: String, secs: u64 },

    #[error("Remote error (HTTP {status}) from {url}")]
    Remote { status: u16, url: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Cache I/O error: {0}")]
    CacheIo(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ScrapeError {
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    pub fn cache_io(msg: impl Into<String>) -> Self {
        Self::CacheIo(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

impl From<serde_json::Error> for ScrapeError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse(e.to_string())
    }
}
