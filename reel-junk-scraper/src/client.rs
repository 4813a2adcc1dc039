use async_trait::async_trait;
use reqwest::header::{ACCEPT, REFERER, USER_AGENT};
use tokio::time::Duration;

use crate::error::ScrapeError;

/// Hard deadline for a single request, including reading the body.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(15);

const IDENTITY: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/124.0 Safari/537.36";
const ACCEPT_LANGUAGE: &str = "pt-BR,pt;q=0.9,en-US;q=0.8,en;q=0.7";

/// Timeout-bounded HTTP retrieval.
///
/// Implementations never retry and never cache; callers decide both.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch a URL and return the body as text.
    async fn fetch_text(
        &self,
        url: &str,
        referer: Option<&str>,
        accept: Option<&str>,
    ) -> Result<String, ScrapeError>;

    /// Fetch a URL and parse the body as JSON.
    async fn fetch_json(&self, url: &str) -> Result<serde_json::Value, ScrapeError> {
        let body = self
            .fetch_text(url, None, Some("application/json"))
            .await?;
        serde_json::from_str(&body)
            .map_err(|e| ScrapeError::parse(format!("Invalid JSON from {url}: {e}")))
    }
}

/// Fetch JSON and deserialize it into `T`.
pub async fn fetch_json_as<T: serde::de::DeserializeOwned>(
    fetcher: &dyn Fetcher,
    url: &str,
) -> Result<T, ScrapeError> {
    let value = fetcher.fetch_json(url).await?;
    serde_json::from_value(value)
        .map_err(|e| ScrapeError::parse(format!("Unexpected JSON shape from {url}: {e}")))
}

/// HTTP client with a fixed browser identity and an absolute per-request
/// deadline ([`FETCH_TIMEOUT`] unless built with [`HttpClient::with_timeout`]).
pub struct HttpClient {
    http: reqwest::Client,
    timeout: Duration,
}

impl HttpClient {
    pub fn new() -> Result<Self, ScrapeError> {
        Self::with_timeout(FETCH_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, ScrapeError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()?;
        Ok(Self { http, timeout })
    }

    async fn send(
        &self,
        url: &str,
        referer: Option<&str>,
        accept: Option<&str>,
    ) -> Result<String, ScrapeError> {
        let mut request = self
            .http
            .get(url)
            .header(USER_AGENT, IDENTITY)
            .header("Accept-Language", ACCEPT_LANGUAGE)
            .header(ACCEPT, accept.unwrap_or("*/*"));
        if let Some(referer) = referer {
            request = request.header(REFERER, referer);
        }

        let resp = request.send().await.map_err(|e| self.map_transport(url, e))?;
        let status = resp.status();
        if !status.is_success() {
            log::debug!("GET {} -> HTTP {}", url, status.as_u16());
            return Err(ScrapeError::Remote {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = resp.text().await.map_err(|e| self.map_transport(url, e))?;
        log::debug!("GET {} -> {} bytes", url, body.len());
        Ok(body)
    }
}

#[async_trait]
impl Fetcher for HttpClient {
    async fn fetch_text(
        &self,
        url: &str,
        referer: Option<&str>,
        accept: Option<&str>,
    ) -> Result<String, ScrapeError> {
        // Dropping the future on elapse cancels the in-flight request.
        match tokio::time::timeout(self.timeout, self.send(url, referer, accept)).await {
            Ok(result) => result,
            Err(_) => Err(self.timeout_error(url)),
        }
    }
}

impl HttpClient {
    fn map_transport(&self, url: &str, e: reqwest::Error) -> ScrapeError {
        if e.is_timeout() {
            self.timeout_error(url)
        } else {
            ScrapeError::Http(e)
        }
    }

    fn timeout_error(&self, url: &str) -> ScrapeError {
        log::debug!("GET {} timed out", url);
        ScrapeError::Timeout {
            url: url.to_string(),
            secs: self.timeout.as_secs(),
        }
    }
}
