use async_trait::async_trait;

use crate::types::ArtResult;

/// Which kind of upstream a source talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Credentialed search API returning typed metadata.
    Structured,
    /// HTML-serving site read through its suggestion, search and detail pages.
    ScrapedSite,
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceKind::Structured => write!(f, "structured"),
            SourceKind::ScrapedSite => write!(f, "scraped-site"),
        }
    }
}

/// Outcome of asking one source for a title's artwork.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtLookup {
    Found(ArtResult),
    Miss,
}

impl ArtLookup {
    /// `Found` only when the result carries a usable poster.
    pub fn from_result(result: Option<ArtResult>) -> Self {
        match result {
            Some(art) if art.is_usable() => ArtLookup::Found(art),
            _ => ArtLookup::Miss,
        }
    }
}

/// A strategy that resolves a title to artwork.
///
/// Implementations swallow their own errors: network failures, bad status
/// codes and unparseable bodies all come back as [`ArtLookup::Miss`].
#[async_trait]
pub trait ArtSource: Send + Sync {
    fn name(&self) -> &'static str;

    fn kind(&self) -> SourceKind;

    async fn resolve(&self, title: &str) -> ArtLookup;
}
