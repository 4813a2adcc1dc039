//! Movie artwork resolution.
//!
//! Resolves a free-text title to the best available poster by asking a
//! structured metadata API (TMDB) and a scraped site (IMDb) in a fixed
//! order, remembering every answer (including "nothing found") in a
//! persistent cache.

pub mod cache;
pub mod client;
pub mod credentials;
pub mod enrich;
pub mod error;
pub mod html;
pub mod imdb;
pub mod rate_gate;
pub mod resolver;
pub mod source;
pub mod tmdb;
pub mod types;

pub use cache::{ArtCache, CacheSnapshot, CacheStats, CacheStore, JsonFileStore, Namespace, cache_key};
pub use client::{Fetcher, HttpClient};
pub use credentials::{CredentialSource, TmdbCredentials};
pub use enrich::Enricher;
pub use error::ScrapeError;
pub use imdb::ImdbSource;
pub use rate_gate::RateGate;
pub use resolver::{ArtResolver, Resolution, create_resolver};
pub use source::{ArtLookup, ArtSource, SourceKind};
pub use tmdb::TmdbSource;
pub use types::{ArtResult, CatalogItem, Listing, ListingRef, MetaItem};
