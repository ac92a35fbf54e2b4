//! Title metadata lookup.
//!
//! Text-search providers need a human title ("Breaking Bad", "The Matrix
//! 1999") where id-based providers only need the IMDb id. This module turns
//! one into the other.

mod cinemeta;

pub use cinemeta::CinemetaResolver;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::fetcher::FetchError;
use crate::selection::MediaType;

/// Errors that can occur when resolving titles.
#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("Metadata service unavailable: {0}")]
    Unavailable(#[from] FetchError),

    #[error("Failed to parse response: {0}")]
    ParseError(String),
}

/// Title and release year of a movie or show.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TitleInfo {
    pub name: String,
    pub year: Option<u32>,
}

impl TitleInfo {
    /// Text query for search-engine providers. Movies include the year;
    /// series leave it out because releases are named by episode.
    pub fn query_text(&self, media_type: MediaType) -> String {
        match (media_type, self.year) {
            (MediaType::Movie, Some(year)) => format!("{} {}", self.name, year),
            _ => self.name.clone(),
        }
    }
}

/// Resolves IMDb ids to titles.
#[async_trait]
pub trait MetadataResolver: Send + Sync {
    /// `Ok(None)` when the id is unknown to the service.
    async fn resolve_title(
        &self,
        media_type: MediaType,
        imdb_id: &str,
    ) -> Result<Option<TitleInfo>, MetadataError>;
}
