//! Types shared by all provider adapters.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::fetcher::FetchError;
use crate::selection::{EpisodeRef, MediaType, Resolution};

/// Where a candidate can be played from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum PlayableRef {
    /// A `magnet:?xt=urn:btih:...` URI.
    Magnet(String),
    /// A direct HTTP(S) URL, usually a debrid-resolved link.
    Url(String),
    /// A bare BitTorrent info hash (hex).
    InfoHash(String),
}

impl PlayableRef {
    /// Render as a single URI the playback client can open.
    pub fn to_uri(&self) -> String {
        match self {
            PlayableRef::Magnet(uri) | PlayableRef::Url(uri) => uri.clone(),
            PlayableRef::InfoHash(hash) => format!("magnet:?xt=urn:btih:{}", hash.to_lowercase()),
        }
    }

    /// Lowercase info hash, if this reference carries one.
    ///
    /// Direct URLs never do, so they are never considered duplicates of
    /// each other.
    pub fn info_hash(&self) -> Option<String> {
        match self {
            PlayableRef::InfoHash(hash) if !hash.is_empty() => Some(hash.to_lowercase()),
            PlayableRef::Magnet(uri) => {
                let lower = uri.to_lowercase();
                let start = lower.find("urn:btih:")? + "urn:btih:".len();
                let hash: String = lower[start..]
                    .chars()
                    .take_while(|c| c.is_ascii_alphanumeric())
                    .collect();
                (!hash.is_empty()).then_some(hash)
            }
            _ => None,
        }
    }
}

/// A candidate exactly as a provider reported it.
///
/// Structured fields are `None` when the provider only has free text; the
/// extractor fills the gaps from `title` and `description`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawCandidate {
    /// Provider name that produced this candidate.
    pub source: String,
    /// Display title (usually the release name).
    pub title: String,
    /// Extra free text (stream addons put seeds/size/cache tags here).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub playable: PlayableRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seeders: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cached: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution: Option<Resolution>,
}

impl RawCandidate {
    /// Candidate with only free text and a playable reference.
    pub fn new(source: impl Into<String>, title: impl Into<String>, playable: PlayableRef) -> Self {
        Self {
            source: source.into(),
            title: title.into(),
            description: None,
            playable,
            seeders: None,
            size_bytes: None,
            cached: None,
            resolution: None,
        }
    }

    /// All free text the extractor should look at.
    pub fn text(&self) -> String {
        match &self.description {
            Some(desc) => format!("{}\n{}", self.title, desc),
            None => self.title.clone(),
        }
    }
}

/// What a provider is asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderQuery {
    pub media_type: MediaType,
    /// IMDb id of the movie or show (`tt...`), without season/episode.
    pub imdb_id: String,
    pub episode: Option<EpisodeRef>,
    /// "Title Year" style text for search-engine providers, if metadata
    /// resolution succeeded.
    pub text: Option<String>,
}

impl ProviderQuery {
    /// Numeric part of the IMDb id (`tt0903747` -> `903747`).
    pub fn imdb_numeric(&self) -> Option<u64> {
        self.imdb_id.trim_start_matches("tt").parse().ok()
    }

    /// Text query narrowed to the requested episode, if any.
    pub fn episode_text(&self) -> Option<String> {
        let text = self.text.as_ref()?;
        Some(match self.episode {
            Some(ep) => format!("{} {}", text, ep.marker()),
            None => text.clone(),
        })
    }
}

/// Errors a provider may report. All of them are non-fatal for a selection.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Provider unavailable: {0}")]
    Unavailable(#[from] FetchError),

    /// The upstream answered, but not with usable results.
    #[error("Invalid provider response: {0}")]
    Parse(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// A source of candidates.
///
/// Implementations return `Ok(vec![])` for "no results" and reserve `Err`
/// for transport or protocol failures.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Provider name for logging and the candidate `source` field.
    fn name(&self) -> &str;

    /// Whether this provider can answer requests for `media_type`.
    fn supports(&self, media_type: MediaType) -> bool;

    /// Whether this provider searches by title text rather than by id.
    /// The selector only resolves titles when some provider needs them.
    fn needs_text_query(&self) -> bool {
        false
    }

    /// Fetch raw candidates for a query.
    async fn fetch(&self, query: &ProviderQuery) -> Result<Vec<RawCandidate>, ProviderError>;
}
