//! EZTV series API.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use crate::fetcher::MirrorFetcher;
use crate::selection::MediaType;

use super::{join_url, lenient_u64, PlayableRef, Provider, ProviderError, ProviderQuery, RawCandidate};

/// Episodes from the EZTV `get-torrents` endpoint.
///
/// EZTV indexes shows by the numeric part of the IMDb id and returns every
/// episode it knows; narrowing to one episode happens downstream.
pub struct EztvProvider {
    name: String,
    fetcher: MirrorFetcher,
    mirrors: Vec<String>,
    timeout: Duration,
}

impl EztvProvider {
    pub fn new(
        name: impl Into<String>,
        fetcher: MirrorFetcher,
        mirrors: Vec<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            name: name.into(),
            fetcher,
            mirrors,
            timeout,
        }
    }

    fn build_urls(&self, imdb_numeric: u64) -> Vec<String> {
        let path = format!("api/get-torrents?imdb_id={}", imdb_numeric);
        self.mirrors.iter().map(|m| join_url(m, &path)).collect()
    }

    fn to_candidates(&self, response: EztvResponse) -> Vec<RawCandidate> {
        response
            .torrents
            .unwrap_or_default()
            .into_iter()
            .filter_map(|t| {
                let playable = match (t.magnet_url, t.hash) {
                    (Some(magnet), _) if !magnet.is_empty() => PlayableRef::Magnet(magnet),
                    (_, Some(hash)) if !hash.is_empty() => PlayableRef::InfoHash(hash),
                    _ => return None,
                };
                let mut candidate = RawCandidate::new(self.name.clone(), t.title, playable);
                candidate.seeders = t.seeds;
                candidate.size_bytes = t.size_bytes;
                Some(candidate)
            })
            .collect()
    }
}

#[async_trait]
impl Provider for EztvProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn supports(&self, media_type: MediaType) -> bool {
        media_type == MediaType::Series
    }

    async fn fetch(&self, query: &ProviderQuery) -> Result<Vec<RawCandidate>, ProviderError> {
        let Some(numeric) = query.imdb_numeric() else {
            debug!(provider = %self.name, imdb_id = %query.imdb_id, "Not a numeric IMDb id, skipping");
            return Ok(Vec::new());
        };

        let urls = self.build_urls(numeric);
        let response: EztvResponse = self.fetcher.fetch_json(&urls, self.timeout).await?;
        let candidates = self.to_candidates(response);

        debug!(provider = %self.name, imdb_id = %query.imdb_id, results = candidates.len(), "EZTV fetch complete");
        Ok(candidates)
    }
}

// EZTV API response types
#[derive(Debug, Deserialize)]
struct EztvResponse {
    torrents: Option<Vec<EztvTorrent>>,
}

#[derive(Debug, Deserialize)]
struct EztvTorrent {
    #[serde(default)]
    title: String,
    hash: Option<String>,
    magnet_url: Option<String>,
    #[serde(default)]
    seeds: Option<u32>,
    #[serde(default, deserialize_with = "lenient_u64")]
    size_bytes: Option<u64>,
}
