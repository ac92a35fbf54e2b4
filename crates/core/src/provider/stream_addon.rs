//! Upstream stream addon (the playback client's addon protocol).

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use crate::fetcher::MirrorFetcher;
use crate::selection::MediaType;

use super::{join_url, PlayableRef, Provider, ProviderError, ProviderQuery, RawCandidate};

/// Streams from another addon's `/stream/{type}/{id}.json` route.
///
/// Addons report everything as display text (`👤 42 💾 1.4 GB [RD+]`), so
/// candidates carry no structured fields and are enriched from text.
pub struct StreamAddonProvider {
    name: String,
    fetcher: MirrorFetcher,
    mirrors: Vec<String>,
    timeout: Duration,
}

impl StreamAddonProvider {
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

    fn build_urls(&self, query: &ProviderQuery) -> Vec<String> {
        let id = match query.episode {
            Some(ep) => format!("{}:{}:{}", query.imdb_id, ep.season, ep.episode),
            None => query.imdb_id.clone(),
        };
        let path = format!(
            "stream/{}/{}.json",
            query.media_type.as_str(),
            urlencoding::encode(&id)
        );
        self.mirrors
            .iter()
            .map(|m| join_url(m.trim_end_matches("/manifest.json"), &path))
            .collect()
    }

    fn to_candidates(&self, response: AddonResponse) -> Vec<RawCandidate> {
        response
            .streams
            .into_iter()
            .filter_map(|s| {
                let playable = match (s.url, s.info_hash) {
                    (Some(url), _) if !url.is_empty() => PlayableRef::Url(url),
                    (_, Some(hash)) if !hash.is_empty() => PlayableRef::InfoHash(hash),
                    _ => return None,
                };
                let name = s.name.unwrap_or_default();
                let (title, description) = match s.title.or(s.description) {
                    Some(text) => (text, Some(name)),
                    None => (name, None),
                };
                let mut candidate = RawCandidate::new(self.name.clone(), title, playable);
                candidate.description = description.filter(|d| !d.is_empty());
                Some(candidate)
            })
            .collect()
    }
}

#[async_trait]
impl Provider for StreamAddonProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn supports(&self, _media_type: MediaType) -> bool {
        true
    }

    async fn fetch(&self, query: &ProviderQuery) -> Result<Vec<RawCandidate>, ProviderError> {
        let urls = self.build_urls(query);
        let response: AddonResponse = self.fetcher.fetch_json(&urls, self.timeout).await?;
        let candidates = self.to_candidates(response);

        debug!(provider = %self.name, imdb_id = %query.imdb_id, results = candidates.len(), "Addon fetch complete");
        Ok(candidates)
    }
}

// Addon protocol response types
#[derive(Debug, Deserialize)]
struct AddonResponse {
    #[serde(default)]
    streams: Vec<AddonStream>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddonStream {
    name: Option<String>,
    title: Option<String>,
    description: Option<String>,
    info_hash: Option<String>,
    url: Option<String>,
}
