//! Jackett text search.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use crate::fetcher::MirrorFetcher;
use crate::selection::MediaType;

use super::{join_url, PlayableRef, Provider, ProviderError, ProviderQuery, RawCandidate};

/// Searches all configured Jackett indexers with a text query.
///
/// Jackett cannot search by IMDb id across every indexer, so this provider
/// only runs when the title was resolved ("Title Year" for movies,
/// "Title S01E02" for episodes) and returns nothing otherwise.
pub struct JackettProvider {
    name: String,
    fetcher: MirrorFetcher,
    mirrors: Vec<String>,
    api_key: String,
    timeout: Duration,
}

impl JackettProvider {
    pub fn new(
        name: impl Into<String>,
        fetcher: MirrorFetcher,
        mirrors: Vec<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            name: name.into(),
            fetcher,
            mirrors,
            api_key: api_key.into(),
            timeout,
        }
    }

    /// Build the Jackett API URL for a search against every mirror.
    fn build_urls(&self, text: &str, media_type: MediaType) -> Vec<String> {
        let path = format!(
            "api/v2.0/indexers/all/results?apikey={}&Query={}&Category[]={}",
            urlencoding::encode(&self.api_key),
            urlencoding::encode(text),
            category_id(media_type)
        );
        self.mirrors.iter().map(|m| join_url(m, &path)).collect()
    }

    fn to_candidates(&self, response: JackettResponse) -> Vec<RawCandidate> {
        response
            .Results
            .into_iter()
            .filter_map(|r| {
                let playable = match (r.MagnetUri, r.InfoHash) {
                    (Some(magnet), _) if magnet.starts_with("magnet:") => {
                        PlayableRef::Magnet(magnet)
                    }
                    (_, Some(hash)) if !hash.is_empty() => PlayableRef::InfoHash(hash),
                    // A bare .torrent link is not something a player can open.
                    _ => return None,
                };
                let mut candidate = RawCandidate::new(self.name.clone(), r.Title, playable);
                candidate.seeders = r.Seeders.map(|s| s.max(0) as u32);
                candidate.size_bytes = r.Size.filter(|s| *s > 0).map(|s| s as u64);
                candidate.description = r.Tracker;
                Some(candidate)
            })
            .collect()
    }
}

/// Jackett (Torznab) category ids.
fn category_id(media_type: MediaType) -> i32 {
    match media_type {
        MediaType::Movie => 2000,
        MediaType::Series => 5000,
    }
}

#[async_trait]
impl Provider for JackettProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn supports(&self, _media_type: MediaType) -> bool {
        true
    }

    fn needs_text_query(&self) -> bool {
        true
    }

    async fn fetch(&self, query: &ProviderQuery) -> Result<Vec<RawCandidate>, ProviderError> {
        let Some(text) = query.episode_text() else {
            debug!(provider = %self.name, "No resolved title, skipping text search");
            return Ok(Vec::new());
        };

        let urls = self.build_urls(&text, query.media_type);
        let response: JackettResponse = self.fetcher.fetch_json(&urls, self.timeout).await?;
        let candidates = self.to_candidates(response);

        debug!(provider = %self.name, query = %text, results = candidates.len(), "Jackett search complete");
        Ok(candidates)
    }
}

// Jackett API response types
#[derive(Debug, Deserialize)]
#[allow(non_snake_case)]
struct JackettResponse {
    #[serde(default)]
    Results: Vec<JackettResult>,
}

#[derive(Debug, Deserialize)]
#[allow(non_snake_case)]
struct JackettResult {
    Title: String,
    Tracker: Option<String>,
    MagnetUri: Option<String>,
    InfoHash: Option<String>,
    Size: Option<i64>,
    Seeders: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::HttpTransport;
    use crate::selection::EpisodeRef;
    use std::sync::Arc;

    fn provider() -> JackettProvider {
        let transport = Arc::new(HttpTransport::new("test").unwrap());
        JackettProvider::new(
            "jackett",
            MirrorFetcher::new("jackett", transport),
            vec!["http://localhost:9117/".to_string()],
            "key 1",
            Duration::from_secs(10),
        )
    }

    #[test]
    fn test_build_urls_encodes_query() {
        let urls = provider().build_urls("Breaking Bad S01E02", MediaType::Series);
        assert_eq!(
            urls,
            vec!["http://localhost:9117/api/v2.0/indexers/all/results?apikey=key%201&Query=Breaking%20Bad%20S01E02&Category[]=5000"]
        );
    }

    #[test]
    fn test_category_ids() {
        assert_eq!(category_id(MediaType::Movie), 2000);
        assert_eq!(category_id(MediaType::Series), 5000);
    }

    #[test]
    fn test_parse_results() {
        let json = r#"{
            "Results": [
                {"Title": "The Matrix 1999 1080p BluRay", "Tracker": "1337x",
                 "MagnetUri": "magnet:?xt=urn:btih:ABC", "Size": 2147483648, "Seeders": 120},
                {"Title": "The Matrix 1999 720p", "Tracker": "rutor",
                 "MagnetUri": null, "InfoHash": "DEF", "Size": 0, "Seeders": -1},
                {"Title": "Torrent file only", "Link": "http://localhost:9117/dl/x.torrent"}
            ]
        }"#;
        let response: JackettResponse = serde_json::from_str(json).unwrap();
        let candidates = provider().to_candidates(response);

        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].seeders, Some(120));
        assert_eq!(candidates[0].size_bytes, Some(2147483648));
        assert_eq!(candidates[0].description.as_deref(), Some("1337x"));

        assert_eq!(candidates[1].playable, PlayableRef::InfoHash("DEF".to_string()));
        assert_eq!(candidates[1].seeders, Some(0));
        assert_eq!(candidates[1].size_bytes, None);
    }

    #[tokio::test]
    async fn test_without_title_returns_empty() {
        let query = ProviderQuery {
            media_type: MediaType::Series,
            imdb_id: "tt0903747".to_string(),
            episode: Some(EpisodeRef { season: 1, episode: 2 }),
            text: None,
        };
        assert!(provider().fetch(&query).await.unwrap().is_empty());
    }
}
