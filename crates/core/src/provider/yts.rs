//! YTS movie API.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use crate::fetcher::MirrorFetcher;
use crate::selection::{MediaType, Resolution};

use super::{join_url, lenient_u64, PlayableRef, Provider, ProviderError, ProviderQuery, RawCandidate};

/// Trackers appended to magnets built from bare YTS hashes.
const TRACKERS: &[&str] = &[
    "udp://open.demonii.com:1337/announce",
    "udp://tracker.opentrackr.org:1337/announce",
    "udp://tracker.openbittorrent.com:80",
];

/// Movies from the YTS `list_movies` endpoint, looked up by IMDb id.
pub struct YtsProvider {
    name: String,
    fetcher: MirrorFetcher,
    mirrors: Vec<String>,
    timeout: Duration,
}

impl YtsProvider {
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

    fn build_urls(&self, imdb_id: &str) -> Vec<String> {
        let path = format!(
            "api/v2/list_movies.json?query_term={}&sort_by=seeds",
            urlencoding::encode(imdb_id)
        );
        self.mirrors.iter().map(|m| join_url(m, &path)).collect()
    }

    fn to_candidates(&self, response: YtsResponse) -> Vec<RawCandidate> {
        let movies = response.data.and_then(|d| d.movies).unwrap_or_default();

        movies
            .into_iter()
            .flat_map(|movie| {
                let title = movie.title;
                movie
                    .torrents
                    .into_iter()
                    .filter(|t| !t.hash.is_empty())
                    .map(move |t| {
                        let quality = t.quality.unwrap_or_default();
                        let kind = t.kind.unwrap_or_default();
                        let mut candidate = RawCandidate::new(
                            self.name.clone(),
                            format!("{} {} {}", title, quality, kind).trim().to_string(),
                            PlayableRef::Magnet(build_magnet(&t.hash, &title, &quality)),
                        );
                        candidate.seeders = t.seeds;
                        candidate.size_bytes = t.size_bytes;
                        candidate.resolution = quality.parse::<Resolution>().ok();
                        candidate
                    })
                    .collect::<Vec<_>>()
            })
            .collect()
    }
}

fn build_magnet(hash: &str, title: &str, quality: &str) -> String {
    let mut magnet = format!(
        "magnet:?xt=urn:btih:{}&dn={}",
        hash.to_lowercase(),
        urlencoding::encode(&format!("{} {}", title, quality).trim().to_string())
    );
    for tracker in TRACKERS {
        magnet.push_str("&tr=");
        magnet.push_str(&urlencoding::encode(tracker));
    }
    magnet
}

/// YTS reports query errors in-band with `"status": "error"`.
fn check_status(response: YtsResponse) -> Result<YtsResponse, ProviderError> {
    match response.status.as_deref() {
        None | Some("ok") => Ok(response),
        Some(status) => Err(ProviderError::Parse(format!(
            "status {}: {}",
            status,
            response.status_message.as_deref().unwrap_or("no message")
        ))),
    }
}

#[async_trait]
impl Provider for YtsProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn supports(&self, media_type: MediaType) -> bool {
        media_type == MediaType::Movie
    }

    async fn fetch(&self, query: &ProviderQuery) -> Result<Vec<RawCandidate>, ProviderError> {
        let urls = self.build_urls(&query.imdb_id);
        let response: YtsResponse = self.fetcher.fetch_json(&urls, self.timeout).await?;
        let response = check_status(response)?;
        let candidates = self.to_candidates(response);

        debug!(provider = %self.name, imdb_id = %query.imdb_id, results = candidates.len(), "YTS fetch complete");
        Ok(candidates)
    }
}

// YTS API response types
#[derive(Debug, Deserialize)]
struct YtsResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    status_message: Option<String>,
    data: Option<YtsData>,
}

#[derive(Debug, Deserialize)]
struct YtsData {
    movies: Option<Vec<YtsMovie>>,
}

#[derive(Debug, Deserialize)]
struct YtsMovie {
    title: String,
    #[serde(default)]
    torrents: Vec<YtsTorrent>,
}

#[derive(Debug, Deserialize)]
struct YtsTorrent {
    #[serde(default)]
    hash: String,
    quality: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    #[serde(default, deserialize_with = "lenient_u64")]
    size_bytes: Option<u64>,
    #[serde(default)]
    seeds: Option<u32>,
}
