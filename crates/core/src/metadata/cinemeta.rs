//! Cinemeta metadata client.
//!
//! Cinemeta needs no API key and serves `/meta/{type}/{id}.json`.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use super::{MetadataError, MetadataResolver, TitleInfo};
use crate::fetcher::MirrorFetcher;
use crate::selection::MediaType;

/// Cinemeta client.
pub struct CinemetaResolver {
    fetcher: MirrorFetcher,
    base_url: String,
    timeout: Duration,
}

impl CinemetaResolver {
    pub fn new(fetcher: MirrorFetcher, base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            fetcher,
            base_url: base_url.into(),
            timeout,
        }
    }

    fn meta_url(&self, media_type: MediaType, imdb_id: &str) -> String {
        format!(
            "{}/meta/{}/{}.json",
            self.base_url.trim_end_matches('/'),
            media_type.as_str(),
            urlencoding::encode(imdb_id)
        )
    }
}

#[async_trait]
impl MetadataResolver for CinemetaResolver {
    async fn resolve_title(
        &self,
        media_type: MediaType,
        imdb_id: &str,
    ) -> Result<Option<TitleInfo>, MetadataError> {
        let url = self.meta_url(media_type, imdb_id);
        let body = self.fetcher.fetch(&[url], self.timeout).await?;
        let info = parse_meta(&body)?;

        debug!(imdb_id = %imdb_id, title = ?info.as_ref().map(|i| &i.name), "Cinemeta lookup complete");
        Ok(info)
    }
}

fn parse_meta(body: &str) -> Result<Option<TitleInfo>, MetadataError> {
    let response: CinemetaResponse =
        serde_json::from_str(body).map_err(|e| MetadataError::ParseError(e.to_string()))?;

    Ok(response.meta.and_then(|meta| {
        let name = meta.name.filter(|n| !n.trim().is_empty())?;
        let year = meta
            .year
            .as_deref()
            .or(meta.release_info.as_deref())
            .and_then(parse_year);
        Some(TitleInfo { name, year })
    }))
}

/// First four-digit run, so "2008–2013" and "2008-" both give 2008.
fn parse_year(text: &str) -> Option<u32> {
    let digits: String = text
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    (digits.len() == 4).then(|| digits.parse().ok()).flatten()
}

#[derive(Debug, Deserialize)]
struct CinemetaResponse {
    meta: Option<CinemetaMeta>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CinemetaMeta {
    name: Option<String>,
    year: Option<String>,
    release_info: Option<String>,
}
