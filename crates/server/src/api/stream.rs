//! Addon protocol endpoints: manifest and streams.
//!
//! User settings arrive either as query parameters
//! (`/stream/movie/tt1.json?resolution=2160p`) or, as playback clients
//! install configured addons, as a path segment in front of the route
//! (`/resolution=2160p/stream/movie/tt1.json`). The segment may also be
//! a URL-encoded JSON object.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use navigator_core::{MediaType, PlayableRef, RankedCandidate, Selection, SelectionConfig};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

use super::handlers::ErrorResponse;
use crate::state::AppState;

/// Shared by every stream we emit so the client keeps autoplaying the next
/// episode from this addon.
pub const BINGE_GROUP: &str = "navigator-autoplay";

const ADDON_ID: &str = "org.navigator.autoplay";
const VERSION: &str = env!("CARGO_PKG_VERSION");

type ApiError = (StatusCode, Json<ErrorResponse>);

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub id: String,
    pub version: String,
    pub name: String,
    pub description: String,
    pub resources: Vec<String>,
    pub types: Vec<String>,
    pub id_prefixes: Vec<String>,
    pub catalogs: Vec<serde_json::Value>,
    pub config: Vec<ConfigOption>,
    pub behavior_hints: ManifestHints,
}

#[derive(Debug, Serialize)]
pub struct ConfigOption {
    pub key: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub options: Vec<String>,
    pub default: String,
    pub required: bool,
}

#[derive(Debug, Serialize)]
pub struct ManifestHints {
    pub configurable: bool,
}

#[derive(Debug, Serialize)]
pub struct StreamsResponse {
    pub streams: Vec<Stream>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stream {
    pub name: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub info_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub behavior_hints: BehaviorHints,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BehaviorHints {
    pub binge_group: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub immediate_play: bool,
}

pub async fn manifest(State(state): State<Arc<AppState>>) -> Json<Manifest> {
    let default_resolution = state.selection_defaults().preferred_resolution;

    Json(Manifest {
        id: ADDON_ID.to_string(),
        version: VERSION.to_string(),
        name: "Torrent Navigator".to_string(),
        description: "Aggregates torrent and debrid sources and autoplays the best stream"
            .to_string(),
        resources: vec!["stream".to_string()],
        types: vec!["movie".to_string(), "series".to_string()],
        id_prefixes: vec!["tt".to_string()],
        catalogs: Vec::new(),
        config: vec![ConfigOption {
            key: "resolution".to_string(),
            kind: "select".to_string(),
            title: "Preferred Resolution".to_string(),
            options: vec!["2160p".to_string(), "1080p".to_string(), "720p".to_string()],
            default: default_resolution.to_string(),
            required: false,
        }],
        behavior_hints: ManifestHints { configurable: true },
    })
}

pub async fn get_streams(
    State(state): State<Arc<AppState>>,
    Path((media_type, id)): Path<(String, String)>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<StreamsResponse>, ApiError> {
    respond(&state, &media_type, &id, params).await
}

pub async fn get_configured_streams(
    State(state): State<Arc<AppState>>,
    Path((config, media_type, id)): Path<(String, String, String)>,
    Query(query): Query<HashMap<String, String>>,
) -> Result<Json<StreamsResponse>, ApiError> {
    let mut params = parse_config_segment(&config);
    // Explicit query parameters win over the installed configuration.
    params.extend(query);
    respond(&state, &media_type, &id, params).await
}

async fn respond(
    state: &AppState,
    media_type: &str,
    id: &str,
    params: HashMap<String, String>,
) -> Result<Json<StreamsResponse>, ApiError> {
    let media_type: MediaType = media_type.parse().map_err(|e: String| {
        (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse { error: e }),
        )
    })?;

    let media_id = id.strip_suffix(".json").unwrap_or(id);
    if media_id.trim().is_empty() {
        return Err((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: "missing media id".to_string(),
            }),
        ));
    }

    let config = SelectionConfig::from_params(&params, state.selection_defaults());
    debug!(media_type = media_type.as_str(), media_id = %media_id, policy = %config.normalized(), "Stream request");

    let selection = state
        .selector()
        .select_best(media_type, media_id, &config)
        .await;

    Ok(Json(StreamsResponse {
        streams: to_streams(&selection),
    }))
}

/// Chosen stream first, flagged for immediate play; the rest follow in
/// rank order as manual fallbacks.
pub fn to_streams(selection: &Selection) -> Vec<Stream> {
    selection.ranked.iter().map(to_stream).collect()
}

fn to_stream(candidate: &RankedCandidate) -> Stream {
    let marker = if candidate.autoplay { "⚡ " } else { "" };
    let health = if candidate.is_cached {
        "cached".to_string()
    } else {
        format!("👤{}", candidate.seeders)
    };
    let name = format!(
        "{}{} {}\n{}",
        marker, candidate.source, candidate.resolution, health
    );

    let uri = &candidate.playable_ref;
    let (info_hash, url) = if uri.starts_with("magnet:") {
        match PlayableRef::Magnet(uri.clone()).info_hash() {
            Some(hash) => (Some(hash), None),
            None => (None, Some(uri.clone())),
        }
    } else {
        (None, Some(uri.clone()))
    };

    Stream {
        name,
        title: candidate.title.clone(),
        info_hash,
        url,
        behavior_hints: BehaviorHints {
            binge_group: BINGE_GROUP.to_string(),
            immediate_play: candidate.autoplay,
        },
    }
}

/// Read a `key=value&key=value` or JSON object segment. The router has
/// already percent-decoded it. Anything unreadable yields no settings.
pub fn parse_config_segment(decoded: &str) -> HashMap<String, String> {
    if decoded.trim_start().starts_with('{') {
        return match serde_json::from_str::<HashMap<String, serde_json::Value>>(decoded) {
            Ok(map) => map
                .into_iter()
                .map(|(k, v)| {
                    let value = match v {
                        serde_json::Value::String(s) => s,
                        other => other.to_string(),
                    };
                    (k, value)
                })
                .collect(),
            Err(e) => {
                warn!(error = %e, "Ignoring malformed addon configuration");
                HashMap::new()
            }
        };
    }

    decoded
        .split(['&', '|'])
        .filter_map(|pair| {
            let (key, value) = pair.split_once('=')?;
            Some((key.trim().to_string(), value.trim().to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use navigator_core::Resolution;

    fn ranked(title: &str, playable_ref: &str, autoplay: bool, cached: bool) -> RankedCandidate {
        RankedCandidate {
            title: title.to_string(),
            playable_ref: playable_ref.to_string(),
            source: "yts".to_string(),
            resolution: Resolution::Fhd1080,
            seeders: 42,
            size_mb: Some(2048.0),
            is_cached: cached,
            score: 2142,
            autoplay,
        }
    }

    #[test]
    fn test_chosen_stream_autoplays() {
        let selection = Selection::from_ranked(vec![
            ranked("Best", "magnet:?xt=urn:btih:ABC&dn=x", false, false),
            ranked("Fallback", "https://debrid.example/1", false, true),
        ]);
        let streams = to_streams(&selection);

        assert_eq!(streams.len(), 2);
        assert_eq!(streams[0].name, "⚡ yts 1080p\n👤42");
        assert_eq!(streams[0].info_hash.as_deref(), Some("abc"));
        assert!(streams[0].url.is_none());
        assert!(streams[0].behavior_hints.immediate_play);

        assert_eq!(streams[1].name, "yts 1080p\ncached");
        assert_eq!(streams[1].url.as_deref(), Some("https://debrid.example/1"));
        assert!(!streams[1].behavior_hints.immediate_play);
        assert_eq!(streams[1].behavior_hints.binge_group, BINGE_GROUP);
    }

    #[test]
    fn test_stream_serialization_omits_false_hint() {
        let stream = to_stream(&ranked("X", "https://x/1", false, false));
        let json = serde_json::to_value(&stream).unwrap();
        assert!(json["behaviorHints"].get("immediatePlay").is_none());
        assert_eq!(json["behaviorHints"]["bingeGroup"], BINGE_GROUP);
        assert!(json.get("infoHash").is_none());
    }

    #[test]
    fn test_parse_query_style_segment() {
        let params = parse_config_segment("resolution=2160p&min_seeders=10");
        assert_eq!(params["resolution"], "2160p");
        assert_eq!(params["min_seeders"], "10");
    }

    #[test]
    fn test_parse_json_segment() {
        let params = parse_config_segment(r#"{"resolution":"720p","min_seeders":3}"#);
        assert_eq!(params["resolution"], "720p");
        assert_eq!(params["min_seeders"], "3");
    }

    #[test]
    fn test_percent_sign_in_value_is_kept() {
        let params = parse_config_segment("note=50%off&resolution=720p");
        assert_eq!(params["note"], "50%off");
        assert_eq!(params["resolution"], "720p");
    }

    #[test]
    fn test_parse_garbage_segment() {
        assert!(parse_config_segment("{not-json").is_empty());
        assert!(parse_config_segment("justtext").is_empty());
    }
}
