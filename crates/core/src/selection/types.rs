//! Types for the selection engine.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use tracing::warn;

use crate::provider::RawCandidate;

/// Kind of media a request is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaType {
    Movie,
    Series,
}

impl MediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Movie => "movie",
            MediaType::Series => "series",
        }
    }
}

impl FromStr for MediaType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "movie" => Ok(MediaType::Movie),
            "series" => Ok(MediaType::Series),
            other => Err(format!("unknown media type: {}", other)),
        }
    }
}

/// A season/episode pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EpisodeRef {
    pub season: u32,
    pub episode: u32,
}

impl EpisodeRef {
    /// `S01E02` style marker.
    pub fn marker(&self) -> String {
        format!("S{:02}E{:02}", self.season, self.episode)
    }
}

/// A parsed media identifier.
///
/// Series identifiers carry the episode as `tt0903747:1:2`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaRequest {
    pub media_type: MediaType,
    /// The id as the client sent it (used for fingerprinting).
    pub media_id: String,
    /// IMDb id of the movie or show, without season/episode.
    pub imdb_id: String,
    pub episode: Option<EpisodeRef>,
}

impl MediaRequest {
    pub fn new(media_type: MediaType, media_id: &str) -> Self {
        let media_id = media_id.trim().to_string();
        let mut parts = media_id.split(':');
        let imdb_id = parts.next().unwrap_or_default().to_string();
        let season = parts.next().and_then(|s| s.parse::<u32>().ok());
        let episode = parts.next().and_then(|e| e.parse::<u32>().ok());

        let episode = match (media_type, season, episode) {
            (MediaType::Series, Some(season), Some(episode)) => {
                Some(EpisodeRef { season, episode })
            }
            _ => None,
        };

        Self {
            media_type,
            media_id,
            imdb_id,
            episode,
        }
    }
}

/// Video resolution, ordered from lowest to highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Resolution {
    #[serde(rename = "unknown")]
    Unknown,
    #[serde(rename = "480p")]
    Sd480,
    #[serde(rename = "720p")]
    Hd720,
    #[serde(rename = "1080p")]
    Fhd1080,
    #[serde(rename = "2160p")]
    Uhd2160,
}

impl Resolution {
    /// Position on the resolution ladder; `None` for unknown.
    pub fn rank(&self) -> Option<i32> {
        match self {
            Resolution::Unknown => None,
            Resolution::Sd480 => Some(0),
            Resolution::Hd720 => Some(1),
            Resolution::Fhd1080 => Some(2),
            Resolution::Uhd2160 => Some(3),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Resolution::Unknown => "unknown",
            Resolution::Sd480 => "480p",
            Resolution::Hd720 => "720p",
            Resolution::Fhd1080 => "1080p",
            Resolution::Uhd2160 => "2160p",
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Resolution {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "2160p" | "4k" | "uhd" => Ok(Resolution::Uhd2160),
            "1080p" | "fhd" => Ok(Resolution::Fhd1080),
            "720p" | "hd" => Ok(Resolution::Hd720),
            "480p" | "sd" => Ok(Resolution::Sd480),
            other => Err(format!("unknown resolution: {}", other)),
        }
    }
}

/// Per-request selection policy.
///
/// One configurable policy replaces the many hard-coded variants: every
/// field has a documented default and user input that fails to parse falls
/// back to that default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionConfig {
    /// Resolution that gets the full resolution bonus (default: 1080p).
    #[serde(default = "default_preferred_resolution")]
    pub preferred_resolution: Resolution,
    /// Rank debrid-cached candidates above every peer-to-peer one (default: true).
    #[serde(default = "default_true")]
    pub prioritize_cached: bool,
    /// Drop CAM/TS/screener releases (default: true).
    #[serde(default = "default_true")]
    pub exclude_low_quality: bool,
    /// Minimum seeders for a peer-to-peer candidate (default: 5).
    #[serde(default = "default_min_seeders")]
    pub min_seeders: u32,
    /// Maximum size in MB for a peer-to-peer candidate (default: 20480).
    #[serde(default = "default_max_size_mb")]
    pub max_size_mb: f64,
    /// Rank the unfiltered list when filtering leaves nothing (default: false).
    #[serde(default)]
    pub fallback_to_unfiltered: bool,
}

fn default_preferred_resolution() -> Resolution {
    Resolution::Fhd1080
}

fn default_true() -> bool {
    true
}

fn default_min_seeders() -> u32 {
    5
}

fn default_max_size_mb() -> f64 {
    20_480.0
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            preferred_resolution: default_preferred_resolution(),
            prioritize_cached: true,
            exclude_low_quality: true,
            min_seeders: default_min_seeders(),
            max_size_mb: default_max_size_mb(),
            fallback_to_unfiltered: false,
        }
    }
}

impl SelectionConfig {
    /// Build a config from loosely typed user parameters on top of `base`.
    ///
    /// Unknown keys are ignored. Values that fail to parse keep the `base`
    /// value and are logged; they never fail the request.
    pub fn from_params(params: &HashMap<String, String>, base: &SelectionConfig) -> Self {
        let mut config = base.clone();

        for (key, value) in params {
            let value = value.trim();
            let applied = match key.as_str() {
                "resolution" | "preferred_resolution" => value
                    .parse::<Resolution>()
                    .map(|r| config.preferred_resolution = r)
                    .is_ok(),
                "prioritize_cached" => parse_bool(value)
                    .map(|b| config.prioritize_cached = b)
                    .is_some(),
                "exclude_low_quality" => parse_bool(value)
                    .map(|b| config.exclude_low_quality = b)
                    .is_some(),
                "fallback_to_unfiltered" => parse_bool(value)
                    .map(|b| config.fallback_to_unfiltered = b)
                    .is_some(),
                "min_seeders" => value
                    .parse::<u32>()
                    .map(|n| config.min_seeders = n)
                    .is_ok(),
                "max_size_mb" => match value.parse::<f64>() {
                    Ok(mb) if mb.is_finite() && mb > 0.0 => {
                        config.max_size_mb = mb;
                        true
                    }
                    _ => false,
                },
                _ => true,
            };

            if !applied {
                warn!(key = %key, value = %value, "Ignoring malformed selection parameter");
            }
        }

        config
    }

    /// Canonical string form used in cache fingerprints.
    pub fn normalized(&self) -> String {
        format!(
            "res={};cached={};lq={};seeds={};max={};fallback={}",
            self.preferred_resolution,
            self.prioritize_cached as u8,
            self.exclude_low_quality as u8,
            self.min_seeders,
            self.max_size_mb,
            self.fallback_to_unfiltered as u8,
        )
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// A raw candidate plus the attributes derived from it.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedCandidate {
    pub raw: RawCandidate,
    pub resolution: Resolution,
    pub seeders: u32,
    /// `None` means the size is unknown, which is not the same as 0.
    pub size_mb: Option<f64>,
    pub is_cached: bool,
    pub is_low_quality: bool,
    pub has_hdr: bool,
}

/// A scored candidate as exposed to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedCandidate {
    pub title: String,
    pub playable_ref: String,
    pub source: String,
    pub resolution: Resolution,
    pub seeders: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_mb: Option<f64>,
    pub is_cached: bool,
    pub score: i64,
    /// Set on the single entry that should be played immediately.
    pub autoplay: bool,
}

impl RankedCandidate {
    pub fn from_enriched(candidate: &EnrichedCandidate, score: i64) -> Self {
        Self {
            title: candidate.raw.title.clone(),
            playable_ref: candidate.raw.playable.to_uri(),
            source: candidate.raw.source.clone(),
            resolution: candidate.resolution,
            seeders: candidate.seeders,
            size_mb: candidate.size_mb,
            is_cached: candidate.is_cached,
            score,
            autoplay: false,
        }
    }
}

/// Outcome of a selection.
///
/// `chosen` is the autoplay pick and is always `ranked[0]` when present; the
/// rest of `ranked` is fallback and must be kept. An empty selection means
/// "no stream available", not an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    pub chosen: Option<RankedCandidate>,
    pub ranked: Vec<RankedCandidate>,
}

impl Selection {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build from a list already sorted best-first; flags the head.
    pub fn from_ranked(mut ranked: Vec<RankedCandidate>) -> Self {
        let chosen = ranked.first_mut().map(|top| {
            top.autoplay = true;
            top.clone()
        });
        Self { chosen, ranked }
    }

    pub fn is_empty(&self) -> bool {
        self.ranked.is_empty()
    }
}
