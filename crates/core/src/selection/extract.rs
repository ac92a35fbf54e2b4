//! Attribute extraction from free-text candidate fields.
//!
//! Every function here is total: any input, including the empty string,
//! yields a value for every attribute. Missing data is reported as
//! `Resolution::Unknown` / `None` rather than a zero that filters would
//! mistake for a real measurement.

use once_cell::sync::Lazy;
use regex_lite::Regex;

use super::{EnrichedCandidate, Resolution};
use crate::provider::RawCandidate;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Debrid-service tags that mark a candidate as served from cache.
const CACHE_MARKERS: &[&str] = &[
    "[rd+]", "[ad+]", "[pm+]", "[dl+]", "[tb+]", "[ed+]", "[oc+]", "[pk+]",
];

// Word boundaries are spelled out: release names use `_` as a separator,
// and `\b` treats it as part of a word.
static FOUR_K: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:^|[^A-Za-z0-9])(?:4k|uhd)(?:$|[^A-Za-z0-9])").expect("4k regex")
});

static SEEDERS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:👤|(?:^|[^A-Za-z0-9])(?:seeders?|seeds?))\s*[:=]?\s*(\d+)")
        .expect("seeders regex")
});

static SIZE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*(gib|gb|mib|mb)(?:$|[^A-Za-z0-9])").expect("size regex")
});

static LOW_QUALITY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(?:^|[^A-Za-z0-9])(?:cam|camrip|hdcam|ts|hdts|telesync|tc|hdtc|telecine|scr|screener|dvdscr|bdscr|pdvd)(?:$|[^A-Za-z0-9])",
    )
    .expect("low quality regex")
});

static HDR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(?:^|[^A-Za-z0-9])(?:hdr(?:10)?|dv|dovi|dolby[ ._]?vision|10[ _-]?bit)(?:$|[^A-Za-z0-9])",
    )
    .expect("hdr regex")
});

/// Attributes derivable from text alone.
#[derive(Debug, Clone, PartialEq)]
pub struct Attributes {
    pub resolution: Resolution,
    pub seeders: u32,
    pub size_mb: Option<f64>,
    pub is_cached: bool,
    pub is_low_quality: bool,
    pub has_hdr: bool,
}

/// Extract all attributes from `text`.
pub fn extract(text: &str) -> Attributes {
    Attributes {
        resolution: extract_resolution(text),
        seeders: extract_seeders(text),
        size_mb: extract_size_mb(text),
        is_cached: is_cached(text),
        is_low_quality: is_low_quality(text),
        has_hdr: HDR.is_match(text),
    }
}

/// Highest-priority resolution marker in `text`: 2160p/4k, then 1080p,
/// 720p, 480p.
pub fn extract_resolution(text: &str) -> Resolution {
    let lower = text.to_lowercase();
    if lower.contains("2160p") || FOUR_K.is_match(text) {
        Resolution::Uhd2160
    } else if lower.contains("1080p") {
        Resolution::Fhd1080
    } else if lower.contains("720p") {
        Resolution::Hd720
    } else if lower.contains("480p") {
        Resolution::Sd480
    } else {
        Resolution::Unknown
    }
}

/// First seed count marker (`👤 42`, `Seeders: 42`, `seeds 42`), or 0.
pub fn extract_seeders(text: &str) -> u32 {
    SEEDERS
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<u32>().ok())
        .unwrap_or(0)
}

/// First `<number> MB|GB` marker converted to megabytes.
pub fn extract_size_mb(text: &str) -> Option<f64> {
    let caps = SIZE.captures(text)?;
    let value: f64 = caps.get(1)?.as_str().parse().ok()?;
    let unit = caps.get(2)?.as_str().to_lowercase();
    let mb = match unit.as_str() {
        "gb" | "gib" => value * 1024.0,
        _ => value,
    };
    (mb.is_finite() && mb > 0.0).then_some(mb)
}

pub fn is_cached(text: &str) -> bool {
    let lower = text.to_lowercase();
    CACHE_MARKERS.iter().any(|marker| lower.contains(marker))
}

/// Camcorder / telesync / screener / telecine markers, whole words only.
pub fn is_low_quality(text: &str) -> bool {
    LOW_QUALITY.is_match(text)
}

/// Combine provider-supplied structured fields with text extraction.
///
/// Structured values win where present.
pub fn enrich(raw: RawCandidate) -> EnrichedCandidate {
    let attrs = extract(&raw.text());

    let resolution = match raw.resolution {
        Some(r) if r != Resolution::Unknown => r,
        _ => attrs.resolution,
    };
    let size_mb = raw
        .size_bytes
        .filter(|bytes| *bytes > 0)
        .map(|bytes| bytes as f64 / BYTES_PER_MB)
        .or(attrs.size_mb);

    EnrichedCandidate {
        resolution,
        seeders: raw.seeders.unwrap_or(attrs.seeders),
        size_mb,
        is_cached: raw.cached.unwrap_or(attrs.is_cached),
        is_low_quality: attrs.is_low_quality,
        has_hdr: attrs.has_hdr,
        raw,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::PlayableRef;

    #[test]
    fn test_empty_text_is_all_unknown() {
        let attrs = extract("");
        assert_eq!(attrs.resolution, Resolution::Unknown);
        assert_eq!(attrs.seeders, 0);
        assert!(attrs.size_mb.is_none());
        assert!(!attrs.is_cached);
        assert!(!attrs.is_low_quality);
        assert!(!attrs.has_hdr);
    }

    #[test]
    fn test_extract_is_deterministic() {
        let text = "Movie.2021.1080p.WEB-DL [RD+] 👤 55 💾 2.1 GB";
        assert_eq!(extract(text), extract(text));
    }

    #[test]
    fn test_resolution_priority() {
        assert_eq!(extract_resolution("Movie 2160p"), Resolution::Uhd2160);
        assert_eq!(extract_resolution("Movie 4K HDR"), Resolution::Uhd2160);
        assert_eq!(extract_resolution("Movie.1080P.x264"), Resolution::Fhd1080);
        assert_eq!(extract_resolution("Movie 720p"), Resolution::Hd720);
        assert_eq!(extract_resolution("Movie 480p"), Resolution::Sd480);
        // First match in priority order wins, not first in the text
        assert_eq!(extract_resolution("720p upscale of 1080p"), Resolution::Fhd1080);
        assert_eq!(extract_resolution("Movie DVDRip"), Resolution::Unknown);
    }

    #[test]
    fn test_four_k_must_be_a_word() {
        assert_eq!(extract_resolution("4kids.tv collection"), Resolution::Unknown);
    }

    #[test]
    fn test_seeders_markers() {
        assert_eq!(extract_seeders("👤 123 💾 1.2 GB"), 123);
        assert_eq!(extract_seeders("Seeders: 45"), 45);
        assert_eq!(extract_seeders("seeds=7 peers=9"), 7);
        assert_eq!(extract_seeders("Movie 1080p 5.1"), 0);
        // First marker wins
        assert_eq!(extract_seeders("👤 10 then 👤 20"), 10);
    }

    #[test]
    fn test_size_conversion() {
        assert_eq!(extract_size_mb("💾 1.5 GB"), Some(1536.0));
        assert_eq!(extract_size_mb("700MB"), Some(700.0));
        assert_eq!(extract_size_mb("size 2 GiB"), Some(2048.0));
        assert_eq!(extract_size_mb("no size here"), None);
        assert_eq!(extract_size_mb("0 MB"), None);
    }

    #[test]
    fn test_cache_markers() {
        assert!(is_cached("[RD+] Movie 1080p"));
        assert!(is_cached("Torrentio\n[ad+] 4k"));
        assert!(!is_cached("[RD download] Movie 1080p"));
    }

    #[test]
    fn test_low_quality_whole_word() {
        assert!(!is_low_quality("Description"));
        assert!(!is_low_quality("Scream.1996.1080p"));
        assert!(!is_low_quality("Matches.2020.720p.DTS"));
        assert!(is_low_quality("CAM-RIP 720p"));
        assert!(is_low_quality("Movie.2024.HDTS.x264"));
        assert!(is_low_quality("Movie 2024 TELESYNC"));
        assert!(is_low_quality("movie.2024.dvdscr"));
        assert!(is_low_quality("Movie_2024_CAM_720p"));
        assert!(is_low_quality("Movie_2024_HDTS_x264"));
        assert!(!is_low_quality("Movie_2024_DTS_720p"));
    }

    #[test]
    fn test_underscore_separated_markers() {
        assert_eq!(extract_resolution("Movie_4K_HDR"), Resolution::Uhd2160);
        assert!(extract("Movie_2160p_HDR10_x265").has_hdr);
        assert!(extract("Movie_2160p_DV_x265").has_hdr);
        assert_eq!(extract_seeders("release_seeders: 12"), 12);
        assert_eq!(extract_resolution("the_4kids_collection"), Resolution::Unknown);
        assert_eq!(extract_size_mb("Movie_1080p_2.5GB_x264"), Some(2560.0));
    }

    #[test]
    fn test_hdr_markers() {
        assert!(extract("Movie 2160p HDR10+ x265").has_hdr);
        assert!(extract("Movie 2160p DV").has_hdr);
        assert!(extract("Movie 1080p 10bit").has_hdr);
        assert!(!extract("Movie 1080p DVDRip").has_hdr);
    }

    #[test]
    fn test_enrich_structured_fields_take_precedence() {
        let mut raw = RawCandidate::new(
            "yts",
            "Movie 720p 👤 3 💾 900 MB",
            PlayableRef::InfoHash("abc".to_string()),
        );
        raw.seeders = Some(250);
        raw.size_bytes = Some(2 * 1024 * 1024 * 1024);
        raw.resolution = Some(Resolution::Fhd1080);
        raw.cached = Some(false);

        let enriched = enrich(raw);
        assert_eq!(enriched.seeders, 250);
        assert_eq!(enriched.size_mb, Some(2048.0));
        assert_eq!(enriched.resolution, Resolution::Fhd1080);
        assert!(!enriched.is_cached);
    }

    #[test]
    fn test_enrich_falls_back_to_text() {
        let mut raw = RawCandidate::new(
            "addon",
            "Movie.2160p.HDR [RD+]",
            PlayableRef::Url("https://example/dl".to_string()),
        );
        raw.description = Some("👤 40 💾 12 GB".to_string());
        raw.size_bytes = Some(0);

        let enriched = enrich(raw);
        assert_eq!(enriched.resolution, Resolution::Uhd2160);
        assert_eq!(enriched.seeders, 40);
        assert_eq!(enriched.size_mb, Some(12.0 * 1024.0));
        assert!(enriched.is_cached);
        assert!(enriched.has_hdr);
    }
}
