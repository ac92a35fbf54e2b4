//! Testing utilities and mock implementations.
//!
//! This module provides mocks for every external seam (providers, title
//! metadata, time) so the selection pipeline can be exercised end to end
//! without network access.
//!
//! # Example
//!
//! ```rust,ignore
//! use navigator_core::testing::{fixtures, MockProvider};
//!
//! let provider = MockProvider::new("mock").with_results(vec![
//!     fixtures::magnet_candidate("mock", "Movie 1080p 👤 50 💾 2 GB", "aaa"),
//! ]);
//!
//! // Register with a Selector...
//! ```

mod manual_clock;
mod mock_metadata;
mod mock_provider;

pub use manual_clock::ManualClock;
pub use mock_metadata::MockMetadataResolver;
pub use mock_provider::MockProvider;

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::provider::{PlayableRef, RawCandidate};
    use crate::selection::{EnrichedCandidate, Resolution};

    /// Create an enriched 1080p peer-to-peer candidate with no quality flags.
    pub fn enriched(title: &str, seeders: u32, size_mb: Option<f64>) -> EnrichedCandidate {
        EnrichedCandidate {
            raw: magnet_candidate("mock", title, &hash_for(title)),
            resolution: Resolution::Fhd1080,
            seeders,
            size_mb,
            is_cached: false,
            is_low_quality: false,
            has_hdr: false,
        }
    }

    /// Create a free-text candidate with a magnet for `info_hash`.
    pub fn magnet_candidate(source: &str, title: &str, info_hash: &str) -> RawCandidate {
        RawCandidate::new(
            source,
            title,
            PlayableRef::Magnet(format!("magnet:?xt=urn:btih:{}", info_hash)),
        )
    }

    /// Create a candidate with structured seeders and size.
    pub fn structured_candidate(
        source: &str,
        title: &str,
        info_hash: &str,
        seeders: u32,
        size_mb: u64,
    ) -> RawCandidate {
        let mut candidate = magnet_candidate(source, title, info_hash);
        candidate.seeders = Some(seeders);
        candidate.size_bytes = Some(size_mb * 1024 * 1024);
        candidate
    }

    /// Create a debrid-cached candidate served from a direct URL.
    pub fn cached_candidate(source: &str, title: &str, url: &str) -> RawCandidate {
        let mut candidate = RawCandidate::new(source, title, PlayableRef::Url(url.to_string()));
        candidate.cached = Some(true);
        candidate
    }

    /// Deterministic hex-ish hash derived from a title.
    fn hash_for(title: &str) -> String {
        title
            .bytes()
            .map(|b| format!("{:02x}", b))
            .collect::<String>()
            .chars()
            .take(40)
            .collect()
    }
}
