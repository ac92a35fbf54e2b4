//! Hard policy filtering of enriched candidates.

use super::{EnrichedCandidate, SelectionConfig};

/// Drop candidates that violate `config`, preserving the order of the rest.
///
/// Cached candidates are always kept once past the low-quality check: they
/// are served by a debrid tier and do not depend on swarm health or size.
/// An unknown size never disqualifies a peer-to-peer candidate.
pub fn filter_candidates(
    candidates: Vec<EnrichedCandidate>,
    config: &SelectionConfig,
) -> Vec<EnrichedCandidate> {
    candidates
        .into_iter()
        .filter(|c| !(config.exclude_low_quality && c.is_low_quality))
        .filter(|c| is_eligible(c, config))
        .collect()
}

fn is_eligible(candidate: &EnrichedCandidate, config: &SelectionConfig) -> bool {
    if candidate.is_cached {
        return true;
    }

    let enough_seeders = candidate.seeders >= config.min_seeders;
    let size_ok = candidate
        .size_mb
        .map(|mb| mb <= config.max_size_mb)
        .unwrap_or(true);

    enough_seeders && size_ok
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures::enriched;

    fn titles(candidates: &[EnrichedCandidate]) -> Vec<&str> {
        candidates.iter().map(|c| c.raw.title.as_str()).collect()
    }

    #[test]
    fn test_excludes_low_quality_when_enabled() {
        let mut cam = enriched("Movie CAM", 100, Some(700.0));
        cam.is_low_quality = true;
        let good = enriched("Movie 1080p", 100, Some(700.0));

        let config = SelectionConfig::default();
        let kept = filter_candidates(vec![cam.clone(), good.clone()], &config);
        assert_eq!(titles(&kept), vec!["Movie 1080p"]);

        let config = SelectionConfig {
            exclude_low_quality: false,
            ..SelectionConfig::default()
        };
        let kept = filter_candidates(vec![cam, good], &config);
        assert_eq!(kept.len(), 2);
    }

    #[test]
    fn test_min_seeders_applies_to_peer_to_peer_only() {
        let weak = enriched("Weak", 2, Some(700.0));
        let mut cached = enriched("Cached", 0, Some(700.0));
        cached.is_cached = true;

        let kept = filter_candidates(vec![weak, cached], &SelectionConfig::default());
        assert_eq!(titles(&kept), vec!["Cached"]);
    }

    #[test]
    fn test_max_size_applies_to_peer_to_peer_only() {
        let huge = enriched("Huge", 500, Some(80_000.0));
        let mut huge_cached = enriched("Huge Cached", 0, Some(80_000.0));
        huge_cached.is_cached = true;

        let kept = filter_candidates(vec![huge, huge_cached], &SelectionConfig::default());
        assert_eq!(titles(&kept), vec!["Huge Cached"]);
    }

    #[test]
    fn test_unknown_size_is_not_a_violation() {
        let unknown = enriched("Unknown Size", 50, None);
        let kept = filter_candidates(vec![unknown], &SelectionConfig::default());
        assert_eq!(kept.len(), 1);
    }

    #[test]
    fn test_preserves_order() {
        let input = vec![
            enriched("C", 10, None),
            enriched("dropped", 0, None),
            enriched("A", 30, None),
            enriched("B", 20, None),
        ];
        let kept = filter_candidates(input, &SelectionConfig::default());
        assert_eq!(titles(&kept), vec!["C", "A", "B"]);
    }

    #[test]
    fn test_filter_is_monotonic() {
        let mut cam = enriched("Cam", 50, None);
        cam.is_low_quality = true;
        let mut cached = enriched("Cached", 0, None);
        cached.is_cached = true;
        let input = vec![
            cam,
            cached,
            enriched("S3", 3, None),
            enriched("S8", 8, None),
            enriched("S40", 40, None),
        ];

        let lenient = SelectionConfig {
            exclude_low_quality: false,
            min_seeders: 0,
            ..SelectionConfig::default()
        };
        let strict_lq = SelectionConfig {
            exclude_low_quality: true,
            ..lenient.clone()
        };
        assert!(
            filter_candidates(input.clone(), &strict_lq).len()
                <= filter_candidates(input.clone(), &lenient).len()
        );

        let mut previous = usize::MAX;
        for min_seeders in [0, 4, 10, 100] {
            let config = SelectionConfig {
                min_seeders,
                ..lenient.clone()
            };
            let kept = filter_candidates(input.clone(), &config);
            let p2p = kept.iter().filter(|c| !c.is_cached).count();
            assert!(p2p <= previous);
            assert!(kept.iter().any(|c| c.is_cached));
            previous = p2p;
        }
    }

    #[test]
    fn test_empty_input() {
        assert!(filter_candidates(vec![], &SelectionConfig::default()).is_empty());
    }
}
