//! Matching release names against a specific season/episode.

use regex_lite::Regex;
use tracing::warn;

use super::EpisodeRef;

/// Matches `S01E02` / `s1e2` / `1x02` style markers for one episode.
///
/// The marker must not be glued to a preceding letter or digit (`_` and
/// `.` separate) and must not continue with a digit. A following letter is
/// fine, so multi-episode names like `S01E02E03` match their first episode.
pub struct EpisodeMatcher {
    pattern: Option<Regex>,
}

impl EpisodeMatcher {
    pub fn new(episode: EpisodeRef) -> Self {
        let source = format!(
            r"(?i)(?:^|[^A-Za-z0-9])(?:S0*{s}\s*E0*{e}|0*{s}x0*{e})(?:$|[^0-9])",
            s = episode.season,
            e = episode.episode
        );
        let pattern = match Regex::new(&source) {
            Ok(re) => Some(re),
            Err(e) => {
                warn!(error = %e, "Failed to build episode pattern, rejecting all candidates");
                None
            }
        };
        Self { pattern }
    }

    /// Whether `text` names this episode. Candidates for other episodes of
    /// the same show never match.
    pub fn matches(&self, text: &str) -> bool {
        self.pattern
            .as_ref()
            .map(|re| re.is_match(text))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matcher(season: u32, episode: u32) -> EpisodeMatcher {
        EpisodeMatcher::new(EpisodeRef { season, episode })
    }

    #[test]
    fn test_matches_standard_marker() {
        let m = matcher(1, 2);
        assert!(m.matches("Breaking.Bad.S01E02.720p.HDTV"));
        assert!(m.matches("breaking bad s01e02 1080p"));
        assert!(m.matches("Breaking Bad S1E2"));
        assert!(m.matches("Breaking_Bad_S01E02_720p_HDTV"));
        assert!(m.matches("Breaking.Bad.S01E02E03.720p"));
        assert!(m.matches("S01E02"));
    }

    #[test]
    fn test_matches_cross_marker() {
        let m = matcher(1, 2);
        assert!(m.matches("Breaking Bad 1x02 Cat's in the Bag"));
    }

    #[test]
    fn test_rejects_other_episodes() {
        let m = matcher(1, 2);
        assert!(!m.matches("Breaking.Bad.S01E01.720p"));
        assert!(!m.matches("Breaking.Bad.S01E20.720p"));
        assert!(!m.matches("Breaking.Bad.S01E022.720p"));
        assert!(!m.matches("Breaking.Bad.S11E02.720p"));
        assert!(!m.matches("Breaking Bad 11x02"));
        assert!(!m.matches("Breaking Bad Season 1 Complete"));
    }

    #[test]
    fn test_double_digit_values() {
        let m = matcher(10, 12);
        assert!(m.matches("Show.S10E12.1080p"));
        assert!(m.matches("Show 10x12"));
        assert!(!m.matches("Show.S01E12.1080p"));
    }
}
