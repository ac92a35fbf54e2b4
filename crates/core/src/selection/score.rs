//! Tiered scoring of candidates.
//!
//! Tiers are additive and evaluated in a fixed order:
//! 1. reliability (debrid cache, swarm health, size risk)
//! 2. resolution distance from the preferred resolution
//! 3. quality extras (HDR bonus, low-quality penalty)

use super::{EnrichedCandidate, Resolution, SelectionConfig};

/// Bonus for a cached candidate when cached candidates are prioritized.
/// Exceeds the best possible peer-to-peer total.
pub const CACHED_BONUS: i64 = 10_000;
/// Cap on the seeder contribution of a single torrent.
pub const SEEDER_CAP: i64 = 500;
/// Cap on the seeders-per-gigabyte density bonus.
pub const DENSITY_CAP: i64 = 100;
/// Penalty when a peer-to-peer candidate's size is unknown.
pub const UNKNOWN_SIZE_PENALTY: i64 = 100;
/// Penalty for a swarm without a single seeder.
pub const DEAD_SWARM_PENALTY: i64 = 10_000;

pub const RESOLUTION_EXACT_BONUS: i64 = 2_000;
pub const RESOLUTION_HIGHER_BONUS: i64 = 1_500;
pub const RESOLUTION_LOWER_BONUS: i64 = 1_000;

pub const HDR_BONUS: i64 = 50;
pub const LOW_QUALITY_PENALTY: i64 = 7_000;

/// Top scores below this are never promoted to autoplay.
pub const UNACCEPTABLE_FLOOR: i64 = -4_000;

/// Score a candidate under `config`. Higher is better.
pub fn score(candidate: &EnrichedCandidate, config: &SelectionConfig) -> i64 {
    reliability_score(candidate, config)
        + resolution_score(candidate.resolution, config.preferred_resolution)
        + extras_score(candidate)
}

fn reliability_score(candidate: &EnrichedCandidate, config: &SelectionConfig) -> i64 {
    if candidate.is_cached {
        return if config.prioritize_cached {
            CACHED_BONUS
        } else {
            SEEDER_CAP
        };
    }

    let seeders = candidate.seeders as i64;
    if seeders == 0 {
        return -DEAD_SWARM_PENALTY;
    }

    let mut total = seeders.min(SEEDER_CAP);
    match candidate.size_mb {
        Some(mb) if mb > 0.0 => {
            let per_gb = candidate.seeders as f64 / (mb / 1024.0);
            total += (per_gb as i64).min(DENSITY_CAP);
        }
        _ => total -= UNKNOWN_SIZE_PENALTY,
    }
    total
}

/// Bonus for how close `actual` is to `preferred` on the resolution ladder.
pub fn resolution_score(actual: Resolution, preferred: Resolution) -> i64 {
    let (Some(actual), Some(preferred)) = (actual.rank(), preferred.rank()) else {
        return 0;
    };

    match actual - preferred {
        0 => RESOLUTION_EXACT_BONUS,
        1 => RESOLUTION_HIGHER_BONUS,
        -1 => RESOLUTION_LOWER_BONUS,
        _ => 0,
    }
}

fn extras_score(candidate: &EnrichedCandidate) -> i64 {
    let mut total = 0;
    if candidate.has_hdr {
        total += HDR_BONUS;
    }
    if candidate.is_low_quality {
        total -= LOW_QUALITY_PENALTY;
    }
    total
}

/// Score and sort best-first. The sort is stable: equal scores keep
/// their input order.
pub fn rank(
    candidates: Vec<EnrichedCandidate>,
    config: &SelectionConfig,
) -> Vec<(i64, EnrichedCandidate)> {
    let mut scored: Vec<_> = candidates
        .into_iter()
        .map(|c| (score(&c, config), c))
        .collect();
    scored.sort_by(|a, b| b.0.cmp(&a.0));
    scored
}
