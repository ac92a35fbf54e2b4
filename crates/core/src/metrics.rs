//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Providers and mirror failover
//! - The result cache
//! - Selection outcomes and latency

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounterVec, Opts};

// =============================================================================
// Providers
// =============================================================================

/// Provider fetches total by result.
pub static PROVIDER_REQUESTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "navigator_provider_requests_total",
            "Total provider fetches",
        ),
        &["provider", "result"], // "success", "empty", "error", "timeout", "panic"
    )
    .unwrap()
});

/// Provider fetch duration in seconds.
pub static PROVIDER_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "navigator_provider_duration_seconds",
            "Duration of provider fetches",
        )
        .buckets(vec![0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 15.0]),
        &["provider"],
    )
    .unwrap()
});

/// Individual mirror attempts by result. Failures are failovers.
pub static MIRROR_ATTEMPTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "navigator_mirror_attempts_total",
            "Total mirror attempts",
        ),
        &["provider", "result"], // "success", "failure"
    )
    .unwrap()
});

// =============================================================================
// Cache
// =============================================================================

/// Result cache lookups by result.
pub static CACHE_LOOKUPS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("navigator_cache_lookups_total", "Total result cache lookups"),
        &["result"], // "hit", "miss"
    )
    .unwrap()
});

// =============================================================================
// Selection
// =============================================================================

/// Selections by outcome.
pub static SELECTIONS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("navigator_selections_total", "Total selections"),
        &["outcome"], // "chosen", "empty", "below_floor"
    )
    .unwrap()
});

/// Candidates merged from all providers per selection.
pub static CANDIDATES_PER_SELECTION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "navigator_candidates_per_selection",
            "Number of raw candidates merged per selection",
        )
        .buckets(vec![0.0, 1.0, 5.0, 10.0, 25.0, 50.0, 100.0, 250.0]),
        &[],
    )
    .unwrap()
});

/// End-to-end selection duration in seconds.
pub static SELECTION_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "navigator_selection_duration_seconds",
            "Duration of uncached selections",
        )
        .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 15.0]),
        &[],
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        // Providers
        Box::new(PROVIDER_REQUESTS.clone()),
        Box::new(PROVIDER_DURATION.clone()),
        Box::new(MIRROR_ATTEMPTS.clone()),
        // Cache
        Box::new(CACHE_LOOKUPS.clone()),
        // Selection
        Box::new(SELECTIONS.clone()),
        Box::new(CANDIDATES_PER_SELECTION.clone()),
        Box::new(SELECTION_DURATION.clone()),
    ]
}
