//! End-to-end selection over all registered providers.

use futures::future::join_all;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::cache::{fingerprint, ResultCache};
use crate::config::Config;
use crate::fetcher::{MirrorFetcher, MirrorTransport};
use crate::metadata::{CinemetaResolver, MetadataResolver};
use crate::metrics::{
    CACHE_LOOKUPS, CANDIDATES_PER_SELECTION, PROVIDER_DURATION, PROVIDER_REQUESTS, SELECTIONS,
    SELECTION_DURATION,
};
use crate::provider::{create_providers, Provider, ProviderQuery, RawCandidate};

use super::episode::EpisodeMatcher;
use super::extract::enrich;
use super::filter::filter_candidates;
use super::score::{rank, UNACCEPTABLE_FLOOR};
use super::{MediaRequest, MediaType, RankedCandidate, Selection, SelectionConfig};

const DEFAULT_DEADLINE: Duration = Duration::from_secs(12);
const DEFAULT_EMPTY_TTL: Duration = Duration::from_secs(120);

/// Fans a request out to every provider and picks the autoplay candidate.
///
/// Provider order is registration order. It decides the merge order and
/// therefore which of two equally scored candidates comes first.
pub struct Selector {
    providers: Vec<Arc<dyn Provider>>,
    metadata: Option<Arc<dyn MetadataResolver>>,
    cache: ResultCache<Selection>,
    deadline: Duration,
    empty_ttl: Duration,
    floor: i64,
}

impl Selector {
    pub fn new(providers: Vec<Arc<dyn Provider>>, cache: ResultCache<Selection>) -> Self {
        Self {
            providers,
            metadata: None,
            cache,
            deadline: DEFAULT_DEADLINE,
            empty_ttl: DEFAULT_EMPTY_TTL,
            floor: UNACCEPTABLE_FLOOR,
        }
    }

    /// Wire providers, metadata and cache from configuration.
    pub fn from_config(config: &Config, transport: Arc<dyn MirrorTransport>) -> Self {
        let providers = create_providers(&config.providers, transport.clone());
        let cache = ResultCache::new(config.cache.capacity, config.cache.ttl());

        let mut selector = Self::new(providers, cache)
            .with_deadline(config.selection.deadline())
            .with_empty_ttl(config.cache.empty_ttl())
            .with_floor(config.selection.floor);

        if config.metadata.enabled {
            let resolver = CinemetaResolver::new(
                MirrorFetcher::new("cinemeta", transport),
                config.metadata.url.clone(),
                Duration::from_secs(config.metadata.timeout_secs),
            );
            selector = selector.with_metadata(Arc::new(resolver));
        }

        selector
    }

    pub fn with_metadata(mut self, metadata: Arc<dyn MetadataResolver>) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Upper bound for each provider fetch and for title resolution.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    /// Lifetime of cached empty selections.
    pub fn with_empty_ttl(mut self, ttl: Duration) -> Self {
        self.empty_ttl = ttl;
        self
    }

    pub fn with_floor(mut self, floor: i64) -> Self {
        self.floor = floor;
        self
    }

    pub fn provider_names(&self) -> Vec<String> {
        self.providers.iter().map(|p| p.name().to_string()).collect()
    }

    pub fn cache(&self) -> &ResultCache<Selection> {
        &self.cache
    }

    /// Cached entry point: fingerprint, cache lookup, and on a miss title
    /// resolution plus a full [`select`](Self::select).
    ///
    /// Empty selections are cached too, with the shorter empty TTL. That
    /// bounds upstream load for ids nobody has, at the cost of hiding new
    /// results for at most that long.
    pub async fn select_best(
        &self,
        media_type: MediaType,
        media_id: &str,
        config: &SelectionConfig,
    ) -> Selection {
        let key = fingerprint(media_type, media_id, config);

        if let Some(hit) = self.cache.get(&key).await {
            CACHE_LOOKUPS.with_label_values(&["hit"]).inc();
            debug!(media_id = %media_id, "Selection cache hit");
            return hit;
        }
        CACHE_LOOKUPS.with_label_values(&["miss"]).inc();

        let request = MediaRequest::new(media_type, media_id);
        let query_text = self.resolve_query_text(&request).await;
        let selection = self.select(&request, query_text, config).await;

        if selection.is_empty() {
            self.cache
                .put_with_ttl(key, selection.clone(), self.empty_ttl)
                .await;
        } else {
            self.cache.put(key, selection.clone()).await;
        }

        selection
    }

    /// Uncached selection for one request.
    ///
    /// Never fails: provider errors, timeouts and panics only remove that
    /// provider's contribution, and "nothing acceptable" is an empty
    /// [`Selection`].
    pub async fn select(
        &self,
        request: &MediaRequest,
        query_text: Option<String>,
        config: &SelectionConfig,
    ) -> Selection {
        let start = Instant::now();
        let query = ProviderQuery {
            media_type: request.media_type,
            imdb_id: request.imdb_id.clone(),
            episode: request.episode,
            text: query_text,
        };

        let raw = self.gather(&query).await;
        CANDIDATES_PER_SELECTION
            .with_label_values(&[])
            .observe(raw.len() as f64);
        let merged = raw.len();

        let raw = match request.episode {
            Some(episode) => {
                let matcher = EpisodeMatcher::new(episode);
                raw.into_iter()
                    .filter(|c| matcher.matches(&c.text()))
                    .collect()
            }
            None => raw,
        };
        let raw = dedup_by_hash(raw);

        let enriched: Vec<_> = raw.into_iter().map(enrich).collect();
        let mut eligible = filter_candidates(enriched.clone(), config);
        if eligible.is_empty() && config.fallback_to_unfiltered && !enriched.is_empty() {
            info!(
                media_id = %request.media_id,
                candidates = enriched.len(),
                "Nothing passed the filters, ranking unfiltered candidates"
            );
            eligible = enriched;
        }
        let eligible_count = eligible.len();

        let ranked = rank(eligible, config);
        let (selection, outcome) = match ranked.first() {
            None => (Selection::empty(), "empty"),
            Some((top, _)) if *top < self.floor => {
                debug!(media_id = %request.media_id, top_score = top, "Best candidate below floor");
                (Selection::empty(), "below_floor")
            }
            Some(_) => {
                let ranked = ranked
                    .iter()
                    .map(|(score, c)| RankedCandidate::from_enriched(c, *score))
                    .collect();
                (Selection::from_ranked(ranked), "chosen")
            }
        };

        SELECTIONS.with_label_values(&[outcome]).inc();
        SELECTION_DURATION
            .with_label_values(&[])
            .observe(start.elapsed().as_secs_f64());

        info!(
            media_type = request.media_type.as_str(),
            media_id = %request.media_id,
            merged = merged,
            eligible = eligible_count,
            outcome = outcome,
            chosen = ?selection.chosen.as_ref().map(|c| &c.title),
            duration_ms = start.elapsed().as_millis() as u64,
            "Selection complete"
        );

        selection
    }

    /// Title query for text-search providers, if any is registered.
    async fn resolve_query_text(&self, request: &MediaRequest) -> Option<String> {
        let metadata = self.metadata.as_ref()?;
        let wanted = self
            .providers
            .iter()
            .any(|p| p.supports(request.media_type) && p.needs_text_query());
        if !wanted {
            return None;
        }

        let lookup = metadata.resolve_title(request.media_type, &request.imdb_id);
        match tokio::time::timeout(self.deadline, lookup).await {
            Ok(Ok(Some(info))) => Some(info.query_text(request.media_type)),
            Ok(Ok(None)) => {
                debug!(imdb_id = %request.imdb_id, "No title metadata");
                None
            }
            Ok(Err(e)) => {
                warn!(imdb_id = %request.imdb_id, error = %e, "Title lookup failed");
                None
            }
            Err(_) => {
                warn!(imdb_id = %request.imdb_id, "Title lookup timed out");
                None
            }
        }
    }

    /// Run every supporting provider as its own task and merge the results
    /// in registration order.
    async fn gather(&self, query: &ProviderQuery) -> Vec<RawCandidate> {
        let tasks: Vec<_> = self
            .providers
            .iter()
            .filter(|p| p.supports(query.media_type))
            .map(|provider| {
                let provider = Arc::clone(provider);
                let query = query.clone();
                let deadline = self.deadline;
                let name = provider.name().to_string();

                let handle = tokio::spawn(async move {
                    let start = Instant::now();
                    let result = tokio::time::timeout(deadline, provider.fetch(&query)).await;
                    PROVIDER_DURATION
                        .with_label_values(&[provider.name()])
                        .observe(start.elapsed().as_secs_f64());
                    result
                });

                async move { (name, handle.await) }
            })
            .collect();

        let results = join_all(tasks).await;

        let mut merged = Vec::new();
        for (name, result) in results {
            let label = match result {
                Ok(Ok(Ok(mut candidates))) => {
                    debug!(provider = %name, results = candidates.len(), "Provider answered");
                    let label = if candidates.is_empty() { "empty" } else { "success" };
                    merged.append(&mut candidates);
                    label
                }
                Ok(Ok(Err(e))) => {
                    warn!(provider = %name, error = %e, "Provider failed");
                    "error"
                }
                Ok(Err(_)) => {
                    warn!(provider = %name, deadline_ms = self.deadline.as_millis() as u64, "Provider timed out");
                    "timeout"
                }
                Err(e) => {
                    warn!(provider = %name, error = %e, "Provider task aborted");
                    "panic"
                }
            };
            PROVIDER_REQUESTS.with_label_values(&[&name, label]).inc();
        }

        merged
    }
}

/// Keep the first candidate per info hash. Candidates without a hash
/// (direct URLs) are always kept.
fn dedup_by_hash(candidates: Vec<RawCandidate>) -> Vec<RawCandidate> {
    let mut seen = HashSet::new();
    candidates
        .into_iter()
        .filter(|c| match c.playable.info_hash() {
            Some(hash) => seen.insert(hash),
            None => true,
        })
        .collect()
}
