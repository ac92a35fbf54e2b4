//! Mock provider for testing.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::provider::{Provider, ProviderError, ProviderQuery, RawCandidate};
use crate::selection::MediaType;

/// Mock implementation of the Provider trait.
///
/// Provides controllable behavior for testing:
/// - Return configurable candidates
/// - Record queries for assertions
/// - Simulate failures, slow responses and panics
///
/// Clones share state, so a test can keep one handle and give the other to
/// the selector.
///
/// # Example
///
/// ```rust,ignore
/// use navigator_core::testing::{MockProvider, fixtures};
///
/// let provider = MockProvider::new("mock")
///     .with_results(vec![fixtures::magnet_candidate("mock", "Movie 1080p 👤 50", "aaa")]);
///
/// let results = provider.fetch(&query).await?;
/// assert_eq!(results.len(), 1);
/// assert_eq!(provider.call_count(), 1);
/// ```
#[derive(Clone)]
pub struct MockProvider {
    name: String,
    media_types: Option<Vec<MediaType>>,
    results: Arc<RwLock<Vec<RawCandidate>>>,
    failure: Arc<RwLock<Option<String>>>,
    delay: Arc<RwLock<Option<Duration>>>,
    panics: bool,
    text_query: bool,
    calls: Arc<AtomicUsize>,
    queries: Arc<RwLock<Vec<ProviderQuery>>>,
}

impl std::fmt::Debug for MockProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockProvider")
            .field("name", &self.name)
            .field("media_types", &self.media_types)
            .field("panics", &self.panics)
            .field("calls", &self.call_count())
            .finish()
    }
}

impl MockProvider {
    /// Create a mock that supports every media type and returns nothing.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            media_types: None,
            results: Arc::new(RwLock::new(Vec::new())),
            failure: Arc::new(RwLock::new(None)),
            delay: Arc::new(RwLock::new(None)),
            panics: false,
            text_query: false,
            calls: Arc::new(AtomicUsize::new(0)),
            queries: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Return these candidates from every fetch.
    pub fn with_results(mut self, results: Vec<RawCandidate>) -> Self {
        self.results = Arc::new(RwLock::new(results));
        self
    }

    /// Only claim support for these media types.
    pub fn supporting(mut self, media_types: Vec<MediaType>) -> Self {
        self.media_types = Some(media_types);
        self
    }

    /// Fail every fetch with an internal error.
    pub fn failing(mut self, message: impl Into<String>) -> Self {
        self.failure = Arc::new(RwLock::new(Some(message.into())));
        self
    }

    /// Sleep before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Arc::new(RwLock::new(Some(delay)));
        self
    }

    /// Panic inside fetch.
    pub fn panicking(mut self) -> Self {
        self.panics = true;
        self
    }

    /// Ask the selector for a resolved title query.
    pub fn needing_text(mut self) -> Self {
        self.text_query = true;
        self
    }

    /// Set the results to return for subsequent fetches.
    pub async fn set_results(&self, results: Vec<RawCandidate>) {
        *self.results.write().await = results;
    }

    /// Make subsequent fetches fail (`Some`) or succeed again (`None`).
    pub async fn set_failure(&self, message: Option<String>) {
        *self.failure.write().await = message;
    }

    /// Number of fetches performed.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Queries received, in call order.
    pub async fn recorded_queries(&self) -> Vec<ProviderQuery> {
        self.queries.read().await.clone()
    }
}

#[async_trait]
impl Provider for MockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn supports(&self, media_type: MediaType) -> bool {
        self.media_types
            .as_ref()
            .map(|types| types.contains(&media_type))
            .unwrap_or(true)
    }

    fn needs_text_query(&self) -> bool {
        self.text_query
    }

    async fn fetch(&self, query: &ProviderQuery) -> Result<Vec<RawCandidate>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.queries.write().await.push(query.clone());

        let delay = *self.delay.read().await;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.panics {
            panic!("mock provider {} panicked", self.name);
        }

        if let Some(message) = self.failure.read().await.clone() {
            return Err(ProviderError::Internal(message));
        }

        Ok(self.results.read().await.clone())
    }
}
