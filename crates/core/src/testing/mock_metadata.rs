//! Mock metadata resolver for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::metadata::{MetadataError, MetadataResolver, TitleInfo};
use crate::selection::MediaType;

/// Mock implementation of the MetadataResolver trait.
///
/// Unknown ids resolve to `Ok(None)`.
#[derive(Debug, Clone, Default)]
pub struct MockMetadataResolver {
    titles: Arc<RwLock<HashMap<String, TitleInfo>>>,
    fail: Arc<AtomicBool>,
    calls: Arc<AtomicUsize>,
}

impl MockMetadataResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a title for an IMDb id.
    pub async fn add_title(&self, imdb_id: &str, name: &str, year: Option<u32>) {
        self.titles.write().await.insert(
            imdb_id.to_string(),
            TitleInfo {
                name: name.to_string(),
                year,
            },
        );
    }

    /// Make every lookup fail.
    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MetadataResolver for MockMetadataResolver {
    async fn resolve_title(
        &self,
        _media_type: MediaType,
        imdb_id: &str,
    ) -> Result<Option<TitleInfo>, MetadataError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(MetadataError::ParseError("mock failure".to_string()));
        }
        Ok(self.titles.read().await.get(imdb_id).cloned())
    }
}
