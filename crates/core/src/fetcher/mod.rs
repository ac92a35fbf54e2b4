//! Mirror failover fetching.
//!
//! A provider is often reachable through several equivalent mirrors. The
//! [`MirrorFetcher`] tries them strictly in order, bounds every attempt by
//! its own timeout, and stops at the first success. When every mirror fails
//! the caller gets one aggregated [`FetchError::AllMirrorsFailed`]; which
//! mirror failed how is only logged.

mod http;

pub use http::{HttpTransport, DEFAULT_USER_AGENT};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use crate::metrics::MIRROR_ATTEMPTS;

/// Failure of a single attempt against one mirror.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Request timed out")]
    Timeout,

    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("HTTP {0}")]
    Status(u16),

    #[error("Invalid response body: {0}")]
    InvalidBody(String),

    #[error("Request failed: {0}")]
    Other(String),
}

/// Errors returned by [`MirrorFetcher`].
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("All {attempts} mirrors failed for {provider}")]
    AllMirrorsFailed {
        provider: String,
        attempts: usize,
        last_error: Option<String>,
    },
}

/// Issues a single GET against one URL.
#[async_trait]
pub trait MirrorTransport: Send + Sync {
    async fn get(&self, url: &str) -> Result<String, TransportError>;
}

/// Tries equivalent endpoints in order until one answers.
#[derive(Clone)]
pub struct MirrorFetcher {
    provider: String,
    transport: Arc<dyn MirrorTransport>,
}

impl MirrorFetcher {
    pub fn new(provider: impl Into<String>, transport: Arc<dyn MirrorTransport>) -> Self {
        Self {
            provider: provider.into(),
            transport,
        }
    }

    /// Fetch the body of the first mirror that answers successfully.
    pub async fn fetch(&self, mirrors: &[String], timeout: Duration) -> Result<String, FetchError> {
        self.fetch_with(mirrors, timeout, |body| Ok(body)).await
    }

    /// Fetch and deserialize JSON. A mirror that answers with a body that
    /// does not parse (a parked domain, a captcha page) counts as failed and
    /// the next mirror is tried.
    pub async fn fetch_json<T: DeserializeOwned>(
        &self,
        mirrors: &[String],
        timeout: Duration,
    ) -> Result<T, FetchError> {
        self.fetch_with(mirrors, timeout, |body| {
            serde_json::from_str(&body).map_err(|e| TransportError::InvalidBody(e.to_string()))
        })
        .await
    }

    async fn fetch_with<T, F>(
        &self,
        mirrors: &[String],
        timeout: Duration,
        accept: F,
    ) -> Result<T, FetchError>
    where
        F: Fn(String) -> Result<T, TransportError>,
    {
        let mut last_error = None;

        for (attempt, url) in mirrors.iter().enumerate() {
            debug!(provider = %self.provider, url = %url, attempt = attempt + 1, "Trying mirror");

            let result = match tokio::time::timeout(timeout, self.transport.get(url)).await {
                Ok(Ok(body)) => accept(body),
                Ok(Err(e)) => Err(e),
                Err(_) => Err(TransportError::Timeout),
            };

            match result {
                Ok(value) => {
                    MIRROR_ATTEMPTS
                        .with_label_values(&[&self.provider, "success"])
                        .inc();
                    return Ok(value);
                }
                Err(e) => {
                    MIRROR_ATTEMPTS
                        .with_label_values(&[&self.provider, "failure"])
                        .inc();
                    warn!(provider = %self.provider, url = %url, error = %e, "Mirror failed");
                    last_error = Some(e.to_string());
                }
            }
        }

        Err(FetchError::AllMirrorsFailed {
            provider: self.provider.clone(),
            attempts: mirrors.len(),
            last_error,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::collections::HashMap;
    use std::sync::Mutex;

    enum Behavior {
        Ok(&'static str),
        Fail,
        Hang,
    }

    /// Transport with scripted per-URL behavior that records call order.
    struct ScriptedTransport {
        behaviors: HashMap<String, Behavior>,
        calls: Mutex<Vec<String>>,
    }

    impl ScriptedTransport {
        fn new(behaviors: Vec<(&str, Behavior)>) -> Arc<Self> {
            Arc::new(Self {
                behaviors: behaviors
                    .into_iter()
                    .map(|(url, b)| (url.to_string(), b))
                    .collect(),
                calls: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl MirrorTransport for ScriptedTransport {
        async fn get(&self, url: &str) -> Result<String, TransportError> {
            self.calls.lock().unwrap().push(url.to_string());
            match self.behaviors.get(url) {
                Some(Behavior::Ok(body)) => Ok(body.to_string()),
                Some(Behavior::Fail) | None => Err(TransportError::Status(503)),
                Some(Behavior::Hang) => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    Ok(String::new())
                }
            }
        }
    }

    fn mirrors(urls: &[&str]) -> Vec<String> {
        urls.iter().map(|u| u.to_string()).collect()
    }

    #[tokio::test]
    async fn test_first_success_short_circuits() {
        let transport = ScriptedTransport::new(vec![
            ("http://a", Behavior::Ok("from a")),
            ("http://b", Behavior::Ok("from b")),
        ]);
        let fetcher = MirrorFetcher::new("test", transport.clone());

        let body = fetcher
            .fetch(&mirrors(&["http://a", "http://b"]), Duration::from_secs(1))
            .await
            .unwrap();

        assert_eq!(body, "from a");
        assert_eq!(transport.calls(), vec!["http://a"]);
    }

    #[tokio::test]
    async fn test_fails_over_in_order() {
        let transport = ScriptedTransport::new(vec![
            ("http://a", Behavior::Fail),
            ("http://b", Behavior::Fail),
            ("http://c", Behavior::Ok("from c")),
        ]);
        let fetcher = MirrorFetcher::new("test", transport.clone());

        let body = fetcher
            .fetch(
                &mirrors(&["http://a", "http://b", "http://c"]),
                Duration::from_secs(1),
            )
            .await
            .unwrap();

        assert_eq!(body, "from c");
        assert_eq!(transport.calls(), vec!["http://a", "http://b", "http://c"]);
    }

    #[tokio::test]
    async fn test_each_attempt_is_time_bounded() {
        let transport = ScriptedTransport::new(vec![
            ("http://slow", Behavior::Hang),
            ("http://fast", Behavior::Ok("fast")),
        ]);
        let fetcher = MirrorFetcher::new("test", transport);

        let body = fetcher
            .fetch(&mirrors(&["http://slow", "http://fast"]), Duration::from_millis(200))
            .await
            .unwrap();
        assert_eq!(body, "fast");
    }

    #[tokio::test]
    async fn test_all_failed_is_single_error() {
        let transport = ScriptedTransport::new(vec![
            ("http://a", Behavior::Fail),
            ("http://b", Behavior::Fail),
        ]);
        let fetcher = MirrorFetcher::new("yts", transport);

        let err = fetcher
            .fetch(&mirrors(&["http://a", "http://b"]), Duration::from_secs(1))
            .await
            .unwrap_err();

        match err {
            FetchError::AllMirrorsFailed {
                provider, attempts, ..
            } => {
                assert_eq!(provider, "yts");
                assert_eq!(attempts, 2);
            }
        }
    }

    #[tokio::test]
    async fn test_empty_mirror_list_fails() {
        let transport = ScriptedTransport::new(vec![]);
        let fetcher = MirrorFetcher::new("test", transport);
        assert!(fetcher.fetch(&[], Duration::from_secs(1)).await.is_err());
    }

    #[derive(Debug, Deserialize)]
    struct Payload {
        ok: bool,
    }

    #[tokio::test]
    async fn test_fetch_json_skips_unparseable_mirror() {
        let transport = ScriptedTransport::new(vec![
            ("http://parked", Behavior::Ok("<html>for sale</html>")),
            ("http://api", Behavior::Ok(r#"{"ok": true}"#)),
        ]);
        let fetcher = MirrorFetcher::new("test", transport.clone());

        let payload: Payload = fetcher
            .fetch_json(&mirrors(&["http://parked", "http://api"]), Duration::from_secs(1))
            .await
            .unwrap();

        assert!(payload.ok);
        assert_eq!(transport.calls().len(), 2);
    }
}
