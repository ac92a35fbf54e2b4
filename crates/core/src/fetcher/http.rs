//! reqwest-backed transport.

use async_trait::async_trait;
use reqwest::Client;

use super::{MirrorTransport, TransportError};

/// Browser-like user agent; several indexers reject library defaults.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// HTTP transport over a shared reqwest client.
///
/// Timeouts are enforced per attempt by the fetcher, not by the client.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(user_agent: &str) -> Result<Self, TransportError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .build()
            .map_err(|e| TransportError::Other(e.to_string()))?;
        Ok(Self { client })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl MirrorTransport for HttpTransport {
    async fn get(&self, url: &str) -> Result<String, TransportError> {
        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                TransportError::Timeout
            } else if e.is_connect() {
                TransportError::Connection(e.to_string())
            } else {
                TransportError::Other(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status(status.as_u16()));
        }

        response
            .text()
            .await
            .map_err(|e| TransportError::InvalidBody(e.to_string()))
    }
}
