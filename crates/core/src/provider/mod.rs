//! Candidate sources.
//!
//! Every adapter turns one upstream API into [`RawCandidate`]s. Adapters
//! know nothing about scoring; they only report what the upstream said.

mod eztv;
mod jackett;
mod stream_addon;
mod types;
mod yts;

pub use eztv::EztvProvider;
pub use jackett::JackettProvider;
pub use stream_addon::StreamAddonProvider;
pub use types::*;
pub use yts::YtsProvider;

use serde::{Deserialize, Deserializer};
use std::sync::Arc;
use tracing::info;

use crate::config::{ProviderConfig, ProviderKind};
use crate::fetcher::{MirrorFetcher, MirrorTransport};

/// Build the enabled providers in configuration order.
pub fn create_providers(
    configs: &[ProviderConfig],
    transport: Arc<dyn MirrorTransport>,
) -> Vec<Arc<dyn Provider>> {
    configs
        .iter()
        .filter(|c| c.enabled)
        .map(|c| {
            let fetcher = MirrorFetcher::new(c.name(), transport.clone());
            let mirrors = c.effective_mirrors();
            info!(provider = %c.name(), kind = c.kind.as_str(), mirrors = mirrors.len(), "Registering provider");

            let provider: Arc<dyn Provider> = match c.kind {
                ProviderKind::Yts => {
                    Arc::new(YtsProvider::new(c.name(), fetcher, mirrors, c.timeout()))
                }
                ProviderKind::Eztv => {
                    Arc::new(EztvProvider::new(c.name(), fetcher, mirrors, c.timeout()))
                }
                ProviderKind::Jackett => Arc::new(JackettProvider::new(
                    c.name(),
                    fetcher,
                    mirrors,
                    c.api_key.clone().unwrap_or_default(),
                    c.timeout(),
                )),
                ProviderKind::StreamAddon => Arc::new(StreamAddonProvider::new(
                    c.name(),
                    fetcher,
                    mirrors,
                    c.timeout(),
                )),
            };
            provider
        })
        .collect()
}

/// Accepts a number, a numeric string or null. Several indexers are
/// inconsistent about quoting sizes and counts.
pub(crate) fn lenient_u64<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
        Some(serde_json::Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

/// Join a mirror base URL and a path.
pub(crate) fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::HttpTransport;

    #[derive(Deserialize)]
    struct SizeField {
        #[serde(default, deserialize_with = "lenient_u64")]
        size: Option<u64>,
    }

    #[test]
    fn test_lenient_u64() {
        let parse = |json: &str| serde_json::from_str::<SizeField>(json).unwrap().size;
        assert_eq!(parse(r#"{"size": 1024}"#), Some(1024));
        assert_eq!(parse(r#"{"size": "2048"}"#), Some(2048));
        assert_eq!(parse(r#"{"size": "n/a"}"#), None);
        assert_eq!(parse(r#"{"size": null}"#), None);
        assert_eq!(parse(r#"{}"#), None);
    }

    #[test]
    fn test_join_url() {
        assert_eq!(join_url("https://a.b/", "/api/x"), "https://a.b/api/x");
        assert_eq!(join_url("https://a.b", "api/x"), "https://a.b/api/x");
    }

    #[test]
    fn test_create_providers_skips_disabled() {
        let transport = Arc::new(HttpTransport::new("test").unwrap());
        let mut eztv = ProviderConfig::new(ProviderKind::Eztv);
        eztv.enabled = false;
        let mut addon = ProviderConfig::new(ProviderKind::StreamAddon);
        addon.name = Some("upstream".to_string());
        addon.mirrors = vec!["https://addon.example".to_string()];

        let providers = create_providers(
            &[ProviderConfig::new(ProviderKind::Yts), eztv, addon],
            transport,
        );

        let names: Vec<_> = providers.iter().map(|p| p.name().to_string()).collect();
        assert_eq!(names, vec!["yts", "upstream"]);
    }
}
