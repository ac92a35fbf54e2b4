use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::time::Duration;

use crate::selection::{SelectionConfig, UNACCEPTABLE_FLOOR};

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub selection: SelectionSettings,
    #[serde(default)]
    pub metadata: MetadataConfig,
    /// Candidate sources in registration order. Registration order is also
    /// the merge order, so it decides score ties.
    #[serde(default = "default_providers")]
    pub providers: Vec<ProviderConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            cache: CacheConfig::default(),
            selection: SelectionSettings::default(),
            metadata: MetadataConfig::default(),
            providers: default_providers(),
        }
    }
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::from([0, 0, 0, 0])
}

fn default_port() -> u16 {
    7000
}

/// Result cache configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    /// Maximum number of cached selections (default: 512)
    #[serde(default = "default_cache_capacity")]
    pub capacity: usize,
    /// Lifetime of a non-empty selection in seconds (default: 900)
    #[serde(default = "default_cache_ttl")]
    pub ttl_secs: u64,
    /// Lifetime of an empty selection in seconds (default: 120).
    /// Shorter so a provider outage does not hide new results for long.
    #[serde(default = "default_empty_ttl")]
    pub empty_ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: default_cache_capacity(),
            ttl_secs: default_cache_ttl(),
            empty_ttl_secs: default_empty_ttl(),
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    pub fn empty_ttl(&self) -> Duration {
        Duration::from_secs(self.empty_ttl_secs)
    }
}

fn default_cache_capacity() -> usize {
    512
}

fn default_cache_ttl() -> u64 {
    900
}

fn default_empty_ttl() -> u64 {
    120
}

/// Selection engine configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SelectionSettings {
    /// Upper bound for every provider fetch in seconds (default: 12)
    #[serde(default = "default_deadline")]
    pub deadline_secs: u64,
    /// Selections whose best score is below this are reported as empty
    #[serde(default = "default_floor")]
    pub floor: i64,
    /// Policy used when a request does not override it
    #[serde(default)]
    pub defaults: SelectionConfig,
}

impl Default for SelectionSettings {
    fn default() -> Self {
        Self {
            deadline_secs: default_deadline(),
            floor: default_floor(),
            defaults: SelectionConfig::default(),
        }
    }
}

impl SelectionSettings {
    pub fn deadline(&self) -> Duration {
        Duration::from_secs(self.deadline_secs)
    }
}

fn default_deadline() -> u64 {
    12
}

fn default_floor() -> i64 {
    UNACCEPTABLE_FLOOR
}

/// Title metadata lookup configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MetadataConfig {
    /// Resolve titles for text-query providers (default: true)
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Cinemeta base URL
    #[serde(default = "default_metadata_url")]
    pub url: String,
    #[serde(default = "default_metadata_timeout")]
    pub timeout_secs: u64,
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            url: default_metadata_url(),
            timeout_secs: default_metadata_timeout(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_metadata_url() -> String {
    "https://v3-cinemeta.strem.io".to_string()
}

fn default_metadata_timeout() -> u64 {
    5
}

/// Available provider adapters
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    Yts,
    Eztv,
    Jackett,
    StreamAddon,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Yts => "yts",
            ProviderKind::Eztv => "eztv",
            ProviderKind::Jackett => "jackett",
            ProviderKind::StreamAddon => "stream_addon",
        }
    }

    /// Built-in mirror list, empty for self-hosted kinds.
    pub fn default_mirrors(&self) -> Vec<String> {
        let mirrors: &[&str] = match self {
            ProviderKind::Yts => &["https://yts.mx", "https://yts.pm", "https://yts.am"],
            ProviderKind::Eztv => &["https://eztv.re", "https://eztv.wf", "https://eztv1.xyz"],
            ProviderKind::Jackett | ProviderKind::StreamAddon => &[],
        };
        mirrors.iter().map(|m| m.to_string()).collect()
    }
}

/// One candidate source
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProviderConfig {
    pub kind: ProviderKind,
    /// Name used in logs and as the candidate source (default: the kind)
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Base URLs tried in order. Empty means the kind's built-in list.
    #[serde(default)]
    pub mirrors: Vec<String>,
    /// Per-mirror timeout in seconds (default: 5)
    #[serde(default = "default_provider_timeout")]
    pub timeout_secs: u64,
    /// API key (required for jackett)
    #[serde(default)]
    pub api_key: Option<String>,
}

impl ProviderConfig {
    pub fn new(kind: ProviderKind) -> Self {
        Self {
            kind,
            name: None,
            enabled: true,
            mirrors: Vec::new(),
            timeout_secs: default_provider_timeout(),
            api_key: None,
        }
    }

    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or(self.kind.as_str())
    }

    pub fn effective_mirrors(&self) -> Vec<String> {
        if self.mirrors.is_empty() {
            self.kind.default_mirrors()
        } else {
            self.mirrors.clone()
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_provider_timeout() -> u64 {
    5
}

fn default_providers() -> Vec<ProviderConfig> {
    vec![
        ProviderConfig::new(ProviderKind::Yts),
        ProviderConfig::new(ProviderKind::Eztv),
    ]
}

/// Sanitized config for API responses (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: ServerConfig,
    pub cache: CacheConfig,
    pub selection: SelectionSettings,
    pub metadata: MetadataConfig,
    pub providers: Vec<SanitizedProviderConfig>,
}

/// Sanitized provider config (API key hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedProviderConfig {
    pub kind: String,
    pub name: String,
    pub enabled: bool,
    pub mirrors: Vec<String>,
    pub timeout_secs: u64,
    pub api_key_configured: bool,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            server: config.server.clone(),
            cache: config.cache.clone(),
            selection: config.selection.clone(),
            metadata: config.metadata.clone(),
            providers: config
                .providers
                .iter()
                .map(|p| SanitizedProviderConfig {
                    kind: p.kind.as_str().to_string(),
                    name: p.name().to_string(),
                    enabled: p.enabled,
                    mirrors: p.effective_mirrors(),
                    timeout_secs: p.timeout_secs,
                    api_key_configured: p.api_key.as_deref().is_some_and(|k| !k.is_empty()),
                })
                .collect(),
        }
    }
}
