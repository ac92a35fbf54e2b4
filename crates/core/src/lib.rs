pub mod cache;
pub mod config;
pub mod fetcher;
pub mod metadata;
pub mod metrics;
pub mod provider;
pub mod selection;
pub mod testing;

pub use cache::{fingerprint, Clock, ResultCache, SystemClock};
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, ProviderConfig,
    ProviderKind, SanitizedConfig,
};
pub use fetcher::{
    FetchError, HttpTransport, MirrorFetcher, MirrorTransport, TransportError, DEFAULT_USER_AGENT,
};
pub use metadata::{CinemetaResolver, MetadataError, MetadataResolver, TitleInfo};
pub use provider::{
    create_providers, PlayableRef, Provider, ProviderError, ProviderQuery, RawCandidate,
};
pub use selection::{
    MediaRequest, MediaType, RankedCandidate, Resolution, Selection, SelectionConfig, Selector,
};
