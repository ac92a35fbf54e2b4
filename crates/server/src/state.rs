use navigator_core::{Config, SanitizedConfig, SelectionConfig, Selector};

/// Shared application state
pub struct AppState {
    config: Config,
    selector: Selector,
}

impl AppState {
    pub fn new(config: Config, selector: Selector) -> Self {
        Self { config, selector }
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn selector(&self) -> &Selector {
        &self.selector
    }

    /// Policy applied before per-request overrides.
    pub fn selection_defaults(&self) -> &SelectionConfig {
        &self.config.selection.defaults
    }
}
