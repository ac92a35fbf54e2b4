use super::{
    types::{Config, ProviderKind},
    ConfigError,
};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Cache capacity and TTLs are not 0
/// - Selection deadline is not 0
/// - Default max_size_mb is a positive finite number
/// - Every enabled provider has at least one mirror
/// - Jackett providers have an API key
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(invalid("server.port cannot be 0"));
    }

    if config.cache.capacity == 0 {
        return Err(invalid("cache.capacity cannot be 0"));
    }
    if config.cache.ttl_secs == 0 || config.cache.empty_ttl_secs == 0 {
        return Err(invalid("cache TTLs cannot be 0"));
    }

    if config.selection.deadline_secs == 0 {
        return Err(invalid("selection.deadline_secs cannot be 0"));
    }

    let max_size_mb = config.selection.defaults.max_size_mb;
    if !max_size_mb.is_finite() || max_size_mb <= 0.0 {
        return Err(invalid(
            "selection.defaults.max_size_mb must be a positive number",
        ));
    }

    for provider in config.providers.iter().filter(|p| p.enabled) {
        if provider.effective_mirrors().is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "provider '{}' has no mirrors",
                provider.name()
            )));
        }
        if provider.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(format!(
                "provider '{}' timeout_secs cannot be 0",
                provider.name()
            )));
        }
        if provider.kind == ProviderKind::Jackett
            && provider.api_key.as_deref().unwrap_or_default().is_empty()
        {
            return Err(ConfigError::ValidationError(format!(
                "provider '{}' requires api_key",
                provider.name()
            )));
        }
    }

    Ok(())
}

fn invalid(msg: &str) -> ConfigError {
    ConfigError::ValidationError(msg.to_string())
}
