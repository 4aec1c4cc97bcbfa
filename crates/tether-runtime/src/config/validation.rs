//! Configuration validation.

use super::error::{ConfigError, ConfigResult};
use super::schema::{ApiConfig, LogLevel, LoggingConfig, SocketModeConfig, TetherConfig};

/// Checks settings that deserialize fine but cannot work.
pub fn validate_config(config: &TetherConfig) -> ConfigResult<()> {
    validate_api(&config.api)?;
    validate_socket_mode(&config.socket_mode)?;
    validate_logging(&config.logging)?;
    Ok(())
}

fn validate_api(api: &ApiConfig) -> ConfigResult<()> {
    if !api.base_url.starts_with("https://") && !api.base_url.starts_with("http://") {
        return Err(ConfigError::invalid_url(
            &api.base_url,
            "must start with http:// or https://",
        ));
    }
    if api.timeout_ms == 0 {
        return Err(ConfigError::validation("api.timeout_ms must be greater than 0"));
    }
    Ok(())
}

fn validate_socket_mode(socket_mode: &SocketModeConfig) -> ConfigResult<()> {
    let has_token = socket_mode
        .app_token
        .as_deref()
        .is_some_and(|token| !token.trim().is_empty());
    if socket_mode.enabled && !has_token {
        return Err(ConfigError::missing_field("socket_mode.app_token"));
    }
    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> ConfigResult<()> {
    for (target, level) in &logging.filters {
        if target.is_empty() {
            return Err(ConfigError::validation("logging.filters has an empty target"));
        }
        level.parse::<LogLevel>().map_err(|reason| {
            ConfigError::validation(format!("logging.filters.{target}: {reason}"))
        })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(validate_config(&TetherConfig::default()).is_ok());
    }

    #[test]
    fn rejects_non_http_base_url() {
        let mut config = TetherConfig::default();
        config.api.base_url = "slack.com/api".into();
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn rejects_zero_timeout() {
        let mut config = TetherConfig::default();
        config.api.timeout_ms = 0;
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::ValidationError { .. })
        ));
    }

    #[test]
    fn socket_mode_needs_app_token() {
        let mut config = TetherConfig::default();
        config.socket_mode.enabled = true;
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::MissingField { field }) if field == "socket_mode.app_token"
        ));

        config.socket_mode.app_token = Some("xapp-1".into());
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn rejects_unknown_filter_level() {
        let mut config = TetherConfig::default();
        config
            .logging
            .filters
            .insert("tether_framework".into(), "chatty".into());
        assert!(validate_config(&config).is_err());

        config
            .logging
            .filters
            .insert("tether_framework".into(), "TRACE".into());
        assert!(validate_config(&config).is_ok());
    }
}
