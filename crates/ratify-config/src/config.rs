//! Root settings type and conversion into runtime configuration.

use std::time::Duration;

use http::StatusCode;
use ratify_server::{ServerConfig, ServerConfigBuilder, StatusDefault, TextEncoding};
use ratify_telemetry::{LogConfig, LogFormat};
use serde::{Deserialize, Serialize};

use crate::{ConfigError, LoggingSettings, ServerSettings, StatusRule};

/// Complete settings for a Ratify service.
///
/// Use [`ConfigLoader`](crate::ConfigLoader) to load settings from files
/// and environment variables.
///
/// # Example
///
/// ```
/// use ratify_config::RatifySettings;
///
/// let settings = RatifySettings::default();
/// let server = settings.server_config().unwrap();
/// assert_eq!(server.port().unwrap(), 8000);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct RatifySettings {
    /// Server settings.
    #[serde(default)]
    pub server: ServerSettings,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingSettings,
}

impl RatifySettings {
    /// Debug-level pretty logging with source locations.
    #[must_use]
    pub fn development() -> Self {
        Self {
            server: ServerSettings::default(),
            logging: LoggingSettings {
                level: "debug".to_string(),
                format: "pretty".to_string(),
                span_events: true,
                file_line_info: true,
                ..LoggingSettings::default()
            },
        }
    }

    /// Info-level JSON logging.
    #[must_use]
    pub fn production() -> Self {
        Self::default()
    }

    /// Checks every value that a conversion would otherwise reject.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] naming the first bad setting.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server_config_builder()?
            .build()
            .port()
            .map_err(|e| ConfigError::invalid_value("server.base_url", e.to_string()))?;
        self.log_config().map(|_| ())
    }

    /// Builds a [`ServerConfigBuilder`] so callers can still attach an
    /// error reporter or a custom wire protocol.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for an unknown encoding or a
    /// status that is not a client or server error.
    pub fn server_config_builder(&self) -> Result<ServerConfigBuilder, ConfigError> {
        let server = &self.server;
        let encoding: TextEncoding = server
            .encoding
            .parse()
            .map_err(|reason: String| ConfigError::invalid_value("server.encoding", reason))?;

        let status_default = match server.status_rule {
            StatusRule::Declared => StatusDefault::Declared,
            StatusRule::Legacy => StatusDefault::legacy(),
        };

        Ok(ServerConfig::builder()
            .base_url(server.base_url.clone())
            .encoding(encoding)
            .validation_error_status(error_status(
                "server.validation_error_status",
                server.validation_error_status,
            )?)
            .app_error_status(error_status("server.app_error_status", server.app_error_status)?)
            .framework_error_status(error_status(
                "server.framework_error_status",
                server.framework_error_status,
            )?)
            .status_default(status_default)
            .shutdown_timeout(Duration::from_secs(server.shutdown_timeout_secs)))
    }

    /// Converts the server section into a [`ServerConfig`].
    ///
    /// # Errors
    ///
    /// See [`server_config_builder`](Self::server_config_builder).
    pub fn server_config(&self) -> Result<ServerConfig, ConfigError> {
        Ok(self.server_config_builder()?.build())
    }

    /// Converts the logging section into a [`LogConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for an unknown format or an
    /// unparsable level.
    pub fn log_config(&self) -> Result<LogConfig, ConfigError> {
        let logging = &self.logging;
        let format: LogFormat = logging
            .format
            .parse()
            .map_err(|e: ratify_telemetry::TelemetryError| {
                ConfigError::invalid_value("logging.format", e.to_string())
            })?;
        ratify_telemetry::create_env_filter(&logging.level)
            .map_err(|e| ConfigError::invalid_value("logging.level", e.to_string()))?;

        Ok(LogConfig {
            enabled: logging.enabled,
            level: logging.level.clone(),
            format,
            span_events: logging.span_events,
            file_line_info: logging.file_line_info,
            include_target: logging.include_target,
        })
    }
}

fn error_status(field: &str, code: u16) -> Result<StatusCode, ConfigError> {
    let status = StatusCode::from_u16(code).map_err(|e| ConfigError::invalid_value(field, e.to_string()))?;
    if status.is_client_error() || status.is_server_error() {
        Ok(status)
    } else {
        Err(ConfigError::invalid_value(
            field,
            format!("{code} is not a client or server error status"),
        ))
    }
}
