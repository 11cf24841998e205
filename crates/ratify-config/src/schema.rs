//! Settings sections.
//!
//! Every section rejects unknown keys and fills missing keys with the same
//! defaults the runtime types use.

use serde::{Deserialize, Serialize};

/// `[server]` section.
///
/// # Example
///
/// ```
/// use ratify_config::ServerSettings;
///
/// let settings = ServerSettings {
///     base_url: "http://localhost:3000".to_string(),
///     ..Default::default()
/// };
/// assert_eq!(settings.app_error_status, 500);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ServerSettings {
    /// Public base URL; the listen port is derived from it.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Text encoding of request and response bodies (`utf-8` or `latin1`).
    #[serde(default = "default_encoding")]
    pub encoding: String,

    /// Status for rejected request input.
    #[serde(default = "default_validation_error_status")]
    pub validation_error_status: u16,

    /// Status for errors raised by handlers.
    #[serde(default = "default_app_error_status")]
    pub app_error_status: u16,

    /// Status for faults inside the dispatcher.
    #[serde(default = "default_framework_error_status")]
    pub framework_error_status: u16,

    /// How a status is chosen when a handler leaves it unset.
    #[serde(default)]
    pub status_rule: StatusRule,

    /// Time to wait for open connections after shutdown.
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout_secs: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            encoding: default_encoding(),
            validation_error_status: default_validation_error_status(),
            app_error_status: default_app_error_status(),
            framework_error_status: default_framework_error_status(),
            status_rule: StatusRule::default(),
            shutdown_timeout_secs: default_shutdown_timeout(),
        }
    }
}

fn default_base_url() -> String {
    ratify_server::DEFAULT_BASE_URL.to_string()
}

fn default_encoding() -> String {
    "utf-8".to_string()
}

fn default_validation_error_status() -> u16 {
    ratify_server::DEFAULT_VALIDATION_ERROR_STATUS.as_u16()
}

fn default_app_error_status() -> u16 {
    ratify_server::DEFAULT_APP_ERROR_STATUS.as_u16()
}

fn default_framework_error_status() -> u16 {
    ratify_server::DEFAULT_FRAMEWORK_ERROR_STATUS.as_u16()
}

const fn default_shutdown_timeout() -> u64 {
    ratify_server::DEFAULT_SHUTDOWN_TIMEOUT_SECS
}

/// Status defaulting rule.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum StatusRule {
    /// The status declared on the route's response.
    #[default]
    Declared,
    /// `200` when the handler returned data, `201` otherwise.
    Legacy,
}

/// `[logging]` section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LoggingSettings {
    /// Install a subscriber at startup.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Filter directive; `RUST_LOG` takes precedence at runtime.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// `json`, `pretty` or `compact`.
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Emit span open/close events.
    #[serde(default)]
    pub span_events: bool,

    /// Include source file and line.
    #[serde(default)]
    pub file_line_info: bool,

    /// Include the module path.
    #[serde(default = "default_true")]
    pub include_target: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            level: default_log_level(),
            format: default_log_format(),
            span_events: false,
            file_line_info: false,
            include_target: true,
        }
    }
}

const fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}
