//! Layered settings loader.
//!
//! Layers apply in order, later ones winning: built-in defaults, a TOML or
//! JSON file, then environment variables named `PREFIX__SECTION__KEY`.

use std::env;
use std::fs;
use std::path::Path;

use crate::{ConfigError, RatifySettings, StatusRule};

/// Settings loader.
///
/// # Example
///
/// ```no_run
/// use ratify_config::ConfigLoader;
///
/// # fn main() -> Result<(), ratify_config::ConfigError> {
/// let settings = ConfigLoader::new()
///     .with_optional_file("ratify.toml")?
///     .with_env_prefix("RATIFY")
///     .load()?;
/// let server = settings.server_config()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ConfigLoader {
    settings: RatifySettings,
    env_prefix: Option<String>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Creates a loader starting from default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            settings: RatifySettings::default(),
            env_prefix: None,
        }
    }

    /// Resets to default settings.
    #[must_use]
    pub fn with_defaults(mut self) -> Self {
        self.settings = RatifySettings::default();
        self
    }

    /// Starts from the development preset.
    ///
    /// ```
    /// use ratify_config::ConfigLoader;
    ///
    /// let settings = ConfigLoader::new().with_development().load().unwrap();
    /// assert_eq!(settings.logging.level, "debug");
    /// ```
    #[must_use]
    pub fn with_development(mut self) -> Self {
        self.settings = RatifySettings::development();
        self
    }

    /// Starts from the production preset.
    #[must_use]
    pub fn with_production(mut self) -> Self {
        self.settings = RatifySettings::production();
        self
    }

    /// Loads settings from a `.toml` or `.json` file.
    ///
    /// The file replaces the current settings; keys it omits take their
    /// defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file is missing, unreadable, has an
    /// unsupported extension, fails to parse or contains unknown keys.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::file_not_found(path));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::read_error(path, e))?;
        let format = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| ConfigError::UnsupportedFormat(path.display().to_string()))?;

        self.settings = parse(&content, format)?;
        Ok(self)
    }

    /// Like [`with_file`](Self::with_file), but a missing file is skipped.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file exists but cannot be loaded.
    pub fn with_optional_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            self.with_file(path)
        } else {
            Ok(self)
        }
    }

    /// Loads settings from a string in the given format (`toml` or `json`).
    ///
    /// ```
    /// use ratify_config::ConfigLoader;
    ///
    /// let settings = ConfigLoader::new()
    ///     .with_string("[server]\nbase_url = \"http://localhost:3000\"", "toml")
    ///     .unwrap()
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(settings.server_config().unwrap().port().unwrap(), 3000);
    /// ```
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the format is unsupported or parsing fails.
    pub fn with_string(mut self, content: &str, format: &str) -> Result<Self, ConfigError> {
        self.settings = parse(content, format)?;
        Ok(self)
    }

    /// Enables environment overrides named `PREFIX__SECTION__KEY`, e.g.
    /// `RATIFY__SERVER__BASE_URL` or `RATIFY__LOGGING__LEVEL`.
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_uppercase());
        self
    }

    /// Applies environment overrides and validates.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if an override cannot be parsed or the final
    /// settings are invalid.
    pub fn load(mut self) -> Result<RatifySettings, ConfigError> {
        if let Some(prefix) = self.env_prefix.take() {
            self.apply_env_overrides(&prefix, env::vars())?;
        }

        self.settings.validate()?;
        Ok(self.settings)
    }

    /// Returns the settings without environment overrides or validation.
    #[must_use]
    pub fn load_unvalidated(self) -> RatifySettings {
        self.settings
    }

    fn apply_env_overrides(
        &mut self,
        prefix: &str,
        vars: impl IntoIterator<Item = (String, String)>,
    ) -> Result<(), ConfigError> {
        let scoped = format!("{prefix}__");
        for (key, value) in vars {
            if let Some(rest) = key.strip_prefix(&scoped) {
                self.apply_env_var(&key, rest, &value)?;
            }
        }
        Ok(())
    }

    fn apply_env_var(&mut self, var: &str, key: &str, value: &str) -> Result<(), ConfigError> {
        let parts: Vec<&str> = key.split("__").collect();
        let server = &mut self.settings.server;
        let logging = &mut self.settings.logging;

        match parts.as_slice() {
            ["SERVER", "BASE_URL"] => server.base_url = value.to_string(),
            ["SERVER", "ENCODING"] => server.encoding = value.to_string(),
            ["SERVER", "VALIDATION_ERROR_STATUS"] => server.validation_error_status = parse_int(var, value)?,
            ["SERVER", "APP_ERROR_STATUS"] => server.app_error_status = parse_int(var, value)?,
            ["SERVER", "FRAMEWORK_ERROR_STATUS"] => server.framework_error_status = parse_int(var, value)?,
            ["SERVER", "SHUTDOWN_TIMEOUT_SECS"] => server.shutdown_timeout_secs = parse_int(var, value)?,
            ["SERVER", "STATUS_RULE"] => {
                server.status_rule = match value.to_lowercase().as_str() {
                    "declared" => StatusRule::Declared,
                    "legacy" => StatusRule::Legacy,
                    _ => return Err(ConfigError::env_parse_error(var, "expected 'declared' or 'legacy'")),
                };
            }

            ["LOGGING", "ENABLED"] => logging.enabled = parse_flag(var, value)?,
            ["LOGGING", "LEVEL"] => logging.level = value.to_string(),
            ["LOGGING", "FORMAT"] => logging.format = value.to_lowercase(),
            ["LOGGING", "SPAN_EVENTS"] => logging.span_events = parse_flag(var, value)?,
            ["LOGGING", "FILE_LINE_INFO"] => logging.file_line_info = parse_flag(var, value)?,
            ["LOGGING", "INCLUDE_TARGET"] => logging.include_target = parse_flag(var, value)?,

            // Unrecognized keys belong to someone else.
            _ => {}
        }

        Ok(())
    }
}

fn parse(content: &str, format: &str) -> Result<RatifySettings, ConfigError> {
    match format.to_lowercase().as_str() {
        "toml" => Ok(toml::from_str(content)?),
        "json" => Ok(serde_json::from_str(content)?),
        _ => Err(ConfigError::UnsupportedFormat(format.to_string())),
    }
}

fn parse_int<T: std::str::FromStr>(var: &str, value: &str) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::env_parse_error(var, "expected integer"))
}

fn parse_flag(var: &str, value: &str) -> Result<bool, ConfigError> {
    parse_bool(value).ok_or_else(|| ConfigError::env_parse_error(var, "expected boolean"))
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
