//! Layered settings for Ratify services.
//!
//! Settings are loaded from built-in defaults, an optional TOML or JSON
//! file, and `RATIFY__SECTION__KEY` environment overrides, then converted
//! into the runtime [`ServerConfig`](ratify_server::ServerConfig) and
//! [`LogConfig`](ratify_telemetry::LogConfig). Unknown keys are errors.
//!
//! # Example
//!
//! ```no_run
//! use ratify_config::ConfigLoader;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let settings = ConfigLoader::new()
//!     .with_optional_file("ratify.toml")?
//!     .with_env_prefix("RATIFY")
//!     .load()?;
//!
//! ratify_telemetry::init_logging(&settings.log_config()?)?;
//! let config = settings.server_config()?;
//! # Ok(())
//! # }
//! ```
//!
//! # File Format
//!
//! ```toml
//! [server]
//! base_url = "http://localhost:8000"
//! encoding = "utf-8"
//! validation_error_status = 400
//! app_error_status = 500
//! framework_error_status = 502
//! status_rule = "declared"
//! shutdown_timeout_secs = 30
//!
//! [logging]
//! enabled = true
//! level = "info"
//! format = "json"
//! ```

#![doc(html_root_url = "https://docs.rs/ratify-config/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod error;
mod loader;
mod schema;

pub use config::RatifySettings;
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::{LoggingSettings, ServerSettings, StatusRule};
