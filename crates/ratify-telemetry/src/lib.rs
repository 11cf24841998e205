//! Logging setup for Ratify services.
//!
//! Ratify emits `tracing` events and spans; this crate installs a
//! subscriber for them.
//!
//! ```rust,no_run
//! use ratify_telemetry::{init_logging, LogConfig, LogFormat};
//!
//! let config = LogConfig {
//!     format: LogFormat::Compact,
//!     ..LogConfig::production()
//! };
//! init_logging(&config).expect("logging");
//! ```

#![doc(html_root_url = "https://docs.rs/ratify-telemetry/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod logging;

pub use error::TelemetryError;
pub use logging::{create_env_filter, fields, init_logging, LogConfig, LogFormat};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
