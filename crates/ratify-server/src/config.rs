//! Server configuration.
//!
//! [`ServerConfig`] carries everything the dispatcher consults while
//! turning a request into a response: the wire protocol, the text
//! encoding, the status codes used for each error class, the default
//! status rule and the hook that receives unexpected errors.
//!
//! # Example
//!
//! ```rust
//! use ratify_server::ServerConfig;
//! use http::StatusCode;
//!
//! let config = ServerConfig::builder()
//!     .base_url("http://localhost:3000")
//!     .app_error_status(StatusCode::SERVICE_UNAVAILABLE)
//!     .build();
//!
//! assert_eq!(config.port().unwrap(), 3000);
//! assert_eq!(config.app_error_status(), StatusCode::SERVICE_UNAVAILABLE);
//! ```

use std::fmt;
use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use http::{StatusCode, Uri};

use crate::error::ReportedError;
use crate::protocol::{JsonProtocol, TextEncoding, WireProtocol};
use crate::server::ServerError;

/// Default base URL.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Default status for rejected request input.
pub const DEFAULT_VALIDATION_ERROR_STATUS: StatusCode = StatusCode::BAD_REQUEST;

/// Default status for errors raised by handlers.
pub const DEFAULT_APP_ERROR_STATUS: StatusCode = StatusCode::INTERNAL_SERVER_ERROR;

/// Default status for faults inside the dispatcher itself.
pub const DEFAULT_FRAMEWORK_ERROR_STATUS: StatusCode = StatusCode::BAD_GATEWAY;

/// Default time to wait for open connections after shutdown, in seconds.
pub const DEFAULT_SHUTDOWN_TIMEOUT_SECS: u64 = 30;

/// Future returned by an [`ErrorReporter`].
pub type ReportFuture = Pin<Box<dyn Future<Output = Result<(), anyhow::Error>> + Send>>;

/// Hook receiving unexpected errors.
///
/// Called once per private application error or framework fault. Public
/// application errors are expected outcomes and never reach the hook.
pub type ErrorReporter = Arc<dyn Fn(ReportedError) -> ReportFuture + Send + Sync>;

/// How a status is chosen when the handler leaves it unset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusDefault {
    /// Use the status declared on the route's response.
    ///
    /// For a multi-variant response this is the first declared variant.
    #[default]
    Declared,

    /// Choose by whether the handler returned response data.
    FromBody {
        /// Status when data is present.
        with_data: StatusCode,
        /// Status when no data is returned.
        without_data: StatusCode,
    },
}

impl StatusDefault {
    /// `200` with data, `201` without.
    #[must_use]
    pub const fn legacy() -> Self {
        Self::FromBody {
            with_data: StatusCode::OK,
            without_data: StatusCode::CREATED,
        }
    }
}

/// Configuration shared by the dispatcher and the HTTP server.
///
/// Use [`ServerConfig::builder()`] to construct instances.
#[derive(Clone)]
pub struct ServerConfig {
    base_url: String,
    protocol: Arc<dyn WireProtocol>,
    encoding: TextEncoding,
    validation_error_status: StatusCode,
    app_error_status: StatusCode,
    framework_error_status: StatusCode,
    status_default: StatusDefault,
    reporter: ErrorReporter,
    shutdown_timeout: Duration,
}

impl ServerConfig {
    /// Creates a new configuration builder.
    #[must_use]
    pub fn builder() -> ServerConfigBuilder {
        ServerConfigBuilder::default()
    }

    /// Returns the base URL the server is published under.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the wire protocol.
    #[must_use]
    pub fn protocol(&self) -> &dyn WireProtocol {
        self.protocol.as_ref()
    }

    /// Returns the body text encoding.
    #[must_use]
    pub fn encoding(&self) -> TextEncoding {
        self.encoding
    }

    /// Returns the status used for rejected request input.
    #[must_use]
    pub fn validation_error_status(&self) -> StatusCode {
        self.validation_error_status
    }

    /// Returns the status used for handler errors.
    #[must_use]
    pub fn app_error_status(&self) -> StatusCode {
        self.app_error_status
    }

    /// Returns the status used for dispatcher faults.
    #[must_use]
    pub fn framework_error_status(&self) -> StatusCode {
        self.framework_error_status
    }

    /// Returns the default status rule.
    #[must_use]
    pub fn status_default(&self) -> StatusDefault {
        self.status_default
    }

    /// Returns the error reporting hook.
    #[must_use]
    pub fn reporter(&self) -> &ErrorReporter {
        &self.reporter
    }

    /// Returns how long shutdown waits for open connections.
    #[must_use]
    pub fn shutdown_timeout(&self) -> Duration {
        self.shutdown_timeout
    }

    /// Returns the port to listen on.
    ///
    /// An explicit port in the base URL wins; otherwise `http` maps to 80
    /// and `https` to 443.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::InvalidBaseUrl`] if the URL cannot be parsed
    /// or has neither a port nor a known scheme.
    pub fn port(&self) -> Result<u16, ServerError> {
        let uri: Uri = self
            .base_url
            .parse()
            .map_err(|e: http::uri::InvalidUri| ServerError::invalid_base_url(&self.base_url, e.to_string()))?;

        if let Some(port) = uri.port_u16() {
            return Ok(port);
        }

        match uri.scheme_str() {
            Some("http") => Ok(80),
            Some("https") => Ok(443),
            Some(other) => Err(ServerError::invalid_base_url(
                &self.base_url,
                format!("no default port for scheme '{other}'"),
            )),
            None => Err(ServerError::invalid_base_url(&self.base_url, "missing scheme")),
        }
    }

    /// Returns the address to bind: every interface on [`port`](Self::port).
    ///
    /// # Errors
    ///
    /// Same as [`port`](Self::port).
    pub fn socket_addr(&self) -> Result<SocketAddr, ServerError> {
        Ok(SocketAddr::from(([0, 0, 0, 0], self.port()?)))
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerConfig")
            .field("base_url", &self.base_url)
            .field("protocol", &self.protocol)
            .field("encoding", &self.encoding)
            .field("validation_error_status", &self.validation_error_status)
            .field("app_error_status", &self.app_error_status)
            .field("framework_error_status", &self.framework_error_status)
            .field("status_default", &self.status_default)
            .field("shutdown_timeout", &self.shutdown_timeout)
            .finish_non_exhaustive()
    }
}

/// Builder for [`ServerConfig`].
#[derive(Clone)]
pub struct ServerConfigBuilder {
    base_url: String,
    protocol: Arc<dyn WireProtocol>,
    encoding: TextEncoding,
    validation_error_status: StatusCode,
    app_error_status: StatusCode,
    framework_error_status: StatusCode,
    status_default: StatusDefault,
    reporter: ErrorReporter,
    shutdown_timeout: Duration,
}

impl ServerConfigBuilder {
    /// Creates a builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            protocol: Arc::new(JsonProtocol),
            encoding: TextEncoding::default(),
            validation_error_status: DEFAULT_VALIDATION_ERROR_STATUS,
            app_error_status: DEFAULT_APP_ERROR_STATUS,
            framework_error_status: DEFAULT_FRAMEWORK_ERROR_STATUS,
            status_default: StatusDefault::default(),
            reporter: log_reporter(),
            shutdown_timeout: Duration::from_secs(DEFAULT_SHUTDOWN_TIMEOUT_SECS),
        }
    }

    /// Sets the base URL.
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets the wire protocol.
    #[must_use]
    pub fn protocol(mut self, protocol: impl WireProtocol + 'static) -> Self {
        self.protocol = Arc::new(protocol);
        self
    }

    /// Sets the body text encoding.
    #[must_use]
    pub fn encoding(mut self, encoding: TextEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Sets the status used for rejected request input.
    #[must_use]
    pub fn validation_error_status(mut self, status: StatusCode) -> Self {
        self.validation_error_status = status;
        self
    }

    /// Sets the status used for handler errors.
    #[must_use]
    pub fn app_error_status(mut self, status: StatusCode) -> Self {
        self.app_error_status = status;
        self
    }

    /// Sets the status used for dispatcher faults.
    #[must_use]
    pub fn framework_error_status(mut self, status: StatusCode) -> Self {
        self.framework_error_status = status;
        self
    }

    /// Sets the default status rule.
    #[must_use]
    pub fn status_default(mut self, rule: StatusDefault) -> Self {
        self.status_default = rule;
        self
    }

    /// Sets the shutdown timeout.
    #[must_use]
    pub fn shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }

    /// Sets the error reporting hook.
    ///
    /// # Example
    ///
    /// ```rust
    /// use ratify_server::ServerConfig;
    ///
    /// let config = ServerConfig::builder()
    ///     .error_reporter(|err| async move {
    ///         eprintln!("unexpected: {err}");
    ///         Ok(())
    ///     })
    ///     .build();
    /// # let _ = config;
    /// ```
    #[must_use]
    pub fn error_reporter<F, Fut>(mut self, hook: F) -> Self
    where
        F: Fn(ReportedError) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), anyhow::Error>> + Send + 'static,
    {
        self.reporter = Arc::new(move |err| Box::pin(hook(err)) as ReportFuture);
        self
    }

    /// Builds the [`ServerConfig`].
    #[must_use]
    pub fn build(self) -> ServerConfig {
        ServerConfig {
            base_url: self.base_url,
            protocol: self.protocol,
            encoding: self.encoding,
            validation_error_status: self.validation_error_status,
            app_error_status: self.app_error_status,
            framework_error_status: self.framework_error_status,
            status_default: self.status_default,
            reporter: self.reporter,
            shutdown_timeout: self.shutdown_timeout,
        }
    }
}

impl Default for ServerConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ServerConfigBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerConfigBuilder")
            .field("base_url", &self.base_url)
            .field("encoding", &self.encoding)
            .field("status_default", &self.status_default)
            .finish_non_exhaustive()
    }
}

/// The default hook: log the error and carry on.
fn log_reporter() -> ErrorReporter {
    Arc::new(|err: ReportedError| {
        tracing::error!(error = %err, kind = err.kind(), "unexpected error while handling request");
        Box::pin(async { Ok(()) }) as ReportFuture
    })
}
