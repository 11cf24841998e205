//! Dispatch error types.
//!
//! Every failure while handling a request falls into one of three classes:
//!
//! - [`ValidationFailure`]: the caller sent input a route's fields rejected
//! - [`AppError`](crate::AppError): the handler itself failed
//! - [`DispatchFault`]: something went wrong inside the dispatcher
//!
//! Private application errors and dispatch faults are handed to the
//! configured reporting hook as a [`ReportedError`].

use std::fmt;

use http::StatusCode;
use ratify_core::ValidationError;
use serde::Serialize;
use thiserror::Error;

use crate::handler::AppError;
use crate::protocol::ProtocolError;

/// Boxed error type used at transport seams.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// The part of a request that failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestPart {
    /// The query string.
    Query,
    /// The request headers.
    Headers,
    /// The request body.
    Body,
}

impl RequestPart {
    /// Returns the lowercase name of the part.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Query => "query",
            Self::Headers => "headers",
            Self::Body => "body",
        }
    }
}

impl fmt::Display for RequestPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request input was rejected before the handler ran.
///
/// Serialized as the body of the validation error response:
///
/// ```json
/// {"part": "query", "path": "query.page", "message": "Not a number", "received": "x"}
/// ```
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[error("invalid request {part}: {error}")]
pub struct ValidationFailure {
    /// Which part of the request was rejected.
    pub part: RequestPart,
    /// The field error, rooted at the part name.
    #[serde(flatten)]
    pub error: ValidationError,
}

impl ValidationFailure {
    /// Wraps a field error raised while validating `part`.
    #[must_use]
    pub fn new(part: RequestPart, error: ValidationError) -> Self {
        Self {
            part,
            error: error.within(part.as_str()),
        }
    }

    /// Input that could not even be decoded into a structured value.
    #[must_use]
    pub fn malformed(part: RequestPart, reason: impl fmt::Display, received: &str) -> Self {
        Self {
            part,
            error: ValidationError::new(
                part.as_str(),
                format!("Malformed {part}: {reason}"),
                &serde_json::Value::String(received.to_string()),
            ),
        }
    }
}

/// A failure inside the dispatcher rather than in the handler's logic.
///
/// Faults are never surfaced to the caller beyond the framework status.
#[derive(Debug, Error)]
pub enum DispatchFault {
    /// Validated input could not be converted to the handler's types.
    #[error("validated {part} does not fit the handler's input type: {source}")]
    RequestShape {
        /// Which input failed to convert.
        part: &'static str,
        /// The conversion error.
        #[source]
        source: serde_json::Error,
    },

    /// The handler's reply could not be converted to a structured value.
    #[error("reply {part} could not be converted: {source}")]
    ReplyShape {
        /// Which reply part failed to convert.
        part: &'static str,
        /// The conversion error.
        #[source]
        source: serde_json::Error,
    },

    /// The handler chose a status the route does not declare.
    #[error("status {0} is not declared by the route's response")]
    UndeclaredStatus(StatusCode),

    /// The response could not be written by the wire protocol.
    #[error("failed to write response: {0}")]
    Protocol(#[from] ProtocolError),

    /// A reply header had an invalid name or value.
    #[error("invalid response header '{name}': {reason}")]
    InvalidHeader {
        /// Header name as returned by the handler.
        name: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The request body could not be read from the transport.
    #[error("failed to read request body: {0}")]
    BodyRead(#[source] BoxError),

    /// The handler panicked.
    #[error("handler panicked: {0}")]
    Panicked(String),
}

impl DispatchFault {
    /// Creates a request conversion fault.
    #[must_use]
    pub fn request_shape(part: &'static str, source: serde_json::Error) -> Self {
        Self::RequestShape { part, source }
    }

    /// Creates a reply conversion fault.
    #[must_use]
    pub fn reply_shape(part: &'static str, source: serde_json::Error) -> Self {
        Self::ReplyShape { part, source }
    }

    /// Creates an invalid header fault.
    #[must_use]
    pub fn invalid_header(name: impl Into<String>, reason: impl fmt::Display) -> Self {
        Self::InvalidHeader {
            name: name.into(),
            reason: reason.to_string(),
        }
    }
}

/// An unexpected error handed to the reporting hook.
#[derive(Debug, Error)]
pub enum ReportedError {
    /// A private application error raised by a handler.
    #[error(transparent)]
    App(AppError),

    /// A fault inside the dispatcher.
    #[error(transparent)]
    Fault(DispatchFault),
}

impl ReportedError {
    /// Returns a short label for logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::App(_) => "app",
            Self::Fault(_) => "framework",
        }
    }
}
